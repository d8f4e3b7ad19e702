//! Case-insensitive, case-preserving header storage.
//!
//! # Components
//!
//! - [`HeaderBag`]: ordered header storage shared by every message type
//!   - names compare case-insensitively, the stored case is kept for output
//!   - every write is validated before anything changes
//! - [`IntoHeaderValues`]: conversion of strings, numbers and collections of them into
//!   header values
//!
//! # Validation
//!
//! Names must be non-empty RFC 7230 tokens. Values may contain visible ASCII, space, tab
//! and obs-text; a CR or LF is only accepted as part of a CRLF immediately followed by a
//! space or tab (obsolete line folding). Anything else is rejected to prevent header
//! injection.

mod bag;
mod validate;
mod value;

pub use bag::HeaderBag;
pub(crate) use validate::is_valid_value;
pub use value::IntoHeaderValues;
pub use value::ToHeaderValue;
