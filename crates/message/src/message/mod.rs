//! The parts every HTTP message shares: protocol version, headers and body.
//!
//! [`Message`] holds those three fields. Requests and responses embed one and expose it
//! through the [`HttpMessage`] trait, whose provided methods implement the shared accessors
//! and the copy-on-write `with_*` methods once for every message type.

mod shared;
mod version;

pub use shared::HttpMessage;
pub use shared::Message;
pub use version::ProtocolVersion;
