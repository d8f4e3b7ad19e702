//! Uniform Resource Identifier value object ([RFC3986])
//!
//! [RFC3986]: <https://datatracker.ietf.org/doc/html/rfc3986>
//!
//! A [`Uri`] holds the seven components of a URI reference: scheme, user-info, host, port,
//! path, query and fragment. It is immutable; every `with_*` method validates its input and
//! returns a new `Uri`.
//!
//! # Normalization
//!
//! - scheme and host are lowercased
//! - a port equal to the scheme's default port (80 for `http`, 443 for `https`) reads as absent
//! - user-info, path, query and fragment are percent-encoded with the character set allowed
//!   for that component, leaving existing `%XX` triples untouched, so encoding is idempotent
//!
//! Only the empty scheme, `http` and `https` are supported.

mod encode;
mod parser;
mod port;
mod reference;
mod scheme;

pub use port::IntoPort;
pub use reference::Uri;
