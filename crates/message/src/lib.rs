//! Immutable HTTP message values
//!
//! This crate models HTTP requests, server-side requests, responses, URIs, bodies and uploaded
//! files as values. Nothing is modified in place: every `with_*` method validates its input
//! and returns a new value, so a message can be handed to several processing stages without
//! any of them observing the others' changes.
//!
//! # Features
//!
//! - RFC 3986 URI parsing with per-component percent-encoding that never double-encodes
//! - Case-insensitive, case-preserving headers with header-injection checks on every write
//! - Requests that keep their `Host` header in sync with their URI
//! - Server requests with cookies, query parameters, a parsed body, attributes and a nested
//!   tree of uploaded files
//! - Responses with standard reason phrases
//! - Shared, seekable bodies over memory buffers or files
//! - Conversions to and from the [`http`] crate
//!
//! # Example
//!
//! ```
//! use micro_message::prelude::*;
//! use micro_message::{Method, Request, Response, Stream};
//!
//! let request = Request::builder()
//!     .method("post")
//!     .uri("https://example.com/items?draft=1")
//!     .header("Content-Type", "application/json")
//!     .body(Stream::from_bytes(r#"{"name":"widget"}"#))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(request.method(), Some(Method::Post));
//! assert_eq!(request.header_line("host"), "example.com");
//! assert_eq!(request.request_target(), "/items?draft=1");
//!
//! let response = Response::new()
//!     .with_status(201, "")
//!     .unwrap()
//!     .with_header("Location", "/items/7")
//!     .unwrap();
//!
//! assert_eq!(response.reason_phrase(), "Created");
//! ```
//!
//! # Architecture
//!
//! - [`uri`]: [`Uri`] value object
//! - [`header`]: [`HeaderBag`] and header value conversions
//! - [`message`]: [`Message`] (version, headers, body) and the [`HttpMessage`] trait
//! - [`request`]: [`Request`], [`ServerRequest`] and the [`HttpRequest`] trait
//! - [`response`]: [`Response`] and status handling
//! - [`stream`]: [`Stream`] bodies and their resources
//! - [`upload`]: [`UploadedFile`] and the file-move capability
//! - [`interop`]: conversions to and from the [`http`] crate
//!
//! # Error Handling
//!
//! - [`ArgumentError`]: malformed input, raised before any value is produced
//! - [`RuntimeError`]: a stream or filesystem operation failed, or the object's state forbids it
//! - [`MessageError`]: either of the two
//!
//! Rendering a message or stream as a string never fails; an unreadable body renders as empty.

pub mod error;
pub mod header;
pub mod interop;
pub mod message;
pub mod request;
pub mod response;
pub mod stream;
pub mod upload;
pub mod uri;

mod utils;

pub use error::{ArgumentError, MessageError, RuntimeError};
pub use header::HeaderBag;
pub use message::{HttpMessage, Message, ProtocolVersion};
pub use request::{FileTree, HttpRequest, Method, Request, ServerRequest, VALID_METHODS};
pub use response::Response;
pub use stream::Stream;
pub use upload::UploadedFile;
pub use uri::Uri;

/// Protocol version of a message unless one is set.
pub const DEFAULT_PROTOCOL_VERSION: ProtocolVersion = ProtocolVersion::Http11;

/// The message traits, to bring their methods into scope.
pub mod prelude {
    pub use crate::message::HttpMessage;
    pub use crate::request::HttpRequest;
}
