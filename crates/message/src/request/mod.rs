//! Requests.
//!
//! - [`Request`]: method, uri and optional request-target on top of a [`Message`](crate::Message)
//! - [`ServerRequest`]: a received request with server parameters, cookies, query parameters,
//!   uploaded files, a parsed body and attributes
//! - [`HttpRequest`]: the request-line behaviour both share, including the `Host` header
//!   synchronization of [`HttpRequest::with_uri`]

mod client;
mod files;
mod method;
mod server;

pub use client::HttpRequest;
pub use client::Request;
pub use client::RequestBuilder;
pub use files::FileTree;
pub use method::Method;
pub use method::VALID_METHODS;
pub use server::Params;
pub use server::ServerRequest;
pub use server::ServerRequestBuilder;
