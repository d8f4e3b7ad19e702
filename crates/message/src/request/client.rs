use tracing::trace;

use super::method::Method;
use crate::error::ArgumentError;
use crate::header::IntoHeaderValues;
use crate::message::{HttpMessage, Message, ProtocolVersion};
use crate::stream::Stream;
use crate::uri::Uri;
use crate::utils::ensure;

const HOST: &str = "Host";

/// A client-side HTTP request.
///
/// The method is optional: a request built without one reports `None`.
#[derive(Debug, Clone, Default)]
pub struct Request {
    message: Message,
    method: Option<Method>,
    uri: Uri,
    target: Option<String>,
}

impl Request {
    /// A request with no method, an empty uri and an empty body.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> RequestBuilder {
        RequestBuilder::new()
    }
}

impl HttpMessage for Request {
    fn message(&self) -> &Message {
        &self.message
    }

    fn with_message(&self, message: Message) -> Self {
        Self { message, ..self.clone() }
    }
}

/// Request line behaviour shared by [`Request`] and
/// [`ServerRequest`](crate::ServerRequest).
pub trait HttpRequest: HttpMessage {
    fn request(&self) -> &Request;

    /// Returns a copy of `self` carrying `request`.
    fn with_request(&self, request: Request) -> Self;

    fn method(&self) -> Option<Method> {
        self.request().method
    }

    fn uri(&self) -> &Uri {
        &self.request().uri
    }

    /// The explicit request-target when one was set, otherwise the uri's path (`/` when empty)
    /// followed by `?query` when the uri has a query.
    fn request_target(&self) -> String {
        let request = self.request();
        if let Some(target) = &request.target {
            return target.clone();
        }

        let path = match request.uri.path() {
            "" => "/",
            path => path,
        };

        match request.uri.query() {
            "" => path.to_owned(),
            query => format!("{path}?{query}"),
        }
    }

    /// Sets the method, parsed case-insensitively. An empty string clears it.
    ///
    /// # Errors
    ///
    /// Fails unless the method is one of [`VALID_METHODS`](crate::VALID_METHODS).
    fn with_method(&self, method: &str) -> Result<Self, ArgumentError> {
        let method = if method.is_empty() { None } else { Some(method.parse()?) };
        Ok(self.with_request(Request { method, ..self.request().clone() }))
    }

    /// Replaces the uri and synchronizes the `Host` header with it.
    ///
    /// When the new uri has a host, `Host` becomes `host[:port]`. With `preserve_host` that only
    /// happens if the current `Host` header is missing or empty. A uri without a host never
    /// touches the header.
    fn with_uri(&self, uri: Uri, preserve_host: bool) -> Self {
        let request = self.request();
        let mut message = request.message.clone();

        if let Some(host) = uri.host_header()
            && (!preserve_host || request.message.header_line(HOST).is_empty())
        {
            trace!(%host, preserve_host, "syncing host header from uri");
            message.headers_mut().insert_validated(HOST, host);
        }

        self.with_request(Request { message, uri, ..request.clone() })
    }

    /// Overrides the request-target. An empty target clears the override.
    ///
    /// # Errors
    ///
    /// Fails when the target contains whitespace.
    fn with_request_target(&self, target: &str) -> Result<Self, ArgumentError> {
        ensure!(!target.contains(char::is_whitespace), ArgumentError::invalid_request_target(target));
        let target = if target.is_empty() { None } else { Some(target.to_owned()) };
        Ok(self.with_request(Request { target, ..self.request().clone() }))
    }
}

impl HttpRequest for Request {
    fn request(&self) -> &Request {
        self
    }

    fn with_request(&self, request: Request) -> Self {
        request
    }
}

/// Collects the parts of a [`Request`] and validates them once in [`build`](RequestBuilder::build).
///
/// ```
/// use micro_message::prelude::*;
/// use micro_message::{Method, Request};
///
/// let request = Request::builder()
///     .method("get")
///     .uri("http://example.com:8080/search?q=rust")
///     .header("Accept", "text/html")
///     .build()
///     .unwrap();
///
/// assert_eq!(request.method(), Some(Method::Get));
/// assert_eq!(request.request_target(), "/search?q=rust");
/// assert_eq!(request.header_line("host"), "example.com:8080");
/// ```
#[derive(Debug)]
pub struct RequestBuilder {
    inner: Result<Request, ArgumentError>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self { inner: Ok(Request::new()) }
    }

    fn and_then<F>(self, f: F) -> Self
    where
        F: FnOnce(Request) -> Result<Request, ArgumentError>,
    {
        Self { inner: self.inner.and_then(f) }
    }

    pub fn method(self, method: &str) -> Self {
        self.and_then(|request| request.with_method(method))
    }

    /// Sets the uri from a [`Uri`] or a string to parse. `Host` is filled from the uri unless a
    /// non-empty `Host` header was already added.
    pub fn uri<U>(self, uri: U) -> Self
    where
        U: TryInto<Uri>,
        U::Error: Into<ArgumentError>,
    {
        self.and_then(|request| Ok(request.with_uri(uri.try_into().map_err(Into::<ArgumentError>::into)?, true)))
    }

    /// Appends values to a header.
    pub fn header<V: IntoHeaderValues>(self, name: &str, values: V) -> Self {
        self.and_then(|request| request.with_added_header(name, values))
    }

    pub fn version(self, version: ProtocolVersion) -> Self {
        self.and_then(|request| request.with_protocol_version(version.as_str()))
    }

    pub fn body(self, body: Stream) -> Self {
        self.and_then(|request| Ok(request.with_body(body)))
    }

    pub fn request_target(self, target: &str) -> Self {
        self.and_then(|request| request.with_request_target(target))
    }

    /// # Errors
    ///
    /// Returns the first error raised by any of the builder calls.
    pub fn build(self) -> Result<Request, ArgumentError> {
        self.inner
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
