use std::fmt;

use tracing::debug;

use super::status::{IntoStatusCode, reason_phrase};
use crate::error::ArgumentError;
use crate::header::{IntoHeaderValues, is_valid_value};
use crate::message::{HttpMessage, Message, ProtocolVersion};
use crate::stream::Stream;

/// An HTTP response: a status line on top of a [`Message`].
#[derive(Debug, Clone)]
pub struct Response {
    message: Message,
    status: u16,
    reason: String,
}

impl Response {
    /// A `200 OK` response with an empty body.
    pub fn new() -> Self {
        Self { message: Message::new(), status: 200, reason: "OK".to_owned() }
    }

    pub fn builder() -> ResponseBuilder {
        ResponseBuilder::new()
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn reason_phrase(&self) -> &str {
        &self.reason
    }

    /// Sets the status code and reason phrase. An empty `reason` selects the standard phrase
    /// of the code.
    ///
    /// # Errors
    ///
    /// Fails when the code is not an integer in `100..=599`, when `reason` is empty and the
    /// code has no standard phrase, or when `reason` holds a line break or control character.
    pub fn with_status<C: IntoStatusCode>(&self, code: C, reason: &str) -> Result<Self, ArgumentError> {
        let status = code.into_status_code()?;

        let reason = if reason.is_empty() {
            let Some(phrase) = reason_phrase(status) else {
                debug!(code = status, "status code has no standard reason phrase");
                return Err(ArgumentError::MissingReasonPhrase { code: status });
            };
            phrase.to_owned()
        } else if reason.contains(['\r', '\n']) || !is_valid_value(reason) {
            debug!(code = status, reason, "rejected invalid reason phrase");
            return Err(ArgumentError::invalid_reason_phrase(reason));
        } else {
            reason.to_owned()
        };

        Ok(Self { status, reason, ..self.clone() })
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpMessage for Response {
    fn message(&self) -> &Message {
        &self.message
    }

    fn with_message(&self, message: Message) -> Self {
        Self { message, ..self.clone() }
    }
}

/// Renders the status line, the header lines and the body.
impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP/{} {} {}\r\n{}", self.protocol_version(), self.status, self.reason, self.message)
    }
}

/// Collects the parts of a [`Response`] and validates them once in
/// [`build`](ResponseBuilder::build).
#[derive(Debug)]
pub struct ResponseBuilder {
    inner: Result<Response, ArgumentError>,
    status: Result<u16, ArgumentError>,
    reason: String,
}

impl ResponseBuilder {
    pub fn new() -> Self {
        Self { inner: Ok(Response::new()), status: Ok(200), reason: String::new() }
    }

    fn and_then<F>(self, f: F) -> Self
    where
        F: FnOnce(Response) -> Result<Response, ArgumentError>,
    {
        Self { inner: self.inner.and_then(f), ..self }
    }

    pub fn status<C: IntoStatusCode>(mut self, code: C) -> Self {
        self.status = code.into_status_code();
        self
    }

    /// A custom reason phrase. Without one the standard phrase of the status is used.
    pub fn reason(mut self, reason: &str) -> Self {
        reason.clone_into(&mut self.reason);
        self
    }

    /// Appends values to a header.
    pub fn header<V: IntoHeaderValues>(self, name: &str, values: V) -> Self {
        self.and_then(|response| response.with_added_header(name, values))
    }

    pub fn version(self, version: ProtocolVersion) -> Self {
        self.and_then(|response| response.with_protocol_version(version.as_str()))
    }

    pub fn body(self, body: Stream) -> Self {
        self.and_then(|response| Ok(response.with_body(body)))
    }

    /// # Errors
    ///
    /// Returns the first error raised by any of the builder calls, or the status error of
    /// [`Response::with_status`].
    pub fn build(self) -> Result<Response, ArgumentError> {
        self.inner?.with_status(self.status?, &self.reason)
    }
}

impl Default for ResponseBuilder {
    fn default() -> Self {
        Self::new()
    }
}
