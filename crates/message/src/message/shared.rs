use std::fmt;

use super::version::ProtocolVersion;
use crate::error::ArgumentError;
use crate::header::{HeaderBag, IntoHeaderValues};
use crate::stream::Stream;

/// Protocol version, headers and body of an HTTP message.
///
/// Cloning a `Message` copies the version and headers and shares the body [`Stream`].
#[derive(Debug, Clone, Default)]
pub struct Message {
    version: ProtocolVersion,
    headers: HeaderBag,
    body: Stream,
}

impl Message {
    /// A `1.1` message with no headers and an empty in-memory body.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn headers_mut(&mut self) -> &mut HeaderBag {
        &mut self.headers
    }
}

/// Shared behaviour of requests and responses.
///
/// Implementors only expose their embedded [`Message`] and rebuild themselves around a
/// replacement one. Every `with_*` method returns a new value and leaves `self` untouched;
/// the body handle is carried over to the new value unless [`with_body`](HttpMessage::with_body)
/// replaces it.
pub trait HttpMessage: Sized {
    fn message(&self) -> &Message;

    /// Returns a copy of `self` carrying `message`.
    fn with_message(&self, message: Message) -> Self;

    fn protocol_version(&self) -> ProtocolVersion {
        self.message().version
    }

    fn headers(&self) -> &HeaderBag {
        &self.message().headers
    }

    /// Values of the header `name`, matched case-insensitively; empty when absent.
    fn header(&self, name: &str) -> &[String] {
        self.headers().get(name)
    }

    /// Values of the header `name` joined with `", "`; empty when absent.
    fn header_line(&self, name: &str) -> String {
        self.headers().line(name)
    }

    fn has_header(&self, name: &str) -> bool {
        self.headers().contains(name)
    }

    fn body(&self) -> &Stream {
        &self.message().body
    }

    /// # Errors
    ///
    /// Fails unless `version` is one of `1.0`, `1.1` or `2.0`.
    fn with_protocol_version(&self, version: &str) -> Result<Self, ArgumentError> {
        let version = version.parse()?;
        Ok(self.with_message(Message { version, ..self.message().clone() }))
    }

    /// Replaces the values of `name`; the header is reported under `name`'s case afterwards.
    ///
    /// # Errors
    ///
    /// Fails when the name is not a valid token or a value contains a forbidden byte.
    fn with_header<V: IntoHeaderValues>(&self, name: &str, values: V) -> Result<Self, ArgumentError> {
        let mut headers = self.headers().clone();
        headers.insert(name, values)?;
        Ok(self.with_headers(headers))
    }

    /// Appends values to `name`, creating the header when it is absent.
    ///
    /// # Errors
    ///
    /// Same as [`with_header`](HttpMessage::with_header).
    fn with_added_header<V: IntoHeaderValues>(&self, name: &str, values: V) -> Result<Self, ArgumentError> {
        let mut headers = self.headers().clone();
        headers.append(name, values)?;
        Ok(self.with_headers(headers))
    }

    /// Removes `name`, matched case-insensitively. Absent headers are ignored.
    fn without_header(&self, name: &str) -> Self {
        let mut headers = self.headers().clone();
        headers.remove(name);
        self.with_headers(headers)
    }

    /// Replaces the whole header set.
    fn with_headers(&self, headers: HeaderBag) -> Self {
        self.with_message(Message { headers, ..self.message().clone() })
    }

    fn with_body(&self, body: Stream) -> Self {
        self.with_message(Message { body, ..self.message().clone() })
    }
}

impl HttpMessage for Message {
    fn message(&self) -> &Message {
        self
    }

    fn with_message(&self, message: Message) -> Self {
        message
    }
}

/// Renders the header lines followed by a blank line and the body.
impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.headers.lines() {
            write!(f, "{line}\r\n")?;
        }
        write!(f, "\r\n{}", self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> Message {
        Message::new().with_header("X-Foo", ["foo", "bar"]).unwrap()
    }

    #[test]
    fn test_defaults() {
        let message = Message::new();
        assert_eq!(message.protocol_version(), ProtocolVersion::Http11);
        assert!(message.headers().is_empty());
        assert_eq!(message.body().to_string(), "");
        assert!(message.body().is_writable());
    }

    #[test]
    fn test_with_protocol_version() {
        let message = Message::new();
        let changed = message.with_protocol_version("1.0").unwrap();
        assert_eq!(changed.protocol_version(), ProtocolVersion::Http10);
        assert_eq!(message.protocol_version(), ProtocolVersion::Http11);

        for version in ["1", "1.2", "1.2.3", "3.0"] {
            assert!(message.with_protocol_version(version).is_err());
        }
    }

    #[test]
    fn test_with_header_is_copy_on_write() {
        let original = Message::new();
        let message = original.with_header("X-Foo", "bar").unwrap();
        assert!(!original.has_header("X-Foo"));
        assert_eq!(message.header("x-foo"), ["bar"]);
    }

    #[test]
    fn test_header_line() {
        assert_eq!(message().header_line("X-Foo"), "foo, bar");
        assert_eq!(message().header_line("X-Nope"), "");
    }

    #[test]
    fn test_has_header_any_case() {
        let message = message();
        assert!(message.has_header("X-FOO"));
        assert!(message.has_header("x-foo"));
    }

    #[test]
    fn test_with_header_takes_new_case() {
        let message = message().with_header("x-foo", "baz").unwrap();
        assert_eq!(message.headers().iter().map(|(name, _)| name).collect::<Vec<_>>(), ["x-foo"]);
        assert_eq!(message.header("X-Foo"), ["baz"]);
    }

    #[test]
    fn test_with_added_header_keeps_case() {
        let message = message().with_added_header("x-FOO", "baz").unwrap();
        assert_eq!(message.headers().name("x-foo"), Some("X-Foo"));
        assert_eq!(message.header_line("X-Foo"), "foo, bar, baz");

        let added = Message::new().with_added_header("X-Foo", "bar").unwrap();
        assert_eq!(added.header("x-foo"), ["bar"]);
    }

    #[test]
    fn test_without_header() {
        let message = message().without_header("x-foo");
        assert!(!message.has_header("X-Foo"));

        let unchanged = message.without_header("X-Nope");
        assert!(unchanged.headers().is_empty());
    }

    #[test]
    fn test_invalid_headers_are_rejected() {
        let message = message();
        assert!(message.with_header("X-Foo\r\n", "bar").is_err());
        assert!(message.with_header("X-Foo", "bar\r\nX-Injected: yes").is_err());
        assert!(message.with_added_header("X-Foo", ["ok", "bad\n"]).is_err());
        assert!(message.with_header("", "bar").is_err());
        assert_eq!(message.header_line("X-Foo"), "foo, bar");
    }

    #[test]
    fn test_body_is_shared_until_replaced() {
        let message = message();
        let copy = message.with_header("X-Bar", "baz").unwrap();
        assert!(copy.body().ptr_eq(message.body()));

        let body = Stream::from_bytes("payload");
        let replaced = message.with_body(body.clone());
        assert!(replaced.body().ptr_eq(&body));
        assert!(!message.body().ptr_eq(&body));
    }

    #[test]
    fn test_display() {
        let message = message().with_body(Stream::from_bytes("hello"));
        assert_eq!(message.to_string(), "X-Foo: foo, bar\r\n\r\nhello");
    }
}
