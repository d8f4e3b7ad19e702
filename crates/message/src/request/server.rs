use serde_json::{Map, Value};
use tracing::debug;
use triomphe::Arc;

use super::client::{HttpRequest, Request};
use super::files::FileTree;
use crate::error::ArgumentError;
use crate::header::IntoHeaderValues;
use crate::message::{HttpMessage, Message, ProtocolVersion};
use crate::stream::Stream;
use crate::uri::Uri;

/// String-keyed parameters: server, cookie and query parameters and request attributes.
pub type Params = Map<String, Value>;

/// A request as seen by the server that received it.
///
/// On top of [`Request`] it carries the server environment, cookies, query parameters, the
/// uploaded files, the parsed body and free-form attributes that processing stages can attach.
/// The server parameters are fixed when the request is built; no `with_*` method replaces them.
#[derive(Debug, Clone, Default)]
pub struct ServerRequest {
    request: Request,
    server_params: Arc<Params>,
    cookie_params: Params,
    query_params: Params,
    uploaded_files: FileTree,
    parsed_body: Option<Value>,
    attributes: Params,
}

impl ServerRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ServerRequestBuilder {
        ServerRequestBuilder::new()
    }

    pub fn server_params(&self) -> &Params {
        &self.server_params
    }

    pub fn cookie_params(&self) -> &Params {
        &self.cookie_params
    }

    pub fn with_cookie_params(&self, cookie_params: Params) -> Self {
        Self { cookie_params, ..self.clone() }
    }

    pub fn query_params(&self) -> &Params {
        &self.query_params
    }

    pub fn with_query_params(&self, query_params: Params) -> Self {
        Self { query_params, ..self.clone() }
    }

    pub fn uploaded_files(&self) -> &FileTree {
        &self.uploaded_files
    }

    /// # Errors
    ///
    /// Fails when any leaf of the tree, at any depth, is not an uploaded file.
    pub fn with_uploaded_files<T: Into<FileTree>>(&self, uploaded_files: T) -> Result<Self, ArgumentError> {
        let uploaded_files = uploaded_files.into();
        uploaded_files.validate()?;
        Ok(Self { uploaded_files, ..self.clone() })
    }

    /// The deserialized body: `None`, an array or an object.
    pub fn parsed_body(&self) -> Option<&Value> {
        self.parsed_body.as_ref()
    }

    /// Sets the parsed body. `None` and `null` clear it.
    ///
    /// # Errors
    ///
    /// Fails for scalars: booleans, numbers and strings.
    pub fn with_parsed_body(&self, parsed_body: Option<Value>) -> Result<Self, ArgumentError> {
        let parsed_body = match parsed_body {
            None | Some(Value::Null) => None,
            Some(body @ (Value::Array(_) | Value::Object(_))) => Some(body),
            Some(other) => {
                debug!(body = %other, "rejected scalar parsed body");
                return Err(ArgumentError::invalid_parsed_body(format!(
                    "expected null, an array or an object, got {}",
                    kind(&other)
                )));
            }
        };

        Ok(Self { parsed_body, ..self.clone() })
    }

    pub fn attributes(&self) -> &Params {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// The attribute `name`, or `default` when it is not set.
    pub fn attribute_or<'a>(&'a self, name: &str, default: &'a Value) -> &'a Value {
        self.attribute(name).unwrap_or(default)
    }

    pub fn with_attribute<V: Into<Value>>(&self, name: &str, value: V) -> Self {
        let mut attributes = self.attributes.clone();
        attributes.insert(name.to_owned(), value.into());
        Self { attributes, ..self.clone() }
    }

    /// Removes the attribute `name`. Missing attributes are ignored.
    pub fn without_attribute(&self, name: &str) -> Self {
        let mut attributes = self.attributes.clone();
        attributes.remove(name);
        Self { attributes, ..self.clone() }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl HttpMessage for ServerRequest {
    fn message(&self) -> &Message {
        self.request.message()
    }

    fn with_message(&self, message: Message) -> Self {
        Self { request: self.request.with_message(message), ..self.clone() }
    }
}

impl HttpRequest for ServerRequest {
    fn request(&self) -> &Request {
        &self.request
    }

    fn with_request(&self, request: Request) -> Self {
        Self { request, ..self.clone() }
    }
}

/// Collects the parts of a [`ServerRequest`] and validates them once in
/// [`build`](ServerRequestBuilder::build).
#[derive(Debug)]
pub struct ServerRequestBuilder {
    inner: Result<ServerRequest, ArgumentError>,
    server_params: Params,
    query_params_from_uri: bool,
}

impl ServerRequestBuilder {
    pub fn new() -> Self {
        Self { inner: Ok(ServerRequest::new()), server_params: Params::new(), query_params_from_uri: false }
    }

    fn and_then<F>(self, f: F) -> Self
    where
        F: FnOnce(ServerRequest) -> Result<ServerRequest, ArgumentError>,
    {
        Self { inner: self.inner.and_then(f), ..self }
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

    pub fn server_params(mut self, server_params: Params) -> Self {
        self.server_params = server_params;
        self
    }

    pub fn cookie_params(self, cookie_params: Params) -> Self {
        self.and_then(|request| Ok(request.with_cookie_params(cookie_params)))
    }

    pub fn query_params(self, query_params: Params) -> Self {
        self.and_then(|request| Ok(request.with_query_params(query_params)))
    }

    /// Fills the query parameters from the uri's query string when the request is built,
    /// replacing any set with [`query_params`](ServerRequestBuilder::query_params).
    pub fn query_params_from_uri(mut self) -> Self {
        self.query_params_from_uri = true;
        self
    }

    pub fn uploaded_files<T: Into<FileTree>>(self, uploaded_files: T) -> Self {
        self.and_then(|request| request.with_uploaded_files(uploaded_files))
    }

    pub fn parsed_body(self, parsed_body: Value) -> Self {
        self.and_then(|request| request.with_parsed_body(Some(parsed_body)))
    }

    /// # Errors
    ///
    /// Returns the first error raised by any of the builder calls, or a query string that
    /// cannot be decoded.
    pub fn build(self) -> Result<ServerRequest, ArgumentError> {
        let mut request = self.inner?;
        request.server_params = Arc::new(self.server_params);

        if self.query_params_from_uri {
            request.query_params = decode_query(request.uri().query())?;
        }

        Ok(request)
    }
}

impl Default for ServerRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_query(query: &str) -> Result<Params, ArgumentError> {
    let pairs: Vec<(String, String)> =
        serde_urlencoded::from_str(query).map_err(|error| ArgumentError::invalid_query(query, error))?;
    Ok(pairs.into_iter().map(|(key, value)| (key, Value::String(value))).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Method;
    use crate::upload::UploadedFile;
    use serde_json::json;

    fn params(value: Value) -> Params {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    fn file() -> UploadedFile {
        UploadedFile::from_stream(Stream::memory()).build().unwrap()
    }

    #[test]
    fn test_builder_all_parts() {
        let body = Stream::memory();
        let request = ServerRequest::builder()
            .method("POST")
            .uri("https://example.com/foo")
            .body(body.clone())
            .server_params(params(json!({"foo": "bar"})))
            .cookie_params(params(json!({"foo": "bar"})))
            .query_params(params(json!({"foo": "bar"})))
            .uploaded_files(vec![file()])
            .header("X-Foo", "bar")
            .version(ProtocolVersion::Http10)
            .build()
            .unwrap();

        assert_eq!(request.method(), Some(Method::Post));
        assert_eq!(request.uri().to_string(), "https://example.com/foo");
        assert!(request.body().ptr_eq(&body));
        assert_eq!(request.server_params(), &params(json!({"foo": "bar"})));
        assert_eq!(request.cookie_params(), &params(json!({"foo": "bar"})));
        assert_eq!(request.query_params(), &params(json!({"foo": "bar"})));
        assert_eq!(request.uploaded_files().files().count(), 1);
        assert_eq!(request.header("x-foo"), ["bar"]);
        assert_eq!(request.parsed_body(), None);
        assert_eq!(request.protocol_version(), ProtocolVersion::Http10);
        assert_eq!(request.request_target(), "/foo");
    }

    #[test]
    fn test_defaults() {
        let request = ServerRequest::new();
        assert_eq!(request.method(), None);
        assert!(request.server_params().is_empty());
        assert!(request.cookie_params().is_empty());
        assert!(request.query_params().is_empty());
        assert!(request.uploaded_files().is_empty());
        assert_eq!(request.parsed_body(), None);
        assert!(request.attributes().is_empty());
    }

    #[test]
    fn test_builder_rejects_invalid_parts() {
        assert!(ServerRequest::builder().method("F@@").build().is_err());
        assert!(ServerRequest::builder().uploaded_files(json!([null])).build().is_err());
        assert!(ServerRequest::builder().header("X-Foo", "bar\nbaz").build().is_err());
    }

    #[test]
    fn test_query_params_from_uri() {
        let request = ServerRequest::builder()
            .query_params(params(json!({"ignored": "yes"})))
            .uri("http://example.com/search?q=rust+lang&page=2&tag=%C3%A9")
            .query_params_from_uri()
            .build()
            .unwrap();

        assert_eq!(request.query_params(), &params(json!({"q": "rust lang", "page": "2", "tag": "é"})));
    }

    #[test]
    fn test_with_cookie_and_query_params() {
        let request = ServerRequest::new();
        let with_cookies = request.with_cookie_params(params(json!({"session": "abc"})));
        let with_query = with_cookies.with_query_params(params(json!({"page": 1})));

        assert!(request.cookie_params().is_empty());
        assert_eq!(with_query.cookie_params().get("session"), Some(&json!("abc")));
        assert_eq!(with_query.query_params().get("page"), Some(&json!(1)));
    }

    #[test]
    fn test_server_params_survive_with_methods() {
        let request = ServerRequest::builder().server_params(params(json!({"REMOTE_ADDR": "127.0.0.1"}))).build().unwrap();
        let changed = request.with_method("GET").unwrap().with_header("X-Foo", "bar").unwrap().with_attribute("a", 1);
        assert_eq!(changed.server_params(), request.server_params());
    }

    #[test]
    fn test_with_uploaded_files() {
        let request = ServerRequest::new();

        let nested = request.with_uploaded_files(vec![vec![file(), file()]]).unwrap();
        assert_eq!(nested.uploaded_files().files().count(), 2);

        assert!(request.with_uploaded_files(json!([null])).is_err());
        assert!(request.with_uploaded_files(json!([[null], [null]])).is_err());
        assert!(request.with_uploaded_files(file()).is_err());
    }

    #[test]
    fn test_with_parsed_body() {
        let request = ServerRequest::new();

        let object = request.with_parsed_body(Some(json!({"foo": "bar"}))).unwrap();
        assert_eq!(object.parsed_body(), Some(&json!({"foo": "bar"})));

        let array = request.with_parsed_body(Some(json!(["foo"]))).unwrap();
        assert_eq!(array.parsed_body(), Some(&json!(["foo"])));

        let cleared = object.with_parsed_body(Some(Value::Null)).unwrap();
        assert_eq!(cleared.parsed_body(), None);
        assert_eq!(object.with_parsed_body(None).unwrap().parsed_body(), None);
    }

    #[test]
    fn test_with_parsed_body_rejects_scalars() {
        let request = ServerRequest::new();
        for body in [json!(true), json!(1), json!(1.5), json!("body")] {
            let error = request.with_parsed_body(Some(body)).unwrap_err();
            assert!(matches!(error, ArgumentError::InvalidParsedBody { .. }));
        }
    }

    #[test]
    fn test_attributes() {
        let request = ServerRequest::new();
        assert_eq!(request.attribute("foo"), None);
        assert_eq!(request.attribute_or("foo", &json!("bar")), &json!("bar"));

        let with = request.with_attribute("foo", "bar");
        assert_eq!(with.attribute("foo"), Some(&json!("bar")));
        assert!(request.attributes().is_empty());

        let without = with.without_attribute("foo");
        assert_eq!(without.attribute("foo"), None);
        assert!(without.attributes().is_empty());
    }

    #[test]
    fn test_null_attribute_can_be_removed() {
        let request = ServerRequest::new().with_attribute("foo", Value::Null);
        assert_eq!(request.attribute("foo"), Some(&Value::Null));
        assert!(request.without_attribute("foo").attributes().is_empty());
        assert!(ServerRequest::new().without_attribute("nope").attributes().is_empty());
    }
}
