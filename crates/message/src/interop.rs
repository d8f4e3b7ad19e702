//! Conversions to and from the [`http`] crate's types.
//!
//! Only the head of a message crosses over: the body [`Stream`](crate::Stream) stays behind and
//! the converted values carry a `()` body, the way a response head is handed to an encoder
//! before its payload is attached.

use http::{HeaderName, HeaderValue};
use tracing::debug;

use crate::error::ArgumentError;
use crate::header::HeaderBag;
use crate::message::{HttpMessage, ProtocolVersion};
use crate::request::{HttpRequest, Method, Request};
use crate::response::Response;
use crate::uri::Uri;

/// A response head without its body.
pub type ResponseHead = http::Response<()>;

impl From<ProtocolVersion> for http::Version {
    fn from(version: ProtocolVersion) -> Self {
        match version {
            ProtocolVersion::Http10 => http::Version::HTTP_10,
            ProtocolVersion::Http11 => http::Version::HTTP_11,
            ProtocolVersion::Http20 => http::Version::HTTP_2,
        }
    }
}

impl TryFrom<http::Version> for ProtocolVersion {
    type Error = ArgumentError;

    fn try_from(version: http::Version) -> Result<Self, Self::Error> {
        match version {
            http::Version::HTTP_10 => Ok(ProtocolVersion::Http10),
            http::Version::HTTP_11 => Ok(ProtocolVersion::Http11),
            http::Version::HTTP_2 => Ok(ProtocolVersion::Http20),
            other => Err(ArgumentError::invalid_protocol_version(format!("{other:?}"))),
        }
    }
}

impl TryFrom<Method> for http::Method {
    type Error = ArgumentError;

    fn try_from(method: Method) -> Result<Self, Self::Error> {
        http::Method::from_bytes(method.as_str().as_bytes()).map_err(ArgumentError::conversion)
    }
}

impl TryFrom<&http::Method> for Method {
    type Error = ArgumentError;

    fn try_from(method: &http::Method) -> Result<Self, Self::Error> {
        method.as_str().parse()
    }
}

impl TryFrom<&Request> for http::Request<()> {
    type Error = ArgumentError;

    fn try_from(request: &Request) -> Result<Self, Self::Error> {
        let method = request.method().ok_or_else(|| ArgumentError::conversion("request has no method"))?;

        let mut builder = http::Request::builder()
            .method(http::Method::try_from(method)?)
            .uri(request.uri().to_string())
            .version(request.protocol_version().into());

        if let Some(headers) = builder.headers_mut() {
            append_headers(headers, request.headers())?;
        }

        builder.body(()).map_err(|e| {
            debug!(error = %e, "failed to convert request into http::Request");
            ArgumentError::conversion(e)
        })
    }
}

impl TryFrom<&Response> for ResponseHead {
    type Error = ArgumentError;

    fn try_from(response: &Response) -> Result<Self, Self::Error> {
        let mut builder = http::Response::builder()
            .status(response.status())
            .version(response.protocol_version().into());

        if let Some(headers) = builder.headers_mut() {
            append_headers(headers, response.headers())?;
        }

        builder.body(()).map_err(|e| {
            debug!(error = %e, "failed to convert response into http::Response");
            ArgumentError::conversion(e)
        })
    }
}

impl<B> TryFrom<&http::Request<B>> for Request {
    type Error = ArgumentError;

    fn try_from(request: &http::Request<B>) -> Result<Self, Self::Error> {
        let uri = Uri::parse(&request.uri().to_string())?;

        Ok(Request::new()
            .with_method(request.method().as_str())?
            .with_protocol_version(ProtocolVersion::try_from(request.version())?.as_str())?
            .with_headers(header_bag(request.headers())?)
            .with_uri(uri, true))
    }
}

impl<B> TryFrom<&http::Response<B>> for Response {
    type Error = ArgumentError;

    fn try_from(response: &http::Response<B>) -> Result<Self, Self::Error> {
        let status = response.status();
        let reason = status.canonical_reason().unwrap_or_default();

        Ok(Response::new()
            .with_status(status, reason)?
            .with_protocol_version(ProtocolVersion::try_from(response.version())?.as_str())?
            .with_headers(header_bag(response.headers())?))
    }
}

fn append_headers(target: &mut http::HeaderMap, headers: &HeaderBag) -> Result<(), ArgumentError> {
    for (name, values) in headers {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(ArgumentError::conversion)?;
        for value in values {
            let value = HeaderValue::from_bytes(value.as_bytes()).map_err(|e| {
                debug!(header = %name, "header value is not representable as http::HeaderValue");
                ArgumentError::conversion(e)
            })?;
            target.append(name.clone(), value);
        }
    }

    Ok(())
}

fn header_bag(headers: &http::HeaderMap) -> Result<HeaderBag, ArgumentError> {
    let mut bag = HeaderBag::new();
    for (name, value) in headers {
        let value = value.to_str().map_err(ArgumentError::conversion)?;
        bag.append(name.as_str(), value)?;
    }

    Ok(bag)
}
