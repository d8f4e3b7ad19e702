//! Error types for message construction and stream I/O.
//!
//! Two failure kinds exist:
//!
//! - [`ArgumentError`]: the caller passed something malformed. It is deterministic and is
//!   always raised before any new value is produced.
//! - [`RuntimeError`]: the underlying stream or filesystem refused an operation, or the
//!   object is in a state (detached, moved) that forbids it.
//!
//! [`MessageError`] is the union of both for operations that can fail either way.

use std::convert::Infallible;
use std::io;
use std::path::PathBuf;
use std::sync::PoisonError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MessageError {
    #[error("invalid argument: {source}")]
    Argument {
        #[from]
        source: ArgumentError,
    },

    #[error("runtime failure: {source}")]
    Runtime {
        #[from]
        source: RuntimeError,
    },
}

impl MessageError {
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, MessageError::Argument { .. })
    }

    pub fn is_runtime(&self) -> bool {
        matches!(self, MessageError::Runtime { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("unsupported uri scheme {scheme:?}, must be empty, \"http\" or \"https\"")]
    InvalidScheme { scheme: String },

    #[error("invalid port {port:?}, must be an integer between 1 and 65535")]
    InvalidPort { port: String },

    #[error("invalid uri {uri:?}: {reason}")]
    InvalidUri { uri: String, reason: String },

    #[error("invalid uri path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("invalid uri query {query:?}: {reason}")]
    InvalidQuery { query: String, reason: String },

    #[error("invalid header name {name:?}")]
    InvalidHeaderName { name: String },

    #[error("invalid value for header {name:?}")]
    InvalidHeaderValue { name: String },

    #[error("invalid protocol version {version:?}, must be one of 1.0, 1.1, 2.0")]
    InvalidProtocolVersion { version: String },

    #[error("invalid http method {method:?}, must be one of HEAD, GET, POST, PUT, PATCH, DELETE, PURGE, OPTIONS, TRACE, CONNECT")]
    InvalidMethod { method: String },

    #[error("invalid request target {target:?}, must not contain whitespace")]
    InvalidRequestTarget { target: String },

    #[error("invalid status code {code:?}, must be an integer between 100 and 599")]
    InvalidStatusCode { code: String },

    #[error("invalid reason phrase {reason:?}, must not contain line breaks or control characters")]
    InvalidReasonPhrase { reason: String },

    #[error("status code {code} has no standard reason phrase, one must be provided")]
    MissingReasonPhrase { code: u16 },

    #[error("invalid parsed body: {reason}")]
    InvalidParsedBody { reason: String },

    #[error("invalid uploaded files tree: {reason}")]
    InvalidUploadedFiles { reason: String },

    #[error("invalid upload error code {code}, must be one of the defined upload errors")]
    InvalidUploadError { code: i64 },

    #[error("invalid stream mode {mode:?}")]
    InvalidOpenMode { mode: String },

    #[error("invalid target path {path:?}: {reason}")]
    InvalidTargetPath { path: PathBuf, reason: String },

    #[error("conversion failed: {reason}")]
    Conversion { reason: String },
}

impl ArgumentError {
    pub fn invalid_scheme<S: ToString>(scheme: S) -> Self {
        Self::InvalidScheme { scheme: scheme.to_string() }
    }

    pub fn invalid_port<S: ToString>(port: S) -> Self {
        Self::InvalidPort { port: port.to_string() }
    }

    pub fn invalid_uri<U: ToString, R: ToString>(uri: U, reason: R) -> Self {
        Self::InvalidUri { uri: uri.to_string(), reason: reason.to_string() }
    }

    pub fn invalid_path<P: ToString, R: ToString>(path: P, reason: R) -> Self {
        Self::InvalidPath { path: path.to_string(), reason: reason.to_string() }
    }

    pub fn invalid_query<Q: ToString, R: ToString>(query: Q, reason: R) -> Self {
        Self::InvalidQuery { query: query.to_string(), reason: reason.to_string() }
    }

    pub fn invalid_header_name<S: ToString>(name: S) -> Self {
        Self::InvalidHeaderName { name: name.to_string() }
    }

    pub fn invalid_header_value<S: ToString>(name: S) -> Self {
        Self::InvalidHeaderValue { name: name.to_string() }
    }

    pub fn invalid_protocol_version<S: ToString>(version: S) -> Self {
        Self::InvalidProtocolVersion { version: version.to_string() }
    }

    pub fn invalid_method<S: ToString>(method: S) -> Self {
        Self::InvalidMethod { method: method.to_string() }
    }

    pub fn invalid_request_target<S: ToString>(target: S) -> Self {
        Self::InvalidRequestTarget { target: target.to_string() }
    }

    pub fn invalid_status_code<S: ToString>(code: S) -> Self {
        Self::InvalidStatusCode { code: code.to_string() }
    }

    pub fn invalid_reason_phrase<S: ToString>(reason: S) -> Self {
        Self::InvalidReasonPhrase { reason: reason.to_string() }
    }

    pub fn invalid_parsed_body<S: ToString>(reason: S) -> Self {
        Self::InvalidParsedBody { reason: reason.to_string() }
    }

    pub fn invalid_uploaded_files<S: ToString>(reason: S) -> Self {
        Self::InvalidUploadedFiles { reason: reason.to_string() }
    }

    pub fn invalid_open_mode<S: ToString>(mode: S) -> Self {
        Self::InvalidOpenMode { mode: mode.to_string() }
    }

    pub fn invalid_target_path<P: Into<PathBuf>, S: ToString>(path: P, reason: S) -> Self {
        Self::InvalidTargetPath { path: path.into(), reason: reason.to_string() }
    }

    pub fn conversion<S: ToString>(reason: S) -> Self {
        Self::Conversion { reason: reason.to_string() }
    }
}

impl From<Infallible> for ArgumentError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("stream is detached")]
    Detached,

    #[error("stream is not readable")]
    NotReadable,

    #[error("stream is not writable")]
    NotWritable,

    #[error("stream is not seekable")]
    NotSeekable,

    #[error("uploaded file was already moved")]
    AlreadyMoved,

    #[error("could not move {from:?} to {to:?}: {source}")]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("stream lock poisoned")]
    Poisoned,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl RuntimeError {
    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    pub fn move_failed<F: Into<PathBuf>, T: Into<PathBuf>>(from: F, to: T, source: io::Error) -> Self {
        Self::MoveFailed { from: from.into(), to: to.into(), source }
    }
}

impl<T> From<PoisonError<T>> for RuntimeError {
    fn from(_: PoisonError<T>) -> Self {
        Self::Poisoned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_error_kinds() {
        let argument: MessageError = ArgumentError::invalid_port("0").into();
        assert!(argument.is_invalid_argument());
        assert!(!argument.is_runtime());

        let runtime: MessageError = RuntimeError::AlreadyMoved.into();
        assert!(runtime.is_runtime());
        assert_eq!(runtime.to_string(), "runtime failure: uploaded file was already moved");
    }

    #[test]
    fn test_argument_error_display() {
        let error = ArgumentError::MissingReasonPhrase { code: 103 };
        assert_eq!(error.to_string(), "status code 103 has no standard reason phrase, one must be provided");
    }
}
