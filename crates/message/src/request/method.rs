use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::ArgumentError;

/// Methods a request may carry.
pub const VALID_METHODS: [&str; 10] =
    ["HEAD", "GET", "POST", "PUT", "PATCH", "DELETE", "PURGE", "OPTIONS", "TRACE", "CONNECT"];

/// An HTTP request method from [`VALID_METHODS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Head,
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Purge,
    Options,
    Trace,
    Connect,
}

impl Method {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Head => "HEAD",
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Purge => "PURGE",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
            Self::Connect => "CONNECT",
        }
    }
}

/// Parses a method name in any case.
impl FromStr for Method {
    type Err = ArgumentError;

    fn from_str(method: &str) -> Result<Self, Self::Err> {
        let parsed = match method.to_ascii_uppercase().as_str() {
            "HEAD" => Self::Head,
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "PATCH" => Self::Patch,
            "DELETE" => Self::Delete,
            "PURGE" => Self::Purge,
            "OPTIONS" => Self::Options,
            "TRACE" => Self::Trace,
            "CONNECT" => Self::Connect,
            _ => {
                debug!(method, "rejected http method");
                return Err(ArgumentError::invalid_method(method));
            }
        };

        Ok(parsed)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
