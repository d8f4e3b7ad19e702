use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::ArgumentError;

/// HTTP protocol version of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolVersion {
    Http10,
    Http11,
    Http20,
}

impl ProtocolVersion {
    /// The version as written after `HTTP/`: `"1.0"`, `"1.1"` or `"2.0"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http10 => "1.0",
            Self::Http11 => "1.1",
            Self::Http20 => "2.0",
        }
    }
}

impl Default for ProtocolVersion {
    fn default() -> Self {
        crate::DEFAULT_PROTOCOL_VERSION
    }
}

impl FromStr for ProtocolVersion {
    type Err = ArgumentError;

    fn from_str(version: &str) -> Result<Self, Self::Err> {
        match version {
            "1.0" => Ok(Self::Http10),
            "1.1" => Ok(Self::Http11),
            "2.0" => Ok(Self::Http20),
            _ => {
                debug!(version, "rejected protocol version");
                Err(ArgumentError::invalid_protocol_version(version))
            }
        }
    }
}

impl TryFrom<&str> for ProtocolVersion {
    type Error = ArgumentError;

    fn try_from(version: &str) -> Result<Self, Self::Error> {
        version.parse()
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_http11() {
        assert_eq!(ProtocolVersion::default(), ProtocolVersion::Http11);
        assert_eq!(ProtocolVersion::default().to_string(), "1.1");
    }

    #[test]
    fn test_valid_versions() {
        for version in ["1.0", "1.1", "2.0"] {
            assert_eq!(version.parse::<ProtocolVersion>().unwrap().as_str(), version);
        }
    }

    #[test]
    fn test_invalid_versions() {
        for version in ["", "1", "1.2", "1.2.3", "3.0", "2", "HTTP/1.1", " 1.1"] {
            assert_eq!(
                ProtocolVersion::try_from(version),
                Err(ArgumentError::invalid_protocol_version(version)),
                "{version:?}"
            );
        }
    }
}
