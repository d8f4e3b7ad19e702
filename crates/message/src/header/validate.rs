use http::HeaderName;
use tracing::debug;

use crate::error::ArgumentError;

/// Validates a header name and returns its lowercase lookup key.
///
/// Token syntax is checked by [`http::HeaderName`], which rejects empty names,
/// separators, whitespace and control characters (CR and LF included).
pub(crate) fn header_key(name: &str) -> Result<String, ArgumentError> {
    match HeaderName::from_bytes(name.as_bytes()) {
        Ok(header_name) => Ok(header_name.as_str().to_owned()),
        Err(e) => {
            debug!(name, cause = %e, "rejected invalid header name");
            Err(ArgumentError::invalid_header_name(name))
        }
    }
}

/// Checks a header value for injected line breaks and forbidden bytes.
///
/// A CR must be followed by LF, and that CRLF by a space or tab. Allowed bytes are
/// HTAB, SP through `~`, and `0x80..=0xFE`.
pub(crate) fn is_valid_value(value: &str) -> bool {
    let bytes = value.as_bytes();

    for (index, &byte) in bytes.iter().enumerate() {
        match byte {
            b'\r' => {
                let folded = bytes.get(index + 1) == Some(&b'\n') && matches!(bytes.get(index + 2), Some(b' ' | b'\t'));
                if !folded {
                    return false;
                }
            }
            b'\n' => {
                if index == 0 || bytes[index - 1] != b'\r' {
                    return false;
                }
            }
            b'\t' | b' '..=b'~' | 0x80..=0xFE => {}
            _ => return false,
        }
    }

    true
}
