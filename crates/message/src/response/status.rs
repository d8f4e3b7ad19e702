use tracing::debug;

use crate::error::ArgumentError;

/// Standard reason phrases, sorted by code.
static REASON_PHRASES: &[(u16, &str)] = &[
    (100, "Continue"),
    (101, "Switching Protocols"),
    (102, "Processing"),
    (200, "OK"),
    (201, "Created"),
    (202, "Accepted"),
    (203, "Non-Authoritative Information"),
    (204, "No Content"),
    (205, "Reset Content"),
    (206, "Partial Content"),
    (207, "Multi-Status"),
    (208, "Already Reported"),
    (226, "IM Used"),
    (300, "Multiple Choices"),
    (301, "Moved Permanently"),
    (302, "Found"),
    (303, "See Other"),
    (304, "Not Modified"),
    (305, "Use Proxy"),
    (307, "Temporary Redirect"),
    (308, "Permanent Redirect"),
    (400, "Bad Request"),
    (401, "Unauthorized"),
    (402, "Payment Required"),
    (403, "Forbidden"),
    (404, "Not Found"),
    (405, "Method Not Allowed"),
    (406, "Not Acceptable"),
    (407, "Proxy Authentication Required"),
    (408, "Request Timeout"),
    (409, "Conflict"),
    (410, "Gone"),
    (411, "Length Required"),
    (412, "Precondition Failed"),
    (413, "Payload Too Large"),
    (414, "URI Too Long"),
    (415, "Unsupported Media Type"),
    (416, "Range Not Satisfiable"),
    (417, "Expectation Failed"),
    (418, "I'm a teapot"),
    (421, "Misdirected Request"),
    (422, "Unprocessable Entity"),
    (423, "Locked"),
    (424, "Failed Dependency"),
    (426, "Upgrade Required"),
    (428, "Precondition Required"),
    (429, "Too Many Requests"),
    (431, "Request Header Fields Too Large"),
    (444, "Connection Closed Without Response"),
    (451, "Unavailable For Legal Reasons"),
    (499, "Client Closed Request"),
    (500, "Internal Server Error"),
    (501, "Not Implemented"),
    (502, "Bad Gateway"),
    (503, "Service Unavailable"),
    (504, "Gateway Timeout"),
    (505, "HTTP Version Not Supported"),
    (506, "Variant Also Negotiates"),
    (507, "Insufficient Storage"),
    (508, "Loop Detected"),
    (510, "Not Extended"),
    (511, "Network Authentication Required"),
    (599, "Network Connect Timeout Error"),
];

/// The standard reason phrase of `code`, if it has one.
pub fn reason_phrase(code: u16) -> Option<&'static str> {
    REASON_PHRASES
        .binary_search_by_key(&code, |&(known, _)| known)
        .ok()
        .map(|index| REASON_PHRASES[index].1)
}

/// Values accepted as a response status code: integers and decimal strings in `100..=599`.
pub trait IntoStatusCode {
    /// # Errors
    ///
    /// Fails when the value is not an integer in `100..=599`.
    fn into_status_code(self) -> Result<u16, ArgumentError>;
}

fn check(code: i128, raw: &dyn std::fmt::Display) -> Result<u16, ArgumentError> {
    match u16::try_from(code) {
        Ok(code) if (100..=599).contains(&code) => Ok(code),
        _ => {
            debug!(code = %raw, "rejected status code");
            Err(ArgumentError::invalid_status_code(raw))
        }
    }
}

macro_rules! int_into_status_code {
    ($($ty:ty),*) => {
        $(
            impl IntoStatusCode for $ty {
                fn into_status_code(self) -> Result<u16, ArgumentError> {
                    check(i128::from(self), &self)
                }
            }
        )*
    };
}

int_into_status_code!(u16, u32, u64, i16, i32, i64);

impl IntoStatusCode for &str {
    fn into_status_code(self) -> Result<u16, ArgumentError> {
        if self.is_empty() || !self.bytes().all(|b| b.is_ascii_digit()) {
            debug!(code = self, "rejected status code");
            return Err(ArgumentError::invalid_status_code(self));
        }

        match self.parse::<i128>() {
            Ok(code) => check(code, &self),
            Err(_) => Err(ArgumentError::invalid_status_code(self)),
        }
    }
}

impl IntoStatusCode for String {
    fn into_status_code(self) -> Result<u16, ArgumentError> {
        self.as_str().into_status_code()
    }
}

impl IntoStatusCode for http::StatusCode {
    fn into_status_code(self) -> Result<u16, ArgumentError> {
        self.as_u16().into_status_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted() {
        assert!(REASON_PHRASES.windows(2).all(|pair| pair[0].0 < pair[1].0));
    }

    #[test]
    fn test_reason_phrase() {
        assert_eq!(reason_phrase(200), Some("OK"));
        assert_eq!(reason_phrase(404), Some("Not Found"));
        assert_eq!(reason_phrase(599), Some("Network Connect Timeout Error"));
        assert_eq!(reason_phrase(103), None);
        assert_eq!(reason_phrase(0), None);
    }

    #[test]
    fn test_valid_codes() {
        assert_eq!(404i32.into_status_code(), Ok(404));
        assert_eq!(100u16.into_status_code(), Ok(100));
        assert_eq!(599i64.into_status_code(), Ok(599));
        assert_eq!("404".into_status_code(), Ok(404));
        assert_eq!(String::from("201").into_status_code(), Ok(201));
        assert_eq!(http::StatusCode::NOT_FOUND.into_status_code(), Ok(404));
    }

    #[test]
    fn test_out_of_range_codes() {
        assert_eq!(99i32.into_status_code(), Err(ArgumentError::invalid_status_code("99")));
        assert_eq!(600i32.into_status_code(), Err(ArgumentError::invalid_status_code("600")));
        assert_eq!((-404i32).into_status_code(), Err(ArgumentError::invalid_status_code("-404")));
        assert_eq!(u64::MAX.into_status_code(), Err(ArgumentError::invalid_status_code(u64::MAX)));
    }

    #[test]
    fn test_malformed_strings() {
        for code in ["", "foo", "100.1", " 404", "+404", "-404", "40 4"] {
            assert_eq!(code.into_status_code(), Err(ArgumentError::invalid_status_code(code)), "{code:?}");
        }
    }
}
