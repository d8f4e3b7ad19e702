/// Supported schemes and their registered default ports.
const SCHEMES: [(&str, Option<u16>); 3] = [("", None), ("http", Some(80)), ("https", Some(443))];

pub(crate) fn is_supported(scheme: &str) -> bool {
    SCHEMES.iter().any(|(name, _)| *name == scheme)
}

pub(crate) fn default_port(scheme: &str) -> Option<u16> {
    SCHEMES.iter().find(|(name, _)| *name == scheme).and_then(|(_, port)| *port)
}

/// Lowercases a scheme and strips a trailing `:` or `://` delimiter.
pub(crate) fn normalize(scheme: &str) -> String {
    let scheme = scheme.strip_suffix("://").or_else(|| scheme.strip_suffix(':')).unwrap_or(scheme);
    scheme.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ports() {
        assert_eq!(default_port("http"), Some(80));
        assert_eq!(default_port("https"), Some(443));
        assert_eq!(default_port(""), None);
        assert_eq!(default_port("ftp"), None);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("HTTPS:"), "https");
        assert_eq!(normalize("https://"), "https");
        assert_eq!(normalize("Http"), "http");
        assert!(is_supported(&normalize("HTTP://")));
        assert!(!is_supported(&normalize("ftp")));
    }
}
