use std::fmt;
use std::fmt::Write;
use std::str::FromStr;

use tracing::{debug, trace};

use super::encode::{encode_fragment, encode_path, encode_query, encode_user_info_part};
use super::parser::{split, split_authority};
use super::port::IntoPort;
use super::scheme;
use crate::error::ArgumentError;
use crate::utils::ensure;

/// An immutable URI reference.
///
/// Components are stored normalized (lowercase scheme and host, percent-encoded
/// user-info, path, query and fragment). The port is stored as given and elided on read
/// when it equals the scheme's default port, so switching the scheme later still yields
/// the right answer.
///
/// ```
/// use micro_message::Uri;
///
/// let uri: Uri = "HTTPS://User@Example.COM:443/a b?k^ey=v#top".parse().unwrap();
/// assert_eq!(uri.host(), "example.com");
/// assert_eq!(uri.port(), None);
/// assert_eq!(uri.to_string(), "https://User@example.com/a%20b?k%5Eey=v#top");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Uri {
    scheme: String,
    user_info: String,
    host: String,
    port: Option<u16>,
    path: String,
    query: String,
    fragment: String,
}

impl Uri {
    /// Parses a URI reference, normalizing and percent-encoding each component.
    ///
    /// # Errors
    ///
    /// Fails when the scheme is not supported, the port is not a number in `1..=65535`,
    /// the authority is malformed or the host holds a character [`with_host`](Uri::with_host)
    /// rejects.
    pub fn parse(input: &str) -> Result<Self, ArgumentError> {
        trace!(uri = input, "parsing uri");
        let raw = split(input);

        let scheme = raw.scheme.map(scheme::normalize).unwrap_or_default();
        if !scheme::is_supported(&scheme) {
            debug!(uri = input, scheme = %scheme, "rejected unsupported scheme");
            return Err(ArgumentError::invalid_scheme(scheme));
        }

        let mut uri = Uri { scheme, ..Uri::default() };

        if let Some(authority) = raw.authority {
            let authority = split_authority(authority)?;
            ensure!(!authority.host.is_empty(), ArgumentError::invalid_uri(input, "authority without host"));
            validate_host(authority.host)?;

            uri.user_info = authority.user_info.map(encode_user_info).unwrap_or_default();
            uri.host = authority.host.to_ascii_lowercase();
            uri.port = authority.port.into_port()?;
        }

        uri.path = encode_path(raw.path);
        uri.query = raw.query.map(encode_query).unwrap_or_default();
        uri.fragment = raw.fragment.map(encode_fragment).unwrap_or_default();

        Ok(uri)
    }

    /// Returns the lowercase scheme without the trailing `:`, or an empty string.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Returns the percent-encoded `user[:password]`, or an empty string.
    pub fn user_info(&self) -> &str {
        &self.user_info
    }

    /// Returns the lowercase host, or an empty string.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port, or `None` when it is absent or equal to the scheme's default port.
    pub fn port(&self) -> Option<u16> {
        self.port.filter(|port| scheme::default_port(&self.scheme) != Some(*port))
    }

    /// Returns `[user-info@]host[:port]`, or an empty string when there is no host.
    pub fn authority(&self) -> String {
        if self.host.is_empty() {
            return String::new();
        }

        let mut authority = String::with_capacity(self.user_info.len() + self.host.len() + 7);
        if !self.user_info.is_empty() {
            authority.push_str(&self.user_info);
            authority.push('@');
        }
        authority.push_str(&self.host);
        if let Some(port) = self.port() {
            let _ = write!(authority, ":{port}");
        }
        authority
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the query without the leading `?`.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns the fragment without the leading `#`.
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Returns a copy with the given scheme.
    ///
    /// The scheme is lowercased and a trailing `:` or `://` is stripped.
    ///
    /// # Errors
    ///
    /// Fails when the scheme is not empty, `http` or `https`.
    pub fn with_scheme(&self, scheme: &str) -> Result<Self, ArgumentError> {
        let scheme = scheme::normalize(scheme);
        if !scheme::is_supported(&scheme) {
            debug!(scheme = %scheme, "rejected unsupported scheme");
            return Err(ArgumentError::invalid_scheme(scheme));
        }

        Ok(Self { scheme, ..self.clone() })
    }

    /// Returns a copy with the given user and optional password. An empty user removes the
    /// user-info.
    pub fn with_user_info(&self, user: &str, password: Option<&str>) -> Self {
        let user_info = match (user, password) {
            ("", _) => String::new(),
            (user, Some(password)) if !password.is_empty() => {
                format!("{}:{}", encode_user_info_part(user), encode_user_info_part(password))
            }
            (user, _) => encode_user_info_part(user),
        };

        Self { user_info, ..self.clone() }
    }

    /// Returns a copy with the given host, lowercased.
    ///
    /// # Errors
    ///
    /// Fails when the host contains whitespace, control characters or one of the
    /// delimiters `/ ? # @`, or a `:` outside an IP literal.
    pub fn with_host(&self, host: &str) -> Result<Self, ArgumentError> {
        validate_host(host)?;
        Ok(Self { host: host.to_ascii_lowercase(), ..self.clone() })
    }

    /// Returns a copy with the given port. `None` or an empty string removes the port.
    ///
    /// # Errors
    ///
    /// Fails when the port is not an integer in `1..=65535`.
    pub fn with_port<P: IntoPort>(&self, port: P) -> Result<Self, ArgumentError> {
        let port = port.into_port()?;
        Ok(Self { port, ..self.clone() })
    }

    pub fn without_port(&self) -> Self {
        Self { port: None, ..self.clone() }
    }

    /// Returns a copy with the given path, percent-encoded.
    ///
    /// # Errors
    ///
    /// Fails when the path contains a query (`?`) or fragment (`#`) delimiter.
    pub fn with_path(&self, path: &str) -> Result<Self, ArgumentError> {
        if path.contains('?') {
            debug!(path, "rejected path containing a query");
            return Err(ArgumentError::invalid_path(path, "must not contain a query string"));
        }
        if path.contains('#') {
            debug!(path, "rejected path containing a fragment");
            return Err(ArgumentError::invalid_path(path, "must not contain a uri fragment"));
        }

        Ok(Self { path: encode_path(path), ..self.clone() })
    }

    /// Returns a copy with the given query, percent-encoded. A leading `?` is stripped.
    ///
    /// # Errors
    ///
    /// Fails when the query contains a fragment (`#`) delimiter.
    pub fn with_query(&self, query: &str) -> Result<Self, ArgumentError> {
        let query = query.strip_prefix('?').unwrap_or(query);
        if query.contains('#') {
            debug!(query, "rejected query containing a fragment");
            return Err(ArgumentError::invalid_query(query, "must not contain a uri fragment"));
        }

        Ok(Self { query: encode_query(query), ..self.clone() })
    }

    /// Returns a copy with the given fragment, percent-encoded. A leading `#` is stripped.
    pub fn with_fragment(&self, fragment: &str) -> Self {
        let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
        Self { fragment: encode_fragment(fragment), ..self.clone() }
    }

    /// Returns `host[:port]` as used by the `Host` header, or `None` when there is no host.
    pub(crate) fn host_header(&self) -> Option<String> {
        if self.host.is_empty() {
            return None;
        }

        Some(match self.port() {
            Some(port) => format!("{}:{port}", self.host),
            None => self.host.clone(),
        })
    }

    fn is_empty(&self) -> bool {
        self.scheme.is_empty()
            && self.host.is_empty()
            && self.path.is_empty()
            && self.query.is_empty()
            && self.fragment.is_empty()
    }
}

/// A host must be usable as a `Host` header value, so whitespace and control characters are
/// rejected along with uri delimiters.
fn validate_host(host: &str) -> Result<(), ArgumentError> {
    let is_ip_literal = host.starts_with('[') && host.ends_with(']');
    let is_valid = host
        .chars()
        .all(|c| !c.is_whitespace() && !c.is_control() && !matches!(c, '/' | '?' | '#' | '@'))
        && (is_ip_literal || !host.contains(['[', ']', ':']));

    if !is_valid {
        debug!(host, "rejected invalid host");
        return Err(ArgumentError::invalid_uri(host, "invalid host"));
    }

    Ok(())
}

/// A relative path whose first segment holds a `:` would re-parse as a scheme.
fn is_scheme_like(path: &str) -> bool {
    path.split('/').next().is_some_and(|segment| segment.contains(':'))
}

fn encode_user_info(user_info: &str) -> String {
    match user_info.split_once(':') {
        Some((user, password)) => format!("{}:{}", encode_user_info_part(user), encode_user_info_part(password)),
        None => encode_user_info_part(user_info),
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("/");
        }

        if !self.scheme.is_empty() {
            write!(f, "{}:", self.scheme)?;
        }

        let authority = self.authority();
        if !authority.is_empty() {
            write!(f, "//{authority}")?;
        }

        if !self.path.is_empty() {
            if authority.is_empty() {
                // "//x" without an authority would re-parse as one
                if self.path.starts_with("//") {
                    write!(f, "/{}", self.path.trim_start_matches('/'))?;
                } else if self.scheme.is_empty() && is_scheme_like(&self.path) {
                    write!(f, "./{}", self.path)?;
                } else {
                    f.write_str(&self.path)?;
                }
            } else if self.path.starts_with('/') {
                f.write_str(&self.path)?;
            } else {
                write!(f, "/{}", self.path)?;
            }
        }

        if !self.query.is_empty() {
            write!(f, "?{}", self.query)?;
        }

        if !self.fragment.is_empty() {
            write!(f, "#{}", self.fragment)?;
        }

        Ok(())
    }
}

impl FromStr for Uri {
    type Err = ArgumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uri::parse(s)
    }
}

impl TryFrom<&str> for Uri {
    type Error = ArgumentError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Uri::parse(value)
    }
}

impl TryFrom<String> for Uri {
    type Error = ArgumentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Uri::parse(&value)
    }
}

impl PartialEq for Uri {
    fn eq(&self, other: &Self) -> bool {
        self.scheme == other.scheme
            && self.user_info == other.user_info
            && self.host == other.host
            && self.port() == other.port()
            && self.path == other.path
            && self.query == other.query
            && self.fragment == other.fragment
    }
}

impl Eq for Uri {}
