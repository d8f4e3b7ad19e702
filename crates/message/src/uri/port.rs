use tracing::debug;

use crate::error::ArgumentError;

/// Conversion of caller input into an optional port.
///
/// Integers must lie in `1..=65535`. Strings must be all digits; the empty string means
/// "no port", as does `None`.
pub trait IntoPort {
    fn into_port(self) -> Result<Option<u16>, ArgumentError>;
}

fn checked_port(port: i128, raw: &dyn std::fmt::Display) -> Result<Option<u16>, ArgumentError> {
    match u16::try_from(port) {
        Ok(port) if port > 0 => Ok(Some(port)),
        _ => {
            debug!(port = %raw, "rejected out of range port");
            Err(ArgumentError::invalid_port(raw))
        }
    }
}

macro_rules! int_into_port {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoPort for $ty {
                fn into_port(self) -> Result<Option<u16>, ArgumentError> {
                    checked_port(i128::from(self), &self)
                }
            }
        )*
    };
}

int_into_port!(u16, u32, u64, i16, i32, i64);

impl IntoPort for &str {
    fn into_port(self) -> Result<Option<u16>, ArgumentError> {
        if self.is_empty() {
            return Ok(None);
        }

        if !self.bytes().all(|b| b.is_ascii_digit()) {
            debug!(port = self, "rejected non numeric port");
            return Err(ArgumentError::invalid_port(self));
        }

        match self.parse::<i128>() {
            Ok(port) => checked_port(port, &self),
            Err(_) => Err(ArgumentError::invalid_port(self)),
        }
    }
}

impl IntoPort for String {
    fn into_port(self) -> Result<Option<u16>, ArgumentError> {
        self.as_str().into_port()
    }
}

impl IntoPort for &String {
    fn into_port(self) -> Result<Option<u16>, ArgumentError> {
        self.as_str().into_port()
    }
}

impl<T: IntoPort> IntoPort for Option<T> {
    fn into_port(self) -> Result<Option<u16>, ArgumentError> {
        match self {
            Some(port) => port.into_port(),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_ports() {
        assert_eq!(8080i32.into_port(), Ok(Some(8080)));
        assert_eq!(1u16.into_port(), Ok(Some(1)));
        assert_eq!(65535i64.into_port(), Ok(Some(65535)));
        assert_eq!("8080".into_port(), Ok(Some(8080)));
        assert_eq!("".into_port(), Ok(None));
        assert_eq!(None::<u16>.into_port(), Ok(None));
        assert_eq!(Some("443").into_port(), Ok(Some(443)));
    }

    #[test]
    fn test_invalid_ports() {
        assert!(0i32.into_port().is_err());
        assert!((-1i32).into_port().is_err());
        assert!(65536u32.into_port().is_err());
        assert!("string".into_port().is_err());
        assert!("80a".into_port().is_err());
        assert!("-1".into_port().is_err());
        assert!("0".into_port().is_err());
        assert!("99999999999999999999999999999999999999999".into_port().is_err());
    }
}
