/// A single scalar that can be stored as a header value.
///
/// Implemented for strings, integers and floats. Floats use Rust's shortest
/// round-trip formatting, so `1.2` becomes `"1.2"`.
pub trait ToHeaderValue {
    fn to_header_value(&self) -> String;
}

impl ToHeaderValue for str {
    fn to_header_value(&self) -> String {
        self.to_owned()
    }
}

impl ToHeaderValue for &str {
    fn to_header_value(&self) -> String {
        (*self).to_owned()
    }
}

impl ToHeaderValue for String {
    fn to_header_value(&self) -> String {
        self.clone()
    }
}

impl ToHeaderValue for &String {
    fn to_header_value(&self) -> String {
        (*self).clone()
    }
}

macro_rules! display_header_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ToHeaderValue for $ty {
                fn to_header_value(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

display_header_value!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, f32, f64);

/// Conversion of caller input into the list of values stored for one header.
///
/// A single scalar becomes a one element list; arrays, vectors and slices of scalars keep
/// their order. An empty collection is allowed and stores a header without values.
pub trait IntoHeaderValues {
    fn into_header_values(self) -> Vec<String>;
}

impl<T: ToHeaderValue> IntoHeaderValues for T {
    fn into_header_values(self) -> Vec<String> {
        vec![self.to_header_value()]
    }
}

impl<T: ToHeaderValue> IntoHeaderValues for Vec<T> {
    fn into_header_values(self) -> Vec<String> {
        self.iter().map(ToHeaderValue::to_header_value).collect()
    }
}

impl<T: ToHeaderValue> IntoHeaderValues for &[T] {
    fn into_header_values(self) -> Vec<String> {
        self.iter().map(ToHeaderValue::to_header_value).collect()
    }
}

impl<T: ToHeaderValue, const N: usize> IntoHeaderValues for [T; N] {
    fn into_header_values(self) -> Vec<String> {
        self.iter().map(ToHeaderValue::to_header_value).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_values() {
        assert_eq!("foo".into_header_values(), vec!["foo"]);
        assert_eq!(String::from("foo").into_header_values(), vec!["foo"]);
        assert_eq!(123i32.into_header_values(), vec!["123"]);
        assert_eq!(1.2f64.into_header_values(), vec!["1.2"]);
    }

    #[test]
    fn test_collection_values() {
        assert_eq!(["foo", "bar"].into_header_values(), vec!["foo", "bar"]);
        assert_eq!(vec![1i32, 2].into_header_values(), vec!["1", "2"]);
        assert_eq!((&["a"][..]).into_header_values(), vec!["a"]);
        assert!(Vec::<&str>::new().into_header_values().is_empty());
    }
}
