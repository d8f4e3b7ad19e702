use indexmap::IndexMap;
use tracing::debug;

use super::validate::{header_key, is_valid_value};
use super::value::IntoHeaderValues;
use crate::error::ArgumentError;

/// Header name as supplied by the caller and its values.
#[derive(Debug, Clone, PartialEq, Eq)]
struct HeaderEntry {
    name: String,
    values: Vec<String>,
}

/// Ordered, case-insensitive header storage.
///
/// Lookups ignore ASCII case. Iteration yields headers in insertion order with the case
/// recorded for each name: [`insert`](HeaderBag::insert) records the case it was given,
/// [`append`](HeaderBag::append) keeps the case of the existing entry.
///
/// Writes validate first and mutate after, so a rejected write leaves the bag unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderBag {
    entries: IndexMap<String, HeaderEntry>,
}

impl HeaderBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every value of `name` and records `name`'s case for output.
    ///
    /// # Errors
    ///
    /// Fails when the name is not a token or a value contains a forbidden byte or an
    /// unfolded line break.
    pub fn insert<V: IntoHeaderValues>(&mut self, name: &str, values: V) -> Result<(), ArgumentError> {
        let (key, values) = validate(name, values)?;
        self.entries.insert(key, HeaderEntry { name: name.to_owned(), values });
        Ok(())
    }

    /// Appends values to `name`, keeping the stored case when the header already exists.
    ///
    /// # Errors
    ///
    /// Same as [`insert`](HeaderBag::insert).
    pub fn append<V: IntoHeaderValues>(&mut self, name: &str, values: V) -> Result<(), ArgumentError> {
        let (key, values) = validate(name, values)?;
        match self.entries.get_mut(&key) {
            Some(entry) => entry.values.extend(values),
            None => {
                self.entries.insert(key, HeaderEntry { name: name.to_owned(), values });
            }
        }
        Ok(())
    }

    /// Replaces `name` with a single value the caller has already validated, such as a `Host`
    /// built from a [`Uri`](crate::Uri) host.
    pub(crate) fn insert_validated(&mut self, name: &str, value: String) {
        self.entries.insert(name.to_ascii_lowercase(), HeaderEntry { name: name.to_owned(), values: vec![value] });
    }

    /// Removes `name` if present. Unknown or malformed names are ignored.
    pub fn remove(&mut self, name: &str) {
        self.entries.shift_remove(&name.to_ascii_lowercase());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_lowercase())
    }

    /// Returns the values of `name`, or an empty slice when absent.
    pub fn get(&self, name: &str) -> &[String] {
        self.entries.get(&name.to_ascii_lowercase()).map_or(&[], |entry| entry.values.as_slice())
    }

    /// Returns the values of `name` joined with `", "`, or an empty string when absent.
    pub fn line(&self, name: &str) -> String {
        self.get(name).join(", ")
    }

    /// Returns the stored case of `name`.
    pub fn name(&self, name: &str) -> Option<&str> {
        self.entries.get(&name.to_ascii_lowercase()).map(|entry| entry.name.as_str())
    }

    /// Iterates `(name, values)` pairs in insertion order, names in their stored case.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.values().map(|entry| (entry.name.as_str(), entry.values.as_slice()))
    }

    /// Iterates the headers formatted as `Name: value1, value2` lines, without line
    /// terminators.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.iter().map(|(name, values)| format!("{name}: {}", values.join(", ")))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn validate<V: IntoHeaderValues>(name: &str, values: V) -> Result<(String, Vec<String>), ArgumentError> {
    let key = header_key(name)?;
    let values = values.into_header_values();

    if let Some(value) = values.iter().find(|value| !is_valid_value(value)) {
        debug!(name, value = ?value, "rejected invalid header value");
        return Err(ArgumentError::invalid_header_value(name));
    }

    Ok((key, values))
}

impl<'a> IntoIterator for &'a HeaderBag {
    type Item = (&'a str, &'a [String]);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a [String])> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
