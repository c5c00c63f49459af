// Parameter store shared by matching and expansion

use serde::Serialize;
use std::collections::BTreeMap;

/// A set of named parameters, each holding one or more string values.
///
/// `exists` and `has_value` are deliberately different: a name set to an
/// empty string exists but has no value.
pub trait Parameters {
    /// Names of all parameters, in lexicographic order
    fn names(&self) -> Vec<&str>;

    /// First value for the name, if any
    fn value(&self, name: &str) -> Option<&str>;

    /// All values for the name, in the order they were set
    fn values(&self, name: &str) -> Option<&[String]>;

    /// Replace the values of `name` with a single value
    fn set(&mut self, name: &str, value: &str);

    /// Replace the values of `name`
    fn set_values(&mut self, name: &str, values: Vec<String>);

    /// True iff the name is present, whatever its values
    fn exists(&self, name: &str) -> bool {
        self.values(name).is_some()
    }

    /// True iff the name is present and its first value is not empty
    fn has_value(&self, name: &str) -> bool {
        self.value(name).is_some_and(|v| !v.is_empty())
    }
}

/// Default parameter store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UriParameters {
    values: BTreeMap<String, Vec<String>>,
}

impl UriParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value to `name`, keeping the existing ones
    pub fn add(&mut self, name: &str, value: &str) {
        self.values
            .entry(name.to_string())
            .or_default()
            .push(value.to_string());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl Parameters for UriParameters {
    fn names(&self) -> Vec<&str> {
        self.values.keys().map(String::as_str).collect()
    }

    fn value(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    fn values(&self, name: &str) -> Option<&[String]> {
        self.values.get(name).map(Vec::as_slice)
    }

    fn set(&mut self, name: &str, value: &str) {
        self.values.insert(name.to_string(), vec![value.to_string()]);
    }

    fn set_values(&mut self, name: &str, values: Vec<String>) {
        self.values.insert(name.to_string(), values);
    }
}

impl<K, V> FromIterator<(K, V)> for UriParameters
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut parameters = UriParameters::new();
        for (name, value) in iter {
            parameters.add(name.as_ref(), value.as_ref());
        }
        parameters
    }
}
