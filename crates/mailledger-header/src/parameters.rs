//! Ordered header parameters.

use crate::error::Result;
use crate::grammar::{validate_parameter_name, validate_parameter_value};
use std::collections::HashMap;

/// Ordered parameter list with case-insensitive lookup.
///
/// Names keep the case they were inserted with and iterate in insertion
/// order, so serialization is deterministic. Lookup ignores ASCII case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    entries: Vec<(String, String)>,
    /// Lowercased name -> index into `entries`.
    index: HashMap<String, usize>,
}

impl Parameters {
    /// Creates an empty parameter list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Gets a parameter value by name, ignoring case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.index
            .get(&name.to_ascii_lowercase())
            .map(|&i| self.entries[i].1.as_str())
    }

    /// Returns true if a parameter with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&name.to_ascii_lowercase())
    }

    /// Inserts a parameter after validating name and value.
    ///
    /// An existing parameter with the same name (ignoring case) keeps its
    /// position but takes the new name spelling and value. The old value
    /// is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not a token or the value contains
    /// CR/LF or non-printable characters.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Option<String>> {
        let name = name.into();
        let value = value.into();
        validate_parameter_name(&name)?;
        validate_parameter_value(&value)?;
        Ok(self.insert_unchecked(name, value))
    }

    pub(crate) fn insert_unchecked(&mut self, name: String, value: String) -> Option<String> {
        let key = name.to_ascii_lowercase();
        if let Some(&i) = self.index.get(&key) {
            let entry = &mut self.entries[i];
            entry.0 = name;
            return Some(std::mem::replace(&mut entry.1, value));
        }
        self.index.insert(key, self.entries.len());
        self.entries.push((name, value));
        None
    }

    /// Removes a parameter by name, ignoring case.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let i = self.index.remove(&name.to_ascii_lowercase())?;
        let (_, value) = self.entries.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Some(value)
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl<'a> IntoIterator for &'a Parameters {
    type Item = (&'a str, &'a str);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a str)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Parameters {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
