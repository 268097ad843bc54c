//! Typed properties attached to XRD documents and links.

use crate::error::XrdError;

/// A single `Property` entry: a type URI and an optional value.
///
/// A property without a value is legal in both wire formats (an empty
/// `<Property/>` element in XML, a `null` value in JRD) and marks the
/// property as present without carrying data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub type_uri: Option<String>,
    pub value: Option<String>,
}

impl Property {
    pub fn new(type_uri: impl Into<String>, value: Option<&str>) -> Self {
        Self {
            type_uri: Some(type_uri.into()),
            value: value.map(|v| v.to_string()),
        }
    }
}

/// Ordered collection of [`Property`] entries.
///
/// Insertion order is preserved and type URIs may repeat. Lookups return the
/// first matching entry. The set is read-only once built: callers that need a
/// different set build a new one (e.g. via `collect()`) and assign it, they do
/// not edit in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertySet {
    entries: Vec<Property>,
}

impl PropertySet {
    /// True if any entry has the given type, even one without a value.
    pub fn has_type(&self, type_uri: &str) -> bool {
        self.entries
            .iter()
            .any(|p| p.type_uri.as_deref() == Some(type_uri))
    }

    /// Value of the first entry with the given type.
    ///
    /// Returns `None` both when no entry matches and when the matching entry
    /// has no value; the two cases are indistinguishable here. Use
    /// [`has_type`](Self::has_type) to tell them apart.
    pub fn value_of(&self, type_uri: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|p| p.type_uri.as_deref() == Some(type_uri))
            .and_then(|p| p.value.as_deref())
    }

    /// All entries with the given type, or every entry when `type_uri` is
    /// `None`, in insertion order.
    pub fn properties(&self, type_uri: Option<&str>) -> Vec<&Property> {
        match type_uri {
            None => self.entries.iter().collect(),
            Some(t) => self
                .entries
                .iter()
                .filter(|p| p.type_uri.as_deref() == Some(t))
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Always fails: property sets are read-only once built.
    pub fn set(&mut self, _type_uri: &str, _value: Option<&str>) -> Result<(), XrdError> {
        Err(XrdError::ReadOnlyProperties)
    }

    /// Always fails: property sets are read-only once built.
    pub fn remove(&mut self, _type_uri: &str) -> Result<(), XrdError> {
        Err(XrdError::ReadOnlyProperties)
    }

    pub(crate) fn push(&mut self, property: Property) {
        self.entries.push(property);
    }
}

impl FromIterator<Property> for PropertySet {
    fn from_iter<I: IntoIterator<Item = Property>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
