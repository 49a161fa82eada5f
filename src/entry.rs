use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::Key;

/// One symbolic constant: its key, display label, registered name, optional
/// sort key and opaque metadata.
///
/// Entries are immutable once registered. The builder-style `with_*`
/// methods are for declaring an entry up front, before it is handed to a
/// [`RegistryBuilder`](crate::RegistryBuilder).
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use symbolic_enum::{Entry, Key};
///
/// let entry = Entry::new(7, "seven")
///     .with_sort(0)
///     .with_metadata_field("roman", "VII");
///
/// assert_eq!(entry.key(), &Key::from(7));
/// assert_eq!(entry.value(), &json!("seven"));
/// assert_eq!(entry.sort_key(), &Key::from(0));
/// assert_eq!(entry.metadata(), Some(&json!({"roman": "VII"})));
/// assert_eq!(entry.assigned_name(), None);
/// assert_eq!(entry.name(), "7");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Entry {
    key: Key,
    value: Value,
    name: Option<String>,
    sort: Option<Key>,
    metadata: Option<Value>,
}

impl Entry {
    pub fn new(key: impl Into<Key>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            name: None,
            sort: None,
            metadata: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_sort(mut self, sort: impl Into<Key>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Attaches an opaque metadata value, replacing any previous payload.
    pub fn with_metadata(mut self, metadata: impl Into<Value>) -> Self {
        self.metadata = Some(metadata.into());
        self
    }

    /// Adds one field to the metadata bag.
    ///
    /// A payload that is not already an object is replaced by a fresh bag.
    pub fn with_metadata_field(
        mut self,
        field: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        let mut bag = match self.metadata.take() {
            Some(Value::Object(bag)) => bag,
            _ => Map::new(),
        };
        bag.insert(field.into(), value.into());
        self.metadata = Some(Value::Object(bag));
        self
    }

    pub fn key(&self) -> &Key { &self.key }

    /// The display label.
    pub fn value(&self) -> &Value { &self.value }

    /// The attribute name this entry was registered under, if any.
    pub fn assigned_name(&self) -> Option<&str> { self.name.as_deref() }

    /// The assigned name, or the key rendered as text when unnamed.
    pub fn name(&self) -> String {
        self.assigned_name()
            .map(|name| name.to_string())
            .unwrap_or_else(|| self.key.to_string())
    }

    pub fn sort(&self) -> Option<&Key> { self.sort.as_ref() }

    /// The key used for display ordering: `sort` when present, else `key`.
    pub fn sort_key(&self) -> &Key { self.sort.as_ref().unwrap_or(&self.key) }

    pub fn metadata(&self) -> Option<&Value> { self.metadata.as_ref() }

    /// Identity used when merging inherited entries.
    pub(crate) fn same_definition(&self, other: &Entry) -> bool {
        self.name == other.name && self.value == other.value
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = Some(name.to_string());
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}: {})", self.name(), self.key, self.value)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_display() {
        let entry = Entry::new(2, "b").with_name("B");
        assert_eq!(entry.to_string(), r#"B(2: "b")"#);
    }

    #[test]
    fn test_metadata_field_replaces_opaque_payload() {
        let entry = Entry::new(1, "a")
            .with_metadata("opaque")
            .with_metadata_field("color", "red")
            .with_metadata_field("weight", 3);
        assert_eq!(entry.metadata(), Some(&json!({"color": "red", "weight": 3})));
    }

    #[test]
    fn test_same_definition_ignores_sort_and_metadata() {
        let a = Entry::new(1, "a").with_name("A").with_sort(9);
        let b = Entry::new(1, "a").with_name("A").with_metadata("m");
        let c = Entry::new(1, "other").with_name("A");
        assert!(a.same_definition(&b));
        assert!(!a.same_definition(&c));
    }
}
