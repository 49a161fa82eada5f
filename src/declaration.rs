use serde_json::Value;

use crate::{Entry, Error, Key, Result};

/// Attribute names starting with this prefix are not registered in body
/// mode.
pub const RESERVED_PREFIX: char = '_';

/// One declared constant, in any of the accepted shapes.
///
/// Normalization into an [`Entry`] follows the shape:
///
/// - [`Declaration::Entry`] is used as-is (its name is overwritten).
/// - [`Declaration::Tuple`] sorts by its own key and carries the optional
///   third element as opaque metadata.
/// - [`Declaration::Scalar`] is labelled with the attribute's own name.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use symbolic_enum::{Declaration, Key};
///
/// let entry = Declaration::from((3, "c", "cmeta")).into_entry("C");
/// assert_eq!(entry.key(), &Key::from(3));
/// assert_eq!(entry.value(), &json!("c"));
/// assert_eq!(entry.metadata(), Some(&json!("cmeta")));
///
/// let entry = Declaration::from(1).into_entry("A");
/// assert_eq!(entry.value(), &json!("A"));
/// assert_eq!(entry.sort(), None);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Declaration {
    /// A pre-built entry.
    Entry(Entry),
    /// The `(key, label[, metadata])` shorthand.
    Tuple {
        key: Key,
        label: Value,
        metadata: Option<Value>,
    },
    /// A bare key.
    Scalar(Key),
}

impl Declaration {
    /// Normalizes the declaration into an entry registered under `name`.
    pub fn into_entry(self, name: &str) -> Entry {
        let mut entry = match self {
            Declaration::Entry(entry) => entry,
            Declaration::Tuple { key, label, metadata } => {
                let entry = Entry::new(key.clone(), label).with_sort(key);
                match metadata {
                    Some(metadata) => entry.with_metadata(metadata),
                    None => entry,
                }
            }
            Declaration::Scalar(key) => Entry::new(key, name),
        };
        entry.set_name(name);
        entry
    }

    /// Reads a declaration from its JSON form.
    ///
    /// An integer or string is a scalar, a 2- or 3-element array is the tuple
    /// shorthand and an object with `key` and `label` (plus optional `sort`
    /// and `metadata`) is a full entry.
    pub fn from_json(name: &str, spec: &Value) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidDeclaration {
            name: name.to_string(),
            reason: reason.to_string(),
        };
        match spec {
            Value::Array(items) => {
                let (key, label, metadata) = match items.as_slice() {
                    [key, label] => (key, label, None),
                    [key, label, metadata] => (key, label, Some(metadata.clone())),
                    _ => {
                        return Err(invalid(
                            "expected (key, label) or (key, label, metadata)",
                        ));
                    }
                };
                let key = json_key(key)
                    .ok_or_else(|| invalid("key must be an integer or a string"))?;
                Ok(Declaration::Tuple { key, label: label.clone(), metadata })
            }
            Value::Object(fields) => {
                let key = fields
                    .get("key")
                    .and_then(json_key)
                    .ok_or_else(|| invalid("entry needs an integer or string key"))?;
                let label = fields
                    .get("label")
                    .ok_or_else(|| invalid("entry needs a label"))?;
                let mut entry = Entry::new(key, label.clone());
                if let Some(sort) = fields.get("sort").filter(|sort| !sort.is_null()) {
                    let sort = json_key(sort)
                        .ok_or_else(|| invalid("sort must be an integer or a string"))?;
                    entry = entry.with_sort(sort);
                }
                let metadata = fields.get("metadata").filter(|metadata| !metadata.is_null());
                if let Some(metadata) = metadata {
                    entry = entry.with_metadata(metadata.clone());
                }
                Ok(Declaration::Entry(entry))
            }
            other => json_key(other)
                .map(Declaration::Scalar)
                .ok_or_else(|| {
                    invalid("expected an integer, a string, an array or an entry object")
                }),
        }
    }
}

/// Whether an attribute name is skipped in body mode.
pub fn is_reserved(name: &str) -> bool { name.starts_with(RESERVED_PREFIX) }

fn json_key(value: &Value) -> Option<Key> {
    match value {
        Value::Number(number) => number.as_i64().map(Key::Int),
        Value::String(text) => Some(Key::Text(text.clone())),
        _ => None,
    }
}

impl From<Entry> for Declaration {
    fn from(entry: Entry) -> Self { Declaration::Entry(entry) }
}

impl From<Key> for Declaration {
    fn from(key: Key) -> Self { Declaration::Scalar(key) }
}

macro_rules! impl_scalar_declaration {
    ($($scalar:ty),*) => {
        $(
            impl From<$scalar> for Declaration {
                fn from(value: $scalar) -> Self { Declaration::Scalar(Key::from(value)) }
            }
        )*
    };
}

impl_scalar_declaration!(i8, i16, i32, i64, u8, u16, u32, &str, String);

impl<K, L> From<(K, L)> for Declaration
where
    K: Into<Key>,
    L: Into<Value>,
{
    fn from((key, label): (K, L)) -> Self {
        Declaration::Tuple { key: key.into(), label: label.into(), metadata: None }
    }
}

impl<K, L, M> From<(K, L, M)> for Declaration
where
    K: Into<Key>,
    L: Into<Value>,
    M: Into<Value>,
{
    fn from((key, label, metadata): (K, L, M)) -> Self {
        Declaration::Tuple {
            key: key.into(),
            label: label.into(),
            metadata: Some(metadata.into()),
        }
    }
}
