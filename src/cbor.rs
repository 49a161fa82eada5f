//! Deterministic CBOR (dCBOR) rendering of keys, entries and verbose
//! listings, for callers that surface enumerations over a binary transport.

use dcbor::prelude::*;
use serde_json::Value;

use crate::{Entry, Key, Registry};

impl Key {
    /// Encodes the key as a CBOR integer or text string.
    ///
    /// ```
    /// use dcbor::prelude::*;
    /// use symbolic_enum::Key;
    ///
    /// assert_eq!(Key::from(3).to_cbor(), CBOR::from(3));
    /// assert_eq!(Key::from("alpha").to_cbor(), CBOR::from("alpha"));
    /// ```
    pub fn to_cbor(&self) -> CBOR {
        match self {
            Key::Int(value) => CBOR::from(*value),
            Key::Text(text) => CBOR::from(text.as_str()),
        }
    }
}

impl Entry {
    /// Encodes the entry as a CBOR map with `key`, `label` and, when set,
    /// `name`, `sort` and `metadata`.
    pub fn to_cbor(&self) -> CBOR {
        let mut map = Map::new();
        map.insert("key", self.key().to_cbor());
        map.insert("label", value_to_cbor(self.value()));
        if let Some(name) = self.assigned_name() {
            map.insert("name", name);
        }
        if let Some(sort) = self.sort() {
            map.insert("sort", sort.to_cbor());
        }
        if let Some(metadata) = self.metadata() {
            map.insert("metadata", value_to_cbor(metadata));
        }
        CBOR::from(map)
    }
}

impl Registry {
    /// Encodes the verbose listing as an array of `[key, label, metadata]`
    /// triples in display order, `null` standing in for absent metadata.
    pub fn verbose_cbor(&self) -> CBOR {
        let triples: Vec<CBOR> = self
            .display_order()
            .into_iter()
            .map(|entry| {
                CBOR::from(vec![
                    entry.key().to_cbor(),
                    value_to_cbor(entry.value()),
                    entry.metadata().map(value_to_cbor).unwrap_or_else(CBOR::null),
                ])
            })
            .collect();
        CBOR::from(triples)
    }

    /// Encodes every entry, in mapping order.
    pub fn entries_cbor(&self) -> CBOR {
        let entries: Vec<CBOR> = self.entries().map(Entry::to_cbor).collect();
        CBOR::from(entries)
    }
}

/// Converts an opaque label or metadata value to CBOR.
///
/// Objects become maps with text keys; numbers keep their integer form when
/// they have one.
pub fn value_to_cbor(value: &Value) -> CBOR {
    match value {
        Value::Null => CBOR::null(),
        Value::Bool(flag) => CBOR::from(*flag),
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                CBOR::from(int)
            } else if let Some(uint) = number.as_u64() {
                CBOR::from(uint)
            } else {
                CBOR::from(number.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(text) => CBOR::from(text.as_str()),
        Value::Array(items) => {
            CBOR::from(items.iter().map(value_to_cbor).collect::<Vec<CBOR>>())
        }
        Value::Object(fields) => {
            let mut map = Map::new();
            for (field, item) in fields {
                map.insert(field.as_str(), value_to_cbor(item));
            }
            CBOR::from(map)
        }
    }
}
