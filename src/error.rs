use serde_json::Value;
use thiserror::Error;

use crate::{Entry, Key};

/// Shortcut for results carrying an enumeration [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Things that may go wrong declaring or querying an enumeration.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum Error {
    /// Two inherited entries bind the same key to different definitions.
    #[error(
        "value already exists in {registry}: found {existing} for {key}, trying to add {incoming} for {key}"
    )]
    Conflict {
        registry: String,
        key: Key,
        existing: Box<Entry>,
        incoming: Box<Entry>,
    },

    /// A declared attribute reuses a key already bound to another name.
    #[error(
        "value already exists in {registry}: found {existing_name} for {key}, trying to add {name} for {key}"
    )]
    DuplicateKey {
        registry: String,
        key: Key,
        existing_name: String,
        name: String,
    },

    #[error("no entry for key {key}")]
    NotFound { key: Key },

    #[error("no entry with label {label}")]
    LabelNotFound { label: Value },

    #[error("the enumeration has no entries")]
    Empty,

    #[error("key {key} is not numeric")]
    NonNumericKey { key: Key },

    #[error("no integer key follows {key}")]
    KeyOverflow { key: Key },

    #[error("invalid declaration for {name}: {reason}")]
    InvalidDeclaration { name: String, reason: String },

    #[error("{registry} inherits from unknown enumeration {base}")]
    UnknownBase { registry: String, base: String },

    #[error("{registry} inherits from itself")]
    InheritanceCycle { registry: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    const fn is_normal<T: Sized + Send + Sync>() {}

    #[test]
    fn normal_types() { is_normal::<Error>(); }

    #[test]
    fn test_duplicate_key_message() {
        let error = Error::DuplicateKey {
            registry: "colors::Color".to_string(),
            key: Key::from(1),
            existing_name: "RED".to_string(),
            name: "CRIMSON".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "value already exists in colors::Color: found RED for 1, trying to add CRIMSON for 1"
        );
    }
}
