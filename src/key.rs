use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The canonical identifier of a symbolic constant.
///
/// Keys are totally ordered: every integer key sorts before every text key,
/// integers compare numerically and text compares lexicographically. This
/// ordering defines the iteration order of a [`Registry`](crate::Registry)
/// and the fallback display order of its verbose listing.
///
/// # Examples
///
/// ```
/// use symbolic_enum::Key;
///
/// let a = Key::from(3);
/// let b = Key::from("alpha");
/// assert!(a < b);
/// assert_eq!(a.to_string(), "3");
/// assert_eq!(b.to_string(), "alpha");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    /// An integer key.
    Int(i64),
    /// A text key.
    Text(String),
}

impl Key {
    /// Returns the integer value if this is an integer key.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Key::Int(value) => Some(*value),
            Key::Text(_) => None,
        }
    }

    /// Returns the text if this is a text key.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Key::Int(_) => None,
            Key::Text(text) => Some(text),
        }
    }

    /// Best-effort integer coercion. Never fails; returns `None` when the key
    /// has no integer reading.
    ///
    /// ```
    /// use symbolic_enum::Key;
    ///
    /// assert_eq!(Key::from(7).to_int(), Some(7));
    /// assert_eq!(Key::from(" 12 ").to_int(), Some(12));
    /// assert_eq!(Key::from("twelve").to_int(), None);
    /// ```
    pub fn to_int(&self) -> Option<i64> {
        match self {
            Key::Int(value) => Some(*value),
            Key::Text(text) => text.trim().parse().ok(),
        }
    }

    /// Returns the key as an opaque label value.
    pub fn to_value(&self) -> Value {
        match self {
            Key::Int(value) => Value::from(*value),
            Key::Text(text) => Value::from(text.as_str()),
        }
    }
}

/// Best-effort integer coercion of an arbitrary value.
///
/// Integers pass through, finite floats are truncated toward zero, booleans
/// become `0`/`1` and numeric strings are parsed after trimming whitespace.
/// Anything else yields `None`; this function never fails.
///
/// ```
/// use serde_json::json;
/// use symbolic_enum::to_int;
///
/// assert_eq!(to_int(&json!(4)), Some(4));
/// assert_eq!(to_int(&json!(4.9)), Some(4));
/// assert_eq!(to_int(&json!("-2")), Some(-2));
/// assert_eq!(to_int(&json!(true)), Some(1));
/// assert_eq!(to_int(&json!("4.9")), None);
/// assert_eq!(to_int(&json!(null)), None);
/// ```
pub fn to_int(value: &Value) -> Option<i64> {
    match value {
        Value::Bool(flag) => Some(i64::from(*flag)),
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|float| float.is_finite())
                .map(f64::trunc)
                .filter(|float| *float >= i64::MIN as f64 && *float < i64::MAX as f64)
                .map(|float| float as i64)
        }),
        Value::String(text) => text.trim().parse().ok(),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// The inverse of [`to_int`] for stored keys: the identity.
pub fn from_int<T>(value: T) -> T { value }

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(value) => write!(f, "{}", value),
            Key::Text(text) => f.write_str(text),
        }
    }
}

macro_rules! impl_key_from_int {
    ($($int:ty),*) => {
        $(
            impl From<$int> for Key {
                fn from(value: $int) -> Self { Key::Int(i64::from(value)) }
            }
        )*
    };
}

impl_key_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<&str> for Key {
    fn from(text: &str) -> Self { Key::Text(text.to_string()) }
}

impl From<String> for Key {
    fn from(text: String) -> Self { Key::Text(text) }
}

impl From<&Key> for Key {
    fn from(key: &Key) -> Self { key.clone() }
}

impl From<Key> for Value {
    fn from(key: Key) -> Self {
        match key {
            Key::Int(value) => Value::from(value),
            Key::Text(text) => Value::String(text),
        }
    }
}

impl PartialEq<i64> for Key {
    fn eq(&self, other: &i64) -> bool { self.as_int() == Some(*other) }
}

impl PartialEq<&str> for Key {
    fn eq(&self, other: &&str) -> bool { self.as_text() == Some(*other) }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_integers_sort_before_text() {
        let mut keys =
            vec![Key::from("b"), Key::from(10), Key::from("a"), Key::from(-1)];
        keys.sort();
        assert_eq!(
            keys,
            vec![Key::from(-1), Key::from(10), Key::from("a"), Key::from("b")]
        );
    }

    #[test]
    fn test_untagged_serialization() {
        assert_eq!(serde_json::to_value(Key::from(5)).unwrap(), json!(5));
        assert_eq!(serde_json::to_value(Key::from("x")).unwrap(), json!("x"));
        let key: Key = serde_json::from_value(json!("y")).unwrap();
        assert_eq!(key, Key::from("y"));
        let key: Key = serde_json::from_value(json!(9)).unwrap();
        assert_eq!(key, Key::from(9));
    }

    #[test]
    fn test_to_int_rejects_out_of_range_floats() {
        assert_eq!(to_int(&json!(1e300)), None);
        assert_eq!(to_int(&json!(-3.7)), Some(-3));
        assert_eq!(to_int(&json!([1])), None);
        assert_eq!(to_int(&json!({"a": 1})), None);
    }

    #[test]
    fn test_from_int_is_identity() {
        assert_eq!(from_int(Key::from(3)), Key::from(3));
        assert_eq!(from_int("label"), "label");
    }
}
