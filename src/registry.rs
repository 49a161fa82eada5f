use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use serde::Serialize;
use serde_json::Value;

use crate::{Entry, Error, Key, Result};

static EMPTY_LABEL: Value = Value::String(String::new());

/// The frozen table of one enumeration: a mapping from [`Key`] to [`Entry`]
/// plus the attribute table that names each constant.
///
/// A `Registry` is produced once by a
/// [`RegistryBuilder`](crate::RegistryBuilder) and is read-only afterwards.
/// Mapping order (used by [`keys`](Self::keys), [`items`](Self::items),
/// iteration and [`reverbose`](Self::reverbose)) is ascending key order;
/// display order (used by [`verbose`](Self::verbose)) follows each entry's
/// [`sort_key`](Entry::sort_key).
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use symbolic_enum::{Key, RegistryBuilder};
///
/// let registry = RegistryBuilder::new("Priority")
///     .declare("LOW", (1, "low"))
///     .declare("HIGH", (3, "high"))
///     .declare("MEDIUM", (2, "medium"))
///     .build()
///     .unwrap();
///
/// assert_eq!(registry.lookup(&Key::from(2)).unwrap(), "MEDIUM");
/// assert_eq!(registry.verbose_of(&Key::from(3)), &json!("high"));
/// assert_eq!(registry.reverbose(&json!("low")).unwrap(), &Key::from(1));
/// assert_eq!(registry.attribute("HIGH"), Some(&Key::from(3)));
/// assert_eq!(registry.next_available_key().unwrap(), Key::from(4));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Registry {
    type_name: String,
    entries: BTreeMap<Key, Entry>,
    attributes: BTreeMap<String, Key>,
}

/// The result of a lenient [`Registry::lookup_or_key`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lookup<'a> {
    /// The registered name for the key.
    Name(&'a str),
    /// The key itself, returned unchanged because it is not registered.
    Unregistered(&'a Key),
}

impl fmt::Display for Lookup<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookup::Name(name) => f.write_str(name),
            Lookup::Unregistered(key) => write!(f, "{}", key),
        }
    }
}

impl Registry {
    pub(crate) fn from_parts(
        type_name: String,
        entries: BTreeMap<Key, Entry>,
        attributes: BTreeMap<String, Key>,
    ) -> Self {
        Self { type_name, entries, attributes }
    }

    /// The name of the enumeration type that owns this registry.
    pub fn type_name(&self) -> &str { &self.type_name }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn contains(&self, key: &Key) -> bool { self.entries.contains_key(key) }

    pub fn entry(&self, key: &Key) -> Option<&Entry> { self.entries.get(key) }

    /// Iterates over every entry in mapping order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> { self.entries.values() }

    /// Returns the key bound to an attribute name, the equivalent of reading
    /// a constant off its enumeration type.
    ///
    /// Inherited attributes resolve to the first parent that defines them;
    /// names declared on the enumeration itself take precedence.
    pub fn attribute(&self, name: &str) -> Option<&Key> { self.attributes.get(name) }

    /// Iterates lazily over all keys in mapping order. Each call restarts
    /// from the beginning.
    pub fn iter(&self) -> impl Iterator<Item = &Key> { self.entries.keys() }

    /// Returns all keys in mapping order.
    pub fn keys(&self) -> Vec<&Key> { self.entries.keys().collect() }

    /// Returns the registered name of every entry, parallel to
    /// [`keys`](Self::keys).
    pub fn values(&self) -> Vec<&str> {
        self.entries.values().map(registered_name).collect()
    }

    /// Returns `(key, name)` pairs in mapping order.
    pub fn items(&self) -> Vec<(&Key, &str)> {
        self.entries
            .iter()
            .map(|(key, entry)| (key, registered_name(entry)))
            .collect()
    }

    /// Returns `(key, label)` pairs in display order: ascending by each
    /// entry's sort key, falling back to the key itself.
    ///
    /// ```
    /// use serde_json::json;
    /// use symbolic_enum::{Entry, Key, RegistryBuilder};
    ///
    /// let registry = RegistryBuilder::new("Sizes")
    ///     .declare("SMALL", Entry::new(10, "S").with_sort(1))
    ///     .declare("LARGE", Entry::new(5, "L").with_sort(3))
    ///     .declare("MEDIUM", Entry::new(7, "M").with_sort(2))
    ///     .build()
    ///     .unwrap();
    ///
    /// let labels: Vec<_> = registry.verbose().into_iter().map(|(_, label)| label).collect();
    /// assert_eq!(labels, [&json!("S"), &json!("M"), &json!("L")]);
    /// ```
    pub fn verbose(&self) -> Vec<(&Key, &Value)> {
        self.display_order()
            .into_iter()
            .map(|entry| (entry.key(), entry.value()))
            .collect()
    }

    /// Returns the label for a key, or an empty-string label when the key is
    /// not registered.
    pub fn verbose_of(&self, key: &Key) -> &Value {
        self.verbose_or(key, &EMPTY_LABEL)
    }

    /// Returns the label for a key, or `default` when the key is not
    /// registered.
    pub fn verbose_or<'a>(&'a self, key: &Key, default: &'a Value) -> &'a Value {
        self.get(key).unwrap_or(default)
    }

    /// Returns the label for a key. Never fails.
    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.entries.get(key).map(Entry::value)
    }

    /// Alias of [`verbose_or`](Self::verbose_or).
    pub fn get_or<'a>(&'a self, key: &Key, default: &'a Value) -> &'a Value {
        self.verbose_or(key, default)
    }

    /// Returns the label for a key, failing when the key is not registered.
    ///
    /// This is the indexing form of [`get`](Self::get).
    pub fn label(&self, key: &Key) -> Result<&Value> {
        self.get(key).ok_or_else(|| Error::NotFound { key: key.clone() })
    }

    /// Returns the registered name for a key.
    pub fn lookup(&self, key: &Key) -> Result<&str> {
        self.entries
            .get(key)
            .map(registered_name)
            .ok_or_else(|| Error::NotFound { key: key.clone() })
    }

    /// Returns the registered name for a key, or the key itself when it is
    /// not registered.
    ///
    /// ```
    /// use symbolic_enum::{Key, Lookup, RegistryBuilder};
    ///
    /// let registry = RegistryBuilder::new("Flags").declare("ON", 1).build().unwrap();
    /// let missing = Key::from(9);
    ///
    /// assert_eq!(registry.lookup_or_key(&Key::from(1)), Lookup::Name("ON"));
    /// assert_eq!(registry.lookup_or_key(&missing), Lookup::Unregistered(&missing));
    /// ```
    pub fn lookup_or_key<'a>(&'a self, key: &'a Key) -> Lookup<'a> {
        match self.entries.get(key) {
            Some(entry) => Lookup::Name(registered_name(entry)),
            None => Lookup::Unregistered(key),
        }
    }

    /// Finds the key whose label equals `label`.
    ///
    /// This is a linear scan; the first match in mapping order wins.
    pub fn reverbose(&self, label: &Value) -> Result<&Key> {
        self.find_label(label)
            .ok_or_else(|| Error::LabelNotFound { label: label.clone() })
    }

    /// Like [`reverbose`](Self::reverbose), returning `default` when no label
    /// matches.
    pub fn reverbose_or<'a>(&'a self, label: &Value, default: &'a Key) -> &'a Key {
        self.find_label(label).unwrap_or(default)
    }

    /// Returns the metadata of every entry, keyed by entry key.
    pub fn metadata(&self) -> BTreeMap<&Key, Option<&Value>> {
        self.entries
            .iter()
            .map(|(key, entry)| (key, entry.metadata()))
            .collect()
    }

    /// Returns the metadata for a key, failing when the key is not
    /// registered. A registered entry without metadata yields `Ok(None)`.
    ///
    /// An unregistered key is [`Error::NotFound`] rather than `None`, so the
    /// two cases stay distinct; [`metadata_or`](Self::metadata_or) is the
    /// lenient form.
    pub fn metadata_of(&self, key: &Key) -> Result<Option<&Value>> {
        self.entries
            .get(key)
            .map(Entry::metadata)
            .ok_or_else(|| Error::NotFound { key: key.clone() })
    }

    /// Returns the metadata for a key, or `default` when the key is not
    /// registered.
    pub fn metadata_or<'a>(&'a self, key: &Key, default: &'a Value) -> Option<&'a Value> {
        match self.entries.get(key) {
            Some(entry) => entry.metadata(),
            None => Some(default),
        }
    }

    /// The length, in characters, of the longest key rendered as text.
    pub fn max_length(&self) -> Option<usize> {
        self.entries
            .keys()
            .map(|key| key.to_string().chars().count())
            .max()
    }

    /// Picks a key uniformly at random from the display-ordered listing.
    pub fn random(&self) -> Result<&Key> { self.random_with(&mut rand::rng()) }

    /// Like [`random`](Self::random), drawing from the given generator.
    pub fn random_with<R: Rng>(&self, rng: &mut R) -> Result<&Key> {
        let listing = self.display_order();
        if listing.is_empty() {
            return Err(Error::Empty);
        }
        let index = rng.random_range(0..listing.len());
        Ok(listing[index].key())
    }

    /// Returns one more than the largest key, or `0` for an empty registry.
    ///
    /// Only meaningful for integer keys; a text key is an error.
    pub fn next_available_key(&self) -> Result<Key> {
        match self.entries.keys().next_back() {
            None => Ok(Key::Int(0)),
            Some(Key::Text(text)) => {
                Err(Error::NonNumericKey { key: Key::Text(text.clone()) })
            }
            Some(Key::Int(max)) => max
                .checked_add(1)
                .map(Key::Int)
                .ok_or(Error::KeyOverflow { key: Key::Int(*max) }),
        }
    }

    /// Renders the verbose listing as JSON `[key, label, metadata]` triples,
    /// in display order.
    pub fn verbose_json(&self) -> Value {
        Value::Array(
            self.display_order()
                .into_iter()
                .map(|entry| {
                    Value::Array(vec![
                        entry.key().to_value(),
                        entry.value().clone(),
                        entry.metadata().cloned().unwrap_or(Value::Null),
                    ])
                })
                .collect(),
        )
    }

    pub(crate) fn display_order(&self) -> Vec<&Entry> {
        let mut listing: Vec<&Entry> = self.entries.values().collect();
        listing.sort_by(|a, b| a.sort_key().cmp(b.sort_key()));
        listing
    }

    pub(crate) fn attributes(&self) -> &BTreeMap<String, Key> { &self.attributes }

    pub(crate) fn entry_map(&self) -> &BTreeMap<Key, Entry> { &self.entries }

    fn find_label(&self, label: &Value) -> Option<&Key> {
        self.entries
            .values()
            .find(|entry| entry.value() == label)
            .map(Entry::key)
    }
}

/// Registered entries always carry a name; unnamed ones are only possible
/// before registration.
fn registered_name(entry: &Entry) -> &str { entry.assigned_name().unwrap_or_default() }

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a Key;
    type IntoIter = std::collections::btree_map::Keys<'a, Key, Entry>;

    fn into_iter(self) -> Self::IntoIter { self.entries.keys() }
}

/// Renders the owning type's name.
impl fmt::Display for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::json;

    use super::*;
    use crate::RegistryBuilder;

    fn letters() -> Registry {
        RegistryBuilder::new("tests::Letters")
            .declare("A", 1)
            .declare("B", (2, "b"))
            .declare("C", (3, "c", "cmeta"))
            .declare("_Z", (100, "z"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_listings() {
        let registry = letters();
        assert_eq!(registry.keys(), [&Key::from(1), &Key::from(2), &Key::from(3)]);
        assert_eq!(registry.values(), ["A", "B", "C"]);
        assert_eq!(
            registry.items(),
            [(&Key::from(1), "A"), (&Key::from(2), "B"), (&Key::from(3), "C")]
        );
        assert_eq!(
            registry.verbose(),
            [
                (&Key::from(1), &json!("A")),
                (&Key::from(2), &json!("b")),
                (&Key::from(3), &json!("c")),
            ]
        );
    }

    #[test]
    fn test_label_queries() {
        let registry = letters();
        assert_eq!(registry.verbose_of(&Key::from(3)), &json!("c"));
        assert_eq!(registry.verbose_of(&Key::from(100)), &json!(""));
        assert_eq!(registry.get(&Key::from(100)), None);
        assert_eq!(registry.get_or(&Key::from(100), &json!("Z")), &json!("Z"));
        assert_eq!(registry.label(&Key::from(3)).unwrap(), registry.verbose_of(&Key::from(3)));
        assert_eq!(
            registry.label(&Key::from(100)),
            Err(Error::NotFound { key: Key::from(100) })
        );
    }

    #[test]
    fn test_lookup() {
        let registry = letters();
        assert_eq!(registry.lookup(&Key::from(3)).unwrap(), "C");
        assert!(matches!(registry.lookup(&Key::from(100)), Err(Error::NotFound { .. })));
        assert_eq!(registry.lookup_or_key(&Key::from(100)).to_string(), "100");
    }

    #[test]
    fn test_reverbose_round_trip() {
        let registry = letters();
        for key in registry.iter() {
            assert_eq!(registry.reverbose(registry.verbose_of(key)).unwrap(), key);
        }
        assert!(matches!(
            registry.reverbose(&json!("nope")),
            Err(Error::LabelNotFound { .. })
        ));
        let fallback = Key::from(-1);
        assert_eq!(registry.reverbose_or(&json!("nope"), &fallback), &fallback);
    }

    #[test]
    fn test_reverbose_first_match_in_key_order() {
        let registry = RegistryBuilder::new("Dupes")
            .declare("LATER", (9, "same"))
            .declare("EARLIER", (4, "same"))
            .build()
            .unwrap();
        assert_eq!(registry.reverbose(&json!("same")).unwrap(), &Key::from(4));
    }

    #[test]
    fn test_metadata() {
        let registry = letters();
        assert_eq!(registry.metadata_of(&Key::from(1)).unwrap(), None);
        assert_eq!(registry.metadata_of(&Key::from(2)).unwrap(), None);
        assert_eq!(registry.metadata_of(&Key::from(3)).unwrap(), Some(&json!("cmeta")));
        assert_eq!(
            registry.metadata_of(&Key::from(100)),
            Err(Error::NotFound { key: Key::from(100) })
        );
        let default = json!("default");
        assert_eq!(registry.metadata_or(&Key::from(100), &default), Some(&default));
        assert_eq!(registry.metadata_or(&Key::from(1), &default), None);

        let all = registry.metadata();
        assert_eq!(all.len(), 3);
        assert_eq!(all[&Key::from(3)], Some(&json!("cmeta")));
    }

    #[test]
    fn test_next_available_key() {
        assert_eq!(letters().next_available_key().unwrap(), Key::from(4));
        assert_eq!(Registry::default().next_available_key().unwrap(), Key::from(0));

        let text = RegistryBuilder::new("Text").declare("A", "a").build().unwrap();
        assert!(matches!(text.next_available_key(), Err(Error::NonNumericKey { .. })));

        let full = RegistryBuilder::new("Full").declare("MAX", i64::MAX).build().unwrap();
        assert!(matches!(full.next_available_key(), Err(Error::KeyOverflow { .. })));
    }

    #[test]
    fn test_max_length() {
        let registry = RegistryBuilder::new("Widths")
            .declare("A", 7)
            .declare("B", 1234)
            .declare("C", -10)
            .build()
            .unwrap();
        assert_eq!(registry.max_length(), Some(4));
        assert_eq!(Registry::default().max_length(), None);
    }

    #[test]
    fn test_random() {
        let registry = letters();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..32 {
            let key = registry.random_with(&mut rng).unwrap();
            assert!(registry.contains(key));
        }
        assert!(registry.random().is_ok());
        assert_eq!(Registry::default().random(), Err(Error::Empty));
    }

    #[test]
    fn test_iteration_is_restartable() {
        let registry = letters();
        let first: Vec<_> = registry.iter().collect();
        let second: Vec<_> = (&registry).into_iter().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_verbose_json() {
        assert_eq!(
            letters().verbose_json(),
            json!([[1, "A", null], [2, "b", null], [3, "c", "cmeta"]])
        );
    }
}
