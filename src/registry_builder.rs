use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::declaration::is_reserved;
use crate::{Declaration, Entry, Error, Key, Registry, Result};

/// How the builder treats two entries that claim the same key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Uniqueness {
    /// Conflicting definitions of a key fail the build.
    #[default]
    Strict,
    /// Any number of names may claim a key; the last one wins.
    Permissive,
}

/// Where the declared attributes come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeclarationMode {
    /// Every declared attribute not starting with the reserved prefix.
    #[default]
    Body,
    /// One explicit name-to-declaration table; no prefix exclusion.
    Table,
}

/// Builds the frozen [`Registry`] of one enumeration.
///
/// Parents are merged in the order they are inherited, then the
/// enumeration's own declarations are normalized and added. With
/// [`Uniqueness::Strict`] (the default) two rules apply:
///
/// - an inherited key may only arrive twice with the same name and label,
///   which makes diamond inheritance a no-op merge;
/// - a declared attribute may not reuse a key already bound to another
///   name.
///
/// # Examples
///
/// ```
/// use symbolic_enum::{Error, Key, RegistryBuilder};
///
/// let base = RegistryBuilder::new("Base")
///     .declare("A", 1)
///     .declare("B", (2, "b"))
///     .build()
///     .unwrap();
///
/// let child = RegistryBuilder::new("Child")
///     .inherit(&base)
///     .declare("D", 5)
///     .build()
///     .unwrap();
/// assert_eq!(child.keys(), [&Key::from(1), &Key::from(2), &Key::from(5)]);
///
/// let clash = RegistryBuilder::new("Clash")
///     .inherit(&base)
///     .declare("OTHER", 1)
///     .build();
/// assert!(matches!(clash, Err(Error::DuplicateKey { .. })));
/// ```
#[derive(Clone, Debug)]
pub struct RegistryBuilder {
    type_name: String,
    uniqueness: Uniqueness,
    parents: Vec<Registry>,
    body: Vec<(String, Declaration)>,
    table: Option<Vec<(String, Declaration)>>,
}

impl RegistryBuilder {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            uniqueness: Uniqueness::default(),
            parents: Vec::new(),
            body: Vec::new(),
            table: None,
        }
    }

    pub fn uniqueness(mut self, uniqueness: Uniqueness) -> Self {
        self.uniqueness = uniqueness;
        self
    }

    /// Adds a parent. Its entries are copied into the new registry.
    pub fn inherit(mut self, parent: &Registry) -> Self {
        self.parents.push(parent.clone());
        self
    }

    pub fn inherit_all<'a>(mut self, parents: impl IntoIterator<Item = &'a Registry>) -> Self {
        self.parents.extend(parents.into_iter().cloned());
        self
    }

    /// Declares one attribute in body mode.
    pub fn declare(mut self, name: impl Into<String>, declaration: impl Into<Declaration>) -> Self {
        self.body.push((name.into(), declaration.into()));
        self
    }

    /// Switches to legacy table mode and appends the given declarations.
    ///
    /// In table mode body declarations are ignored and the reserved prefix
    /// does not exclude anything.
    pub fn table<N, D>(mut self, declarations: impl IntoIterator<Item = (N, D)>) -> Self
    where
        N: Into<String>,
        D: Into<Declaration>,
    {
        self.table
            .get_or_insert_with(Vec::new)
            .extend(
                declarations
                    .into_iter()
                    .map(|(name, declaration)| (name.into(), declaration.into())),
            );
        self
    }

    pub fn mode(&self) -> DeclarationMode {
        if self.table.is_some() { DeclarationMode::Table } else { DeclarationMode::Body }
    }

    /// Merges, normalizes and validates everything declared so far.
    pub fn build(self) -> Result<Registry> {
        let mode = self.mode();
        let mut merge = Merge {
            type_name: &self.type_name,
            uniqueness: self.uniqueness,
            entries: BTreeMap::new(),
            attributes: BTreeMap::new(),
        };

        for parent in &self.parents {
            merge.inherit(parent)?;
        }

        let declared = match self.table {
            Some(table) => {
                if !self.body.is_empty() {
                    debug!(
                        registry = %self.type_name,
                        ignored = self.body.len(),
                        "table mode ignores body declarations"
                    );
                }
                table
            }
            None => self.body,
        };

        for (name, declaration) in declared {
            if mode == DeclarationMode::Body && is_reserved(&name) {
                trace!(registry = %self.type_name, %name, "skipping reserved attribute");
                continue;
            }
            merge.declare(&name, declaration.into_entry(&name))?;
        }

        debug!(
            registry = %self.type_name,
            entries = merge.entries.len(),
            parents = self.parents.len(),
            ?mode,
            "registry built"
        );
        let Merge { entries, attributes, .. } = merge;
        Ok(Registry::from_parts(self.type_name, entries, attributes))
    }
}

struct Merge<'a> {
    type_name: &'a str,
    uniqueness: Uniqueness,
    entries: BTreeMap<Key, Entry>,
    attributes: BTreeMap<String, Key>,
}

impl Merge<'_> {
    fn inherit(&mut self, parent: &Registry) -> Result<()> {
        for (key, incoming) in parent.entry_map() {
            match self.entries.get(key) {
                Some(existing) if existing.same_definition(incoming) => {
                    trace!(registry = self.type_name, %key, "identical inherited entry");
                }
                Some(existing) if self.uniqueness == Uniqueness::Strict => {
                    return Err(Error::Conflict {
                        registry: self.type_name.to_string(),
                        key: key.clone(),
                        existing: Box::new(existing.clone()),
                        incoming: Box::new(incoming.clone()),
                    });
                }
                Some(existing) => {
                    debug!(
                        registry = self.type_name,
                        %key,
                        %existing,
                        %incoming,
                        "inherited entry overwrites key"
                    );
                }
                None => {}
            }
            self.entries.insert(key.clone(), incoming.clone());
        }
        for (name, key) in parent.attributes() {
            self.attributes.entry(name.clone()).or_insert_with(|| key.clone());
        }
        Ok(())
    }

    fn declare(&mut self, name: &str, entry: Entry) -> Result<()> {
        let key = entry.key().clone();
        if let Some(existing) = self.entries.get(&key) {
            let existing_name = existing.name();
            if existing_name != name {
                if self.uniqueness == Uniqueness::Strict {
                    return Err(Error::DuplicateKey {
                        registry: self.type_name.to_string(),
                        key,
                        existing_name,
                        name: name.to_string(),
                    });
                }
                debug!(
                    registry = self.type_name,
                    %key,
                    %existing_name,
                    %name,
                    "declared entry overwrites key"
                );
            }
        }
        self.attributes.insert(name.to_string(), key.clone());
        self.entries.insert(key, entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn base_a() -> Registry {
        RegistryBuilder::new("A")
            .declare("A", 1)
            .declare("B", (2, "b"))
            .declare("C", (3, "c", "cmeta"))
            .declare("_Z", (100, "z"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_root_registry_is_empty() {
        let root = RegistryBuilder::new("Enum").build().unwrap();
        assert!(root.is_empty());
        assert_eq!(root.type_name(), "Enum");
    }

    #[test]
    fn test_reserved_attributes_are_skipped_in_body_mode() {
        let registry = base_a();
        assert!(!registry.contains(&Key::from(100)));
        assert_eq!(registry.attribute("_Z"), None);
    }

    #[test]
    fn test_table_mode_keeps_reserved_names_and_ignores_body() {
        let registry = RegistryBuilder::new("Legacy")
            .declare("IGNORED", 50)
            .table([("_HIDDEN", (7, "h")), ("SHOWN", (8, "s"))])
            .build()
            .unwrap();
        assert_eq!(registry.keys(), [&Key::from(7), &Key::from(8)]);
        assert_eq!(registry.lookup(&Key::from(7)).unwrap(), "_HIDDEN");
        assert_eq!(registry.attribute("IGNORED"), None);
    }

    #[test]
    fn test_diamond_inheritance_merges_identical_entries() {
        let a = base_a();
        let left = RegistryBuilder::new("Left").inherit(&a).declare("L", 10).build().unwrap();
        let right = RegistryBuilder::new("Right").inherit(&a).declare("R", 20).build().unwrap();
        let bottom = RegistryBuilder::new("Bottom")
            .inherit_all([&left, &right])
            .build()
            .unwrap();
        assert_eq!(bottom.len(), 5);
        assert_eq!(bottom.lookup(&Key::from(3)).unwrap(), "C");
    }

    #[test]
    fn test_conflicting_parents_fail() {
        let left = RegistryBuilder::new("Left").declare("X", (1, "x")).build().unwrap();
        let right = RegistryBuilder::new("Right").declare("Y", (1, "y")).build().unwrap();
        let error = RegistryBuilder::new("Both")
            .inherit(&left)
            .inherit(&right)
            .build()
            .unwrap_err();
        match error {
            Error::Conflict { registry, key, existing, incoming } => {
                assert_eq!(registry, "Both");
                assert_eq!(key, Key::from(1));
                assert_eq!(existing.assigned_name(), Some("X"));
                assert_eq!(incoming.assigned_name(), Some("Y"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_same_name_different_label_conflicts_across_parents() {
        let left = RegistryBuilder::new("Left").declare("X", (1, "x")).build().unwrap();
        let right = RegistryBuilder::new("Right").declare("X", (1, "ex")).build().unwrap();
        let result = RegistryBuilder::new("Both").inherit_all([&left, &right]).build();
        assert!(matches!(result, Err(Error::Conflict { .. })));
    }

    #[test]
    fn test_declared_key_reuse_reports_prior_name() {
        let error = RegistryBuilder::new("Dup")
            .declare("FIRST", 1)
            .declare("SECOND", (1, "one"))
            .build()
            .unwrap_err();
        assert_eq!(
            error,
            Error::DuplicateKey {
                registry: "Dup".to_string(),
                key: Key::from(1),
                existing_name: "FIRST".to_string(),
                name: "SECOND".to_string(),
            }
        );
    }

    #[test]
    fn test_redeclaring_inherited_name_replaces_entry() {
        let child = RegistryBuilder::new("Child")
            .inherit(&base_a())
            .declare("B", (2, "bee"))
            .build()
            .unwrap();
        assert_eq!(child.verbose_of(&Key::from(2)), &json!("bee"));
        assert_eq!(child.len(), 3);
    }

    #[test]
    fn test_attributes_follow_declaration_over_parents() {
        let child = RegistryBuilder::new("Child")
            .inherit(&base_a())
            .declare("A", 7)
            .build()
            .unwrap();
        assert_eq!(child.attribute("A"), Some(&Key::from(7)));
        assert_eq!(child.attribute("B"), Some(&Key::from(2)));
        assert!(child.contains(&Key::from(1)));
    }

    #[test]
    fn test_first_parent_wins_attribute() {
        let left = RegistryBuilder::new("Left").declare("SHARED", 1).build().unwrap();
        let right = RegistryBuilder::new("Right").declare("SHARED", 2).build().unwrap();
        let both = RegistryBuilder::new("Both").inherit_all([&left, &right]).build().unwrap();
        assert_eq!(both.attribute("SHARED"), Some(&Key::from(1)));
        assert_eq!(both.len(), 2);
    }

    #[test]
    fn test_permissive_mode_overwrites() {
        let registry = RegistryBuilder::new("Loose")
            .uniqueness(Uniqueness::Permissive)
            .declare("FIRST", (1, "first"))
            .declare("SECOND", (1, "second"))
            .build()
            .unwrap();
        assert_eq!(registry.lookup(&Key::from(1)).unwrap(), "SECOND");
        assert_eq!(registry.attribute("FIRST"), Some(&Key::from(1)));
        assert_eq!(registry.attribute("SECOND"), Some(&Key::from(1)));

        let left = RegistryBuilder::new("Left").declare("X", (1, "x")).build().unwrap();
        let right = RegistryBuilder::new("Right").declare("Y", (1, "y")).build().unwrap();
        let merged = RegistryBuilder::new("Merged")
            .uniqueness(Uniqueness::Permissive)
            .inherit_all([&left, &right])
            .build()
            .unwrap();
        assert_eq!(merged.lookup(&Key::from(1)).unwrap(), "Y");
    }

    #[test]
    fn test_parents_are_copied() {
        let base = base_a();
        let child = RegistryBuilder::new("Child").inherit(&base).declare("D", 5).build().unwrap();
        assert_eq!(base.len(), 3);
        assert_eq!(child.len(), 4);
    }
}
