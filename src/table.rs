//! Enumerations declared as data rather than with the
//! [`enumeration!`](crate::enumeration) macro.
//!
//! A [`TableDefinition`] deserializes from JSON of the form:
//!
//! ```json
//! {
//!   "name": "Color",
//!   "bases": ["Base"],
//!   "non_unique": false,
//!   "mode": "body",
//!   "entries": {
//!     "RED": 1,
//!     "GREEN": [2, "green"],
//!     "BLUE": [3, "blue", {"hex": "#00f"}],
//!     "GRAY": {"key": 4, "label": "gray", "sort": 0}
//!   }
//! }
//! ```
//!
//! Only `name` and `entries` are required. `mode` is `"body"` (names
//! starting with `_` are skipped) or `"table"` (nothing is skipped).

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    Declaration, DeclarationMode, Error, Registry, RegistryBuilder, Result, Uniqueness,
};

/// One enumeration declared as data.
#[derive(Clone, Debug, Deserialize)]
pub struct TableDefinition {
    /// The enumeration's type name, also used to refer to it as a base.
    pub name: String,
    /// Names of the enumerations this one inherits from, in order.
    #[serde(default)]
    pub bases: Vec<String>,
    /// Whether several names may share a key.
    #[serde(default)]
    pub non_unique: bool,
    #[serde(default)]
    pub mode: TableMode,
    /// Attribute name to declaration, in declaration order.
    pub entries: Map<String, Value>,
}

/// Declaration mode as spelled in JSON.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableMode {
    #[default]
    Body,
    Table,
}

impl From<TableMode> for DeclarationMode {
    fn from(mode: TableMode) -> Self {
        match mode {
            TableMode::Body => DeclarationMode::Body,
            TableMode::Table => DeclarationMode::Table,
        }
    }
}

impl TableDefinition {
    /// Turns the JSON entries into declarations, in declaration order.
    pub fn declarations(&self) -> Result<Vec<(String, Declaration)>> {
        self.entries
            .iter()
            .map(|(name, spec)| Ok((name.clone(), Declaration::from_json(name, spec)?)))
            .collect()
    }

    /// Builds the registry of this definition on top of already-built
    /// parent registries.
    pub fn build<'a>(
        &self,
        parents: impl IntoIterator<Item = &'a Registry>,
    ) -> Result<Registry> {
        let uniqueness =
            if self.non_unique { Uniqueness::Permissive } else { Uniqueness::Strict };
        let builder = RegistryBuilder::new(self.name.as_str())
            .uniqueness(uniqueness)
            .inherit_all(parents);
        let declarations = self.declarations()?;
        let builder = match DeclarationMode::from(self.mode) {
            DeclarationMode::Body => declarations
                .into_iter()
                .fold(builder, |builder, (name, declaration)| builder.declare(name, declaration)),
            DeclarationMode::Table => builder.table(declarations),
        };
        builder.build()
    }
}

/// Builds registries for a set of definitions, resolving bases by name.
///
/// Bases must be among the given definitions. Each registry is built after
/// its bases; a base that leads back to the definition itself is an
/// [`Error::InheritanceCycle`]. When two definitions share a name, the later
/// one is used.
///
/// ```
/// use serde_json::json;
/// use symbolic_enum::{Key, TableDefinition, build_registries};
///
/// let child: TableDefinition = serde_json::from_value(json!({
///     "name": "Child", "bases": ["Base"], "entries": {"D": 5}
/// })).unwrap();
/// let base: TableDefinition = serde_json::from_value(json!({
///     "name": "Base", "entries": {"A": 1, "B": [2, "b"]}
/// })).unwrap();
///
/// let registries = build_registries([&child, &base]).unwrap();
/// assert_eq!(registries["Child"].attribute("B"), Some(&Key::from(2)));
/// ```
pub fn build_registries<'a>(
    definitions: impl IntoIterator<Item = &'a TableDefinition>,
) -> Result<BTreeMap<String, Registry>> {
    let definitions: BTreeMap<&str, &TableDefinition> = definitions
        .into_iter()
        .map(|definition| (definition.name.as_str(), definition))
        .collect();
    let mut built = BTreeMap::new();
    for name in definitions.keys() {
        resolve(name, &definitions, &mut built, &mut Vec::new())?;
    }
    debug!(registries = built.len(), "built table registries");
    Ok(built)
}

fn resolve(
    name: &str,
    definitions: &BTreeMap<&str, &TableDefinition>,
    built: &mut BTreeMap<String, Registry>,
    in_progress: &mut Vec<String>,
) -> Result<()> {
    if built.contains_key(name) {
        return Ok(());
    }
    if in_progress.iter().any(|pending| pending == name) {
        return Err(Error::InheritanceCycle { registry: name.to_string() });
    }
    let Some(definition) = definitions.get(name) else {
        return Err(Error::UnknownBase {
            registry: in_progress.last().cloned().unwrap_or_default(),
            base: name.to_string(),
        });
    };

    in_progress.push(name.to_string());
    for base in &definition.bases {
        resolve(base, definitions, built, in_progress)?;
    }
    in_progress.pop();

    let parents: Vec<&Registry> = definition
        .bases
        .iter()
        .filter_map(|base| built.get(base.as_str()))
        .collect();
    let registry = definition.build(parents)?;
    built.insert(name.to_string(), registry);
    Ok(())
}
