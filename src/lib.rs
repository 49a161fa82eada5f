//! Symbolic Enumerations: named constants with labels, metadata and
//! inheritance.
//!
//! This crate lets a program declare an enumeration type whose members are
//! named constants, then query it for reverse lookups (key → name), verbose
//! display labels, per-entry metadata, and constant sets merged from base
//! enumerations.
//!
//! # Basic Usage
//!
//! ```rust
//! use serde_json::json;
//! use symbolic_enum::{enumeration, Enumeration, Key};
//!
//! enumeration! {
//!     pub struct Letters {
//!         A = 1,
//!         B = (2, "b"),
//!         C = (3, "c", "cmeta"),
//!         _Z = (100, "z"),
//!     }
//! }
//!
//! // Reserved `_` names are not registered.
//! assert_eq!(Letters::keys(), [&Key::from(1), &Key::from(2), &Key::from(3)]);
//!
//! // Names, labels and metadata
//! assert_eq!(Letters::lookup(&Key::from(3)).unwrap(), "C");
//! assert_eq!(Letters::verbose_of(&Key::from(3)), &json!("c"));
//! assert_eq!(Letters::metadata_of(&Key::from(3)).unwrap(), Some(&json!("cmeta")));
//! assert_eq!(Letters::get_or(&Key::from(100), &json!("Z")), &json!("Z"));
//! ```
//!
//! # Building Registries Directly
//!
//! [`RegistryBuilder`] is the explicit form of the macro: an ordered list of
//! parent registries and named declarations in, a frozen [`Registry`] out.
//!
//! ```rust
//! use symbolic_enum::{Key, RegistryBuilder};
//!
//! let base = RegistryBuilder::new("Base").declare("A", 1).build().unwrap();
//! let other = RegistryBuilder::new("Other").declare("E", 0).build().unwrap();
//! let mixed = RegistryBuilder::new("Mixed")
//!     .inherit(&base)
//!     .inherit(&other)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(mixed.keys(), [&Key::from(0), &Key::from(1)]);
//! ```
//!
//! # Declaring Enumerations as Data
//!
//! Enumerations can also be described in JSON and deserialized into
//! [`TableDefinition`]s; [`build_registries`] resolves their bases by name.

mod key;
pub use key::{Key, from_int, to_int};

mod entry;
pub use entry::Entry;

mod declaration;
pub use declaration::{Declaration, RESERVED_PREFIX, is_reserved};

mod error;
pub use error::{Error, Result};

mod registry;
pub use registry::{Lookup, Registry};

mod registry_builder;
pub use registry_builder::{DeclarationMode, RegistryBuilder, Uniqueness};

mod enumeration;
pub use enumeration::{Enumeration, LazyRegistry};

pub mod cbor;

mod table;
pub use table::{TableDefinition, TableMode, build_registries};

/// Re-exported for the value types of labels and metadata.
pub use serde_json::Value;

#[doc(hidden)]
pub use paste;
