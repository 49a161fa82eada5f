use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde_json::Value;

use crate::{Error, Key, Lookup, Registry, Result};

/// An enumeration type: a Rust type whose constants live in a frozen
/// [`Registry`].
///
/// Every query of the registry is available as an associated function, so
/// enumerations are queried at the type level:
///
/// ```
/// use serde_json::json;
/// use symbolic_enum::{enumeration, Enumeration, Key};
///
/// enumeration! {
///     /// Traffic light colors.
///     pub struct Light {
///         RED = (1, "stop"),
///         AMBER = (2, "slow"),
///         GREEN = (3, "go"),
///     }
/// }
///
/// assert_eq!(Light::green_key(), Some(&Key::from(3)));
/// assert_eq!(Light::lookup(&Key::from(1)).unwrap(), "RED");
/// assert_eq!(Light::reverbose(&json!("slow")).unwrap(), &Key::from(2));
/// assert_eq!(Light::next_available_key().unwrap(), Key::from(4));
/// ```
///
/// Types are normally declared with [`enumeration!`](crate::enumeration) or
/// [`non_unique_enumeration!`](crate::non_unique_enumeration); implementing
/// the trait by hand only requires [`try_registry`](Self::try_registry).
pub trait Enumeration {
    /// Returns the registry, building it on first access.
    fn try_registry() -> Result<&'static Registry>;

    /// Returns the registry, building it on first access.
    ///
    /// # Panics
    ///
    /// Panics when the declaration is invalid, for instance when two
    /// attributes claim the same key. Use
    /// [`try_registry`](Self::try_registry) to observe the error instead.
    fn registry() -> &'static Registry {
        match Self::try_registry() {
            Ok(registry) => registry,
            Err(error) => panic!("invalid enumeration declaration: {error}"),
        }
    }

    fn attribute(name: &str) -> Option<&'static Key> { Self::registry().attribute(name) }

    fn contains(key: &Key) -> bool { Self::registry().contains(key) }

    fn iter() -> impl Iterator<Item = &'static Key> { Self::registry().iter() }

    fn keys() -> Vec<&'static Key> { Self::registry().keys() }

    fn values() -> Vec<&'static str> { Self::registry().values() }

    fn items() -> Vec<(&'static Key, &'static str)> { Self::registry().items() }

    fn verbose() -> Vec<(&'static Key, &'static Value)> { Self::registry().verbose() }

    fn verbose_of(key: &Key) -> &'static Value { Self::registry().verbose_of(key) }

    fn get(key: &Key) -> Option<&'static Value> { Self::registry().get(key) }

    fn get_or<'a>(key: &Key, default: &'a Value) -> &'a Value {
        Self::registry().get_or(key, default)
    }

    fn label(key: &Key) -> Result<&'static Value> { Self::registry().label(key) }

    fn lookup(key: &Key) -> Result<&'static str> { Self::registry().lookup(key) }

    fn lookup_or_key(key: &Key) -> Lookup<'_> { Self::registry().lookup_or_key(key) }

    fn reverbose(label: &Value) -> Result<&'static Key> { Self::registry().reverbose(label) }

    fn reverbose_or<'a>(label: &Value, default: &'a Key) -> &'a Key {
        Self::registry().reverbose_or(label, default)
    }

    fn metadata() -> BTreeMap<&'static Key, Option<&'static Value>> { Self::registry().metadata() }

    fn metadata_of(key: &Key) -> Result<Option<&'static Value>> {
        Self::registry().metadata_of(key)
    }

    fn metadata_or<'a>(key: &Key, default: &'a Value) -> Option<&'a Value> {
        Self::registry().metadata_or(key, default)
    }

    fn max_length() -> Option<usize> { Self::registry().max_length() }

    fn to_int(value: &Value) -> Option<i64> { crate::to_int(value) }

    fn from_int(key: Key) -> Key { crate::from_int(key) }

    fn random() -> Result<&'static Key> { Self::registry().random() }

    fn next_available_key() -> Result<Key> { Self::registry().next_available_key() }

    fn verbose_json() -> Value { Self::registry().verbose_json() }
}

thread_local! {
    /// Enumerations whose registries are being built on this thread,
    /// outermost first.
    static BUILDING: RefCell<Vec<&'static str>> = const { RefCell::new(Vec::new()) };
}

/// Pops the in-progress marker when a build finishes or unwinds.
struct BuildGuard;

impl Drop for BuildGuard {
    fn drop(&mut self) {
        BUILDING.with(|building| {
            building.borrow_mut().pop();
        });
    }
}

/// Lazily built storage for the registry of a declared enumeration.
///
/// The build runs at most once, even under concurrent first access, and its
/// outcome (registry or error) is kept for every later caller. An
/// enumeration that reaches itself through its bases fails with
/// [`Error::InheritanceCycle`].
#[doc(hidden)]
#[derive(Debug)]
pub struct LazyRegistry {
    data: OnceLock<Result<Registry>>,
}

impl LazyRegistry {
    pub const fn new() -> Self { Self { data: OnceLock::new() } }

    pub fn get_or_build(
        &'static self,
        type_name: &'static str,
        build: impl FnOnce() -> Result<Registry>,
    ) -> Result<&'static Registry> {
        if let Some(data) = self.data.get() {
            return data.as_ref().map_err(Clone::clone);
        }
        let reentered = BUILDING.with(|building| {
            let mut building = building.borrow_mut();
            if building.contains(&type_name) {
                return true;
            }
            building.push(type_name);
            false
        });
        if reentered {
            return Err(Error::InheritanceCycle { registry: type_name.to_string() });
        }
        let _guard = BuildGuard;
        self.data.get_or_init(build).as_ref().map_err(Clone::clone)
    }
}

impl Default for LazyRegistry {
    fn default() -> Self { Self::new() }
}

/// Declares an enumeration type.
///
/// Each `NAME = spec` line declares one attribute. A spec may be a bare key
/// (`A = 1`), the `(key, label)` or `(key, label, metadata)` shorthand, or a
/// full [`Entry`](crate::Entry). Names starting with `_` are not registered.
/// Base enumerations follow the type name; the legacy form
/// `enums = { NAME = spec, ... }` declares an explicit table in which no
/// names are excluded.
///
/// For each declared attribute the macro adds an associated function named
/// after it in lower case with a `_key` suffix, returning the key bound to
/// that attribute.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use symbolic_enum::{enumeration, Enumeration, Key};
///
/// enumeration! {
///     pub struct Letters {
///         A = 1,
///         B = (2, "b"),
///         C = (3, "c", "cmeta"),
///         _Z = (100, "z"),
///     }
/// }
///
/// enumeration! {
///     pub struct MoreLetters: Letters {
///         D = 5,
///     }
/// }
///
/// enumeration! {
///     pub struct LegacyLetters: Letters {
///         enums = { F = (0, "f") }
///     }
/// }
///
/// assert_eq!(Letters::keys(), [&Key::from(1), &Key::from(2), &Key::from(3)]);
/// assert_eq!(Letters::_z_key(), None);
/// assert_eq!(MoreLetters::d_key(), Some(&Key::from(5)));
/// assert_eq!(MoreLetters::attribute("A"), Some(&Key::from(1)));
/// assert_eq!(LegacyLetters::verbose()[0], (&Key::from(0), &json!("f")));
/// ```
#[macro_export]
macro_rules! enumeration {
    (
        $(#[$attr:meta])*
        $vis:vis struct $ty:ident $(: $($base:path),+)? {
            enums = { $($name:ident = $spec:expr),* $(,)? } $(,)?
        }
    ) => {
        $crate::enumeration!(@define [$(#[$attr])*] $vis $ty [$($($base),+)?]
            Strict table [$($name = $spec),*]);
    };
    (
        $(#[$attr:meta])*
        $vis:vis struct $ty:ident $(: $($base:path),+)? {
            $($name:ident = $spec:expr),* $(,)?
        }
    ) => {
        $crate::enumeration!(@define [$(#[$attr])*] $vis $ty [$($($base),+)?]
            Strict body [$($name = $spec),*]);
    };
    (
        @define [$($attr:tt)*] $vis:vis $ty:ident [$($base:path),*]
        $uniqueness:ident $mode:ident [$($name:ident = $spec:expr),*]
    ) => {
        $($attr)*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
        $vis struct $ty;

        impl $crate::Enumeration for $ty {
            fn try_registry() -> $crate::Result<&'static $crate::Registry> {
                static REGISTRY: $crate::LazyRegistry = $crate::LazyRegistry::new();
                const TYPE_NAME: &str = concat!(module_path!(), "::", stringify!($ty));
                REGISTRY.get_or_build(TYPE_NAME, || {
                    let builder = $crate::RegistryBuilder::new(TYPE_NAME)
                        .uniqueness($crate::Uniqueness::$uniqueness);
                    $(
                        let builder = builder.inherit(
                            <$base as $crate::Enumeration>::try_registry()?,
                        );
                    )*
                    $crate::enumeration!(@declare builder $mode [$($name = $spec),*]).build()
                })
            }
        }

        $crate::paste::paste! {
            impl $ty {
                $(
                    #[allow(dead_code)]
                    $vis fn [<$name:lower _key>]() -> Option<&'static $crate::Key> {
                        <Self as $crate::Enumeration>::attribute(stringify!($name))
                    }
                )*
            }
        }
    };
    (@declare $builder:ident body [$($name:ident = $spec:expr),*]) => {
        $builder $(.declare(stringify!($name), $spec))*
    };
    (@declare $builder:ident table [$($name:ident = $spec:expr),*]) => {
        {
            let declarations: ::std::vec::Vec<(&str, $crate::Declaration)> = ::std::vec![
                $((stringify!($name), $crate::Declaration::from($spec))),*
            ];
            $builder.table(declarations)
        }
    };
}

/// Declares an enumeration that lets several names share a key, the last
/// declaration winning.
///
/// Accepts the same forms as [`enumeration!`](crate::enumeration).
///
/// ```
/// use serde_json::json;
/// use symbolic_enum::{non_unique_enumeration, Enumeration, Key};
///
/// non_unique_enumeration! {
///     pub struct Aliases {
///         COLOR = (1, "color"),
///         COLOUR = (1, "colour"),
///     }
/// }
///
/// assert_eq!(Aliases::lookup(&Key::from(1)).unwrap(), "COLOUR");
/// assert_eq!(Aliases::color_key(), Some(&Key::from(1)));
/// ```
#[macro_export]
macro_rules! non_unique_enumeration {
    (
        $(#[$attr:meta])*
        $vis:vis struct $ty:ident $(: $($base:path),+)? {
            enums = { $($name:ident = $spec:expr),* $(,)? } $(,)?
        }
    ) => {
        $crate::enumeration!(@define [$(#[$attr])*] $vis $ty [$($($base),+)?]
            Permissive table [$($name = $spec),*]);
    };
    (
        $(#[$attr:meta])*
        $vis:vis struct $ty:ident $(: $($base:path),+)? {
            $($name:ident = $spec:expr),* $(,)?
        }
    ) => {
        $crate::enumeration!(@define [$(#[$attr])*] $vis $ty [$($($base),+)?]
            Permissive body [$($name = $spec),*]);
    };
}
