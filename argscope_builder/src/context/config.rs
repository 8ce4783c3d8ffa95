use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::rc::Rc;

use crate::api::is_numeric_literal;
use crate::constant::DEFAULT_PREFIXES;
use crate::model::{CharMode, PositionalPolicy};

/// A conversion function from text into a value of type `T`.
/// The error string is presented to the user as the reason for the failed conversion.
pub type ConvertFn<T> = Rc<dyn Fn(&str) -> Result<T, String>>;

// A heterogeneous table keyed by value type.
#[derive(Clone, Default)]
pub(crate) struct TypeMap {
    values: HashMap<TypeId, Rc<dyn Any>>,
}

impl TypeMap {
    pub(crate) fn insert<K: 'static, V: 'static>(&mut self, value: V) {
        self.values.insert(TypeId::of::<K>(), Rc::new(value));
    }

    pub(crate) fn get<K: 'static, V: 'static>(&self) -> Option<&V> {
        self.values
            .get(&TypeId::of::<K>())
            .and_then(|value| value.downcast_ref::<V>())
    }

    // Entries of `child` win over those of `self`.
    fn overlay(&self, child: &TypeMap) -> TypeMap {
        let mut values = self.values.clone();
        values.extend(
            child
                .values
                .iter()
                .map(|(key, value)| (*key, Rc::clone(value))),
        );
        TypeMap { values }
    }

    fn len(&self) -> usize {
        self.values.len()
    }
}

impl std::fmt::Debug for TypeMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TypeMap[{}]", self.len())
    }
}

/// The configuration declared on a single scope (the root parser, or a group).
///
/// Every setting starts out unset, meaning "use the nearest ancestor's value" (or the built-in default at the root).
/// Per-type settings (bounds & converters) merge by type: declaring bounds for `u8` does not hide the parent's bounds for `i32`.
///
/// ### Example
/// ```
/// # use argscope_builder as argscope;
/// use argscope::{CharMode, PositionalPolicy, ScopeConfig};
///
/// let config = ScopeConfig::default()
///     .char_mode(CharMode::ExpectInteger)
///     .positional_policy(PositionalPolicy::AfterFlags)
///     .prefixes(["-", "--", "+"])
///     .bounds(0u8..=100)
///     .converter(|text: &str| text.parse::<u16>().map_err(|e| e.to_string()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScopeConfig {
    char_mode: Option<CharMode>,
    positional_policy: Option<PositionalPolicy>,
    prefixes: Option<Vec<String>>,
    bounds: TypeMap,
    converters: TypeMap,
}

impl ScopeConfig {
    /// Set how `char` values are interpreted in this scope.
    pub fn char_mode(mut self, char_mode: CharMode) -> Self {
        self.char_mode.replace(char_mode);
        self
    }

    /// Set the positional ordering policy of this scope.
    pub fn positional_policy(mut self, positional_policy: PositionalPolicy) -> Self {
        self.positional_policy.replace(positional_policy);
        self
    }

    /// Set the flag prefixes accepted in this scope.
    pub fn prefixes<S: Into<String>>(mut self, prefixes: impl IntoIterator<Item = S>) -> Self {
        self.prefixes
            .replace(prefixes.into_iter().map(Into::into).collect());
        self
    }

    /// Bound every numeric (or `char`) value of type `T` in this scope to the inclusive `range`.
    pub fn bounds<T: 'static>(mut self, range: RangeInclusive<T>) -> Self {
        self.bounds.insert::<T, RangeInclusive<T>>(range);
        self
    }

    /// Register the conversion function for every value of type `T` in this scope.
    /// An option level converter still takes precedence.
    pub fn converter<T: 'static>(
        mut self,
        converter: impl Fn(&str) -> Result<T, String> + 'static,
    ) -> Self {
        let converter: ConvertFn<T> = Rc::new(converter);
        self.converters.insert::<T, ConvertFn<T>>(converter);
        self
    }

    /// Resolve this declaration against the parent's resolved configuration.
    pub(crate) fn resolve(&self, parent: &ResolvedConfig) -> ResolvedConfig {
        ResolvedConfig {
            char_mode: self.char_mode.unwrap_or(parent.char_mode),
            positional_policy: self.positional_policy.unwrap_or(parent.positional_policy),
            prefixes: self
                .prefixes
                .clone()
                .unwrap_or_else(|| parent.prefixes.clone()),
            bounds: parent.bounds.overlay(&self.bounds),
            converters: parent.converters.overlay(&self.converters),
        }
    }
}

/// The effective configuration of a scope, after inheritance.
/// Every setting holds a concrete value.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    char_mode: CharMode,
    positional_policy: PositionalPolicy,
    prefixes: Vec<String>,
    bounds: TypeMap,
    converters: TypeMap,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            char_mode: CharMode::ExpectAscii,
            positional_policy: PositionalPolicy::Interleaved,
            prefixes: DEFAULT_PREFIXES.iter().map(|p| p.to_string()).collect(),
            bounds: TypeMap::default(),
            converters: TypeMap::default(),
        }
    }
}

impl ResolvedConfig {
    /// How `char` values are interpreted.
    pub fn char_mode(&self) -> CharMode {
        self.char_mode
    }

    /// The positional ordering policy.
    pub fn positional_policy(&self) -> PositionalPolicy {
        self.positional_policy
    }

    /// The accepted flag prefixes.
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// The configured inclusive bounds for values of type `T`, if any.
    pub fn bounds<T: 'static>(&self) -> Option<&RangeInclusive<T>> {
        self.bounds.get::<T, RangeInclusive<T>>()
    }

    pub(crate) fn converter<T: 'static>(&self) -> Option<&ConvertFn<T>> {
        self.converters.get::<T, ConvertFn<T>>()
    }

    /// The longest prefix `name` starts with.
    pub(crate) fn prefix_of(&self, name: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .filter(|prefix| !prefix.is_empty() && name.starts_with(prefix.as_str()))
            .max_by_key(|prefix| prefix.len())
            .map(String::as_str)
    }

    /// Whether `text` reads as a flag of this scope (as opposed to a value, such as `-5`).
    pub(crate) fn looks_like_flag(&self, text: &str) -> bool {
        self.prefix_of(text).is_some() && !is_numeric_literal(text)
    }
}
