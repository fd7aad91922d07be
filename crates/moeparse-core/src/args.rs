//! Argument binding for matched tokens.
//!
//! Each capture group of a token class pattern becomes one positional
//! argument. Named groups (`(?P<name>...)`) and explicit aliases make the
//! same value reachable by name. Lookups never fail: unknown names and
//! out-of-range positions resolve to the empty string.

use std::collections::HashMap;

/// The captured arguments of one matched token.
///
/// Position 0 is the first capture group of the class pattern; the whole
/// match is not an argument. Groups that did not take part in the match
/// bind the empty string.
///
/// `TokenArgs` is immutable once built. The `with_*` methods consume the
/// value and return a modified copy, which is how argument modifiers
/// rewrite bindings before a token is built.
///
/// # Example
///
/// ```rust
/// use std::collections::HashMap;
/// use moeparse_core::TokenArgs;
///
/// let names = HashMap::from([("username".to_string(), 0)]);
/// let args = TokenArgs::new(vec!["alice".to_string()], names);
///
/// assert_eq!(args.by_name("username"), "alice");
/// assert_eq!(args.by_position(0), "alice");
/// assert_eq!(args.by_name("nonexistent"), "");
/// assert_eq!(args.by_position(7), "");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenArgs {
    values: Vec<String>,
    by_name: HashMap<String, usize>,
}

impl TokenArgs {
    /// Bind `values` with the given name mapping.
    ///
    /// Names pointing past the end of `values` are dropped.
    pub fn new(values: Vec<String>, mut by_name: HashMap<String, usize>) -> Self {
        let len = values.len();
        by_name.retain(|_, position| *position < len);
        Self { values, by_name }
    }

    /// Bind `values` without any names.
    pub fn from_positional(values: Vec<String>) -> Self {
        Self {
            values,
            by_name: HashMap::new(),
        }
    }

    /// Get the argument at `position`, or `""` if out of range.
    #[inline]
    pub fn by_position(&self, position: usize) -> &str {
        self.values.get(position).map_or("", String::as_str)
    }

    /// Get the argument bound to `name`, or `""` if the name is unknown.
    #[inline]
    pub fn by_name(&self, name: &str) -> &str {
        self.position_of(name).map_or("", |p| self.by_position(p))
    }

    /// Position bound to `name`, if any.
    #[inline]
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Number of bound arguments.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if no arguments were captured.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over the arguments in positional order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    /// Iterate over `(name, position)` pairs, sorted by position then name.
    pub fn names(&self) -> impl Iterator<Item = (&str, usize)> {
        let mut names: Vec<_> = self
            .by_name
            .iter()
            .map(|(name, position)| (name.as_str(), *position))
            .collect();
        names.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(b.0)));
        names.into_iter()
    }

    /// Append a positional argument.
    pub fn with_arg(mut self, value: impl Into<String>) -> Self {
        self.values.push(value.into());
        self
    }

    /// Append an argument and bind `name` to it.
    ///
    /// An existing binding for `name` is moved to the new argument.
    pub fn with_named_arg(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.push(value.into());
        self.by_name.insert(name.into(), self.values.len() - 1);
        self
    }

    /// Replace the argument at `position`.
    ///
    /// If `position` is past the end, the gap is filled with empty
    /// arguments first.
    pub fn with_replaced(mut self, position: usize, value: impl Into<String>) -> Self {
        if position >= self.values.len() {
            self.values.resize(position + 1, String::new());
        }
        self.values[position] = value.into();
        self
    }

    /// Bind `name` to an existing position. Ignored if out of range.
    pub fn with_alias(mut self, name: impl Into<String>, position: usize) -> Self {
        if position < self.values.len() {
            self.by_name.insert(name.into(), position);
        }
        self
    }
}
