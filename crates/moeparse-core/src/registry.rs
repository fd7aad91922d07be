//! The token class registry.
//!
//! Classes are registered during a setup phase, then compiled once into a
//! combined matcher. Registration alone never recompiles, so a batch of
//! registrations pays for compilation once:
//!
//! ```rust
//! use moeparse_core::{Registry, TokenClass};
//! use moeparse_core::html::HtmlTag;
//!
//! let mut registry = Registry::new();
//! registry.register("b", TokenClass::open(r"\[b\]").with_renderer(HtmlTag::new("b")));
//! registry.register("/b", TokenClass::close(r"\[/b\]").pairs_with("b"));
//! registry.compile().unwrap();
//!
//! let tokens = registry.tokenize("[b]hi[/b]");
//! assert_eq!(tokens[0].output().unwrap(), "<b>hi</b>");
//! ```
//!
//! Tokenizing uses the matcher from the last successful [`Registry::compile`].
//! Classes registered or removed since then are not seen until the next
//! compilation.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::class::TokenClass;
use crate::error::CompileError;
use crate::matcher::Matcher;
use crate::token::Token;
use crate::tokenizer::{Tokenizer, DEFAULT_MAX_DEPTH};

/// Named token classes and their compiled matcher.
pub struct Registry {
    classes: Vec<(String, TokenClass)>,
    matcher: Arc<Matcher>,
    stale: bool,
    max_depth: usize,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create an empty registry. It is compiled and recognizes nothing.
    pub fn new() -> Self {
        Self {
            classes: Vec::new(),
            matcher: Arc::new(Matcher::empty()),
            stale: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Limit how deeply nested bodies are tokenized again. Bodies past the
    /// limit are kept as plain text.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Insert a class, or replace the class registered under `name`.
    ///
    /// A replaced class keeps its position in the match precedence order.
    pub fn register(&mut self, name: impl Into<String>, class: TokenClass) {
        let name = name.into();
        match self.classes.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = class,
            None => self.classes.push((name, class)),
        }
        self.stale = true;
    }

    /// Remove the class registered under `name`.
    pub fn unregister(&mut self, name: &str) -> Option<TokenClass> {
        let index = self.classes.iter().position(|(existing, _)| existing == name)?;
        self.stale = true;
        Some(self.classes.remove(index).1)
    }

    /// Compile every registered class into a new combined matcher.
    ///
    /// On error the previous matcher stays in use.
    pub fn compile(&mut self) -> Result<(), CompileError> {
        let matcher =
            Matcher::compile(self.classes.iter().map(|(name, class)| (name.as_str(), class)))?;
        self.matcher = Arc::new(matcher);
        self.stale = false;
        debug!(classes = self.classes.len(), "registry compiled");
        Ok(())
    }

    /// Whether classes changed since the last successful compilation.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&TokenClass> {
        self.classes
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, class)| class)
    }

    /// Registered names, in precedence order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(|(name, _)| name.as_str())
    }

    /// A tokenizer over the last compiled matcher.
    pub fn tokenizer(&self) -> Tokenizer {
        if self.stale {
            warn!("tokenizing with a stale registry; call compile() after registering classes");
        }
        Tokenizer::new(Arc::clone(&self.matcher), self.max_depth)
    }

    /// Tokenize `input` with the last compiled matcher. Never fails.
    pub fn tokenize<'a>(&self, input: &'a str) -> Vec<Token<'a>> {
        self.tokenizer().tokenize(input)
    }
}
