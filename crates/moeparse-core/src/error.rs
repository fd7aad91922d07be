//! Error types for compiling token classes and rendering tokens.
//!
//! Malformed markup in the input is never an error: the tokenizer degrades
//! it to plain text. Errors only come from a broken registry (caught by
//! [`Registry::compile`](crate::Registry::compile)) or from a custom output
//! function that refuses to render a token.

use std::fmt;

use thiserror::Error;

/// An error raised while compiling the registered token classes.
///
/// Compilation is all-or-nothing: when it fails the registry keeps the
/// matcher from its last successful compilation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A class pattern is not a valid regular expression.
    #[error("invalid pattern for token class `{class}`: {message}")]
    Pattern { class: String, message: String },
    /// A class definition contradicts itself or another class.
    #[error("conflicting definition for token class `{class}`: {message}")]
    Conflict { class: String, message: String },
}

impl CompileError {
    /// Create an error for a pattern the regex engine or parser rejected.
    pub fn pattern(class: &str, source: &impl fmt::Display) -> Self {
        Self::Pattern {
            class: class.to_string(),
            message: source.to_string(),
        }
    }

    /// Create an error for an unresolvable definition conflict.
    pub fn conflict(class: &str, message: impl Into<String>) -> Self {
        Self::Conflict {
            class: class.to_string(),
            message: message.into(),
        }
    }

    /// Name of the token class the error was raised for.
    pub fn class(&self) -> &str {
        match self {
            Self::Pattern { class, .. } | Self::Conflict { class, .. } => class,
        }
    }
}

/// An error reported by a custom output function.
///
/// Recoverable per token: see [`ErrorPolicy`](crate::render::ErrorPolicy).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot render `{class}`: {message}")]
pub struct RenderError {
    /// Token class whose output failed. Filled in by the renderer when
    /// the output function leaves it empty.
    pub class: String,
    /// Human-readable reason.
    pub message: String,
}

impl RenderError {
    /// Create a render error. The class is attached by the renderer.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            class: String::new(),
            message: message.into(),
        }
    }

    /// Attach the failing class name unless one is already set.
    pub fn with_class(mut self, class: &str) -> Self {
        if self.class.is_empty() {
            self.class = class.to_string();
        }
        self
    }
}
