//! # moeparse core
//!
//! Turns chat text with lightweight markup (`[b]bold[/b]`, `@alice`,
//! `*bold*`) into HTML, leaving everything it does not recognize exactly
//! as written.
//!
//! Markup is described by token classes: a regular expression plus a
//! nesting classification, behavior options and a renderer. Classes are
//! registered into a [`Registry`], compiled into a single combined
//! matcher, and used to tokenize input into a tree of [`Token`]s, which
//! are then rendered.
//!
//! ## Quick Start
//!
//! ```rust
//! use moeparse_core::bbcode;
//!
//! let registry = bbcode::registry().unwrap();
//! let tokens = registry.tokenize("[b]bold [i]and italic[/i][/b], *chat style*");
//!
//! let html = moeparse_core::Renderer::default().render(&tokens).unwrap();
//! assert_eq!(html, "<b>bold <i>and italic</i></b>, <b>chat style</b>");
//! ```
//!
//! ## Graceful Degradation
//!
//! Malformed markup never fails. Unclosed or stray tags stay in the output
//! as plain text:
//!
//! ```rust
//! let registry = moeparse_core::bbcode::registry().unwrap();
//! let html = moeparse_core::render(&registry, "[b]unclosed [/i]").unwrap();
//! assert_eq!(html, "[b]unclosed [/i]");
//! ```
//!
//! ## Sharing
//!
//! [`Registry::tokenizer`] returns a frozen, thread-safe [`Tokenizer`]:
//! register and compile during setup, then tokenize from any thread.

pub mod args;
pub mod bbcode;
pub mod class;
pub mod error;
pub mod html;
mod matcher;
pub mod options;
pub mod registry;
pub mod render;
pub mod span;
pub mod token;
pub mod tokenizer;

pub use args::TokenArgs;
pub use class::{TagRenderer, TokenClass};
pub use error::{CompileError, RenderError};
pub use options::{Classification, TokenOption, TokenOptions};
pub use registry::Registry;
pub use render::{render, ErrorPolicy, RenderOptions, Renderer};
pub use token::{TagKind, TagToken, TextToken, Token};
pub use tokenizer::Tokenizer;
