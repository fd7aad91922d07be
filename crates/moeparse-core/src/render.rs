//! Rendering token sequences to output markup.
//!
//! Rendering is a depth-first walk: children are rendered first and their
//! concatenated output is handed to the tag's renderer as its content.
//! The renderer holds no state between calls, so rendering the same tokens
//! twice yields the same string.

use std::borrow::Cow;

use tracing::debug;

use crate::error::RenderError;
use crate::html::escape_html;
use crate::registry::Registry;
use crate::token::{TagToken, Token};

/// What to do when a tag's output function fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Stop and return the error.
    #[default]
    Propagate,
    /// Emit the tag's source text instead, as if it had never matched.
    Literal,
    /// Emit nothing for the tag.
    Skip,
}

/// Options controlling the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOptions {
    /// HTML-escape plain text and verbatim bodies. Off by default: text is
    /// emitted exactly as it appeared in the input.
    pub escape_text: bool,
    /// Handling of failing output functions.
    pub on_error: ErrorPolicy,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_escape_text(mut self, escape: bool) -> Self {
        self.escape_text = escape;
        self
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.on_error = policy;
        self
    }
}

/// Renders tokens to a string.
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    options: RenderOptions,
}

impl Renderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> RenderOptions {
        self.options
    }

    /// Render a token sequence, concatenating the output of each token.
    pub fn render(&self, tokens: &[Token<'_>]) -> Result<String, RenderError> {
        let mut out = String::new();
        for token in tokens {
            self.render_into(token, &mut out)?;
        }
        Ok(out)
    }

    /// Render a single token, applying the error policy if it fails.
    pub fn render_token(&self, token: &Token<'_>) -> Result<String, RenderError> {
        let mut out = String::new();
        self.render_into(token, &mut out)?;
        Ok(out)
    }

    /// Render a tag token. Failures are returned as-is, whatever the
    /// error policy; the policy applies to the tag's descendants.
    pub fn render_tag(&self, tag: &TagToken<'_>) -> Result<String, RenderError> {
        let content = match (tag.children(), tag.body()) {
            (Some(children), _) => Some(self.render(children)?),
            (None, Some(body)) => Some(self.text(body).into_owned()),
            (None, None) => None,
        };
        tag.renderer()
            .render(tag, content.as_deref())
            .map_err(|e| e.with_class(tag.class()))
    }

    fn render_into(&self, token: &Token<'_>, out: &mut String) -> Result<(), RenderError> {
        match token {
            Token::Text(text) => out.push_str(&self.text(&text.content)),
            Token::Tag(tag) => match self.render_tag(tag) {
                Ok(rendered) => out.push_str(&rendered),
                Err(err) => match self.options.on_error {
                    ErrorPolicy::Propagate => return Err(err),
                    ErrorPolicy::Literal => {
                        debug!(error = %err, "rendering tag source as text");
                        out.push_str(&self.text(tag.source()));
                    }
                    ErrorPolicy::Skip => {
                        debug!(error = %err, "skipping tag that failed to render");
                    }
                },
            },
        }
        Ok(())
    }

    fn text<'t>(&self, text: &'t str) -> Cow<'t, str> {
        if self.options.escape_text {
            escape_html(text)
        } else {
            Cow::Borrowed(text)
        }
    }
}

/// Tokenize `input` with `registry` and render it with default options.
///
/// ```rust
/// let registry = moeparse_core::bbcode::registry().unwrap();
/// let html = moeparse_core::render(&registry, "[i]hello[/i] [b]world").unwrap();
/// assert_eq!(html, "<i>hello</i> [b]world");
/// ```
pub fn render(registry: &Registry, input: &str) -> Result<String, RenderError> {
    Renderer::default().render(&registry.tokenize(input))
}
