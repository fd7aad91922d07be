//! Tokens produced by the tokenizer.
//!
//! A token is either plain text copied from the input or an instance of a
//! registered tag class. Text borrows from the input whenever possible;
//! arguments are owned because argument modifiers may rewrite them.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::args::TokenArgs;
use crate::class::TagRenderer;
use crate::error::RenderError;
use crate::matcher::CompiledClass;
use crate::options::TokenOptions;
use crate::render::Renderer;
use crate::span::Span;

/// One unit of tokenized input.
#[derive(Debug, Clone)]
pub enum Token<'a> {
    /// Input that no class matched, or markup that could not be paired.
    Text(TextToken<'a>),
    /// A matched tag.
    Tag(TagToken<'a>),
}

impl<'a> Token<'a> {
    /// Source span of the whole token.
    pub fn span(&self) -> Span {
        match self {
            Token::Text(t) => t.span,
            Token::Tag(t) => t.span,
        }
    }

    /// The input text this token was produced from.
    pub fn source(&self) -> &str {
        match self {
            Token::Text(t) => &t.content,
            Token::Tag(t) => &t.source,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Token::Text(_))
    }

    pub fn as_text(&self) -> Option<&TextToken<'a>> {
        match self {
            Token::Text(t) => Some(t),
            Token::Tag(_) => None,
        }
    }

    pub fn as_tag(&self) -> Option<&TagToken<'a>> {
        match self {
            Token::Tag(t) => Some(t),
            Token::Text(_) => None,
        }
    }

    /// Render this token, and its children, with default render options.
    ///
    /// Text is returned unchanged.
    pub fn output(&self) -> Result<String, RenderError> {
        Renderer::default().render_token(self)
    }
}

/// Plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextToken<'a> {
    /// The text, verbatim.
    pub content: Cow<'a, str>,
    /// Source span.
    pub span: Span,
}

impl<'a> TextToken<'a> {
    pub(crate) fn borrowed(content: &'a str, span: Span) -> Self {
        Self {
            content: Cow::Borrowed(content),
            span,
        }
    }
}

/// Whether a tag token stands alone or wraps a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// A single class, or an unclosed open token that was allowed to stand
    /// alone.
    Single,
    /// An open token paired with its closer.
    Paired,
}

/// An instance of a registered token class.
#[derive(Clone)]
pub struct TagToken<'a> {
    class: Arc<str>,
    tag: Arc<str>,
    kind: TagKind,
    options: TokenOptions,
    args: TokenArgs,
    source: Cow<'a, str>,
    body: Option<Cow<'a, str>>,
    children: Option<Vec<Token<'a>>>,
    span: Span,
    renderer: Arc<dyn TagRenderer>,
}

impl<'a> TagToken<'a> {
    pub(crate) fn build(
        compiled: &CompiledClass,
        kind: TagKind,
        args: TokenArgs,
        source: &'a str,
        body: Option<&'a str>,
        children: Option<Vec<Token<'a>>>,
        span: Span,
    ) -> Self {
        let options = compiled.class.options();
        let args = bind_body(args, options, body);

        Self {
            class: Arc::clone(&compiled.name),
            tag: Arc::clone(&compiled.tag),
            kind,
            options,
            args,
            source: Cow::Borrowed(source),
            body: body.map(Cow::Borrowed),
            children,
            span,
            renderer: Arc::clone(compiled.class.renderer()),
        }
    }

    /// Name the class was registered under.
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Pairing tag of the class.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn kind(&self) -> TagKind {
        self.kind
    }

    pub fn is_single(&self) -> bool {
        self.kind == TagKind::Single
    }

    pub fn options(&self) -> TokenOptions {
        self.options
    }

    pub fn args(&self) -> &TokenArgs {
        &self.args
    }

    /// The full matched text: opener, body and closer.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Raw body text between opener and closer, if there was one.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// The tokenized body. `None` when the body was kept verbatim or the
    /// token has no body.
    pub fn children(&self) -> Option<&[Token<'a>]> {
        self.children.as_deref()
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub(crate) fn renderer(&self) -> &dyn TagRenderer {
        self.renderer.as_ref()
    }

    /// Render this token with default render options.
    pub fn output(&self) -> Result<String, RenderError> {
        Renderer::default().render_tag(self)
    }
}

/// Feed the body into the arguments according to the class options.
///
/// A token without a body still gets an empty `body` argument, so every
/// token of a class exposes the same argument positions.
fn bind_body(args: TokenArgs, options: TokenOptions, body: Option<&str>) -> TokenArgs {
    let args = match body {
        Some(body)
            if options.contains(TokenOptions::ALLOW_TOKEN_BODY_AS_FIRST_ARG)
                && args.by_position(0).is_empty() =>
        {
            args.with_replaced(0, body)
        }
        _ => args,
    };
    if options.contains(TokenOptions::TOKEN_BODY_AS_ARG) {
        args.with_named_arg("body", body.unwrap_or_default())
    } else {
        args
    }
}

impl fmt::Debug for TagToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagToken")
            .field("class", &self.class)
            .field("tag", &self.tag)
            .field("kind", &self.kind)
            .field("options", &self.options)
            .field("args", &self.args)
            .field("body", &self.body)
            .field("children", &self.children)
            .field("span", &self.span)
            .finish_non_exhaustive()
    }
}
