//! Token class definitions.
//!
//! A [`TokenClass`] describes one kind of markup the tokenizer recognizes:
//! its pattern, how it nests, its behavior options, and how a matched
//! token turns into output. Classes are registered by name into a
//! [`Registry`](crate::Registry) and never reference each other; an open
//! class and a close class are tied together only through a shared
//! pairing tag.

use std::fmt;
use std::sync::Arc;

use crate::args::TokenArgs;
use crate::error::RenderError;
use crate::options::{Classification, TokenOption, TokenOptions};
use crate::token::TagToken;

/// Produces the output of a matched tag token.
///
/// `content` is the rendered children of a paired token, its verbatim
/// body when the class has [`TokenOption::NoParseInner`] (or for a single
/// token that took the text after it as its body), and `None` for a bare
/// single token.
pub trait TagRenderer: Send + Sync {
    fn render(&self, tag: &TagToken<'_>, content: Option<&str>) -> Result<String, RenderError>;
}

/// Adapts a closure into a [`TagRenderer`].
pub struct FnRenderer<F>(pub F);

impl<F> TagRenderer for FnRenderer<F>
where
    F: Fn(&TagToken<'_>, Option<&str>) -> Result<String, RenderError> + Send + Sync,
{
    fn render(&self, tag: &TagToken<'_>, content: Option<&str>) -> Result<String, RenderError> {
        (self.0)(tag, content)
    }
}

/// Renders a token as its content alone, e.g. for `[noparse]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl TagRenderer for Passthrough {
    fn render(&self, _tag: &TagToken<'_>, content: Option<&str>) -> Result<String, RenderError> {
        Ok(content.unwrap_or_default().to_string())
    }
}

/// Rewrites captured arguments before the validity check runs.
pub type ArgModifier = Arc<dyn Fn(TokenArgs) -> TokenArgs + Send + Sync>;

/// Decides whether a match is accepted, after argument modification.
pub type ArgValidator = Arc<dyn Fn(&TokenArgs) -> bool + Send + Sync>;

/// The definition of a token class.
///
/// Built with chained `with_*` calls:
///
/// ```rust
/// use moeparse_core::{TokenClass, TokenOption};
/// use moeparse_core::html::HtmlTag;
///
/// let open = TokenClass::open(r"\[url(?:=(?P<href>[^\]]*))?\]")
///     .with_option(TokenOption::PossibleSingle)
///     .with_option(TokenOption::AllowTokenBodyAsFirstArg)
///     .with_renderer(HtmlTag::new("a").with_attr_by_name("href", "href"));
/// let close = TokenClass::close(r"\[/url\]").pairs_with("url");
/// # let _ = (open, close);
/// ```
#[derive(Clone)]
pub struct TokenClass {
    pattern: String,
    classification: Classification,
    options: TokenOptions,
    tag: Option<String>,
    aliases: Vec<(String, usize)>,
    renderer: Arc<dyn TagRenderer>,
    arg_modifier: Option<ArgModifier>,
    validator: Option<ArgValidator>,
}

impl TokenClass {
    /// Create a class with no options that renders as its content.
    pub fn new(pattern: impl Into<String>, classification: Classification) -> Self {
        Self {
            pattern: pattern.into(),
            classification,
            options: TokenOptions::empty(),
            tag: None,
            aliases: Vec::new(),
            renderer: Arc::new(Passthrough),
            arg_modifier: None,
            validator: None,
        }
    }

    pub fn single(pattern: impl Into<String>) -> Self {
        Self::new(pattern, Classification::Single)
    }

    pub fn open(pattern: impl Into<String>) -> Self {
        Self::new(pattern, Classification::Open)
    }

    pub fn close(pattern: impl Into<String>) -> Self {
        Self::new(pattern, Classification::Close)
    }

    pub fn symmetric(pattern: impl Into<String>) -> Self {
        Self::new(pattern, Classification::Symmetric)
    }

    /// Replace the option set.
    pub fn with_options(mut self, options: TokenOptions) -> Self {
        self.options = options;
        self
    }

    /// Add one option.
    pub fn with_option(mut self, option: TokenOption) -> Self {
        self.options |= option.flag();
        self
    }

    /// Pair this class with others sharing `tag` instead of its own name.
    ///
    /// A close class registered as `/b` uses `pairs_with("b")` to close
    /// tokens opened by the class registered as `b`.
    pub fn pairs_with(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Make the capture at `position` reachable as `name`.
    pub fn with_alias(mut self, name: impl Into<String>, position: usize) -> Self {
        self.aliases.push((name.into(), position));
        self
    }

    pub fn with_renderer(mut self, renderer: impl TagRenderer + 'static) -> Self {
        self.renderer = Arc::new(renderer);
        self
    }

    /// Render with a closure instead of a [`TagRenderer`] type.
    pub fn with_output_fn<F>(self, output: F) -> Self
    where
        F: Fn(&TagToken<'_>, Option<&str>) -> Result<String, RenderError> + Send + Sync + 'static,
    {
        self.with_renderer(FnRenderer(output))
    }

    /// Rewrite the captured arguments of every match, e.g. to map a
    /// username to a user id.
    pub fn with_arg_modifier<F>(mut self, modifier: F) -> Self
    where
        F: Fn(TokenArgs) -> TokenArgs + Send + Sync + 'static,
    {
        self.arg_modifier = Some(Arc::new(modifier));
        self
    }

    /// Reject matches for which `validator` returns false; they stay
    /// plain text.
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&TokenArgs) -> bool + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    pub fn options(&self) -> TokenOptions {
        self.options
    }

    /// The explicit pairing tag, if one was set.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn aliases(&self) -> &[(String, usize)] {
        &self.aliases
    }

    pub(crate) fn renderer(&self) -> &Arc<dyn TagRenderer> {
        &self.renderer
    }

    /// Run the argument modifier and validator over freshly captured
    /// arguments. Returns `None` if the match is rejected.
    pub(crate) fn bind(&self, args: TokenArgs) -> Option<TokenArgs> {
        let args = match &self.arg_modifier {
            Some(modify) => modify(args),
            None => args,
        };
        match &self.validator {
            Some(is_valid) if !is_valid(&args) => None,
            _ => Some(args),
        }
    }
}

impl fmt::Debug for TokenClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenClass")
            .field("pattern", &self.pattern)
            .field("classification", &self.classification)
            .field("options", &self.options)
            .field("tag", &self.tag)
            .field("aliases", &self.aliases)
            .field("arg_modifier", &self.arg_modifier.is_some())
            .field("validator", &self.validator.is_some())
            .finish_non_exhaustive()
    }
}
