//! HTML output for tag tokens.
//!
//! [`HtmlTag`] is the structural renderer: it wraps a token's content in
//! one or more elements and fills in classes, attributes and CSS
//! properties, either fixed or taken from the token's arguments by
//! position or by name. A custom output function, when set, replaces all
//! of that.
//!
//! ```rust
//! use moeparse_core::{Registry, TokenClass};
//! use moeparse_core::html::HtmlTag;
//!
//! let mut registry = Registry::new();
//! registry.register(
//!     "size",
//!     TokenClass::open(r"\[size=([^\]]+)\]")
//!         .with_renderer(HtmlTag::new("span").with_css(0, "font-size").with_px_numbers()),
//! );
//! registry.register("/size", TokenClass::close(r"\[/size\]").pairs_with("size"));
//! registry.compile().unwrap();
//!
//! let html = moeparse_core::render(&registry, "[size=12]big[/size]").unwrap();
//! assert_eq!(html, r#"<span style="font-size: 12px;">big</span>"#);
//! ```

use std::borrow::Cow;
use std::fmt::{self, Write};
use std::sync::Arc;

use memchr::{memchr2, memchr3};

use crate::args::TokenArgs;
use crate::class::TagRenderer;
use crate::error::RenderError;
use crate::options::TokenOptions;
use crate::token::TagToken;

/// Escape text for use in HTML content or a quoted attribute value.
///
/// Borrows the input when nothing needs escaping.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    let bytes = text.as_bytes();
    if memchr3(b'<', b'>', b'&', bytes).is_none() && memchr2(b'"', b'\'', bytes).is_none() {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Refers to a token argument by position or by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgRef {
    Position(usize),
    Name(String),
}

impl ArgRef {
    /// Look the argument up, `""` if absent.
    pub fn resolve<'r>(&self, args: &'r TokenArgs) -> &'r str {
        match self {
            ArgRef::Position(position) => args.by_position(*position),
            ArgRef::Name(name) => args.by_name(name),
        }
    }
}

type ClassFn = Arc<dyn Fn(Vec<String>, &TokenArgs) -> Vec<String> + Send + Sync>;
type OutputFn =
    Arc<dyn Fn(&TagToken<'_>, Option<&str>) -> Result<String, RenderError> + Send + Sync>;

/// Renders a tag token as HTML elements.
///
/// Classes, attributes and styles go on the outermost element. Empty
/// values are left out rather than rendered as empty attributes.
#[derive(Clone, Default)]
pub struct HtmlTag {
    elements: Vec<String>,
    classes: Vec<String>,
    class_fn: Option<ClassFn>,
    static_attrs: Vec<(String, String)>,
    attrs: Vec<(ArgRef, String)>,
    css: Vec<(ArgRef, String)>,
    px_numbers: bool,
    void: bool,
    output_fn: Option<OutputFn>,
}

impl HtmlTag {
    /// Wrap content in one element.
    pub fn new(element: impl Into<String>) -> Self {
        Self {
            elements: vec![element.into()],
            ..Self::default()
        }
    }

    /// Wrap content in nested elements, outermost first:
    /// `["pre", "code"]` renders `<pre><code>..</code></pre>`.
    pub fn nested<I, S>(elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            elements: elements.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Compute the final class list from the static classes and the
    /// token arguments.
    pub fn with_class_fn<F>(mut self, classes: F) -> Self
    where
        F: Fn(Vec<String>, &TokenArgs) -> Vec<String> + Send + Sync + 'static,
    {
        self.class_fn = Some(Arc::new(classes));
        self
    }

    pub fn with_static_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.static_attrs.push((name.into(), value.into()));
        self
    }

    /// Set attribute `name` from the argument at `position`.
    pub fn with_attr(mut self, position: usize, name: impl Into<String>) -> Self {
        self.attrs.push((ArgRef::Position(position), name.into()));
        self
    }

    /// Set attribute `name` from the argument bound to `arg`.
    pub fn with_attr_by_name(mut self, arg: impl Into<String>, name: impl Into<String>) -> Self {
        self.attrs.push((ArgRef::Name(arg.into()), name.into()));
        self
    }

    /// Set CSS property `property` from the argument at `position`.
    pub fn with_css(mut self, position: usize, property: impl Into<String>) -> Self {
        self.css.push((ArgRef::Position(position), property.into()));
        self
    }

    /// Set CSS property `property` from the argument bound to `arg`.
    pub fn with_css_by_name(mut self, arg: impl Into<String>, property: impl Into<String>) -> Self {
        self.css.push((ArgRef::Name(arg.into()), property.into()));
        self
    }

    /// Append `px` to CSS values that are plain numbers (`12` -> `12px`).
    pub fn with_px_numbers(mut self) -> Self {
        self.px_numbers = true;
        self
    }

    /// Render only the opening element, e.g. `<img ...>`.
    pub fn void(mut self) -> Self {
        self.void = true;
        self
    }

    /// Replace structural rendering with a custom function.
    pub fn with_output_fn<F>(mut self, output: F) -> Self
    where
        F: Fn(&TagToken<'_>, Option<&str>) -> Result<String, RenderError> + Send + Sync + 'static,
    {
        self.output_fn = Some(Arc::new(output));
        self
    }

    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    fn render_structure(&self, tag: &TagToken<'_>, content: Option<&str>) -> String {
        let content = content.unwrap_or_default();
        let Some((outer, inner)) = self.elements.split_first() else {
            return content.to_string();
        };

        let mut out = String::with_capacity(content.len() + 32);
        out.push('<');
        out.push_str(outer);
        self.write_attributes(&mut out, tag.args());
        out.push('>');

        if self.void || tag.options().contains(TokenOptions::HTML_SINGLE) {
            return out;
        }

        for element in inner {
            let _ = write!(out, "<{}>", element);
        }
        out.push_str(content);
        for element in inner.iter().rev() {
            let _ = write!(out, "</{}>", element);
        }
        let _ = write!(out, "</{}>", outer);
        out
    }

    fn write_attributes(&self, out: &mut String, args: &TokenArgs) {
        let mut classes = self.classes.clone();
        if let Some(class_fn) = &self.class_fn {
            classes = class_fn(classes, args);
        }
        classes.retain(|class| !class.is_empty());
        if !classes.is_empty() {
            write_attr(out, "class", &classes.join(" "));
        }

        for (name, value) in &self.static_attrs {
            write_attr(out, name, value);
        }

        for (arg, name) in &self.attrs {
            let value = arg.resolve(args);
            if !value.is_empty() {
                write_attr(out, name, value);
            }
        }

        let style: Vec<String> = self
            .css
            .iter()
            .filter_map(|(arg, property)| {
                let value = arg.resolve(args);
                if value.is_empty() {
                    None
                } else if self.px_numbers && is_plain_number(value) {
                    Some(format!("{}: {}px;", property, value))
                } else {
                    Some(format!("{}: {};", property, value))
                }
            })
            .collect();
        if !style.is_empty() {
            write_attr(out, "style", &style.join(" "));
        }
    }
}

impl TagRenderer for HtmlTag {
    fn render(&self, tag: &TagToken<'_>, content: Option<&str>) -> Result<String, RenderError> {
        match &self.output_fn {
            Some(output) => output(tag, content),
            None => Ok(self.render_structure(tag, content)),
        }
    }
}

impl fmt::Debug for HtmlTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HtmlTag")
            .field("elements", &self.elements)
            .field("classes", &self.classes)
            .field("static_attrs", &self.static_attrs)
            .field("attrs", &self.attrs)
            .field("css", &self.css)
            .field("px_numbers", &self.px_numbers)
            .field("void", &self.void)
            .field("output_fn", &self.output_fn.is_some())
            .finish_non_exhaustive()
    }
}

fn write_attr(out: &mut String, name: &str, value: &str) {
    let _ = write!(out, " {}=\"{}\"", name, escape_html(value));
}

fn is_plain_number(value: &str) -> bool {
    let mut dots = 0;
    let mut digits = 0;
    for b in value.bytes() {
        match b {
            b'0'..=b'9' => digits += 1,
            b'.' => dots += 1,
            _ => return false,
        }
    }
    digits > 0 && dots <= 1
}
