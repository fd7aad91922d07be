//! Python bindings for the moeparse chat markup renderer.

use std::collections::BTreeMap;

use moeparse_core::html::HtmlTag;
use moeparse_core::span::Span as CoreSpan;
use moeparse_core::{
    bbcode, Classification, Registry as CoreRegistry, RenderOptions, Renderer, TagKind,
    Token as CoreToken, TokenClass, TokenOption, TokenOptions,
};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

// ============================================================================
// Span
// ============================================================================

/// Source location in the input text (byte offsets).
#[pyclass(frozen, get_all, name = "Span")]
#[derive(Clone)]
pub struct PySpan {
    pub start: u32,
    pub end: u32,
}

#[pymethods]
impl PySpan {
    fn __repr__(&self) -> String {
        format!("Span({}, {})", self.start, self.end)
    }

    #[getter]
    fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }
}

impl From<CoreSpan> for PySpan {
    fn from(s: CoreSpan) -> Self {
        PySpan {
            start: s.start,
            end: s.end,
        }
    }
}

// ============================================================================
// Enums
// ============================================================================

/// Whether a tag was closed or stands alone.
#[pyclass(frozen, eq, eq_int, name = "TagKind")]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PyTagKind {
    Single,
    Paired,
}

impl From<TagKind> for PyTagKind {
    fn from(k: TagKind) -> Self {
        match k {
            TagKind::Single => PyTagKind::Single,
            TagKind::Paired => PyTagKind::Paired,
        }
    }
}

fn parse_classification(name: &str) -> PyResult<Classification> {
    match name {
        "single" => Ok(Classification::Single),
        "open" => Ok(Classification::Open),
        "close" => Ok(Classification::Close),
        "symmetric" => Ok(Classification::Symmetric),
        other => Err(PyValueError::new_err(format!(
            "unknown classification: {}",
            other
        ))),
    }
}

fn parse_options(names: &[String]) -> PyResult<TokenOptions> {
    names
        .iter()
        .map(|name| {
            TokenOption::from_name(name)
                .ok_or_else(|| PyValueError::new_err(format!("unknown token option: {}", name)))
        })
        .collect()
}

// ============================================================================
// Tokens
// ============================================================================

/// Plain text.
#[pyclass(frozen, get_all, name = "Text")]
pub struct PyText {
    pub content: String,
    pub span: PySpan,
}

#[pymethods]
impl PyText {
    fn __repr__(&self) -> String {
        format!("Text({:?})", self.content)
    }
}

/// A matched tag.
#[pyclass(frozen, get_all, name = "Tag")]
pub struct PyTag {
    /// Name the class was registered under.
    pub class_name: String,
    /// Pairing tag shared by opener and closer.
    pub tag: String,
    pub kind: PyTagKind,
    pub source: String,
    /// Arguments by position.
    pub args: Vec<String>,
    /// Argument names mapped to positions.
    pub named: PyObject,
    pub body: Option<String>,
    /// Child tokens, or None when the body was kept verbatim.
    pub children: Option<PyObject>,
    pub span: PySpan,
}

#[pymethods]
impl PyTag {
    fn __repr__(&self) -> String {
        format!("Tag({:?}, {:?})", self.class_name, self.source)
    }
}

fn convert_tokens(py: Python<'_>, tokens: &[CoreToken<'_>]) -> PyResult<PyObject> {
    let list = PyList::empty(py);
    for token in tokens {
        list.append(convert_token(py, token)?)?;
    }
    Ok(list.into())
}

fn convert_token(py: Python<'_>, token: &CoreToken<'_>) -> PyResult<PyObject> {
    let token = match token {
        CoreToken::Text(t) => Py::new(
            py,
            PyText {
                content: t.content.to_string(),
                span: t.span.into(),
            },
        )?
        .into_any(),
        CoreToken::Tag(t) => {
            let named = PyDict::new(py);
            for (name, position) in t.args().names() {
                named.set_item(name, position)?;
            }
            let children = match t.children() {
                Some(children) => Some(convert_tokens(py, children)?),
                None => None,
            };
            Py::new(
                py,
                PyTag {
                    class_name: t.class().to_string(),
                    tag: t.tag().to_string(),
                    kind: t.kind().into(),
                    source: t.source().to_string(),
                    args: t.args().iter().map(str::to_string).collect(),
                    named: named.into(),
                    body: t.body().map(str::to_string),
                    children,
                    span: t.span().into(),
                },
            )?
            .into_any()
        }
    };
    Ok(token)
}

// ============================================================================
// Registry
// ============================================================================

/// A set of token classes.
///
/// Classes registered or removed after construction take effect once
/// `compile()` is called.
#[pyclass(name = "Registry")]
pub struct PyRegistry {
    inner: CoreRegistry,
}

#[pymethods]
impl PyRegistry {
    #[new]
    #[pyo3(
        signature = (bbcode=true, chat=true, max_depth=None),
        text_signature = "(bbcode=True, chat=True, max_depth=None)"
    )]
    fn new(bbcode: bool, chat: bool, max_depth: Option<usize>) -> PyResult<Self> {
        let mut inner = match max_depth {
            Some(depth) => CoreRegistry::new().with_max_depth(depth),
            None => CoreRegistry::new(),
        };
        if bbcode {
            bbcode::register_bbcode(&mut inner);
        }
        if chat {
            bbcode::register_chat_styles(&mut inner);
        }
        inner
            .compile()
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(PyRegistry { inner })
    }

    /// Register a class rendered as an HTML element.
    ///
    /// `attrs` and `css` map attribute names and CSS properties to
    /// argument positions. Without `element` the content is output as is.
    #[pyo3(
        signature = (name, pattern, classification="single", element=None, options=None, pairs_with=None, attrs=None, css=None),
        text_signature = "(self, name, pattern, classification='single', element=None, options=None, pairs_with=None, attrs=None, css=None)"
    )]
    #[allow(clippy::too_many_arguments)]
    fn register(
        &mut self,
        name: &str,
        pattern: &str,
        classification: &str,
        element: Option<&str>,
        options: Option<Vec<String>>,
        pairs_with: Option<&str>,
        attrs: Option<BTreeMap<String, usize>>,
        css: Option<BTreeMap<String, usize>>,
    ) -> PyResult<()> {
        let mut html = element.map(HtmlTag::new).unwrap_or_default();
        for (attr, position) in attrs.unwrap_or_default() {
            html = html.with_attr(position, attr);
        }
        for (property, position) in css.unwrap_or_default() {
            html = html.with_css(position, property);
        }

        let mut class = TokenClass::new(pattern, parse_classification(classification)?)
            .with_options(parse_options(&options.unwrap_or_default())?)
            .with_renderer(html);
        if let Some(tag) = pairs_with {
            class = class.pairs_with(tag);
        }

        self.inner.register(name, class);
        Ok(())
    }

    /// Remove a class. Returns whether it was registered.
    #[pyo3(text_signature = "(self, name)")]
    fn unregister(&mut self, name: &str) -> bool {
        self.inner.unregister(name).is_some()
    }

    /// Rebuild the matcher. Raises ValueError on invalid classes.
    #[pyo3(text_signature = "(self)")]
    fn compile(&mut self) -> PyResult<()> {
        self.inner
            .compile()
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    /// Tokenize a string into a list of Text and Tag objects.
    #[pyo3(text_signature = "(self, input)")]
    fn tokenize(&self, py: Python<'_>, input: &str) -> PyResult<PyObject> {
        convert_tokens(py, &self.inner.tokenize(input))
    }

    /// Render a string to HTML. Raises ValueError when a tag fails to render.
    #[pyo3(signature = (input, escape=false), text_signature = "(self, input, escape=False)")]
    fn render(&self, input: &str, escape: bool) -> PyResult<String> {
        render_with(&self.inner, input, escape)
    }

    /// Registered class names in precedence order.
    fn names(&self) -> Vec<String> {
        self.inner.names().map(str::to_string).collect()
    }

    #[getter]
    fn is_stale(&self) -> bool {
        self.inner.is_stale()
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __contains__(&self, name: &str) -> bool {
        self.inner.contains(name)
    }

    fn __repr__(&self) -> String {
        format!("Registry({} classes)", self.inner.len())
    }
}

fn render_with(registry: &CoreRegistry, input: &str, escape: bool) -> PyResult<String> {
    let renderer = Renderer::new(RenderOptions::new().with_escape_text(escape));
    renderer
        .render(&registry.tokenize(input))
        .map_err(|e| PyValueError::new_err(e.to_string()))
}

fn default_registry() -> PyResult<CoreRegistry> {
    bbcode::registry().map_err(|e| PyValueError::new_err(e.to_string()))
}

// ============================================================================
// Module functions
// ============================================================================

/// Render a string with the built-in BBCode tags and chat styles.
///
/// Args:
///     input: Markup string
///     escape: Escape HTML special characters in plain text
///
/// Returns:
///     str: Rendered HTML
#[pyfunction]
#[pyo3(signature = (input, escape=false), text_signature = "(input, escape=False)")]
fn render(input: &str, escape: bool) -> PyResult<String> {
    render_with(&default_registry()?, input, escape)
}

/// Tokenize a string with the built-in BBCode tags and chat styles.
///
/// Args:
///     input: Markup string
///
/// Returns:
///     list: Text and Tag objects
#[pyfunction]
#[pyo3(signature = (input), text_signature = "(input)")]
fn tokenize(py: Python<'_>, input: &str) -> PyResult<PyObject> {
    convert_tokens(py, &default_registry()?.tokenize(input))
}

// ============================================================================
// Module
// ============================================================================

/// moeparse - chat markup to HTML.
#[pymodule]
fn pymoe(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySpan>()?;
    m.add_class::<PyTagKind>()?;
    m.add_class::<PyText>()?;
    m.add_class::<PyTag>()?;
    m.add_class::<PyRegistry>()?;
    m.add_function(wrap_pyfunction!(render, m)?)?;
    m.add_function(wrap_pyfunction!(tokenize, m)?)?;
    Ok(())
}
