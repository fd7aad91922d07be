//! Built-in tag catalog: BBCode tags, chat styles and `@mentions`.
//!
//! Everything here goes through the public registration API; the
//! tokenizer has no knowledge of any particular tag.
//!
//! | markup | output |
//! |---|---|
//! | `[b]`, `[i]`, `[s]`, `[q]`, `[samp]` | element of the same name |
//! | `[u]` | `<span class="underline">` |
//! | `[pre]`, `[code]` | `<pre>`, `<pre><code>`, body kept verbatim |
//! | `[noparse]` | body kept verbatim, no element |
//! | `[color=red]`, `[colour=red]` | `<span style="color: red;">` |
//! | `[size=12]` | `<span style="font-size: 12px;">` |
//! | `[url]x[/url]`, `[url=x]..[/url]`, `[url]x` | `<a href="x">` |
//! | `[img]x[/img]`, `[img=x]title[/img]`, `[img]x` | `<img src="x" title="..">` |
//! | `*bold*`, `_italic_`, `~~strike~~`, `` `code` `` | chat styles |

use crate::class::TokenClass;
use crate::error::CompileError;
use crate::html::{escape_html, HtmlTag};
use crate::options::{TokenOption, TokenOptions};
use crate::registry::Registry;

/// How a BBCode opening tag takes its `=value` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgSyntax {
    None,
    Optional,
    Required,
}

struct BbTag {
    name: &'static str,
    arg: ArgSyntax,
    options: TokenOptions,
    html: HtmlTag,
}

impl BbTag {
    fn new(name: &'static str, html: HtmlTag) -> Self {
        Self {
            name,
            arg: ArgSyntax::None,
            options: TokenOptions::empty(),
            html,
        }
    }

    fn arg(mut self, arg: ArgSyntax) -> Self {
        self.arg = arg;
        self
    }

    fn option(mut self, option: TokenOption) -> Self {
        self.options |= option.flag();
        self
    }

    fn open_pattern(&self) -> String {
        match self.arg {
            ArgSyntax::None => format!(r"(?i)\[{}\]", self.name),
            ArgSyntax::Optional => format!(r"(?i)\[{}(?:=([^\]]*))?\]", self.name),
            ArgSyntax::Required => format!(r"(?i)\[{}=([^\]]+)\]", self.name),
        }
    }

    fn register(self, registry: &mut Registry) {
        let open = TokenClass::open(self.open_pattern())
            .with_options(self.options)
            .with_renderer(self.html);
        let close = TokenClass::close(format!(r"(?i)\[/{}\]", self.name)).pairs_with(self.name);
        registry.register(self.name, open);
        registry.register(format!("/{}", self.name), close);
    }
}

fn bbcode_tags() -> Vec<BbTag> {
    use ArgSyntax::{Optional, Required};
    use TokenOption::*;

    vec![
        BbTag::new("b", HtmlTag::new("b")),
        BbTag::new("i", HtmlTag::new("i")),
        BbTag::new("u", HtmlTag::new("span").with_class("underline")),
        BbTag::new("s", HtmlTag::new("s")),
        BbTag::new("samp", HtmlTag::new("samp")),
        BbTag::new("q", HtmlTag::new("q")),
        BbTag::new("pre", HtmlTag::new("pre")).option(NoParseInner),
        BbTag::new("code", HtmlTag::nested(["pre", "code"])).option(NoParseInner),
        BbTag::new("noparse", HtmlTag::default()).option(NoParseInner),
        BbTag::new("color", HtmlTag::new("span").with_css(0, "color")).arg(Required),
        BbTag::new("colour", HtmlTag::new("span").with_css(0, "color")).arg(Required),
        BbTag::new(
            "size",
            HtmlTag::new("span")
                .with_css(0, "font-size")
                .with_px_numbers(),
        )
        .arg(Required),
        BbTag::new("url", HtmlTag::new("a").with_attr(0, "href"))
            .arg(Optional)
            .option(AllowTokenBodyAsFirstArg)
            .option(PossibleSingle),
        BbTag::new(
            "img",
            HtmlTag::new("img").with_attr(0, "src").with_attr(1, "title"),
        )
        .arg(Optional)
        .option(AllowTokenBodyAsFirstArg)
        .option(TokenBodyAsArg)
        .option(PossibleSingle)
        .option(HtmlSingle),
    ]
}

/// Register the BBCode tags. Each tag `x` registers an opener as `x` and
/// a closer as `/x`.
pub fn register_bbcode(registry: &mut Registry) {
    for tag in bbcode_tags() {
        tag.register(registry);
    }
}

/// Register the chat styles `*bold*`, `_italic_`, `~~strike~~` and
/// `` `code` ``.
///
/// These are symmetric and only open at the start of a word and close at
/// the end of one, so `snake_case_name` and `2*3*4` stay untouched.
pub fn register_chat_styles(registry: &mut Registry) {
    registry.register(
        "chat-bold",
        TokenClass::symmetric(r"\*").with_renderer(HtmlTag::new("b")),
    );
    registry.register(
        "chat-italic",
        TokenClass::symmetric("_").with_renderer(HtmlTag::new("i")),
    );
    registry.register(
        "chat-strike",
        TokenClass::symmetric("~~").with_renderer(HtmlTag::new("s")),
    );
    registry.register(
        "chat-code",
        TokenClass::symmetric("`")
            .with_option(TokenOption::NoParseInner)
            .with_renderer(HtmlTag::new("code")),
    );
}

/// A registry with the BBCode tags and chat styles, compiled.
pub fn registry() -> Result<Registry, CompileError> {
    let mut registry = Registry::new();
    register_bbcode(&mut registry);
    register_chat_styles(&mut registry);
    registry.compile()?;
    Ok(registry)
}

/// A single token class for `@username` mentions.
///
/// `lookup` maps a username to a user id; mentions of unknown users stay
/// plain text. The match includes the whitespace before the `@`, which is
/// kept in the output.
///
/// The `@` must start the text or follow whitespace. A username is a run
/// of word characters (`\w+`: Unicode letters, digits and `_`), so
/// punctuation ends it: in `@alice, hi` the name is `alice` and the comma
/// stays text, and `@bob.smith` looks up `bob`.
///
/// ```rust
/// use moeparse_core::{bbcode, Registry};
///
/// let mut registry = Registry::new();
/// registry.register(
///     "mention",
///     bbcode::mention(|name| (name == "alice").then(|| "0".to_string())),
/// );
/// registry.compile().unwrap();
///
/// let html = moeparse_core::render(&registry, "hi @alice and @bob").unwrap();
/// assert_eq!(
///     html,
///     r#"hi <span class="at-tag user-0" data-uid="0" data-user="alice">@alice</span> and @bob"#
/// );
/// ```
pub fn mention<F>(lookup: F) -> TokenClass
where
    F: Fn(&str) -> Option<String> + Send + Sync + 'static,
{
    TokenClass::single(r"(^|\s)@(?P<username>\w+)")
        .with_arg_modifier(move |args| {
            let uid = lookup(args.by_name("username")).unwrap_or_default();
            args.with_named_arg("uid", uid)
        })
        .with_validator(|args| !args.by_name("uid").is_empty())
        .with_output_fn(|tag, _| {
            let args = tag.args();
            let uid = escape_html(args.by_name("uid"));
            let user = escape_html(args.by_name("username"));
            Ok(format!(
                r#"{}<span class="at-tag user-{uid}" data-uid="{uid}" data-user="{user}">@{user}</span>"#,
                args.by_position(0),
                uid = uid,
                user = user,
            ))
        })
}
