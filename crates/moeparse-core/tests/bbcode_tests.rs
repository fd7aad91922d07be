//! Tests for the built-in BBCode catalog and chat styles

use moeparse_core::bbcode::{self, mention};
use moeparse_core::{Registry, TagKind};
use rstest::{fixture, rstest};

#[fixture]
fn registry() -> Registry {
    bbcode::registry().unwrap()
}

fn render(registry: &Registry, input: &str) -> String {
    moeparse_core::render(registry, input).unwrap()
}

// ============================================================================
// Catalog Tests
// ============================================================================

#[rstest]
#[case::bold("[b]bold[/b]", "<b>bold</b>")]
#[case::italic("[i]it[/i]", "<i>it</i>")]
#[case::underline("[u]under[/u]", r#"<span class="underline">under</span>"#)]
#[case::strike("[s]x[/s]", "<s>x</s>")]
#[case::samp("[samp]x[/samp]", "<samp>x</samp>")]
#[case::quote("[q]x[/q]", "<q>x</q>")]
#[case::pre("[pre][b]raw[/b][/pre]", "<pre>[b]raw[/b]</pre>")]
#[case::code("[code]*x*[/code]", "<pre><code>*x*</code></pre>")]
#[case::noparse("[noparse][b]x[/b][/noparse]", "[b]x[/b]")]
#[case::color("[color=red]x[/color]", r#"<span style="color: red;">x</span>"#)]
#[case::colour("[colour=#f00]x[/colour]", r##"<span style="color: #f00;">x</span>"##)]
#[case::size_px("[size=12]x[/size]", r#"<span style="font-size: 12px;">x</span>"#)]
#[case::size_unit("[size=2em]x[/size]", r#"<span style="font-size: 2em;">x</span>"#)]
#[case::url_body("[url]http://a.io[/url]", r#"<a href="http://a.io">http://a.io</a>"#)]
#[case::url_arg("[url=http://a.io]site[/url]", r#"<a href="http://a.io">site</a>"#)]
#[case::url_single("[url]http://a.io and more", r#"<a href="http://a.io">http://a.io</a> and more"#)]
#[case::img_body("[img]cat.png[/img]", r#"<img src="cat.png" title="cat.png">"#)]
#[case::img_title("[img=cat.png]A cat[/img]", r#"<img src="cat.png" title="A cat">"#)]
#[case::img_single("[img]cat.png", r#"<img src="cat.png" title="cat.png">"#)]
#[case::uppercase("[B]loud[/B]", "<b>loud</b>")]
fn test_catalog_renders(registry: Registry, #[case] input: &str, #[case] expected: &str) {
    assert_eq!(render(&registry, input), expected);
}

#[rstest]
#[case::missing_value("[color]x[/color]")]
#[case::empty_value("[size=]x[/size]")]
#[case::unknown_tag("[blink]x[/blink]")]
#[case::unclosed("[b]never closed")]
#[case::stray("closing [/i] only")]
fn test_catalog_leaves_text(registry: Registry, #[case] input: &str) {
    assert_eq!(render(&registry, input), input);
}

#[rstest]
fn test_attribute_values_are_escaped(registry: Registry) {
    assert_eq!(
        render(&registry, r#"[color=red" onclick="x]t[/color]"#),
        r#"<span style="color: red&quot; onclick=&quot;x;">t</span>"#
    );
}

#[rstest]
fn test_nested_catalog(registry: Registry) {
    assert_eq!(
        render(&registry, "[b]bold [color=blue]blue *chat*[/color][/b]"),
        r#"<b>bold <span style="color: blue;">blue <b>chat</b></span></b>"#
    );
}

#[rstest]
fn test_unclosed_url_inside_bold(registry: Registry) {
    assert_eq!(
        render(&registry, "[b][url]x.io[/b]"),
        r#"<b><a href="x.io">x.io</a></b>"#
    );
}

#[rstest]
fn test_single_url_token_shape(registry: Registry) {
    let tokens = registry.tokenize("[url]x.io rest");
    assert_eq!(tokens.len(), 2);

    let url = tokens[0].as_tag().unwrap();
    assert_eq!(url.kind(), TagKind::Single);
    assert_eq!(url.source(), "[url]x.io");
    assert_eq!(url.body(), Some("x.io"));
    assert_eq!(url.args().by_position(0), "x.io");
}

#[rstest]
#[case::stray_closer(
    "[url]a.io [/i] tail [/url]",
    r#"<a href="a.io">a.io</a> [/i] tail [/url]"#
)]
#[case::outer_closer("[i][url]x.io[/i] [/url]", r#"<i><a href="x.io">x.io</a></i> [/url]"#)]
#[case::nested_section(
    "[url=a.io][b]x[/b][/url]",
    r#"<a href="a.io"><b>x</b></a>"#
)]
fn test_possible_single_stops_at_unrelated_closer(
    registry: Registry,
    #[case] input: &str,
    #[case] expected: &str,
) {
    assert_eq!(render(&registry, input), expected);
}

#[rstest]
fn test_single_img_without_body_keeps_body_argument(registry: Registry) {
    let tokens = registry.tokenize("[img] x");
    assert_eq!(tokens.len(), 2);

    let img = tokens[0].as_tag().unwrap();
    assert_eq!(img.kind(), TagKind::Single);
    assert_eq!(img.source(), "[img]");
    assert_eq!(img.body(), None);
    assert_eq!(img.args().len(), 2);
    assert_eq!(img.args().by_name("body"), "");
    assert_eq!(tokens[1].as_text().unwrap().content, " x");
    assert_eq!(render(&registry, "[img] x"), "<img> x");

    let tokens = registry.tokenize("[img=cat.png] x");
    let img = tokens[0].as_tag().unwrap();
    assert_eq!(img.args().len(), 2);
    assert_eq!(img.args().by_position(0), "cat.png");
    assert_eq!(img.args().by_position(1), "");
}

// ============================================================================
// Scaling Tests
// ============================================================================

#[rstest]
#[case::mid_word_underscores("a_b ", 50_000)]
#[case::unclosed_bold("[b]", 40_000)]
#[case::unclosed_stars(" *a", 40_000)]
#[case::stray_closers("[/i]", 40_000)]
fn test_degenerate_input_stays_text(
    registry: Registry,
    #[case] unit: &str,
    #[case] repeat: usize,
) {
    let input = unit.repeat(repeat);
    let tokens = registry.tokenize(&input);
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].as_text().unwrap().content, input);
}

// ============================================================================
// Chat Style Tests
// ============================================================================

#[rstest]
#[case::all_styles(
    "*bold* _it_ ~~gone~~ `[b]x[/b]`",
    "<b>bold</b> <i>it</i> <s>gone</s> <code>[b]x[/b]</code>"
)]
#[case::mid_word("snake_case_name 2*3*4", "snake_case_name 2*3*4")]
#[case::punctuation_after("*wow*, nice", "*wow*, nice")]
#[case::two_styles("*bold* and _it_", "<b>bold</b> and <i>it</i>")]
#[case::body_edges_are_boundaries("_a *b*_", "<i>a <b>b</b></i>")]
#[case::inside_bbcode("[i]*x*[/i]", "<i><b>x</b></i>")]
fn test_chat_styles(registry: Registry, #[case] input: &str, #[case] expected: &str) {
    assert_eq!(render(&registry, input), expected);
}

// ============================================================================
// Mention Tests
// ============================================================================

fn with_mentions() -> Registry {
    let mut registry = Registry::new();
    bbcode::register_bbcode(&mut registry);
    registry.register(
        "mention",
        mention(|name| match name {
            "alice" => Some("0".to_string()),
            "bob" => Some("1".to_string()),
            _ => None,
        }),
    );
    registry.compile().unwrap();
    registry
}

#[test]
fn test_mention_at_body_start() {
    let registry = with_mentions();
    assert_eq!(
        render(&registry, "[b]@alice[/b]"),
        r#"<b><span class="at-tag user-0" data-uid="0" data-user="alice">@alice</span></b>"#
    );
}

#[test]
fn test_mention_arguments() {
    let registry = with_mentions();
    let tokens = registry.tokenize("hey @bob");
    let tag = tokens[1].as_tag().unwrap();

    assert_eq!(tag.class(), "mention");
    assert_eq!(tag.source(), " @bob");
    assert_eq!(tag.args().by_name("username"), "bob");
    assert_eq!(tag.args().by_name("uid"), "1");
}

#[test]
fn test_mention_name_ends_at_punctuation() {
    let registry = with_mentions();
    assert_eq!(
        render(&registry, "hi @alice, there"),
        r#"hi <span class="at-tag user-0" data-uid="0" data-user="alice">@alice</span>, there"#
    );

    let tokens = registry.tokenize("cc @bob.smith");
    let tag = tokens[1].as_tag().unwrap();
    assert_eq!(tag.args().by_name("username"), "bob");
    assert_eq!(tokens[2].as_text().unwrap().content, ".smith");
}

#[test]
fn test_mention_needs_whitespace_before() {
    let registry = with_mentions();
    let tokens = registry.tokenize("(@alice)");
    assert_eq!(tokens.len(), 1);
    assert!(tokens[0].is_text());
}

#[test]
fn test_unknown_mention_is_text() {
    let registry = with_mentions();
    let tokens = registry.tokenize("hey @carol");
    assert_eq!(tokens.len(), 1);
    assert!(tokens[0].is_text());
}
