//! Property-based tests for the tokenizer
//!
//! Inputs are built from markup fragments of the built-in catalog mixed
//! with plain words, so most generated strings contain a mix of balanced,
//! unbalanced, crossed and stray tags.

use moeparse_core::{bbcode, Registry, Renderer, Token};
use proptest::prelude::*;

const MARKUP: &[&str] = &[
    "[b]", "[/b]", "[i]", "[/i]", "[code]", "[/code]", "[url]", "[url=x.io]", "[/url]",
    "[img]", "[/img]", "[color=red]", "[/color]", "*", "_", "~~", "`", " ",
];

fn fragment_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(MARKUP).prop_map(str::to_string),
        "[a-zé ]{1,6}",
    ]
}

fn markup_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(fragment_strategy(), 0..24).prop_map(|parts| parts.concat())
}

fn registry() -> Registry {
    bbcode::registry().unwrap()
}

/// Check that `tokens` tile `input[start..end]` exactly, and that every
/// tag's children tile its body.
fn assert_tiles(tokens: &[Token], input: &str, start: usize, end: usize) {
    let mut cursor = start;
    for token in tokens {
        let span = token.span();
        assert_eq!(span.start as usize, cursor, "gap or overlap at {}", cursor);
        assert!(span.end > span.start, "empty token at {}", cursor);
        assert_eq!(span.slice(input), token.source());
        cursor = span.end as usize;

        let Some(tag) = token.as_tag() else {
            continue;
        };
        if let (Some(body), Some(children)) = (tag.body(), tag.children()) {
            let Some(first) = children.first() else {
                assert!(body.is_empty());
                continue;
            };
            let body_start = first.span().start as usize;
            assert!(body_start >= span.start as usize);
            assert!(body_start + body.len() <= span.end as usize);
            assert_eq!(&input[body_start..body_start + body.len()], body);
            assert_tiles(children, input, body_start, body_start + body.len());
        }
    }
    assert_eq!(cursor, end);
}

proptest! {
    #[test]
    fn test_tokens_cover_input(input in markup_strategy()) {
        let registry = registry();
        let tokens = registry.tokenize(&input);
        assert_tiles(&tokens, &input, 0, input.len());
    }

    #[test]
    fn test_plain_text_is_one_token(input in "[a-zA-Z0-9 ,.!?]{1,60}") {
        let registry = registry();
        let tokens = registry.tokenize(&input);
        prop_assert_eq!(tokens.len(), 1);
        prop_assert_eq!(tokens[0].as_text().map(|t| t.content.as_ref()), Some(input.as_str()));
    }

    #[test]
    fn test_render_is_stable(input in markup_strategy()) {
        let registry = registry();
        let tokens = registry.tokenize(&input);
        let renderer = Renderer::default();
        let first = renderer.render(&tokens).unwrap();
        let second = renderer.render(&tokens).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_tokenize_is_deterministic(input in markup_strategy()) {
        let registry = registry();
        let first = moeparse_core::render(&registry, &input).unwrap();
        let second = moeparse_core::render(&registry, &input).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_text_without_markup_renders_unchanged(input in "[a-z ]{0,40}") {
        let registry = registry();
        prop_assert_eq!(moeparse_core::render(&registry, &input).unwrap(), input);
    }
}
