//! Tokenizer: scanning, pairing and recursive body tokenization.
//!
//! Tokenizing a piece of text runs in two passes.
//!
//! The scan pass walks the text left to right with the combined matcher,
//! collecting accepted matches. A match is rejected when it is empty, when
//! it breaks its class's mid-word rule, or when the class validator refuses
//! its arguments. After a rejection, classes registered later are tried at
//! the same position; if none is accepted the scan moves on by one
//! character. Every iteration consumes at least one character.
//!
//! The pairing pass turns the matches into tokens:
//!
//! - single matches become single tag tokens
//! - an opener is paired with its closer in one pass that keeps a stack
//!   per pairing tag, so the last opened tag is the first closed; symmetric
//!   tags pair with the next occurrence of the same tag that is able to
//!   close
//! - the text between opener and closer is tokenized again (absolute spans
//!   are kept), unless the class keeps its body verbatim
//! - an opener without closer becomes a single token if the class allows
//!   it, and plain text otherwise; stray closers are plain text
//! - an opener that may stand alone stops waiting for its closer once a
//!   closer of another tag ends a section opened before it, e.g. the
//!   `[/i]` in `[url]a.io [/i] x [/url]`
//!
//! Markup that cannot be resolved is never dropped: it stays in the output
//! as plain text.

use std::sync::Arc;

use tracing::trace;

use crate::args::TokenArgs;
use crate::matcher::{Matcher, RawMatch};
use crate::options::{Classification, TokenOptions};
use crate::span::Span;
use crate::token::{TagKind, TagToken, TextToken, Token};

/// Nesting depth up to which tag bodies are tokenized again.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// A frozen view of a compiled registry that turns text into tokens.
///
/// Cheap to clone and safe to share between threads: registering more
/// classes afterwards does not affect an existing tokenizer.
#[derive(Clone)]
pub struct Tokenizer {
    matcher: Arc<Matcher>,
    max_depth: usize,
}

/// An accepted match awaiting pairing.
struct Lexeme {
    class: usize,
    start: usize,
    end: usize,
    args: TokenArgs,
    can_open: bool,
    can_close: bool,
}

impl Tokenizer {
    pub(crate) fn new(matcher: Arc<Matcher>, max_depth: usize) -> Self {
        Self { matcher, max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Tokenize a complete input string.
    ///
    /// The returned tokens cover the input without gaps or overlaps.
    /// Empty input yields no tokens.
    pub fn tokenize<'a>(&self, input: &'a str) -> Vec<Token<'a>> {
        self.tokenize_at(input, 0, 0)
    }

    fn tokenize_at<'a>(&self, text: &'a str, base: usize, depth: usize) -> Vec<Token<'a>> {
        if text.is_empty() {
            return Vec::new();
        }
        let lexemes = self.scan(text);
        self.assemble(text, base, depth, lexemes)
    }

    fn scan(&self, text: &str) -> Vec<Lexeme> {
        let mut lexemes = Vec::new();
        let mut pos = 0;

        while pos < text.len() {
            let Some(found) = self.matcher.find_at(text, pos) else {
                break;
            };
            let start = found.start;
            let first = found.class;

            let accepted = self.accept(text, found).or_else(|| {
                (first + 1..self.matcher.len()).find_map(|class| {
                    self.matcher
                        .match_class_at(class, text, start)
                        .and_then(|m| self.accept(text, m))
                })
            });

            match accepted {
                Some(lexeme) => {
                    pos = lexeme.end;
                    lexemes.push(lexeme);
                }
                None => pos = next_char_boundary(text, start),
            }
        }

        lexemes
    }

    fn accept(&self, text: &str, found: RawMatch) -> Option<Lexeme> {
        let compiled = self.matcher.class(found.class);
        if found.start == found.end {
            trace!(class = %compiled.name, at = found.start, "skipping empty match");
            return None;
        }

        let options = compiled.class.options();
        let allow = options.contains(TokenOptions::ALLOW_MID_WORD);
        let disallow = options.contains(TokenOptions::DISALLOW_MID_WORD);
        let leading = boundary_before(text, found.start);
        let trailing = boundary_after(text, found.end);

        let (fits, can_open, can_close) = match compiled.class.classification() {
            Classification::Single => (!disallow || (leading && trailing), false, false),
            Classification::Open => (!disallow || leading, true, false),
            Classification::Close => (!disallow || trailing, false, true),
            Classification::Symmetric => {
                let can_open = allow || leading;
                let can_close = allow || trailing;
                (can_open || can_close, can_open, can_close)
            }
        };
        if !fits {
            trace!(class = %compiled.name, at = found.start, "match rejected inside a word");
            return None;
        }

        let Some(args) = compiled.class.bind(found.args) else {
            trace!(class = %compiled.name, at = found.start, "match rejected by validator");
            return None;
        };

        Some(Lexeme {
            class: found.class,
            start: found.start,
            end: found.end,
            args,
            can_open,
            can_close,
        })
    }

    fn assemble<'a>(
        &self,
        text: &'a str,
        base: usize,
        depth: usize,
        mut lexemes: Vec<Lexeme>,
    ) -> Vec<Token<'a>> {
        let closers = self.pair(&lexemes);
        let mut tokens = Vec::with_capacity(lexemes.len() * 2 + 1);
        let mut cursor = 0;
        let mut i = 0;

        while i < lexemes.len() {
            let compiled = self.matcher.class(lexemes[i].class);
            let options = compiled.class.options();
            let start = lexemes[i].start;

            let opens = match compiled.class.classification() {
                Classification::Single => {
                    push_text(&mut tokens, text, base, cursor, start);
                    let end = lexemes[i].end;
                    tokens.push(self.tag(&mut lexemes[i], text, base, end, TagKind::Single, None, None));
                    cursor = end;
                    i += 1;
                    continue;
                }
                Classification::Open => true,
                Classification::Symmetric => lexemes[i].can_open,
                Classification::Close => false,
            };

            if !opens {
                trace!(class = %compiled.name, at = start, "unmatched closer left as text");
                i += 1;
                continue;
            }

            if let Some(j) = closers[i] {
                let open_end = lexemes[i].end;
                let close_start = lexemes[j].start;
                let close_end = lexemes[j].end;
                let body = &text[open_end..close_start];

                let children = if options.contains(TokenOptions::NO_PARSE_INNER) {
                    None
                } else if depth >= self.max_depth {
                    trace!(class = %compiled.name, depth, "nesting limit reached, body kept as text");
                    let mut flat = Vec::new();
                    push_text(&mut flat, text, base, open_end, close_start);
                    Some(flat)
                } else {
                    Some(self.tokenize_at(body, base + open_end, depth + 1))
                };

                push_text(&mut tokens, text, base, cursor, start);
                tokens.push(self.tag(
                    &mut lexemes[i],
                    text,
                    base,
                    close_end,
                    TagKind::Paired,
                    Some(body),
                    children,
                ));
                cursor = close_end;
                i = j + 1;
            } else if options.contains(TokenOptions::POSSIBLE_SINGLE) {
                let open_end = lexemes[i].end;
                let next = lexemes.get(i + 1).map_or(text.len(), |l| l.start);
                let body = if options.takes_body_arg() {
                    Some(adjacent_word(&text[open_end..next])).filter(|word| !word.is_empty())
                } else {
                    None
                };
                let end = open_end + body.map_or(0, str::len);

                push_text(&mut tokens, text, base, cursor, start);
                tokens.push(self.tag(&mut lexemes[i], text, base, end, TagKind::Single, body, None));
                cursor = end;
                i += 1;
            } else {
                trace!(class = %compiled.name, at = start, "unclosed opener left as text");
                i += 1;
            }
        }

        push_text(&mut tokens, text, base, cursor, text.len());
        tokens
    }

    /// For every opener, the index of the lexeme that closes it.
    ///
    /// Open/close tags nest: a closer pops the most recent opener of its
    /// tag. A symmetric lexeme that can close pairs with every pending
    /// opener of its tag. Openers inside a paired body are answered too;
    /// `assemble` skips them and pairs them again when the body is
    /// tokenized.
    fn pair(&self, lexemes: &[Lexeme]) -> Vec<Option<usize>> {
        let tags = self.matcher.tag_count();
        let mut closers = vec![None; lexemes.len()];
        let mut abandoned = vec![false; lexemes.len()];
        let mut open: Vec<Vec<usize>> = vec![Vec::new(); tags];
        // Unabandoned PossibleSingle openers per tag, in lexeme order.
        let mut singles: Vec<Vec<usize>> = vec![Vec::new(); tags];

        for (index, lexeme) in lexemes.iter().enumerate() {
            let compiled = self.matcher.class(lexeme.class);
            let tag = compiled.tag_id;
            let classification = compiled.class.classification();

            let closes = match classification {
                Classification::Close => true,
                Classification::Symmetric => lexeme.can_close && !open[tag].is_empty(),
                Classification::Open | Classification::Single => false,
            };

            if closes {
                // First lexeme of the section this closer ends, if any.
                let anchor = match classification {
                    Classification::Symmetric => open[tag].first().copied(),
                    _ => open[tag].last().copied(),
                };
                for (other, pending) in singles.iter_mut().enumerate() {
                    if other == tag {
                        continue;
                    }
                    while let Some(&opener) = pending.last() {
                        if anchor.is_some_and(|anchor| opener < anchor) {
                            break;
                        }
                        trace!(at = lexemes[opener].start, "unrelated closer ends a possible single");
                        abandoned[opener] = true;
                        pending.pop();
                    }
                }

                if classification == Classification::Symmetric {
                    for opener in open[tag].drain(..) {
                        if !abandoned[opener] {
                            closers[opener] = Some(index);
                        }
                    }
                    singles[tag].clear();
                } else if let Some(opener) = open[tag].pop() {
                    if singles[tag].last() == Some(&opener) {
                        singles[tag].pop();
                    }
                    if !abandoned[opener] {
                        closers[opener] = Some(index);
                    }
                }
            }

            let opens = match classification {
                Classification::Open => true,
                Classification::Symmetric => lexeme.can_open,
                Classification::Close | Classification::Single => false,
            };
            if opens {
                open[tag].push(index);
                if compiled.class.options().contains(TokenOptions::POSSIBLE_SINGLE) {
                    singles[tag].push(index);
                }
            }
        }

        closers
    }

    #[allow(clippy::too_many_arguments)]
    fn tag<'a>(
        &self,
        lexeme: &mut Lexeme,
        text: &'a str,
        base: usize,
        end: usize,
        kind: TagKind,
        body: Option<&'a str>,
        children: Option<Vec<Token<'a>>>,
    ) -> Token<'a> {
        let compiled = self.matcher.class(lexeme.class);
        Token::Tag(TagToken::build(
            compiled,
            kind,
            std::mem::take(&mut lexeme.args),
            &text[lexeme.start..end],
            body,
            children,
            Span::from_range(base, lexeme.start, end),
        ))
    }
}

fn push_text<'a>(tokens: &mut Vec<Token<'a>>, text: &'a str, base: usize, start: usize, end: usize) {
    if start < end {
        tokens.push(Token::Text(TextToken::borrowed(
            &text[start..end],
            Span::from_range(base, start, end),
        )));
    }
}

/// The run of non-whitespace text at the start of `text`.
fn adjacent_word(text: &str) -> &str {
    let end = text.find(char::is_whitespace).unwrap_or(text.len());
    &text[..end]
}

#[inline]
fn boundary_before(text: &str, pos: usize) -> bool {
    text[..pos].chars().next_back().map_or(true, char::is_whitespace)
}

#[inline]
fn boundary_after(text: &str, pos: usize) -> bool {
    text[pos..].chars().next().map_or(true, char::is_whitespace)
}

#[inline]
fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .chars()
        .next()
        .map_or(text.len(), |c| pos + c.len_utf8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::TokenClass;
    use crate::options::TokenOption;

    fn tokenizer(classes: &[(&str, TokenClass)]) -> Tokenizer {
        let matcher = Matcher::compile(classes.iter().map(|(name, class)| (*name, class))).unwrap();
        Tokenizer::new(Arc::new(matcher), DEFAULT_MAX_DEPTH)
    }

    fn closers(tokenizer: &Tokenizer, text: &str) -> Vec<Option<usize>> {
        tokenizer.pair(&tokenizer.scan(text))
    }

    fn bbcode_pairs(link_options: TokenOptions) -> Tokenizer {
        tokenizer(&[
            ("url", TokenClass::open(r"\[url(?:=(?P<href>[^\]]*))?\]").with_options(link_options)),
            ("/url", TokenClass::close(r"\[/url\]").pairs_with("url")),
            ("b", TokenClass::open(r"\[b\]")),
            ("/b", TokenClass::close(r"\[/b\]").pairs_with("b")),
            ("i", TokenClass::open(r"\[i\]")),
            ("/i", TokenClass::close(r"\[/i\]").pairs_with("i")),
        ])
    }

    #[test]
    fn nested_tags_pair_inside_out() {
        let t = bbcode_pairs(TokenOptions::empty());
        assert_eq!(
            closers(&t, "[b][b]x[/b][/b]"),
            vec![Some(3), Some(2), None, None]
        );
    }

    #[test]
    fn crossed_tags_pair_by_tag() {
        let t = bbcode_pairs(TokenOptions::empty());
        assert_eq!(closers(&t, "[b][i]x[/b][/i]"), vec![Some(2), Some(3), None, None]);
    }

    #[test]
    fn stray_closer_cuts_off_a_possible_single() {
        let t = bbcode_pairs(TokenOptions::POSSIBLE_SINGLE);
        assert_eq!(closers(&t, "[url]a.io [/i] tail [/url]"), vec![None, None, None]);
    }

    #[test]
    fn closer_of_an_outer_section_cuts_off_a_possible_single() {
        let t = bbcode_pairs(TokenOptions::POSSIBLE_SINGLE);
        assert_eq!(closers(&t, "[b][url]x.io[/b][/url]"), vec![Some(2), None, None, None]);
    }

    #[test]
    fn sections_nested_in_a_possible_single_do_not_cut_it_off() {
        let t = bbcode_pairs(TokenOptions::POSSIBLE_SINGLE);
        assert_eq!(
            closers(&t, "[url=a.io][b]x[/b][/url]"),
            vec![Some(3), Some(2), None, None]
        );
    }

    #[test]
    fn unrelated_closers_do_not_cut_off_plain_openers() {
        let t = bbcode_pairs(TokenOptions::empty());
        assert_eq!(closers(&t, "[url]a.io [/i] tail [/url]"), vec![Some(2), None, None]);
    }

    #[test]
    fn symmetric_pairs_with_next_closing_occurrence() {
        let t = tokenizer(&[("*", TokenClass::symmetric(r"\*"))]);
        // `a *b* c *d*`: openers at 0 and 2, closers at 1 and 3.
        assert_eq!(
            closers(&t, "a *b* c *d*"),
            vec![Some(1), None, Some(3), None]
        );
    }

    #[test]
    fn unclosed_openers_pair_in_one_pass() {
        let t = bbcode_pairs(TokenOptions::POSSIBLE_SINGLE);
        let text = "[b][url]".repeat(100_000);
        let result = closers(&t, &text);
        assert_eq!(result.len(), 200_000);
        assert!(result.iter().all(Option::is_none));
    }

    #[test]
    fn rejected_matches_fall_back_to_later_classes_at_the_same_spot() {
        let t = tokenizer(&[
            ("strict", TokenClass::single(r"x\d").with_option(TokenOption::DisallowMidWord)),
            ("loose", TokenClass::single(r"x\d")),
        ]);
        let lexemes = t.scan("ax1 x2");
        let found: Vec<_> = lexemes.iter().map(|l| (l.class, l.start)).collect();
        assert_eq!(found, vec![(1, 1), (0, 4)]);
    }
}
