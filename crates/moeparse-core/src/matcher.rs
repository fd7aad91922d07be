//! Combined matcher: every registered pattern folded into one regex.
//!
//! Each class pattern is first compiled on its own, which validates it and
//! fixes the number and names of its capture groups. The pattern is then
//! parsed into a syntax tree, its group names are cleared, and it is
//! printed back inside a capturing group:
//!
//! ```text
//! class "b":       \[b\]                  ->  (\[b\])
//! class "mention": (^|\s)@(?P<user>\S+)   ->  ((^|\s)@(\S+))
//! combined:        (\[b\])|((^|\s)@(\S+))
//! ```
//!
//! Group names therefore never collide across classes. A reverse map from
//! combined group index to class index identifies which alternative
//! matched; the class's arguments are the groups directly after its
//! wrapper, and names are resolved through the class's own name table.
//!
//! Alternatives are tried in registration order, so when two classes match
//! at the same position the one registered first wins.
//!
//! Every class also keeps a second compilation for anchored searches, used
//! when the tokenizer rejects a combined match and retries the remaining
//! classes at exactly that position.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;
use regex_automata::{meta, Anchored, Input};
use regex_syntax::ast::parse::Parser;
use regex_syntax::ast::print::Printer;
use regex_syntax::ast::{Ast, GroupKind};
use tracing::debug;

use crate::args::TokenArgs;
use crate::class::TokenClass;
use crate::error::CompileError;
use crate::options::Classification;

/// Name used in errors that concern the combined pattern as a whole.
const COMBINED: &str = "<combined>";

/// A registered class together with its compiled pattern data.
pub(crate) struct CompiledClass {
    pub(crate) name: Arc<str>,
    pub(crate) tag: Arc<str>,
    /// Dense index of `tag`, shared by every class pairing on it.
    pub(crate) tag_id: usize,
    pub(crate) class: TokenClass,
    anchored: meta::Regex,
    names: HashMap<String, usize>,
    group: usize,
    arg_count: usize,
}

impl CompiledClass {
    fn args_from(&self, values: Vec<String>) -> TokenArgs {
        TokenArgs::new(values, self.names.clone())
    }
}

/// A successful match, before any tokenizer rule has been applied.
#[derive(Debug)]
pub(crate) struct RawMatch {
    pub(crate) class: usize,
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) args: TokenArgs,
}

/// All registered classes compiled into one scanning pass.
pub(crate) struct Matcher {
    combined: Option<Regex>,
    classes: Vec<CompiledClass>,
    /// Combined group index -> class index, for wrapper groups only.
    owners: Vec<Option<usize>>,
    tags: usize,
}

impl Matcher {
    /// A matcher that recognizes nothing.
    pub(crate) fn empty() -> Self {
        Self {
            combined: None,
            classes: Vec::new(),
            owners: vec![None],
            tags: 0,
        }
    }

    pub(crate) fn compile<'c, I>(classes: I) -> Result<Self, CompileError>
    where
        I: IntoIterator<Item = (&'c str, &'c TokenClass)>,
    {
        let mut compiled: Vec<CompiledClass> = Vec::new();
        let mut alternatives = Vec::new();
        let mut owners = vec![None];
        let mut tag_ids: HashMap<Arc<str>, usize> = HashMap::new();

        for (name, class) in classes {
            class
                .options()
                .validate()
                .map_err(|message| CompileError::conflict(name, message))?;

            let regex = Regex::new(class.pattern()).map_err(|e| CompileError::pattern(name, &e))?;
            let arg_count = regex.captures_len() - 1;
            let anchored =
                meta::Regex::new(class.pattern()).map_err(|e| CompileError::pattern(name, &e))?;

            let mut names = HashMap::new();
            for (index, group_name) in regex.capture_names().enumerate().skip(1) {
                if let Some(group_name) = group_name {
                    names.insert(group_name.to_string(), index - 1);
                }
            }
            for (alias, position) in class.aliases() {
                if *position >= arg_count {
                    return Err(CompileError::conflict(
                        name,
                        format!(
                            "alias `{}` refers to argument {} but the pattern captures {}",
                            alias, position, arg_count
                        ),
                    ));
                }
                match names.get(alias) {
                    Some(&bound) if bound != *position => {
                        return Err(CompileError::conflict(
                            name,
                            format!(
                                "alias `{}` -> {} collides with the capture group bound to argument {}",
                                alias, position, bound
                            ),
                        ));
                    }
                    _ => {
                        names.insert(alias.clone(), *position);
                    }
                }
            }

            let group = owners.len();
            owners.push(Some(compiled.len()));
            owners.extend(std::iter::repeat(None).take(arg_count));
            alternatives.push(format!("({})", unnamed_groups(name, class.pattern())?));

            let tag: Arc<str> = Arc::from(class.tag().unwrap_or(name));
            let next_id = tag_ids.len();
            let tag_id = *tag_ids.entry(Arc::clone(&tag)).or_insert(next_id);

            compiled.push(CompiledClass {
                name: Arc::from(name),
                tag,
                tag_id,
                class: class.clone(),
                anchored,
                names,
                group,
                arg_count,
            });
        }

        check_pairing_tags(&compiled)?;

        let combined = if alternatives.is_empty() {
            None
        } else {
            let source = alternatives.join("|");
            let regex = Regex::new(&source).map_err(|e| CompileError::pattern(COMBINED, &e))?;
            if regex.captures_len() != owners.len() {
                return Err(CompileError::conflict(
                    COMBINED,
                    format!(
                        "expected {} capture groups, found {}",
                        owners.len(),
                        regex.captures_len()
                    ),
                ));
            }
            Some(regex)
        };

        debug!(
            classes = compiled.len(),
            tags = tag_ids.len(),
            groups = owners.len(),
            "compiled combined matcher"
        );

        Ok(Self {
            combined,
            classes: compiled,
            owners,
            tags: tag_ids.len(),
        })
    }

    #[inline]
    pub(crate) fn class(&self, index: usize) -> &CompiledClass {
        &self.classes[index]
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.classes.len()
    }

    /// Number of distinct pairing tags.
    #[inline]
    pub(crate) fn tag_count(&self) -> usize {
        self.tags
    }

    /// Find the leftmost match of any class starting at or after `start`.
    pub(crate) fn find_at(&self, text: &str, start: usize) -> Option<RawMatch> {
        let combined = self.combined.as_ref()?;
        let caps = combined.captures_at(text, start)?;
        let whole = caps.get(0)?;
        let class = caps
            .iter()
            .enumerate()
            .skip(1)
            .find_map(|(index, group)| group.and(self.owners[index]))?;

        let compiled = &self.classes[class];
        let values = (0..compiled.arg_count)
            .map(|k| {
                caps.get(compiled.group + 1 + k)
                    .map_or_else(String::new, |m| m.as_str().to_string())
            })
            .collect();

        Some(RawMatch {
            class,
            start: whole.start(),
            end: whole.end(),
            args: compiled.args_from(values),
        })
    }

    /// Match one class exactly at `position`, ignoring the others.
    ///
    /// The search is anchored, so it never looks past `position` for a
    /// start; the text before `position` still counts for `^` and other
    /// look-behind assertions.
    pub(crate) fn match_class_at(&self, class: usize, text: &str, position: usize) -> Option<RawMatch> {
        let compiled = &self.classes[class];
        let input = Input::new(text).range(position..).anchored(Anchored::Yes);
        let mut caps = compiled.anchored.create_captures();
        compiled.anchored.search_captures(&input, &mut caps);
        let whole = caps.get_match()?;

        let values = (1..=compiled.arg_count)
            .map(|k| {
                caps.get_group(k)
                    .map_or_else(String::new, |span| text[span.start..span.end].to_string())
            })
            .collect();

        Some(RawMatch {
            class,
            start: whole.start(),
            end: whole.end(),
            args: compiled.args_from(values),
        })
    }
}

/// A pairing tag may be driven by symmetric classes or by open/close
/// classes, never both.
fn check_pairing_tags(classes: &[CompiledClass]) -> Result<(), CompileError> {
    let mut styles: HashMap<&str, (bool, &str)> = HashMap::new();
    for compiled in classes {
        let symmetric = match compiled.class.classification() {
            Classification::Symmetric => true,
            Classification::Open | Classification::Close => false,
            Classification::Single => continue,
        };
        match styles.get(&*compiled.tag) {
            Some(&(seen, other)) if seen != symmetric => {
                return Err(CompileError::conflict(
                    &compiled.name,
                    format!(
                        "pairing tag `{}` is used by both symmetric and open/close classes (also `{}`)",
                        compiled.tag, other
                    ),
                ));
            }
            Some(_) => {}
            None => {
                styles.insert(&*compiled.tag, (symmetric, &*compiled.name));
            }
        }
    }
    Ok(())
}

/// Print `pattern` back with every named group turned into a plain
/// capturing group. Group order, flags and escapes are kept; comments and
/// insignificant whitespace of verbose patterns are dropped.
fn unnamed_groups(class: &str, pattern: &str) -> Result<String, CompileError> {
    let mut ast = Parser::new()
        .parse(pattern)
        .map_err(|e| CompileError::pattern(class, &e))?;
    clear_group_names(&mut ast);

    let mut out = String::with_capacity(pattern.len());
    Printer::new()
        .print(&ast, &mut out)
        .map_err(|e| CompileError::pattern(class, &e))?;
    Ok(out)
}

fn clear_group_names(ast: &mut Ast) {
    match ast {
        Ast::Group(group) => {
            let index = match &group.kind {
                GroupKind::CaptureName { name, .. } => Some(name.index),
                _ => None,
            };
            if let Some(index) = index {
                group.kind = GroupKind::CaptureIndex(index);
            }
            clear_group_names(&mut group.ast);
        }
        Ast::Repetition(repetition) => clear_group_names(&mut repetition.ast),
        Ast::Alternation(alternation) => alternation.asts.iter_mut().for_each(clear_group_names),
        Ast::Concat(concat) => concat.asts.iter_mut().for_each(clear_group_names),
        _ => {}
    }
}
