//! Token classification and per-class behavior options.

use std::fmt;

use bitflags::bitflags;

/// How a token class takes part in nesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Stands alone, e.g. `@alice` or `[hr]`.
    Single,
    /// Starts a section, e.g. `[b]`.
    Open,
    /// Ends a section, e.g. `[/b]`.
    Close,
    /// Starts or ends a section depending on whether one is already open,
    /// e.g. `*` in `*bold*`.
    Symmetric,
}

impl Classification {
    /// Short lowercase name, used in logs and serialized output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Open => "open",
            Self::Close => "close",
            Self::Symmetric => "symmetric",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single behavior flag for a token class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenOption {
    /// Treat an open token with no matching close as a single token.
    PossibleSingle,
    /// Keep the body verbatim instead of tokenizing it again.
    NoParseInner,
    /// Append the raw body text as a trailing argument named `body`.
    TokenBodyAsArg,
    /// Use the body as argument 0 when the token did not capture one,
    /// so `[url]x[/url]` behaves like `[url=x][/url]`.
    AllowTokenBodyAsFirstArg,
    /// Accept matches that start or end inside a word.
    AllowMidWord,
    /// Reject matches that start or end inside a word.
    DisallowMidWord,
    /// The rendered element has no closing tag, e.g. `<img>`.
    HtmlSingle,
}

impl TokenOption {
    /// Every option, in declaration order.
    pub const ALL: [TokenOption; 7] = [
        Self::PossibleSingle,
        Self::NoParseInner,
        Self::TokenBodyAsArg,
        Self::AllowTokenBodyAsFirstArg,
        Self::AllowMidWord,
        Self::DisallowMidWord,
        Self::HtmlSingle,
    ];

    /// The flag this option stands for in a [`TokenOptions`] set.
    pub const fn flag(self) -> TokenOptions {
        match self {
            Self::PossibleSingle => TokenOptions::POSSIBLE_SINGLE,
            Self::NoParseInner => TokenOptions::NO_PARSE_INNER,
            Self::TokenBodyAsArg => TokenOptions::TOKEN_BODY_AS_ARG,
            Self::AllowTokenBodyAsFirstArg => TokenOptions::ALLOW_TOKEN_BODY_AS_FIRST_ARG,
            Self::AllowMidWord => TokenOptions::ALLOW_MID_WORD,
            Self::DisallowMidWord => TokenOptions::DISALLOW_MID_WORD,
            Self::HtmlSingle => TokenOptions::HTML_SINGLE,
        }
    }

    /// Stable snake_case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PossibleSingle => "possible_single",
            Self::NoParseInner => "no_parse_inner",
            Self::TokenBodyAsArg => "token_body_as_arg",
            Self::AllowTokenBodyAsFirstArg => "allow_token_body_as_first_arg",
            Self::AllowMidWord => "allow_mid_word",
            Self::DisallowMidWord => "disallow_mid_word",
            Self::HtmlSingle => "html_single",
        }
    }

    /// Look an option up by its [`as_str`](Self::as_str) name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|opt| opt.as_str() == name)
    }
}

bitflags! {
    /// A set of token class options.
    ///
    /// Each flag mirrors one [`TokenOption`]; the enum is the named view
    /// used by builders and by lookups from configuration strings.
    ///
    /// ```rust
    /// use moeparse_core::{TokenOption, TokenOptions};
    ///
    /// let opts = TokenOptions::POSSIBLE_SINGLE | TokenOption::HtmlSingle.flag();
    /// assert!(opts.contains(TokenOptions::HTML_SINGLE));
    /// assert!(!opts.contains(TokenOptions::NO_PARSE_INNER));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TokenOptions: u8 {
        const POSSIBLE_SINGLE = 1 << 0;
        const NO_PARSE_INNER = 1 << 1;
        const TOKEN_BODY_AS_ARG = 1 << 2;
        const ALLOW_TOKEN_BODY_AS_FIRST_ARG = 1 << 3;
        const ALLOW_MID_WORD = 1 << 4;
        const DISALLOW_MID_WORD = 1 << 5;
        const HTML_SINGLE = 1 << 6;
    }
}

impl TokenOptions {
    /// Iterate over the options in the set, in declaration order.
    pub fn options(self) -> impl Iterator<Item = TokenOption> {
        TokenOption::ALL
            .into_iter()
            .filter(move |opt| self.contains(opt.flag()))
    }

    /// Reject option combinations that contradict each other.
    pub fn validate(self) -> Result<(), String> {
        if self.contains(Self::ALLOW_MID_WORD | Self::DISALLOW_MID_WORD) {
            return Err("allow_mid_word and disallow_mid_word are mutually exclusive".to_string());
        }
        Ok(())
    }

    /// Whether the body of a token feeds into its arguments.
    #[inline]
    pub(crate) fn takes_body_arg(self) -> bool {
        self.intersects(Self::TOKEN_BODY_AS_ARG | Self::ALLOW_TOKEN_BODY_AS_FIRST_ARG)
    }
}

impl Default for TokenOptions {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<TokenOption> for TokenOptions {
    fn from(option: TokenOption) -> Self {
        option.flag()
    }
}

impl FromIterator<TokenOption> for TokenOptions {
    fn from_iter<I: IntoIterator<Item = TokenOption>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), |set, option| set | option.flag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_option_has_its_own_flag() {
        let all: TokenOptions = TokenOption::ALL.into_iter().collect();
        assert_eq!(all, TokenOptions::all());
        assert_eq!(all.options().collect::<Vec<_>>(), TokenOption::ALL);
    }

    #[test]
    fn names_round_trip() {
        for option in TokenOption::ALL {
            assert_eq!(TokenOption::from_name(option.as_str()), Some(option));
        }
        assert_eq!(TokenOption::from_name("bogus"), None);
    }

    #[test]
    fn mid_word_flags_conflict() {
        let both = TokenOptions::ALLOW_MID_WORD | TokenOptions::DISALLOW_MID_WORD;
        assert!(both.validate().is_err());
        assert!(TokenOptions::ALLOW_MID_WORD.validate().is_ok());
        assert!(TokenOptions::default().validate().is_ok());
    }
}
