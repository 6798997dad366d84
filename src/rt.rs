//! Runtime support for generated parsers.
//!
//! Generated parse functions thread one lookahead token (`None` at the end
//! of input) through every call and pull further tokens from a plain
//! `Iterator`. Everything they need beyond that lives here.

use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParseError>;

/// A token as seen by a generated parser.
pub trait Lexeme {
    /// Token category, compared against the grammar's terminal names.
    fn kind(&self) -> &str;

    /// The keyword this token spells, if it is one.
    ///
    /// Keyword tokens only match keyword terminals, whatever their kind.
    fn keyword(&self) -> Option<&str> {
        None
    }

    /// Source text, used in error messages.
    fn text(&self) -> &str {
        self.kind()
    }

    fn key(&self) -> Key<'_> {
        Key {
            kind: self.kind(),
            keyword: self.keyword(),
        }
    }
}

/// The parts of a token that `match` dispatch looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key<'a> {
    pub kind: &'a str,
    pub keyword: Option<&'a str>,
}

/// Bare strings act as tokens whose kind is the string itself.
impl Lexeme for &str {
    fn kind(&self) -> &str {
        self
    }
}

/// An owned token, for hand-written lexers and tests.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: String,
    pub keyword: Option<String>,
    pub text: String,
}

impl Token {
    pub fn new(kind: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            keyword: None,
            text: text.into(),
        }
    }

    pub fn keyword(kind: impl Into<String>, keyword: impl Into<String>) -> Self {
        let keyword = keyword.into();
        Self {
            kind: kind.into(),
            text: keyword.clone(),
            keyword: Some(keyword),
        }
    }
}

impl Lexeme for Token {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }

    fn text(&self) -> &str {
        &self.text
    }
}

/// What a terminal requires of a token.
///
/// `Kind` matches plain tokens of that kind and `Keyword` matches keyword
/// tokens spelling that word, so no token satisfies both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expected {
    Kind(&'static str),
    Keyword(&'static str),
}

impl Expected {
    pub fn matches<T: Lexeme + ?Sized>(&self, token: &T) -> bool {
        match *self {
            Expected::Kind(kind) => token.keyword().is_none() && token.kind() == kind,
            Expected::Keyword(keyword) => token.keyword() == Some(keyword),
        }
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Kind(kind) => write!(f, "{}", kind),
            Expected::Keyword(keyword) => write!(f, "`{}`", keyword),
        }
    }
}

/// A parse tree that mirrors the grammar exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseTree<K, T> {
    /// A rule that consumed at least one token, with its children in order.
    Inner { kind: K, children: Vec<ParseTree<K, T>> },
    /// One consumed token.
    Leaf(T),
    /// A rule that matched the empty input.
    Epsilon(K),
}

impl<K, T> ParseTree<K, T> {
    /// Closes a rule: `Epsilon` when nothing was collected, `Inner` otherwise.
    pub fn finish(kind: K, children: Vec<ParseTree<K, T>>) -> Self {
        if children.is_empty() {
            ParseTree::Epsilon(kind)
        } else {
            ParseTree::Inner { kind, children }
        }
    }

    /// The rule tag; `None` for leaves.
    pub fn kind(&self) -> Option<&K> {
        match self {
            ParseTree::Inner { kind, .. } | ParseTree::Epsilon(kind) => Some(kind),
            ParseTree::Leaf(_) => None,
        }
    }

    pub fn children(&self) -> &[ParseTree<K, T>] {
        match self {
            ParseTree::Inner { children, .. } => children,
            _ => &[],
        }
    }

    pub fn token(&self) -> Option<&T> {
        match self {
            ParseTree::Leaf(token) => Some(token),
            _ => None,
        }
    }

    /// All consumed tokens, left to right.
    pub fn tokens(&self) -> Vec<&T> {
        let mut out = Vec::new();
        self.collect_tokens(&mut out);
        out
    }

    fn collect_tokens<'a>(&'a self, out: &mut Vec<&'a T>) {
        match self {
            ParseTree::Leaf(token) => out.push(token),
            ParseTree::Inner { children, .. } => {
                children.iter().for_each(|c| c.collect_tokens(out));
            }
            ParseTree::Epsilon(_) => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("<{rule}>: expected {expected}, found {found}")]
    Mismatch {
        rule: String,
        expected: String,
        found: String,
    },
    #[error("<{rule}>: unexpected {found}, expected one of {}", .expected.join(", "))]
    UnexpectedToken {
        rule: String,
        expected: Vec<String>,
        found: String,
    },
    #[error("unexpected trailing input starting at {found}")]
    TrailingInput { found: String },
}

const END_OF_INPUT: &str = "end of input";

fn describe<T: Lexeme>(token: Option<&T>) -> String {
    match token {
        Some(token) => format!("`{}`", token.text()),
        None => END_OF_INPUT.to_string(),
    }
}

/// Matches and consumes one terminal, yielding its leaf and the next
/// lookahead.
pub fn expect<K, T, I>(
    rule: &str,
    lookahead: Option<T>,
    tokens: &mut I,
    expected: Expected,
) -> Result<(ParseTree<K, T>, Option<T>)>
where
    T: Lexeme,
    I: Iterator<Item = T>,
{
    match lookahead {
        Some(token) if expected.matches(&token) => Ok((ParseTree::Leaf(token), tokens.next())),
        other => Err(ParseError::Mismatch {
            rule: rule.to_string(),
            expected: expected.to_string(),
            found: describe(other.as_ref()),
        }),
    }
}

pub fn lookahead_in<T: Lexeme>(lookahead: Option<&T>, expected: &[Expected]) -> bool {
    lookahead.is_some_and(|token| expected.iter().any(|e| e.matches(token)))
}

/// The error for a lookahead no branch of `rule` accepts.
pub fn unexpected<T: Lexeme>(rule: &str, lookahead: Option<&T>, expected: &[Expected]) -> ParseError {
    ParseError::UnexpectedToken {
        rule: rule.to_string(),
        expected: expected.iter().map(Expected::to_string).collect(),
        found: describe(lookahead),
    }
}

/// Runs `start` over the whole of `tokens` and rejects anything left over.
pub fn parse_all<K, T, I, F>(tokens: I, start: F) -> Result<ParseTree<K, T>>
where
    T: Lexeme,
    I: IntoIterator<Item = T>,
    F: FnOnce(Option<T>, &mut I::IntoIter) -> Result<(ParseTree<K, T>, Option<T>)>,
{
    let mut tokens = tokens.into_iter();
    let lookahead = tokens.next();
    let (tree, rest) = start(lookahead, &mut tokens)?;
    match rest {
        Some(token) => Err(ParseError::TrailingInput {
            found: describe(Some(&token)),
        }),
        None => Ok(tree),
    }
}
