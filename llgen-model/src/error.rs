use itertools::Itertools;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GrammarError>;

/// Coarse classification of a [`GrammarError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Load,
    Reference,
    Ambiguity,
    LeftRecursion,
    GenerationInvariant,
}

/// Everything that can abort a generation run.
///
/// Every variant is fatal: the pipeline stops at the first error and no
/// partial output is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("line {line}: {message}: `{text}`")]
    Load {
        line: usize,
        text: String,
        message: String,
    },

    #[error("rule <{rule}> uses undeclared token `{token}`")]
    UndeclaredToken { rule: String, token: String },

    #[error("rule <{rule}> references undefined rule <{name}>")]
    UndefinedRule { rule: String, name: String },

    #[error(
        "rule <{rule}> is ambiguous: alternatives led by {left} and {right} both start with {}",
        .shared.join(", ")
    )]
    Ambiguity {
        rule: String,
        left: String,
        right: String,
        shared: Vec<String>,
    },

    #[error("rule <{rule}> is left-recursive: {}", chain(.cycle))]
    LeftRecursion { rule: String, cycle: Vec<String> },

    #[error("rule <{rule}>: {message}")]
    Invariant { rule: String, message: String },
}

fn chain(cycle: &[String]) -> String {
    cycle.iter().map(|name| format!("<{}>", name)).join(" -> ")
}

impl GrammarError {
    pub fn load(line: usize, text: impl Into<String>, message: impl Into<String>) -> Self {
        GrammarError::Load {
            line,
            text: text.into(),
            message: message.into(),
        }
    }

    pub fn invariant(rule: impl Into<String>, message: impl Into<String>) -> Self {
        GrammarError::Invariant {
            rule: rule.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            GrammarError::Load { .. } => ErrorKind::Load,
            GrammarError::UndeclaredToken { .. } | GrammarError::UndefinedRule { .. } => {
                ErrorKind::Reference
            }
            GrammarError::Ambiguity { .. } => ErrorKind::Ambiguity,
            GrammarError::LeftRecursion { .. } => ErrorKind::LeftRecursion,
            GrammarError::Invariant { .. } => ErrorKind::GenerationInvariant,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguity_message_lists_shared_tokens() {
        let err = GrammarError::Ambiguity {
            rule: "A".into(),
            left: "<B>".into(),
            right: "<C>".into(),
            shared: vec!["z".into(), "w".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("<A>"));
        assert!(msg.contains("<B> and <C>"));
        assert!(msg.ends_with("z, w"));
        assert_eq!(err.kind(), ErrorKind::Ambiguity);
    }

    #[test]
    fn test_left_recursion_message_shows_cycle() {
        let err = GrammarError::LeftRecursion {
            rule: "A".into(),
            cycle: vec!["A".into(), "B".into(), "A".into()],
        };
        assert!(err.to_string().contains("<A> -> <B> -> <A>"));
    }
}
