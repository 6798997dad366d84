use crate::model::Terminal;
use serde::{Deserialize, Serialize};

/// Reserved literals of the grammar text format.
///
/// Missing fields fall back to the defaults when deserialized, so a dialect
/// file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Dialect {
    pub tokens_header: String,
    pub rules_header: String,
    pub arrow: String,
    pub alternative: String,
    pub epsilon: String,
    pub comment: String,
    pub macro_marker: String,
    pub keyword_prefix: Option<String>,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            tokens_header: "%tokens".into(),
            rules_header: "%rules".into(),
            arrow: "->".into(),
            alternative: "|".into(),
            epsilon: "ε".into(),
            comment: "//".into(),
            macro_marker: "@".into(),
            keyword_prefix: Some("KW_".into()),
        }
    }
}

impl Dialect {
    pub fn is_comment(&self, line: &str) -> bool {
        !self.comment.is_empty() && line.trim_start().starts_with(&self.comment)
    }

    /// Builds the terminal for a declared token name, reading the keyword
    /// prefix if this dialect has one.
    pub fn terminal(&self, name: &str) -> Terminal {
        let keyword = self
            .keyword_prefix
            .as_deref()
            .and_then(|prefix| name.strip_prefix(prefix))
            .filter(|rest| !rest.is_empty());
        match keyword {
            Some(kw) => Terminal::keyword(name, kw),
            None => Terminal::new(name),
        }
    }

    /// Splits `Macro@Argument` into its two halves.
    pub fn split_macro<'a>(&self, name: &'a str) -> Option<(&'a str, &'a str)> {
        if self.macro_marker.is_empty() {
            return None;
        }
        name.split_once(self.macro_marker.as_str())
    }
}
