//! Grammar text -> [`Grammar`].
//!
//! ```text
//! // comment
//! %tokens
//! a, b, KW_while
//! %rules
//! <S> -> a <S>
//!      | ε
//! ```

use crate::dialect::Dialect;
use crate::error::{GrammarError, Result};
use crate::model::*;
use log::debug;
use std::collections::HashSet;

/// A source line with its 1-based line number.
type Line<'a> = (usize, &'a str);

pub fn load(text: &str, dialect: &Dialect) -> Result<Grammar> {
    let lines: Vec<Line> = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l))
        .filter(|(_, l)| !dialect.is_comment(l))
        .collect();

    let tokens_at = find_header(&lines, &dialect.tokens_header)?;
    let rules_at = find_header(&lines, &dialect.rules_header)?;
    if rules_at < tokens_at {
        let (no, text) = lines[rules_at];
        return Err(GrammarError::load(
            no,
            text.trim(),
            "rules section precedes tokens section",
        ));
    }
    if let Some(&(no, text)) = lines[..tokens_at].iter().find(|(_, l)| !l.trim().is_empty()) {
        return Err(GrammarError::load(
            no,
            text.trim(),
            "text before tokens section",
        ));
    }

    let tokens = load_tokens(&lines[tokens_at + 1..rules_at], dialect)?;
    let rules = load_rules(&lines[rules_at + 1..], dialect)?;
    debug!(
        "Loaded grammar with {} tokens and {} rules",
        tokens.len(),
        rules.len()
    );
    Ok(Grammar { tokens, rules })
}

fn find_header(lines: &[Line], header: &str) -> Result<usize> {
    lines
        .iter()
        .position(|(_, l)| l.trim() == header)
        .ok_or_else(|| GrammarError::load(0, header, "missing section header"))
}

fn load_tokens(lines: &[Line], dialect: &Dialect) -> Result<Vec<Terminal>> {
    let mut tokens = Vec::new();
    let mut seen = HashSet::new();
    for &(no, line) in lines {
        for entry in line.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            if !is_name(entry) {
                return Err(GrammarError::load(no, entry, "invalid token name"));
            }
            if !seen.insert(entry) {
                return Err(GrammarError::load(no, entry, "duplicate token"));
            }
            tokens.push(dialect.terminal(entry));
        }
    }
    Ok(tokens)
}

/// Joins continuation lines (those without the arrow) onto the previous
/// rule line.
fn logical_lines(lines: &[Line], dialect: &Dialect) -> Result<Vec<(usize, String)>> {
    let mut logical: Vec<(usize, String)> = Vec::new();
    for &(no, line) in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.contains(dialect.arrow.as_str()) {
            logical.push((no, line.to_string()));
        } else if let Some((_, last)) = logical.last_mut() {
            last.push(' ');
            last.push_str(line);
        } else {
            return Err(GrammarError::load(
                no,
                line,
                "continuation line before any rule",
            ));
        }
    }
    Ok(logical)
}

fn load_rules(lines: &[Line], dialect: &Dialect) -> Result<Vec<ProductionRule>> {
    let mut rules: Vec<ProductionRule> = Vec::new();
    for (no, line) in logical_lines(lines, dialect)? {
        let rule = load_rule(no, &line, dialect)?;
        if rules.iter().any(|r| r.name == rule.name) {
            return Err(GrammarError::load(no, line, "duplicate rule"));
        }
        rules.push(rule);
    }
    if rules.is_empty() {
        return Err(GrammarError::load(
            0,
            dialect.rules_header.as_str(),
            "grammar defines no rules",
        ));
    }
    Ok(rules)
}

fn load_rule(no: usize, line: &str, dialect: &Dialect) -> Result<ProductionRule> {
    let (lhs, rhs) = line
        .split_once(dialect.arrow.as_str())
        .ok_or_else(|| GrammarError::load(no, line, "missing rule arrow"))?;

    let name = match parse_symbol(no, lhs.trim(), dialect)? {
        Symbol::NonTerminal(name) => name,
        _ => {
            return Err(GrammarError::load(
                no,
                lhs.trim(),
                "left-hand side must be a non-terminal",
            ))
        }
    };

    let alternatives = rhs
        .split(dialect.alternative.as_str())
        .map(|alt| {
            let symbols = alt
                .split_whitespace()
                .map(|word| parse_symbol(no, word, dialect))
                .collect::<Result<Vec<_>>>()?;
            if symbols.is_empty() {
                return Err(GrammarError::load(
                    no,
                    line,
                    format!("empty alternative in <{}>", name),
                ));
            }
            Ok(Alternative::new(symbols))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ProductionRule::new(name, alternatives))
}

/// Classifies one whitespace-free word of a rule.
pub fn parse_symbol(no: usize, word: &str, dialect: &Dialect) -> Result<Symbol> {
    if word == dialect.epsilon {
        return Ok(Symbol::Epsilon);
    }

    if let Some(inner) = word.strip_prefix('<') {
        let name = inner
            .strip_suffix('>')
            .ok_or_else(|| GrammarError::load(no, word, "unbalanced angle brackets"))?;
        if !is_name(name) {
            return Err(GrammarError::load(no, word, "invalid non-terminal name"));
        }
        return Ok(Symbol::NonTerminal(name.to_string()));
    }

    if word.contains(['<', '>']) {
        return Err(GrammarError::load(no, word, "unbalanced angle brackets"));
    }

    if let Some((modifier, argument)) = dialect.split_macro(word) {
        if !is_name(modifier) || !is_name(argument) {
            return Err(GrammarError::load(no, word, "malformed modifier"));
        }
        return Ok(Symbol::terminal(word));
    }

    if !is_name(word) {
        return Err(GrammarError::load(no, word, "invalid characters in symbol"));
    }
    Ok(Symbol::Terminal(dialect.terminal(word)))
}

fn is_name(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use rstest::rstest;

    fn load_default(text: &str) -> Result<Grammar> {
        load(text, &Dialect::default())
    }

    #[test]
    fn test_load_basic() {
        let g = load_default(
            "// a tiny grammar\n%tokens\na, b,\nKW_if\n%rules\n<S> -> a <S> | ε\n<T> -> KW_if b\n",
        )
        .unwrap();

        assert_eq!(
            g.tokens.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
            vec!["a", "b", "KW_if"]
        );
        assert_eq!(g.tokens[2].keyword.as_deref(), Some("if"));
        assert_eq!(g.rules.len(), 2);

        let s = &g.rules[0];
        assert_eq!(s.name, "S");
        assert_eq!(
            s.alternatives[0].symbols,
            vec![Symbol::terminal("a"), Symbol::non_terminal("S")]
        );
        assert!(s.alternatives[1].is_epsilon());

        let t = g.rule("T").unwrap();
        match &t.alternatives[0].symbols[0] {
            Symbol::Terminal(kw) => assert_eq!(kw.keyword.as_deref(), Some("if")),
            other => panic!("Expected keyword terminal, got {:?}", other),
        }
    }

    #[test]
    fn test_continuation_lines() {
        let g = load_default("%tokens\na, b, c\n%rules\n<S> -> a\n  | b\n\n  | c <S>\n").unwrap();
        assert_eq!(g.rules.len(), 1);
        assert_eq!(g.rules[0].alternatives.len(), 3);
        assert_eq!(g.rules[0].to_string(), "<S> -> a | b | c <S>");
    }

    #[test]
    fn test_modifier_symbol_is_kept() {
        let g = load_default("%tokens\na, b\n%rules\n<S> -> AnythingBut@a b\n").unwrap();
        assert_eq!(
            g.rules[0].alternatives[0].symbols[0],
            Symbol::terminal("AnythingBut@a")
        );
    }

    #[rstest]
    #[case("<S -> a", "<S")]
    #[case("<S> -> a>", "a>")]
    #[case("<S> -> <a", "<a")]
    #[case("<S> -> a$b", "a$b")]
    #[case("<S> -> <1x>", "<1x>")]
    #[case("<S> -> @a", "@a")]
    #[case("S -> a", "S")]
    fn test_malformed_symbols(#[case] rule: &str, #[case] offending: &str) {
        let err = load_default(&format!("%tokens\na\n%rules\n{}\n", rule)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Load);
        match err {
            GrammarError::Load { line, text, .. } => {
                assert_eq!(line, 4);
                assert_eq!(text, offending);
            }
            other => panic!("Expected load error, got {:?}", other),
        }
    }

    #[rstest]
    #[case("%rules\n<S> -> a\n", "missing section header")]
    #[case("%tokens\na\n", "missing section header")]
    #[case("%rules\n<S> -> a\n%tokens\na\n", "rules section precedes")]
    #[case("junk\n%tokens\na\n%rules\n<S> -> a\n", "text before tokens")]
    #[case("%tokens\na, a\n%rules\n<S> -> a\n", "duplicate token")]
    #[case("%tokens\na\n%rules\n| a\n", "continuation line before any rule")]
    #[case("%tokens\na\n%rules\n<S> -> a | | a\n", "empty alternative")]
    #[case("%tokens\na\n%rules\n<S> -> a\n<S> -> a\n", "duplicate rule")]
    #[case("%tokens\na\n%rules\n", "no rules")]
    fn test_structural_errors(#[case] text: &str, #[case] message: &str) {
        let err = load_default(text).unwrap_err();
        assert!(
            err.to_string().contains(message),
            "expected {:?} in {:?}",
            message,
            err.to_string()
        );
    }

    #[test]
    fn test_alternate_dialect() {
        let dialect = Dialect {
            tokens_header: "TOKENS:".into(),
            rules_header: "RULES:".into(),
            arrow: "::=".into(),
            epsilon: "EPS".into(),
            comment: "#".into(),
            ..Dialect::default()
        };
        let g = load("# comment\nTOKENS:\nx\nRULES:\n<A> ::= x <A> | EPS\n", &dialect).unwrap();
        assert_eq!(g.rules[0].alternatives.len(), 2);
        assert!(g.rules[0].alternatives[1].is_epsilon());
    }
}
