use crate::error::{GrammarError, Result};
use crate::first::FirstSets;
use crate::model::*;
use log::debug;
use std::collections::HashSet;

/// Runs all checks in order and stops at the first failure.
pub fn validate(grammar: &Grammar, first: &mut FirstSets) -> Result<()> {
    check_tokens(grammar)?;
    check_references(grammar)?;
    check_determinism(grammar, first)?;
    debug!("Grammar passed validation");
    Ok(())
}

/// Every terminal used in a rule must be declared.
pub fn check_tokens(grammar: &Grammar) -> Result<()> {
    let declared: HashSet<&str> = grammar.tokens.iter().map(|t| t.name.as_str()).collect();
    for rule in &grammar.rules {
        for alt in rule.alternatives.iter().filter(|a| !a.is_epsilon()) {
            for sym in &alt.symbols {
                if let Symbol::Terminal(t) = sym {
                    if !declared.contains(t.name.as_str()) {
                        return Err(GrammarError::UndeclaredToken {
                            rule: rule.name.clone(),
                            token: t.name.clone(),
                        });
                    }
                }
            }
        }
    }
    Ok(())
}

/// Every non-terminal used in a rule must have a rule of its own.
pub fn check_references(grammar: &Grammar) -> Result<()> {
    let defined: HashSet<&str> = grammar.rules.iter().map(|r| r.name.as_str()).collect();
    for rule in &grammar.rules {
        for sym in rule.alternatives.iter().flat_map(|a| &a.symbols) {
            if let Symbol::NonTerminal(name) = sym {
                if !defined.contains(name.as_str()) {
                    return Err(GrammarError::UndefinedRule {
                        rule: rule.name.clone(),
                        name: name.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Alternatives led by distinct non-terminals must have disjoint FIRST
/// sets. Alternatives sharing a leading symbol are left to factoring.
pub fn check_determinism(grammar: &Grammar, first: &mut FirstSets) -> Result<()> {
    for rule in &grammar.rules {
        let leads: Vec<&Symbol> = rule
            .alternatives
            .iter()
            .map(Alternative::leading)
            .filter(|s| matches!(s, Symbol::NonTerminal(_)))
            .collect();

        for (i, left) in leads.iter().enumerate() {
            for right in leads.iter().skip(i + 1) {
                if left == right {
                    continue;
                }
                let left_set = first.first_set(left)?;
                let right_set = first.first_set(right)?;
                let shared: Vec<String> = left_set
                    .intersection(&right_set)
                    .map(|s| s.to_string())
                    .collect();
                if !shared.is_empty() {
                    return Err(GrammarError::Ambiguity {
                        rule: rule.name.clone(),
                        left: left.to_string(),
                        right: right.to_string(),
                        shared,
                    });
                }
            }
        }
    }
    Ok(())
}
