//! Expansion of macro-annotated symbols (`Macro@Argument`).

use crate::dialect::Dialect;
use crate::model::*;
use log::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    /// Any declared terminal except the argument.
    AnythingBut,
}

impl Modifier {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "AnythingBut" => Some(Modifier::AnythingBut),
            _ => None,
        }
    }
}

/// Replaces every alternative containing a recognized modifier by its
/// concrete alternatives. Unrecognized modifiers are left in place.
pub fn expand(mut grammar: Grammar, dialect: &Dialect) -> Grammar {
    let tokens = grammar.tokens.clone();
    for rule in &mut grammar.rules {
        let before = rule.alternatives.len();
        rule.alternatives = std::mem::take(&mut rule.alternatives)
            .into_iter()
            .flat_map(|alt| {
                report_unrecognized(&rule.name, &alt, &tokens, dialect);
                expand_alternative(alt, &tokens, dialect)
            })
            .collect();
        if rule.alternatives.len() != before {
            debug!(
                "Expanded <{}> from {} to {} alternatives",
                rule.name,
                before,
                rule.alternatives.len()
            );
        }
    }
    grammar
}

/// Expands the leftmost recognized modifier, then recurses on each result
/// so that several modifiers form a cartesian product.
pub fn expand_alternative(alt: Alternative, tokens: &[Terminal], dialect: &Dialect) -> Vec<Alternative> {
    let found = alt.symbols.iter().enumerate().find_map(|(i, sym)| {
        let (modifier, argument) = modifier_of(sym, dialect)?;
        Some((i, modifier, argument.to_string()))
    });
    let Some((position, Modifier::AnythingBut, except)) = found else {
        return vec![alt];
    };

    tokens
        .iter()
        .filter(|t| t.name != except)
        .flat_map(|t| {
            let mut symbols = alt.symbols.clone();
            symbols[position] = Symbol::Terminal(t.clone());
            expand_alternative(Alternative::new(symbols), tokens, dialect)
        })
        .collect()
}

fn modifier_of<'a>(sym: &'a Symbol, dialect: &Dialect) -> Option<(Modifier, &'a str)> {
    let Symbol::Terminal(t) = sym else {
        return None;
    };
    let (name, argument) = dialect.split_macro(&t.name)?;
    Some((Modifier::from_name(name)?, argument))
}

fn report_unrecognized(rule: &str, alt: &Alternative, tokens: &[Terminal], dialect: &Dialect) {
    for sym in &alt.symbols {
        let Symbol::Terminal(t) = sym else { continue };
        let Some((name, argument)) = dialect.split_macro(&t.name) else {
            continue;
        };
        if Modifier::from_name(name).is_none() {
            warn!("<{}>: unknown modifier `{}`, left unexpanded", rule, name);
        } else if !tokens.iter().any(|tok| tok.name == argument) {
            warn!("<{}>: `{}` excludes undeclared token `{}`", rule, t.name, argument);
        }
    }
}
