use crate::error::{GrammarError, Result};
use crate::model::*;
use indexmap::IndexSet;
use log::trace;
use std::collections::HashMap;

pub type FirstSet = IndexSet<Symbol>;

/// Memoized FIRST sets for one generation run.
///
/// FIRST of a non-terminal is the union of FIRST of each alternative's
/// leading symbol. Only the leading symbol is consulted, even if it can
/// derive epsilon.
pub struct FirstSets<'g> {
    rules: HashMap<&'g str, &'g ProductionRule>,
    cache: HashMap<Symbol, FirstSet>,
    stack: Vec<String>,
}

impl<'g> FirstSets<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self {
            rules: grammar.rules.iter().map(|r| (r.name.as_str(), r)).collect(),
            cache: HashMap::new(),
            stack: Vec::new(),
        }
    }

    pub fn first_set(&mut self, symbol: &Symbol) -> Result<FirstSet> {
        let name = match symbol {
            Symbol::Terminal(_) | Symbol::Epsilon => {
                return Ok(IndexSet::from([symbol.clone()]));
            }
            Symbol::NonTerminal(name) => name,
        };
        if let Some(set) = self.cache.get(symbol) {
            return Ok(set.clone());
        }

        if let Some(pos) = self.stack.iter().position(|n| n == name) {
            let mut cycle = self.stack[pos..].to_vec();
            cycle.push(name.clone());
            return Err(GrammarError::LeftRecursion {
                rule: name.clone(),
                cycle,
            });
        }

        let rule = *self.rules.get(name.as_str()).ok_or_else(|| {
            GrammarError::invariant(
                name.as_str(),
                "FIRST set requested for a rule that does not exist",
            )
        })?;

        self.stack.push(name.clone());
        let mut set = FirstSet::new();
        let mut outcome = Ok(());
        for alt in &rule.alternatives {
            match self.first_set(alt.leading()) {
                Ok(leading) => set.extend(leading),
                Err(e) => {
                    outcome = Err(e);
                    break;
                }
            }
        }
        self.stack.pop();
        outcome?;

        trace!("FIRST(<{}>) = {:?}", name, set);
        self.cache.insert(symbol.clone(), set.clone());
        Ok(set)
    }

    /// The terminals that select `symbol`, i.e. its FIRST set minus epsilon.
    pub fn lookahead(&mut self, symbol: &Symbol) -> Result<Vec<Terminal>> {
        Ok(self
            .first_set(symbol)?
            .into_iter()
            .filter_map(|s| match s {
                Symbol::Terminal(t) => Some(t),
                _ => None,
            })
            .collect())
    }

    pub fn is_nullable(&mut self, symbol: &Symbol) -> Result<bool> {
        Ok(self.first_set(symbol)?.contains(&Symbol::Epsilon))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use crate::error::ErrorKind;
    use crate::loader::load;

    fn grammar(text: &str) -> Grammar {
        load(text, &Dialect::default()).unwrap()
    }

    fn names(set: &FirstSet) -> Vec<String> {
        set.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_terminal_and_epsilon() {
        let g = grammar("%tokens\na\n%rules\n<S> -> a\n");
        let mut first = FirstSets::new(&g);
        assert_eq!(names(&first.first_set(&Symbol::terminal("a")).unwrap()), vec!["a"]);
        assert_eq!(names(&first.first_set(&Symbol::Epsilon).unwrap()), vec!["ε"]);
    }

    #[test]
    fn test_union_over_leading_symbols() {
        let g = grammar(
            "%tokens\na, b, c, d\n%rules\n<S> -> <A> d | c\n<A> -> a | <B> a\n<B> -> b | ε\n",
        );
        let mut first = FirstSets::new(&g);
        let s = first.first_set(&Symbol::non_terminal("S")).unwrap();
        assert_eq!(names(&s), vec!["a", "b", "ε", "c"]);
        assert!(first.is_nullable(&Symbol::non_terminal("B")).unwrap());
        assert_eq!(
            first.lookahead(&Symbol::non_terminal("B")).unwrap(),
            vec![Terminal::new("b")]
        );
    }

    #[test]
    fn test_union_matches_alternatives_and_is_stable() {
        let g = grammar("%tokens\na, b, c\n%rules\n<S> -> <A> | <B> | c\n<A> -> a\n<B> -> b | ε\n");
        let mut first = FirstSets::new(&g);
        let s = Symbol::non_terminal("S");

        let mut union = FirstSet::new();
        for alt in &g.rule("S").unwrap().alternatives {
            union.extend(first.first_set(alt.leading()).unwrap());
        }
        let once = first.first_set(&s).unwrap();
        let twice = first.first_set(&s).unwrap();
        assert_eq!(once, union);
        assert_eq!(once, twice);
        assert_eq!(FirstSets::new(&g).first_set(&s).unwrap(), once);
    }

    #[test]
    fn test_left_recursion_is_reported() {
        let g = grammar("%tokens\na\n%rules\n<A> -> <B> a | a\n<B> -> <A>\n");
        let err = FirstSets::new(&g)
            .first_set(&Symbol::non_terminal("A"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LeftRecursion);
        assert_eq!(
            err,
            GrammarError::LeftRecursion {
                rule: "A".into(),
                cycle: vec!["A".into(), "B".into(), "A".into()],
            }
        );
    }
}
