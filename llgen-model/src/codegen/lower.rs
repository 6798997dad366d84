//! Factored branches -> parser IR.
//!
//! All routing decisions are made here, so the printer never fails.

use super::ir::*;
use crate::error::{GrammarError, Result};
use crate::first::FirstSets;
use crate::model::*;
use log::debug;
use std::iter;

pub fn lower(grammar: &Grammar, functions: &[ParseFunction], first: &mut FirstSets) -> Result<Module> {
    let start = grammar
        .start()
        .ok_or_else(|| GrammarError::load(0, "", "grammar defines no rules"))?
        .name
        .clone();

    let functions = functions
        .iter()
        .map(|f| {
            check_name(&f.name)?;
            let body = Lowering {
                rule: &f.name,
                first: &mut *first,
            }
            .choice(&f.branches)?;
            Ok(Function {
                rule: f.name.clone(),
                body,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!("Lowered {} parse functions", functions.len());
    Ok(Module {
        node_types: grammar.rules.iter().map(|r| r.name.clone()).collect(),
        functions,
        start,
    })
}

/// Rule names become Rust identifiers; these cannot even be raw ones.
fn check_name(name: &str) -> Result<()> {
    if matches!(name, "self" | "Self" | "super" | "crate") {
        return Err(GrammarError::load(
            0,
            format!("<{}>", name),
            "rule name cannot be used as a Rust identifier",
        ));
    }
    Ok(())
}

/// A concrete sibling together with its routing condition.
struct Route<'b> {
    branch: &'b Branch,
    lookahead: Vec<Terminal>,
    nullable: bool,
}

struct Lowering<'a, 'g> {
    rule: &'a str,
    first: &'a mut FirstSets<'g>,
}

impl Lowering<'_, '_> {
    fn choice(&mut self, branches: &[Branch]) -> Result<Block> {
        if let [only] = branches {
            if only.is_epsilon() {
                return self.branch(only);
            }
        }
        if branches.is_empty() {
            return Err(GrammarError::invariant(self.rule, "no alternatives to choose from"));
        }

        let epsilon = branches.iter().find(|b| b.is_epsilon());
        let mut routes = Vec::new();
        for branch in branches.iter().filter(|b| !b.is_epsilon()) {
            routes.push(Route {
                branch,
                lookahead: self.first.lookahead(&branch.first)?,
                nullable: self.first.is_nullable(&branch.first)?,
            });
        }
        self.check_disjoint(&routes, epsilon.is_some())?;

        let style = if routes.len() > 2 {
            DispatchStyle::Match
        } else {
            DispatchStyle::IfChain
        };

        // Without an epsilon sibling, a branch led by a nullable rule takes
        // every token the other arms do not.
        let nullable_fallback = match epsilon {
            Some(_) => None,
            None => routes.iter().position(|r| r.nullable),
        };
        if let Some(i) = nullable_fallback {
            self.check_continuation(&routes, i)?;
        }

        let mut arms = Vec::new();
        let mut fallback_body = None;
        for (i, route) in routes.into_iter().enumerate() {
            let body = self.branch(route.branch)?;
            if Some(i) == nullable_fallback {
                fallback_body = Some(body);
            } else if route.lookahead.is_empty() {
                return Err(GrammarError::invariant(
                    self.rule,
                    format!("branch led by {} has no lookahead", route.branch.first),
                ));
            } else {
                arms.push(Arm {
                    lookahead: route.lookahead,
                    body,
                });
            }
        }

        let fallback = match (epsilon, fallback_body) {
            (Some(eps), _) => Fallback::Body(Box::new(self.branch(eps)?)),
            (None, Some(body)) => Fallback::Body(Box::new(body)),
            (None, None) => Fallback::Error {
                expected: arms.iter().flat_map(|a| a.lookahead.iter().cloned()).collect(),
            },
        };

        Ok(Block {
            steps: Vec::new(),
            tail: Tail::Dispatch(Dispatch {
                style,
                arms,
                fallback,
            }),
        })
    }

    /// Siblings must be selectable by one token, and at most one of them
    /// may match the empty input.
    fn check_disjoint(&self, routes: &[Route], has_epsilon: bool) -> Result<()> {
        for (i, left) in routes.iter().enumerate() {
            if has_epsilon && left.nullable {
                return Err(self.ambiguity(&left.branch.first, &Symbol::Epsilon, vec!["ε".into()]));
            }
            for right in routes.iter().skip(i + 1) {
                let mut shared: Vec<String> = left
                    .lookahead
                    .iter()
                    .filter(|t| right.lookahead.contains(t))
                    .map(|t| t.name.clone())
                    .collect();
                if left.nullable && right.nullable {
                    shared.push("ε".into());
                }
                if !shared.is_empty() {
                    return Err(self.ambiguity(&left.branch.first, &right.branch.first, shared));
                }
            }
        }
        Ok(())
    }

    /// When the fallback's lead derives nothing, the token after it must
    /// still not belong to another arm.
    fn check_continuation(&mut self, routes: &[Route], fallback: usize) -> Result<()> {
        let lead = routes[fallback].branch;
        let follow = self.continuation(lead)?;
        for (_, other) in routes.iter().enumerate().filter(|(i, _)| *i != fallback) {
            let shared: Vec<String> = follow
                .iter()
                .filter(|t| other.lookahead.contains(t))
                .map(|t| t.name.clone())
                .collect();
            if !shared.is_empty() {
                return Err(self.ambiguity(&lead.first, &other.branch.first, shared));
            }
        }
        Ok(())
    }

    /// Terminals that can start what follows `branch.first`.
    fn continuation(&mut self, branch: &Branch) -> Result<Vec<Terminal>> {
        let mut follow = Vec::new();
        for sym in &branch.common {
            merge(&mut follow, self.first.lookahead(sym)?);
            if !self.first.is_nullable(sym)? {
                return Ok(follow);
            }
        }
        for sub in branch.sub_branches.iter().filter(|b| !b.is_epsilon()) {
            merge(&mut follow, self.first.lookahead(&sub.first)?);
            if self.first.is_nullable(&sub.first)? {
                let rest = self.continuation(sub)?;
                merge(&mut follow, rest);
            }
        }
        Ok(follow)
    }

    fn ambiguity(&self, left: &Symbol, right: &Symbol, shared: Vec<String>) -> GrammarError {
        GrammarError::Ambiguity {
            rule: self.rule.to_string(),
            left: left.to_string(),
            right: right.to_string(),
            shared,
        }
    }

    fn branch(&mut self, branch: &Branch) -> Result<Block> {
        if branch.first.is_epsilon() {
            if branch.common.is_empty() && branch.sub_branches.is_empty() {
                return Ok(Block::finish());
            }
            return Err(GrammarError::invariant(self.rule, "ε inside an alternative"));
        }

        let mut steps = Vec::new();
        for sym in iter::once(&branch.first).chain(&branch.common) {
            steps.push(match sym {
                Symbol::Terminal(t) => Step::Match(t.clone()),
                Symbol::NonTerminal(name) => Step::Call(name.clone()),
                Symbol::Epsilon => {
                    return Err(GrammarError::invariant(self.rule, "ε inside an alternative"))
                }
            });
        }

        if branch.sub_branches.is_empty() {
            return Ok(Block {
                steps,
                tail: Tail::Finish,
            });
        }
        let inner = self.choice(&branch.sub_branches)?;
        steps.extend(inner.steps);
        Ok(Block {
            steps,
            tail: inner.tail,
        })
    }
}

fn merge(into: &mut Vec<Terminal>, more: Vec<Terminal>) {
    for t in more {
        if !into.contains(&t) {
            into.push(t);
        }
    }
}
