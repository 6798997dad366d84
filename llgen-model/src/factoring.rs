//! Left-factoring of rule alternatives into a one-token decision tree.

use crate::model::*;
use indexmap::IndexMap;
use log::trace;

pub fn factor(grammar: &Grammar) -> Vec<ParseFunction> {
    grammar.rules.iter().map(factor_rule).collect()
}

pub fn factor_rule(rule: &ProductionRule) -> ParseFunction {
    let branches = normalize_branches(leaves(rule));
    trace!("Factored <{}> into {} branches", rule.name, branches.len());
    ParseFunction {
        name: rule.name.clone(),
        branches,
    }
}

/// One unfactored branch per alternative.
pub fn leaves(rule: &ProductionRule) -> Vec<Branch> {
    rule.alternatives
        .iter()
        .map(|alt| {
            if alt.is_epsilon() {
                Branch::epsilon()
            } else {
                Branch::leaf(&alt.symbols)
            }
        })
        .collect()
}

/// Merges siblings sharing a leading symbol, recursively, until every
/// list of siblings has pairwise distinct leading symbols.
///
/// Groups keep the order in which their leading symbol first appeared.
pub fn normalize_branches(branches: Vec<Branch>) -> Vec<Branch> {
    let mut groups: IndexMap<Symbol, Vec<Branch>> = IndexMap::new();
    for branch in branches {
        let members = groups.entry(branch.first.clone()).or_default();
        if !members.contains(&branch) {
            members.push(branch);
        }
    }

    groups
        .into_iter()
        .map(|(first, mut members)| {
            if members.len() == 1 {
                let mut only = members.remove(0);
                only.sub_branches = normalize_branches(only.sub_branches);
                return only;
            }
            trace!("Merging {} branches led by {}", members.len(), first);
            let peeled = members.into_iter().flat_map(peel).collect();
            Branch {
                first,
                common: Vec::new(),
                sub_branches: normalize_branches(peeled),
            }
        })
        .collect()
}

/// Removes the leading symbol of a branch. What remains becomes one or more
/// sibling candidates for the merged sub-decision.
fn peel(branch: Branch) -> Vec<Branch> {
    let Branch {
        common,
        sub_branches,
        ..
    } = branch;
    let mut rest = common.into_iter();
    match rest.next() {
        Some(first) => vec![Branch {
            first,
            common: rest.collect(),
            sub_branches,
        }],
        None if !sub_branches.is_empty() => sub_branches,
        None => vec![Branch::epsilon()],
    }
}
