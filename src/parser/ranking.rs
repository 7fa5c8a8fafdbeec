//! Ranking of competing parse versions.
//!
//! Two versions that split at a conflicting cell are compared at the first
//! choice where they differ, using the conflict policy and the grammar's
//! precedence and associativity data.

use super::options::ConflictPolicy;
use super::stack::StackVersion;
use crate::grammar::{Action, Associativity, GrammarTable, RuleId, Symbol};
use std::cmp::Ordering;

/// `Greater` means `a` is the better interpretation
pub(crate) fn compare_versions(
    table: &GrammarTable,
    policy: ConflictPolicy,
    a: &StackVersion,
    b: &StackVersion,
) -> Ordering {
    if a.accepted != b.accepted {
        return a.accepted.cmp(&b.accepted);
    }
    for (x, y) in a.choices.iter().zip(&b.choices) {
        if x == y {
            continue;
        }
        if x.fork != y.fork {
            return Ordering::Equal;
        }
        return compare_actions(table, policy, x.action, y.action, x.lookahead);
    }
    Ordering::Equal
}

/// `Greater` means action `a` is preferred over `b` on `lookahead`
pub(crate) fn compare_actions(
    table: &GrammarTable,
    policy: ConflictPolicy,
    a: Action,
    b: Action,
    lookahead: Symbol,
) -> Ordering {
    match (a, b) {
        (Action::Accept, Action::Accept) => Ordering::Equal,
        (Action::Accept, _) => Ordering::Greater,
        (_, Action::Accept) => Ordering::Less,
        (Action::Shift(_), Action::Shift(_)) => Ordering::Equal,
        (Action::Reduce(x), Action::Reduce(y)) => reduce_over_reduce(table, policy, x, y),
        (Action::Shift(_), Action::Reduce(rule)) => shift_over_reduce(table, policy, rule, lookahead),
        (Action::Reduce(rule), Action::Shift(_)) => {
            shift_over_reduce(table, policy, rule, lookahead).reverse()
        }
    }
}

fn reduce_over_reduce(table: &GrammarTable, policy: ConflictPolicy, x: RuleId, y: RuleId) -> Ordering {
    let by_precedence = match policy {
        ConflictPolicy::Precedence => table.rule(x).precedence.cmp(&table.rule(y).precedence),
        ConflictPolicy::Associativity | ConflictPolicy::DeclarationOrder => Ordering::Equal,
    };
    // Earlier rules win ties
    by_precedence.then_with(|| y.cmp(&x))
}

fn shift_over_reduce(table: &GrammarTable, policy: ConflictPolicy, rule: RuleId, lookahead: Symbol) -> Ordering {
    let rule = table.rule(rule);
    if policy == ConflictPolicy::DeclarationOrder {
        return Ordering::Greater;
    }
    if policy == ConflictPolicy::Precedence {
        let by_precedence = table.precedence(lookahead).cmp(&rule.precedence);
        if by_precedence != Ordering::Equal {
            return by_precedence;
        }
    }
    match rule.associativity {
        Associativity::Left => Ordering::Less,
        Associativity::Right | Associativity::None => Ordering::Greater,
    }
}

/// Index of the best-ranked version
pub(crate) fn best_index<'v>(
    table: &GrammarTable,
    policy: ConflictPolicy,
    versions: impl IntoIterator<Item = &'v StackVersion>,
) -> Option<usize> {
    let mut best: Option<(usize, &StackVersion)> = None;
    for (index, version) in versions.into_iter().enumerate() {
        match best {
            Some((_, current)) if compare_versions(table, policy, version, current) != Ordering::Greater => {}
            _ => best = Some((index, version)),
        }
    }
    best.map(|(index, _)| index)
}
