//! Boolean simplification of predicate trees.
//!
//! The simplifier folds trivial truth out of the tree:
//! - `and(true, x)` → `x`, `and(false, _)` → `false`
//! - `or(false, x)` → `x`, `or(true, _)` → `true`
//! - `not(not(x))` → `x`, `not(true)` → `false`
//! - `and(x, not(x))` → `false`, `or(x, not(x))` → `true`
//! - nested junctions of the same kind are flattened
//!
//! Rewrites run bottom-up through [`Expr::transform`], so nested folds
//! converge in a single pass.

use crate::expr::Expr;

/// Simplify an expression to its minimal boolean form.
pub fn simplify(expr: Expr) -> Expr {
    expr.transform(&mut simplify_node)
}

/// Trivial tag of an expression: `Some(true)`/`Some(false)` when the whole
/// tree reduced to a literal, `None` otherwise. Meaningful after
/// [`simplify`].
pub fn trivial(expr: &Expr) -> Option<bool> {
    match expr {
        Expr::Literal(b) => Some(*b),
        _ => None,
    }
}

fn simplify_node(node: Expr) -> Expr {
    match node {
        Expr::And(children) => fold_junction(children, true),
        Expr::Or(children) => fold_junction(children, false),
        Expr::Not(inner) => match *inner {
            Expr::Literal(b) => Expr::Literal(!b),
            Expr::Not(nested) => *nested,
            other => Expr::Not(Box::new(other)),
        },
        other => other,
    }
}

/// Fold one junction level. `identity` is `true` for AND, `false` for OR;
/// the dual literal annihilates the junction.
fn fold_junction(children: Vec<Expr>, identity: bool) -> Expr {
    let mut kept: Vec<Expr> = Vec::with_capacity(children.len());
    for child in children {
        match child {
            Expr::Literal(b) if b == identity => {}
            Expr::Literal(b) => return Expr::Literal(b),
            Expr::And(nested) if identity => kept.extend(nested),
            Expr::Or(nested) if !identity => kept.extend(nested),
            other => kept.push(other),
        }
    }
    if has_complement_pair(&kept) {
        return Expr::Literal(!identity);
    }
    match kept.len() {
        0 => Expr::Literal(identity),
        1 => kept.swap_remove(0),
        _ if identity => Expr::And(kept),
        _ => Expr::Or(kept),
    }
}

/// Whether the children contain some `x` together with `not(x)`.
fn has_complement_pair(children: &[Expr]) -> bool {
    children.iter().any(|a| {
        children.iter().any(|b| match b {
            Expr::Not(inner) => inner.as_ref() == a,
            _ => false,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_true_absorbs() {
        let x = Expr::eq("a", 1);
        let simplified = simplify(Expr::And(vec![Expr::Literal(true), x.clone()]));
        assert_eq!(simplified, x);
    }

    #[test]
    fn and_false_annihilates() {
        let simplified = simplify(Expr::And(vec![Expr::Literal(false), Expr::eq("a", 1)]));
        assert_eq!(simplified, Expr::Literal(false));
    }

    #[test]
    fn or_false_absorbs() {
        let x = Expr::eq("a", 1);
        let simplified = simplify(Expr::Or(vec![Expr::Literal(false), x.clone()]));
        assert_eq!(simplified, x);
    }

    #[test]
    fn or_true_annihilates() {
        let simplified = simplify(Expr::Or(vec![Expr::eq("a", 1), Expr::Literal(true)]));
        assert_eq!(simplified, Expr::Literal(true));
    }

    #[test]
    fn double_negation_cancels() {
        let x = Expr::eq("a", 1);
        assert_eq!(simplify(Expr::not(Expr::not(x.clone()))), x);
        assert_eq!(simplify(Expr::not(Expr::Literal(true))), Expr::Literal(false));
        assert_eq!(simplify(Expr::not(Expr::Literal(false))), Expr::Literal(true));
    }

    #[test]
    fn complement_laws() {
        let x = Expr::eq("a", 1);
        assert_eq!(
            simplify(Expr::And(vec![x.clone(), Expr::not(x.clone())])),
            Expr::Literal(false)
        );
        assert_eq!(
            simplify(Expr::Or(vec![x.clone(), Expr::not(x)])),
            Expr::Literal(true)
        );
    }

    #[test]
    fn empty_junctions() {
        assert_eq!(simplify(Expr::And(Vec::new())), Expr::Literal(true));
        assert_eq!(simplify(Expr::Or(Vec::new())), Expr::Literal(false));
    }

    #[test]
    fn nested_trivia_folds_in_one_pass() {
        // or(false, and(true, x)) -> x
        let x = Expr::gt("b", 2);
        let expr = Expr::Or(vec![
            Expr::Literal(false),
            Expr::And(vec![Expr::Literal(true), x.clone()]),
        ]);
        assert_eq!(simplify(expr), x);
    }

    #[test]
    fn same_kind_junctions_flatten() {
        let expr = Expr::And(vec![
            Expr::eq("a", 1),
            Expr::And(vec![Expr::eq("b", 2), Expr::eq("c", 3)]),
        ]);
        match simplify(expr) {
            Expr::And(v) => assert_eq!(v.len(), 3),
            other => panic!("expected flattened And, got {other:?}"),
        }
    }

    #[test]
    fn trivial_tag() {
        assert_eq!(trivial(&Expr::Literal(true)), Some(true));
        assert_eq!(trivial(&Expr::Literal(false)), Some(false));
        assert_eq!(trivial(&Expr::eq("a", 1)), None);
    }

    #[test]
    fn non_trivial_trees_are_untouched() {
        let expr = Expr::And(vec![Expr::eq("a", 1), Expr::not(Expr::eq("b", 2))]);
        assert_eq!(simplify(expr.clone()), expr);
    }
}
