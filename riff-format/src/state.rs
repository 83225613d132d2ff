//! Resolved predicate bound to a type description.
//!
//! Evaluation over stripe summaries must stay sound: `false` proves that no
//! row of the stripe can satisfy the predicate, `true` only means "might".
//! Negation therefore cannot be computed by flipping a summary answer — a
//! summary hit never proves that *every* row matches. `NOT` is pushed
//! through junctions by De Morgan during evaluation and answers `true` once
//! it reaches a comparison leaf.

use riff_expr::{bind, simplify, trivial, Expr, Filter, Operator};
use riff_result::Result;
use riff_types::{RowView, TypeDescription};

use crate::filter::ColumnFilter;
use crate::stats::{Statistics, ORD_MAX, ORD_MIN};

/// A predicate tree bound to a type description and simplified.
///
/// Immutable after construction and safe to share: distinct planners may
/// evaluate the same state concurrently by reference.
#[derive(Debug, Clone)]
pub struct PredicateState {
    tree: Expr,
    trivial: Option<bool>,
}

impl PredicateState {
    /// Bind `expr` against `td`, simplify, and record the trivial tag.
    pub fn new(expr: &Expr, td: &TypeDescription) -> Result<PredicateState> {
        let bound = bind(expr.clone(), td)?;
        let tree = simplify(bound);
        let trivial = trivial(&tree);
        Ok(PredicateState { tree, trivial })
    }

    /// The bound, simplified tree.
    pub fn tree(&self) -> &Expr {
        &self.tree
    }

    /// `Some(true)`/`Some(false)` when the whole predicate folded to a
    /// literal. A trivially false state lets the planner skip the data file
    /// entirely.
    pub fn trivial(&self) -> Option<bool> {
        self.trivial
    }

    /// Whether a stripe with the given statistics might contain a matching
    /// row. `stats` is ordinal-aligned over the indexed prefix; leaves on
    /// columns outside it answer `true`.
    pub fn evaluate_stats(&self, stats: &[Statistics]) -> bool {
        if let Some(answer) = self.trivial {
            return answer;
        }
        eval_summary(&self.tree, false, &mut |leaf| leaf_stats(leaf, stats))
    }

    /// Whether a stripe with the given column filters might contain a
    /// matching row. Only equality-flavored leaves consult the oracle.
    pub fn evaluate_filters(&self, filters: &[ColumnFilter]) -> bool {
        if let Some(answer) = self.trivial {
            return answer;
        }
        eval_summary(&self.tree, false, &mut |leaf| leaf_filter(leaf, filters))
    }

    /// Exact row-level evaluation, used while streaming.
    pub fn evaluate_row(&self, row: &dyn RowView) -> bool {
        if let Some(answer) = self.trivial {
            return answer;
        }
        self.tree.evaluate(row)
    }
}

/// Recursive summary evaluation with pessimistic negation.
///
/// `inverted` tracks an odd number of enclosing `NOT`s; junctions flip by
/// De Morgan and an inverted leaf answers `true` (cannot prove every row
/// matches the leaf, so some row may satisfy its negation).
fn eval_summary<F>(expr: &Expr, inverted: bool, leaf_eval: &mut F) -> bool
where
    F: FnMut(&Filter) -> bool,
{
    match expr {
        Expr::Literal(b) => *b != inverted,
        Expr::Not(inner) => eval_summary(inner, !inverted, leaf_eval),
        Expr::And(children) if !inverted => children
            .iter()
            .all(|c| eval_summary(c, false, leaf_eval)),
        Expr::And(children) => children.iter().any(|c| eval_summary(c, true, leaf_eval)),
        Expr::Or(children) if !inverted => children
            .iter()
            .any(|c| eval_summary(c, false, leaf_eval)),
        Expr::Or(children) => children.iter().all(|c| eval_summary(c, true, leaf_eval)),
        Expr::Pred(leaf) => {
            if inverted {
                true
            } else {
                leaf_eval(leaf)
            }
        }
    }
}

/// Statistics test for a single leaf, per the pushdown rules:
/// `=` needs `min <= x <= max`, inequalities test one bound, `in` needs one
/// member inside the range, `is null` needs observed nulls. Empty statistics
/// report null at both pseudo-row ordinals and thus never match.
fn leaf_stats(leaf: &Filter, stats: &[Statistics]) -> bool {
    let Some(ordinal) = leaf.ordinal else {
        return true;
    };
    let Some(s) = stats.get(ordinal) else {
        // not in the indexed prefix: cannot prove a skip
        return true;
    };
    match &leaf.op {
        Operator::Equals(v) => {
            !s.is_null_at(ORD_MIN) && v.le_expr(s, ORD_MIN) && v.ge_expr(s, ORD_MAX)
        }
        Operator::GreaterThan(v) => !s.is_null_at(ORD_MAX) && v.gt_expr(s, ORD_MAX),
        Operator::GreaterThanOrEquals(v) => !s.is_null_at(ORD_MAX) && v.ge_expr(s, ORD_MAX),
        Operator::LessThan(v) => !s.is_null_at(ORD_MIN) && v.lt_expr(s, ORD_MIN),
        Operator::LessThanOrEquals(v) => !s.is_null_at(ORD_MIN) && v.le_expr(s, ORD_MIN),
        Operator::In(values) => {
            !s.is_null_at(ORD_MIN)
                && values
                    .iter()
                    .any(|v| v.le_expr(s, ORD_MIN) && v.ge_expr(s, ORD_MAX))
        }
        Operator::IsNull => s.has_nulls(),
    }
}

/// Column-filter test for a single leaf. The oracle carries no range
/// information, so only equality-flavored leaves consult it.
fn leaf_filter(leaf: &Filter, filters: &[ColumnFilter]) -> bool {
    let Some(ordinal) = leaf.ordinal else {
        return true;
    };
    let Some(filter) = filters.get(ordinal) else {
        return true;
    };
    match &leaf.op {
        Operator::Equals(v) => filter.may_contain(v),
        Operator::In(values) => values.iter().any(|v| filter.may_contain(v)),
        _ => true,
    }
}
