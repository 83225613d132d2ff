//! Name-to-ordinal binding of predicate leaves.

use riff_result::{Error, Result};
use riff_types::{ScalarType, TypeDescription};

use crate::expr::{Expr, Filter, Operator};

/// Resolve every leaf of `expr` against `td`, producing a bound tree.
///
/// Each leaf name is looked up in the type description and its ordinal
/// recorded; literals are checked against the column's scalar type. Binding
/// an already-bound tree revalidates and yields the same tree, so the rule
/// is idempotent.
///
/// Fails with [`Error::UnknownColumn`] for a name the description lacks and
/// [`Error::TypeMismatch`] when a literal's type does not match the column.
pub fn bind(expr: Expr, td: &TypeDescription) -> Result<Expr> {
    expr.try_transform(&mut |node| match node {
        Expr::Pred(filter) => bind_filter(filter, td).map(Expr::Pred),
        other => Ok(other),
    })
}

fn bind_filter(filter: Filter, td: &TypeDescription) -> Result<Filter> {
    let ordinal = td.position(&filter.name)?;
    let column_type = td.at(ordinal).data_type();
    check_literals(&filter, column_type)?;
    Ok(Filter {
        name: filter.name,
        ordinal: Some(ordinal),
        op: filter.op,
    })
}

fn check_literals(filter: &Filter, column_type: ScalarType) -> Result<()> {
    let check = |literal_type: ScalarType| {
        if literal_type == column_type {
            Ok(())
        } else {
            Err(Error::TypeMismatch(format!(
                "literal type {} does not match column '{}' of type {}",
                literal_type, filter.name, column_type
            )))
        }
    };
    match &filter.op {
        Operator::Equals(v)
        | Operator::GreaterThan(v)
        | Operator::GreaterThanOrEquals(v)
        | Operator::LessThan(v)
        | Operator::LessThanOrEquals(v) => check(v.data_type()),
        Operator::In(values) => values.iter().try_for_each(|v| check(v.data_type())),
        Operator::IsNull => Ok(()),
    }
}
