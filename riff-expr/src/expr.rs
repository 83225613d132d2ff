//! Typed predicate AST.
#![forbid(unsafe_code)]

use riff_result::Result;
use riff_types::{RowView, Value};

/// Logical expression over predicates.
///
/// Leaves reference a column by name until [`crate::bind`] resolves them to
/// an ordinal; `Literal` carries trivial truth produced by simplification.
/// Equality is structural: `And`/`Or` children are compared in order and no
/// canonical form is imposed.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Not(Box<Expr>),
    Pred(Filter),
    Literal(bool),
}

/// Single predicate against a column.
///
/// `ordinal` is `None` until the filter is bound to a type description; the
/// name is kept so that rebinding stays idempotent and display stays
/// readable.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub name: String,
    pub ordinal: Option<usize>,
    pub op: Operator,
}

/// Comparison operators carrying typed literals.
#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    Equals(Value),
    GreaterThan(Value),
    GreaterThanOrEquals(Value),
    LessThan(Value),
    LessThanOrEquals(Value),
    In(Vec<Value>),
    IsNull,
}

impl Filter {
    pub fn new(name: impl Into<String>, op: Operator) -> Filter {
        Filter {
            name: name.into(),
            ordinal: None,
            op,
        }
    }

    /// Evaluate this filter against a row.
    ///
    /// Comparison operators never match a null slot; `IsNull` matches only a
    /// null slot. An unbound filter never matches — callers bind first.
    pub fn evaluate<R: RowView + ?Sized>(&self, row: &R) -> bool {
        let Some(ordinal) = self.ordinal else {
            return false;
        };
        match &self.op {
            Operator::IsNull => row.is_null_at(ordinal),
            _ if row.is_null_at(ordinal) => false,
            Operator::Equals(v) => v.eq_expr(row, ordinal),
            Operator::GreaterThan(v) => v.gt_expr(row, ordinal),
            Operator::GreaterThanOrEquals(v) => v.ge_expr(row, ordinal),
            Operator::LessThan(v) => v.lt_expr(row, ordinal),
            Operator::LessThanOrEquals(v) => v.le_expr(row, ordinal),
            Operator::In(values) => values.iter().any(|v| v.eq_expr(row, ordinal)),
        }
    }
}

impl Expr {
    /// Build an AND of filters.
    #[inline]
    pub fn all_of(fs: Vec<Filter>) -> Expr {
        Expr::And(fs.into_iter().map(Expr::Pred).collect())
    }

    /// Build an OR of filters.
    #[inline]
    pub fn any_of(fs: Vec<Filter>) -> Expr {
        Expr::Or(fs.into_iter().map(Expr::Pred).collect())
    }

    /// Wrap an expression in a logical NOT.
    #[allow(clippy::should_implement_trait)]
    #[inline]
    pub fn not(e: Expr) -> Expr {
        Expr::Not(Box::new(e))
    }

    /// `column = literal`
    pub fn eq(name: impl Into<String>, value: impl Into<Value>) -> Expr {
        Expr::Pred(Filter::new(name, Operator::Equals(value.into())))
    }

    /// `column > literal`
    pub fn gt(name: impl Into<String>, value: impl Into<Value>) -> Expr {
        Expr::Pred(Filter::new(name, Operator::GreaterThan(value.into())))
    }

    /// `column >= literal`
    pub fn ge(name: impl Into<String>, value: impl Into<Value>) -> Expr {
        Expr::Pred(Filter::new(name, Operator::GreaterThanOrEquals(value.into())))
    }

    /// `column < literal`
    pub fn lt(name: impl Into<String>, value: impl Into<Value>) -> Expr {
        Expr::Pred(Filter::new(name, Operator::LessThan(value.into())))
    }

    /// `column <= literal`
    pub fn le(name: impl Into<String>, value: impl Into<Value>) -> Expr {
        Expr::Pred(Filter::new(name, Operator::LessThanOrEquals(value.into())))
    }

    /// `column IN (literals...)`
    pub fn in_set(name: impl Into<String>, values: Vec<Value>) -> Expr {
        Expr::Pred(Filter::new(name, Operator::In(values)))
    }

    /// `column IS NULL`
    pub fn is_null(name: impl Into<String>) -> Expr {
        Expr::Pred(Filter::new(name, Operator::IsNull))
    }

    /// Bottom-up rewrite with a pure function.
    ///
    /// Children are rewritten first, then `f` is applied to the rebuilt
    /// node; the result is a new tree, never an in-place mutation.
    pub fn transform<F>(self, f: &mut F) -> Expr
    where
        F: FnMut(Expr) -> Expr,
    {
        let node = match self {
            Expr::And(children) => Expr::And(children.into_iter().map(|c| c.transform(f)).collect()),
            Expr::Or(children) => Expr::Or(children.into_iter().map(|c| c.transform(f)).collect()),
            Expr::Not(inner) => Expr::Not(Box::new(inner.transform(f))),
            leaf => leaf,
        };
        f(node)
    }

    /// Fallible form of [`Expr::transform`].
    pub fn try_transform<F>(self, f: &mut F) -> Result<Expr>
    where
        F: FnMut(Expr) -> Result<Expr>,
    {
        let node = match self {
            Expr::And(children) => Expr::And(
                children
                    .into_iter()
                    .map(|c| c.try_transform(f))
                    .collect::<Result<_>>()?,
            ),
            Expr::Or(children) => Expr::Or(
                children
                    .into_iter()
                    .map(|c| c.try_transform(f))
                    .collect::<Result<_>>()?,
            ),
            Expr::Not(inner) => Expr::Not(Box::new(inner.try_transform(f)?)),
            leaf => leaf,
        };
        f(node)
    }

    /// Evaluate this expression against a row with short-circuiting.
    pub fn evaluate<R: RowView + ?Sized>(&self, row: &R) -> bool {
        match self {
            Expr::And(children) => children.iter().all(|c| c.evaluate(row)),
            Expr::Or(children) => children.iter().any(|c| c.evaluate(row)),
            Expr::Not(inner) => !inner.evaluate(row),
            Expr::Pred(filter) => filter.evaluate(row),
            Expr::Literal(b) => *b,
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operator::Equals(v) => write!(f, "= {v}"),
            Operator::GreaterThan(v) => write!(f, "> {v}"),
            Operator::GreaterThanOrEquals(v) => write!(f, ">= {v}"),
            Operator::LessThan(v) => write!(f, "< {v}"),
            Operator::LessThanOrEquals(v) => write!(f, "<= {v}"),
            Operator::In(values) => {
                write!(f, "in (")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, ")")
            }
            Operator::IsNull => write!(f, "is null"),
        }
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.ordinal {
            Some(ordinal) => write!(f, "{}[{}] {}", self.name, ordinal, self.op),
            None => write!(f, "{} {}", self.name, self.op),
        }
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn join(f: &mut std::fmt::Formatter<'_>, op: &str, children: &[Expr]) -> std::fmt::Result {
            write!(f, "{op}(")?;
            for (i, c) in children.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{c}")?;
            }
            write!(f, ")")
        }
        match self {
            Expr::And(children) => join(f, "and", children),
            Expr::Or(children) => join(f, "or", children),
            Expr::Not(inner) => write!(f, "not({inner})"),
            Expr::Pred(filter) => write!(f, "{filter}"),
            Expr::Literal(b) => write!(f, "{b}"),
        }
    }
}
