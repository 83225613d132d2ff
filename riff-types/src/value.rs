//! Typed literal values.

use std::cmp::Ordering;

use crate::data_type::ScalarType;
use crate::row::RowView;

/// A typed scalar value.
///
/// This is the literal wrapper carried by predicate leaves: each variant is
/// tied to exactly one scalar type. The comparison entry points all follow
/// the rule *value at ordinal ⟨op⟩ this literal* — e.g. [`Value::gt_expr`]
/// answers whether `row[ordinal] > self`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Utf8(String),
    /// Days since the epoch.
    Date(i32),
    /// Microseconds since the epoch.
    Timestamp(i64),
}

impl Value {
    /// Scalar type of this value.
    pub fn data_type(&self) -> ScalarType {
        match self {
            Value::Null => ScalarType::Null,
            Value::Boolean(_) => ScalarType::Boolean,
            Value::Byte(_) => ScalarType::Byte,
            Value::Short(_) => ScalarType::Short,
            Value::Int(_) => ScalarType::Int,
            Value::Long(_) => ScalarType::Long,
            Value::Utf8(_) => ScalarType::Utf8,
            Value::Date(_) => ScalarType::Date,
            Value::Timestamp(_) => ScalarType::Timestamp,
        }
    }

    /// Compare the (non-null) row value at `ordinal` with this literal.
    ///
    /// Returns `None` for the `Null` literal, which no row value compares
    /// against. The row value is read through the typed getter matching this
    /// literal's scalar type; callers must rule out a null slot first.
    pub fn compare_at<R: RowView + ?Sized>(&self, row: &R, ordinal: usize) -> Option<Ordering> {
        match self {
            Value::Null => None,
            Value::Boolean(v) => Some(row.get_boolean(ordinal).cmp(v)),
            Value::Byte(v) => Some(row.get_byte(ordinal).cmp(v)),
            Value::Short(v) => Some(row.get_short(ordinal).cmp(v)),
            Value::Int(v) => Some(row.get_int(ordinal).cmp(v)),
            Value::Long(v) => Some(row.get_long(ordinal).cmp(v)),
            Value::Utf8(v) => Some(row.get_utf8(ordinal).cmp(v.as_str())),
            Value::Date(v) => Some(row.get_date(ordinal).cmp(v)),
            Value::Timestamp(v) => Some(row.get_timestamp(ordinal).cmp(v)),
        }
    }

    /// Value at `ordinal` equals this literal.
    #[inline]
    pub fn eq_expr<R: RowView + ?Sized>(&self, row: &R, ordinal: usize) -> bool {
        matches!(self.compare_at(row, ordinal), Some(Ordering::Equal))
    }

    /// Value at `ordinal` is greater than this literal.
    #[inline]
    pub fn gt_expr<R: RowView + ?Sized>(&self, row: &R, ordinal: usize) -> bool {
        matches!(self.compare_at(row, ordinal), Some(Ordering::Greater))
    }

    /// Value at `ordinal` is less than this literal.
    #[inline]
    pub fn lt_expr<R: RowView + ?Sized>(&self, row: &R, ordinal: usize) -> bool {
        matches!(self.compare_at(row, ordinal), Some(Ordering::Less))
    }

    /// Value at `ordinal` is greater than or equal to this literal.
    #[inline]
    pub fn ge_expr<R: RowView + ?Sized>(&self, row: &R, ordinal: usize) -> bool {
        matches!(
            self.compare_at(row, ordinal),
            Some(Ordering::Greater | Ordering::Equal)
        )
    }

    /// Value at `ordinal` is less than or equal to this literal.
    #[inline]
    pub fn le_expr<R: RowView + ?Sized>(&self, row: &R, ordinal: usize) -> bool {
        matches!(
            self.compare_at(row, ordinal),
            Some(Ordering::Less | Ordering::Equal)
        )
    }

    /// Canonical byte encoding used when hashing a value into a column
    /// filter. Big-endian for fixed-width values, raw UTF-8 for strings.
    pub fn filter_bytes(&self) -> Vec<u8> {
        match self {
            Value::Null => Vec::new(),
            Value::Boolean(v) => vec![*v as u8],
            Value::Byte(v) => v.to_be_bytes().to_vec(),
            Value::Short(v) => v.to_be_bytes().to_vec(),
            Value::Int(v) | Value::Date(v) => v.to_be_bytes().to_vec(),
            Value::Long(v) | Value::Timestamp(v) => v.to_be_bytes().to_vec(),
            Value::Utf8(v) => v.as_bytes().to_vec(),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Byte(v) => write!(f, "{v}"),
            Value::Short(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Long(v) => write!(f, "{v}"),
            Value::Utf8(v) => write!(f, "'{v}'"),
            Value::Date(v) => write!(f, "date({v})"),
            Value::Timestamp(v) => write!(f, "timestamp({v})"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Value::Byte(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Short(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Utf8(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Utf8(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Row;

    #[test]
    fn comparisons_follow_row_op_literal() {
        let row = Row::from_values(vec![Value::Int(5)]);
        let literal = Value::Int(3);
        assert!(literal.gt_expr(&row, 0));
        assert!(literal.ge_expr(&row, 0));
        assert!(!literal.lt_expr(&row, 0));
        assert!(!literal.le_expr(&row, 0));
        assert!(!literal.eq_expr(&row, 0));
        assert!(Value::Int(5).eq_expr(&row, 0));
    }

    #[test]
    fn string_comparisons_are_lexicographic() {
        let row = Row::from_values(vec![Value::Utf8("mango".to_string())]);
        assert!(Value::from("apple").gt_expr(&row, 0));
        assert!(Value::from("zebra").lt_expr(&row, 0));
        assert!(Value::from("mango").eq_expr(&row, 0));
    }

    #[test]
    fn null_literal_never_matches() {
        let row = Row::from_values(vec![Value::Int(5)]);
        assert!(!Value::Null.eq_expr(&row, 0));
        assert!(!Value::Null.gt_expr(&row, 0));
        assert!(!Value::Null.le_expr(&row, 0));
    }

    #[test]
    fn filter_bytes_distinguish_values() {
        assert_ne!(
            Value::Int(1).filter_bytes(),
            Value::Int(256).filter_bytes()
        );
        assert_eq!(Value::from("abc").filter_bytes(), b"abc".to_vec());
        assert_eq!(Value::Long(1).filter_bytes().len(), 8);
    }

    #[test]
    fn data_types_match_variants() {
        assert_eq!(Value::Date(10).data_type(), ScalarType::Date);
        assert_eq!(Value::Timestamp(10).data_type(), ScalarType::Timestamp);
        assert_eq!(Value::Null.data_type(), ScalarType::Null);
    }
}
