//! Row abstraction and a simple in-memory row.

use crate::value::Value;

/// Read-only view over one row.
///
/// The predicate evaluator depends only on this trait, never on the row's
/// storage layout: implementors may be concrete in-memory rows, views over a
/// decoded stripe buffer, or the `[min, max]` pseudo-row exposed by
/// statistics.
///
/// Typed getters assume the caller already knows the column type (the binder
/// guarantees well-typed access) and that `is_null_at` was consulted first;
/// they panic on type confusion or null access. The defaults panic so that
/// narrow implementations only provide the getters their type set needs.
pub trait RowView {
    /// Number of fields in this row.
    fn num_fields(&self) -> usize;

    /// Whether the value at `ordinal` is null.
    fn is_null_at(&self, ordinal: usize) -> bool;

    fn get_boolean(&self, _ordinal: usize) -> bool {
        panic!("boolean access is not supported by this row")
    }

    fn get_byte(&self, _ordinal: usize) -> i8 {
        panic!("byte access is not supported by this row")
    }

    fn get_short(&self, _ordinal: usize) -> i16 {
        panic!("short access is not supported by this row")
    }

    fn get_int(&self, _ordinal: usize) -> i32 {
        panic!("int access is not supported by this row")
    }

    fn get_long(&self, _ordinal: usize) -> i64 {
        panic!("long access is not supported by this row")
    }

    fn get_utf8(&self, _ordinal: usize) -> &str {
        panic!("string access is not supported by this row")
    }

    /// Days since the epoch.
    fn get_date(&self, _ordinal: usize) -> i32 {
        panic!("date access is not supported by this row")
    }

    /// Microseconds since the epoch.
    fn get_timestamp(&self, _ordinal: usize) -> i64 {
        panic!("timestamp access is not supported by this row")
    }
}

/// Simple mutable row backed by an array of typed values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    /// Create a row with `size` fields, all null.
    pub fn new(size: usize) -> Row {
        Row {
            values: vec![Value::Null; size],
        }
    }

    /// Create a row from existing values. No copy is made.
    pub fn from_values(values: Vec<Value>) -> Row {
        Row { values }
    }

    /// Replace the value at `ordinal`.
    pub fn update(&mut self, ordinal: usize, value: Value) {
        self.values[ordinal] = value;
    }

    /// Borrow the value at `ordinal`.
    pub fn value(&self, ordinal: usize) -> &Value {
        &self.values[ordinal]
    }

    /// Whether any field of this row is null.
    pub fn any_null(&self) -> bool {
        self.values.iter().any(|v| matches!(v, Value::Null))
    }

    /// Underlying values, in position order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

macro_rules! typed_getter {
    ($fn_name:ident, $variant:ident, $ty:ty, $what:literal) => {
        fn $fn_name(&self, ordinal: usize) -> $ty {
            match &self.values[ordinal] {
                Value::$variant(v) => v.clone(),
                other => panic!(concat!("expected ", $what, " value, got {:?}"), other),
            }
        }
    };
}

impl RowView for Row {
    fn num_fields(&self) -> usize {
        self.values.len()
    }

    fn is_null_at(&self, ordinal: usize) -> bool {
        matches!(self.values[ordinal], Value::Null)
    }

    typed_getter!(get_boolean, Boolean, bool, "boolean");
    typed_getter!(get_byte, Byte, i8, "byte");
    typed_getter!(get_short, Short, i16, "short");
    typed_getter!(get_int, Int, i32, "int");
    typed_getter!(get_long, Long, i64, "long");
    typed_getter!(get_date, Date, i32, "date");
    typed_getter!(get_timestamp, Timestamp, i64, "timestamp");

    fn get_utf8(&self, ordinal: usize) -> &str {
        match &self.values[ordinal] {
            Value::Utf8(s) => s.as_str(),
            other => panic!("expected string value, got {other:?}"),
        }
    }
}

impl std::fmt::Display for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.values.is_empty() {
            return write!(f, "[empty row]");
        }
        write!(f, "[")?;
        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_row_is_all_null() {
        let row = Row::new(3);
        assert_eq!(row.num_fields(), 3);
        assert!(row.any_null());
        for ord in 0..3 {
            assert!(row.is_null_at(ord));
        }
    }

    #[test]
    fn update_and_typed_access() {
        let mut row = Row::new(4);
        row.update(0, Value::Int(12));
        row.update(1, Value::Utf8("abc".to_string()));
        row.update(2, Value::Long(-8));
        row.update(3, Value::Boolean(true));

        assert_eq!(row.get_int(0), 12);
        assert_eq!(row.get_utf8(1), "abc");
        assert_eq!(row.get_long(2), -8);
        assert!(row.get_boolean(3));
        assert!(!row.any_null());
    }

    #[test]
    fn structural_equality() {
        let a = Row::from_values(vec![Value::Int(1), Value::Null]);
        let b = Row::from_values(vec![Value::Int(1), Value::Null]);
        let c = Row::from_values(vec![Value::Int(2), Value::Null]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    #[should_panic(expected = "expected int value")]
    fn type_confusion_panics() {
        let row = Row::from_values(vec![Value::Utf8("x".to_string())]);
        let _ = row.get_int(0);
    }
}
