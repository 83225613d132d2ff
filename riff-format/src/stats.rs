//! Per-column, per-stripe summary statistics.
//!
//! One concrete shape exists per orderable scalar type. A statistics object
//! doubles as the `[min, max]` pseudo-row ([`ORD_MIN`]/[`ORD_MAX`]) so that
//! predicate evaluation over summaries reuses the same typed comparison
//! entry points as row evaluation; the empty sentinel reports null at both
//! ordinals, which makes every comparison on it false.

use riff_result::{Error, Result};
use riff_types::{RowView, ScalarType, Value};

use crate::io::{InputBuffer, OutputBuffer};

/// Pseudo-row ordinal of the minimum value.
pub const ORD_MIN: usize = 0;
/// Pseudo-row ordinal of the maximum value.
pub const ORD_MAX: usize = 1;

/// Summary of one column over one stripe.
///
/// `bounds` is `None` until the first non-null value is observed; for every
/// row in the stripe `min <= value <= max` holds under the scalar type's
/// total order, and `has_nulls` is set iff at least one null was observed.
#[derive(Debug, Clone, PartialEq)]
pub enum Statistics {
    Byte {
        bounds: Option<(i8, i8)>,
        has_nulls: bool,
    },
    Short {
        bounds: Option<(i16, i16)>,
        has_nulls: bool,
    },
    Int {
        bounds: Option<(i32, i32)>,
        has_nulls: bool,
    },
    Long {
        bounds: Option<(i64, i64)>,
        has_nulls: bool,
    },
    Utf8 {
        bounds: Option<(String, String)>,
        has_nulls: bool,
    },
    Date {
        bounds: Option<(i32, i32)>,
        has_nulls: bool,
    },
    Timestamp {
        bounds: Option<(i64, i64)>,
        has_nulls: bool,
    },
}

fn widen<T: Ord + Copy>(bounds: &mut Option<(T, T)>, v: T) {
    match bounds {
        None => *bounds = Some((v, v)),
        Some((min, max)) => {
            if v < *min {
                *min = v;
            }
            if v > *max {
                *max = v;
            }
        }
    }
}

fn widen_str(bounds: &mut Option<(String, String)>, v: &str) {
    match bounds {
        None => *bounds = Some((v.to_string(), v.to_string())),
        Some((min, max)) => {
            if v < min.as_str() {
                *min = v.to_string();
            }
            if v > max.as_str() {
                *max = v.to_string();
            }
        }
    }
}

#[inline]
fn pick<T>(ordinal: usize, min: T, max: T) -> T {
    if ordinal == ORD_MIN { min } else { max }
}

impl Statistics {
    /// Empty statistics for an orderable scalar type.
    pub fn for_type(data_type: ScalarType) -> Result<Statistics> {
        let stats = match data_type {
            ScalarType::Byte => Statistics::Byte {
                bounds: None,
                has_nulls: false,
            },
            ScalarType::Short => Statistics::Short {
                bounds: None,
                has_nulls: false,
            },
            ScalarType::Int => Statistics::Int {
                bounds: None,
                has_nulls: false,
            },
            ScalarType::Long => Statistics::Long {
                bounds: None,
                has_nulls: false,
            },
            ScalarType::Utf8 => Statistics::Utf8 {
                bounds: None,
                has_nulls: false,
            },
            ScalarType::Date => Statistics::Date {
                bounds: None,
                has_nulls: false,
            },
            ScalarType::Timestamp => Statistics::Timestamp {
                bounds: None,
                has_nulls: false,
            },
            other => {
                return Err(Error::SchemaError(format!(
                    "statistics are not supported for type {other}"
                )));
            }
        };
        Ok(stats)
    }

    pub fn data_type(&self) -> ScalarType {
        match self {
            Statistics::Byte { .. } => ScalarType::Byte,
            Statistics::Short { .. } => ScalarType::Short,
            Statistics::Int { .. } => ScalarType::Int,
            Statistics::Long { .. } => ScalarType::Long,
            Statistics::Utf8 { .. } => ScalarType::Utf8,
            Statistics::Date { .. } => ScalarType::Date,
            Statistics::Timestamp { .. } => ScalarType::Timestamp,
        }
    }

    /// Whether at least one null was observed.
    pub fn has_nulls(&self) -> bool {
        match self {
            Statistics::Byte { has_nulls, .. }
            | Statistics::Short { has_nulls, .. }
            | Statistics::Int { has_nulls, .. }
            | Statistics::Long { has_nulls, .. }
            | Statistics::Utf8 { has_nulls, .. }
            | Statistics::Date { has_nulls, .. }
            | Statistics::Timestamp { has_nulls, .. } => *has_nulls,
        }
    }

    fn set_has_nulls(&mut self) {
        match self {
            Statistics::Byte { has_nulls, .. }
            | Statistics::Short { has_nulls, .. }
            | Statistics::Int { has_nulls, .. }
            | Statistics::Long { has_nulls, .. }
            | Statistics::Utf8 { has_nulls, .. }
            | Statistics::Date { has_nulls, .. }
            | Statistics::Timestamp { has_nulls, .. } => *has_nulls = true,
        }
    }

    /// Whether no non-null value has been observed yet.
    pub fn is_empty(&self) -> bool {
        match self {
            Statistics::Byte { bounds, .. } => bounds.is_none(),
            Statistics::Short { bounds, .. } => bounds.is_none(),
            Statistics::Int { bounds, .. } => bounds.is_none(),
            Statistics::Long { bounds, .. } => bounds.is_none(),
            Statistics::Utf8 { bounds, .. } => bounds.is_none(),
            Statistics::Date { bounds, .. } => bounds.is_none(),
            Statistics::Timestamp { bounds, .. } => bounds.is_none(),
        }
    }

    /// Minimum observed value, if any.
    pub fn min_value(&self) -> Option<Value> {
        match self {
            Statistics::Byte { bounds, .. } => bounds.map(|(min, _)| Value::Byte(min)),
            Statistics::Short { bounds, .. } => bounds.map(|(min, _)| Value::Short(min)),
            Statistics::Int { bounds, .. } => bounds.map(|(min, _)| Value::Int(min)),
            Statistics::Long { bounds, .. } => bounds.map(|(min, _)| Value::Long(min)),
            Statistics::Utf8 { bounds, .. } => {
                bounds.as_ref().map(|(min, _)| Value::Utf8(min.clone()))
            }
            Statistics::Date { bounds, .. } => bounds.map(|(min, _)| Value::Date(min)),
            Statistics::Timestamp { bounds, .. } => bounds.map(|(min, _)| Value::Timestamp(min)),
        }
    }

    /// Maximum observed value, if any.
    pub fn max_value(&self) -> Option<Value> {
        match self {
            Statistics::Byte { bounds, .. } => bounds.map(|(_, max)| Value::Byte(max)),
            Statistics::Short { bounds, .. } => bounds.map(|(_, max)| Value::Short(max)),
            Statistics::Int { bounds, .. } => bounds.map(|(_, max)| Value::Int(max)),
            Statistics::Long { bounds, .. } => bounds.map(|(_, max)| Value::Long(max)),
            Statistics::Utf8 { bounds, .. } => {
                bounds.as_ref().map(|(_, max)| Value::Utf8(max.clone()))
            }
            Statistics::Date { bounds, .. } => bounds.map(|(_, max)| Value::Date(max)),
            Statistics::Timestamp { bounds, .. } => bounds.map(|(_, max)| Value::Timestamp(max)),
        }
    }

    /// Fold the value at `ordinal` of `row` into this summary.
    pub fn update(&mut self, row: &dyn RowView, ordinal: usize) {
        if row.is_null_at(ordinal) {
            self.set_has_nulls();
            return;
        }
        match self {
            Statistics::Byte { bounds, .. } => widen(bounds, row.get_byte(ordinal)),
            Statistics::Short { bounds, .. } => widen(bounds, row.get_short(ordinal)),
            Statistics::Int { bounds, .. } => widen(bounds, row.get_int(ordinal)),
            Statistics::Long { bounds, .. } => widen(bounds, row.get_long(ordinal)),
            Statistics::Utf8 { bounds, .. } => widen_str(bounds, row.get_utf8(ordinal)),
            Statistics::Date { bounds, .. } => widen(bounds, row.get_date(ordinal)),
            Statistics::Timestamp { bounds, .. } => widen(bounds, row.get_timestamp(ordinal)),
        }
    }

    /// Union another summary of the same shape into this one.
    pub fn merge(&mut self, other: &Statistics) -> Result<()> {
        if other.has_nulls() {
            self.set_has_nulls();
        }
        match (&mut *self, other) {
            (Statistics::Byte { bounds, .. }, Statistics::Byte { bounds: o, .. }) => {
                merge_bounds(bounds, o)
            }
            (Statistics::Short { bounds, .. }, Statistics::Short { bounds: o, .. }) => {
                merge_bounds(bounds, o)
            }
            (Statistics::Int { bounds, .. }, Statistics::Int { bounds: o, .. }) => {
                merge_bounds(bounds, o)
            }
            (Statistics::Long { bounds, .. }, Statistics::Long { bounds: o, .. }) => {
                merge_bounds(bounds, o)
            }
            (Statistics::Date { bounds, .. }, Statistics::Date { bounds: o, .. }) => {
                merge_bounds(bounds, o)
            }
            (Statistics::Timestamp { bounds, .. }, Statistics::Timestamp { bounds: o, .. }) => {
                merge_bounds(bounds, o)
            }
            (Statistics::Utf8 { bounds, .. }, Statistics::Utf8 { bounds: o, .. }) => {
                if let Some((omin, omax)) = o {
                    widen_str(bounds, omin);
                    widen_str(bounds, omax);
                }
            }
            (left, right) => {
                return Err(Error::Internal(format!(
                    "cannot merge statistics of type {} into {}",
                    right.data_type(),
                    left.data_type()
                )));
            }
        }
        Ok(())
    }

    /// Serialize into the stripe index layout.
    pub fn write_to(&self, buf: &mut OutputBuffer) {
        buf.write_u8(self.data_type().tag());
        buf.write_u8(self.has_nulls() as u8);
        buf.write_u8(self.is_empty() as u8);
        match self {
            Statistics::Byte {
                bounds: Some((min, max)),
                ..
            } => {
                buf.write_u8(*min as u8);
                buf.write_u8(*max as u8);
            }
            Statistics::Short {
                bounds: Some((min, max)),
                ..
            } => {
                buf.write_i16(*min);
                buf.write_i16(*max);
            }
            Statistics::Int {
                bounds: Some((min, max)),
                ..
            }
            | Statistics::Date {
                bounds: Some((min, max)),
                ..
            } => {
                buf.write_i32(*min);
                buf.write_i32(*max);
            }
            Statistics::Long {
                bounds: Some((min, max)),
                ..
            }
            | Statistics::Timestamp {
                bounds: Some((min, max)),
                ..
            } => {
                buf.write_i64(*min);
                buf.write_i64(*max);
            }
            Statistics::Utf8 {
                bounds: Some((min, max)),
                ..
            } => {
                buf.write_utf8(min);
                buf.write_utf8(max);
            }
            _ => {}
        }
    }

    /// Deserialize from the stripe index layout.
    pub fn read_from(input: &mut InputBuffer<'_>) -> Result<Statistics> {
        let data_type = ScalarType::from_tag(input.read_u8()?)?;
        let has_nulls = input.read_u8()? != 0;
        let empty = input.read_u8()? != 0;
        let stats = match data_type {
            ScalarType::Byte => Statistics::Byte {
                bounds: if empty {
                    None
                } else {
                    Some((input.read_u8()? as i8, input.read_u8()? as i8))
                },
                has_nulls,
            },
            ScalarType::Short => Statistics::Short {
                bounds: if empty {
                    None
                } else {
                    Some((input.read_i16()?, input.read_i16()?))
                },
                has_nulls,
            },
            ScalarType::Int => Statistics::Int {
                bounds: if empty {
                    None
                } else {
                    Some((input.read_i32()?, input.read_i32()?))
                },
                has_nulls,
            },
            ScalarType::Long => Statistics::Long {
                bounds: if empty {
                    None
                } else {
                    Some((input.read_i64()?, input.read_i64()?))
                },
                has_nulls,
            },
            ScalarType::Utf8 => Statistics::Utf8 {
                bounds: if empty {
                    None
                } else {
                    Some((input.read_utf8()?, input.read_utf8()?))
                },
                has_nulls,
            },
            ScalarType::Date => Statistics::Date {
                bounds: if empty {
                    None
                } else {
                    Some((input.read_i32()?, input.read_i32()?))
                },
                has_nulls,
            },
            ScalarType::Timestamp => Statistics::Timestamp {
                bounds: if empty {
                    None
                } else {
                    Some((input.read_i64()?, input.read_i64()?))
                },
                has_nulls,
            },
            other => {
                return Err(Error::CorruptHeader(format!(
                    "statistics with non-orderable type tag {}",
                    other.tag()
                )));
            }
        };
        Ok(stats)
    }
}

fn merge_bounds<T: Ord + Copy>(bounds: &mut Option<(T, T)>, other: &Option<(T, T)>) {
    if let Some((omin, omax)) = other {
        widen(bounds, *omin);
        widen(bounds, *omax);
    }
}

/// The `[min, max]` pseudo-row. Empty statistics report null at both
/// ordinals; typed getters serve only the matching scalar type.
impl RowView for Statistics {
    fn num_fields(&self) -> usize {
        2
    }

    fn is_null_at(&self, _ordinal: usize) -> bool {
        self.is_empty()
    }

    fn get_byte(&self, ordinal: usize) -> i8 {
        match self {
            Statistics::Byte {
                bounds: Some((min, max)),
                ..
            } => pick(ordinal, *min, *max),
            other => panic!("byte access on {other:?}"),
        }
    }

    fn get_short(&self, ordinal: usize) -> i16 {
        match self {
            Statistics::Short {
                bounds: Some((min, max)),
                ..
            } => pick(ordinal, *min, *max),
            other => panic!("short access on {other:?}"),
        }
    }

    fn get_int(&self, ordinal: usize) -> i32 {
        match self {
            Statistics::Int {
                bounds: Some((min, max)),
                ..
            } => pick(ordinal, *min, *max),
            other => panic!("int access on {other:?}"),
        }
    }

    fn get_long(&self, ordinal: usize) -> i64 {
        match self {
            Statistics::Long {
                bounds: Some((min, max)),
                ..
            } => pick(ordinal, *min, *max),
            other => panic!("long access on {other:?}"),
        }
    }

    fn get_utf8(&self, ordinal: usize) -> &str {
        match self {
            Statistics::Utf8 {
                bounds: Some((min, max)),
                ..
            } => pick(ordinal, min, max),
            other => panic!("string access on {other:?}"),
        }
    }

    fn get_date(&self, ordinal: usize) -> i32 {
        match self {
            Statistics::Date {
                bounds: Some((min, max)),
                ..
            } => pick(ordinal, *min, *max),
            other => panic!("date access on {other:?}"),
        }
    }

    fn get_timestamp(&self, ordinal: usize) -> i64 {
        match self {
            Statistics::Timestamp {
                bounds: Some((min, max)),
                ..
            } => pick(ordinal, *min, *max),
            other => panic!("timestamp access on {other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riff_types::Row;

    #[test]
    fn update_widens_bounds_and_tracks_nulls() {
        let mut stats = Statistics::for_type(ScalarType::Int).unwrap();
        assert!(stats.is_empty());
        assert!(!stats.has_nulls());

        for v in [5, 1, 9, 3] {
            let row = Row::from_values(vec![Value::Int(v)]);
            stats.update(&row, 0);
        }
        stats.update(&Row::new(1), 0);

        assert_eq!(stats.min_value(), Some(Value::Int(1)));
        assert_eq!(stats.max_value(), Some(Value::Int(9)));
        assert!(stats.has_nulls());
        assert!(!stats.is_empty());
    }

    #[test]
    fn string_bounds_are_lexicographic() {
        let mut stats = Statistics::for_type(ScalarType::Utf8).unwrap();
        for v in ["mango", "apple", "pear"] {
            let row = Row::from_values(vec![Value::from(v)]);
            stats.update(&row, 0);
        }
        assert_eq!(stats.min_value(), Some(Value::from("apple")));
        assert_eq!(stats.max_value(), Some(Value::from("pear")));
    }

    #[test]
    fn pseudo_row_exposes_min_and_max() {
        let mut stats = Statistics::for_type(ScalarType::Long).unwrap();
        let row = Row::from_values(vec![Value::Long(4)]);
        stats.update(&row, 0);
        let row = Row::from_values(vec![Value::Long(11)]);
        stats.update(&row, 0);

        assert_eq!(stats.num_fields(), 2);
        assert!(!stats.is_null_at(ORD_MIN));
        assert_eq!(stats.get_long(ORD_MIN), 4);
        assert_eq!(stats.get_long(ORD_MAX), 11);

        // literal comparisons against the pseudo-row
        assert!(Value::Long(3).gt_expr(&stats, ORD_MAX)); // max > 3
        assert!(!Value::Long(11).gt_expr(&stats, ORD_MAX));
        assert!(Value::Long(5).le_expr(&stats, ORD_MIN)); // min <= 5
    }

    #[test]
    fn empty_statistics_compare_as_null() {
        let stats = Statistics::for_type(ScalarType::Int).unwrap();
        assert!(stats.is_null_at(ORD_MIN));
        assert!(stats.is_null_at(ORD_MAX));
        assert!(!stats.has_nulls());
    }

    #[test]
    fn merge_unions_bounds() {
        let mut a = Statistics::Int {
            bounds: Some((4, 9)),
            has_nulls: false,
        };
        let b = Statistics::Int {
            bounds: Some((1, 6)),
            has_nulls: true,
        };
        a.merge(&b).unwrap();
        assert_eq!(a.min_value(), Some(Value::Int(1)));
        assert_eq!(a.max_value(), Some(Value::Int(9)));
        assert!(a.has_nulls());

        let mismatched = Statistics::for_type(ScalarType::Long).unwrap();
        assert!(a.merge(&mismatched).is_err());
    }

    #[test]
    fn serialization_roundtrip() {
        let samples = [
            Statistics::Int {
                bounds: Some((-3, 700)),
                has_nulls: true,
            },
            Statistics::Utf8 {
                bounds: Some(("aa".to_string(), "zz".to_string())),
                has_nulls: false,
            },
            Statistics::Timestamp {
                bounds: None,
                has_nulls: false,
            },
            Statistics::Byte {
                bounds: Some((i8::MIN, i8::MAX)),
                has_nulls: false,
            },
        ];
        for stats in samples {
            let mut buf = OutputBuffer::new();
            stats.write_to(&mut buf);
            let bytes = buf.into_inner();
            let mut input = InputBuffer::new(&bytes);
            let decoded = Statistics::read_from(&mut input).unwrap();
            assert_eq!(decoded, stats);
            assert_eq!(input.remaining(), 0);
        }
    }

    #[test]
    fn boolean_statistics_are_rejected() {
        assert!(Statistics::for_type(ScalarType::Boolean).is_err());
        assert!(Statistics::for_type(ScalarType::Null).is_err());
    }
}
