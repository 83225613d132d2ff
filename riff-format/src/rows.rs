//! Row codec for stripe payloads.
//!
//! Each row is a null bitmap (`ceil(n/8)` bytes, bit set = null) followed by
//! the non-null values in position order: fixed-width values big-endian,
//! strings length-prefixed. The encoding is self-delimiting, so a stripe
//! payload is simply rows back to back and decoding runs until the buffer is
//! drained.

use riff_result::{Error, Result};
use riff_types::{Row, RowView, ScalarType, TypeDescription, Value};

use crate::io::{InputBuffer, OutputBuffer};

/// Encode one row, validating it against the type description.
pub fn write_row(buf: &mut OutputBuffer, row: &Row, td: &TypeDescription) -> Result<()> {
    if row.num_fields() != td.size() {
        return Err(Error::Internal(format!(
            "row arity {} does not match type description of {} fields",
            row.num_fields(),
            td.size()
        )));
    }
    let n = td.size();
    let mut bitmap = vec![0u8; n.div_ceil(8)];
    for ordinal in 0..n {
        if row.is_null_at(ordinal) {
            bitmap[ordinal / 8] |= 1 << (ordinal % 8);
        }
    }
    buf.write_bytes(&bitmap);

    for ordinal in 0..n {
        if row.is_null_at(ordinal) {
            continue;
        }
        let spec = td.at(ordinal);
        let value = row.value(ordinal);
        if value.data_type() != spec.data_type() {
            return Err(Error::TypeMismatch(format!(
                "value of type {} in column '{}' of type {}",
                value.data_type(),
                spec.name(),
                spec.data_type()
            )));
        }
        match value {
            Value::Boolean(v) => buf.write_u8(*v as u8),
            Value::Byte(v) => buf.write_u8(*v as u8),
            Value::Short(v) => buf.write_i16(*v),
            Value::Int(v) | Value::Date(v) => buf.write_i32(*v),
            Value::Long(v) | Value::Timestamp(v) => buf.write_i64(*v),
            Value::Utf8(v) => buf.write_utf8(v),
            Value::Null => {}
        }
    }
    Ok(())
}

/// Decode one row.
pub fn read_row(input: &mut InputBuffer<'_>, td: &TypeDescription) -> Result<Row> {
    let n = td.size();
    let mut bitmap = vec![0u8; n.div_ceil(8)];
    input.read_fully(&mut bitmap)?;

    let mut row = Row::new(n);
    for ordinal in 0..n {
        if bitmap[ordinal / 8] & (1 << (ordinal % 8)) != 0 {
            continue;
        }
        let value = match td.at(ordinal).data_type() {
            ScalarType::Boolean => Value::Boolean(input.read_u8()? != 0),
            ScalarType::Byte => Value::Byte(input.read_u8()? as i8),
            ScalarType::Short => Value::Short(input.read_i16()?),
            ScalarType::Int => Value::Int(input.read_i32()?),
            ScalarType::Long => Value::Long(input.read_i64()?),
            ScalarType::Utf8 => Value::Utf8(input.read_utf8()?),
            ScalarType::Date => Value::Date(input.read_i32()?),
            ScalarType::Timestamp => Value::Timestamp(input.read_i64()?),
            ScalarType::Null => {
                return Err(Error::CorruptHeader(format!(
                    "non-null payload in null-typed column '{}'",
                    td.at(ordinal).name()
                )));
            }
        };
        row.update(ordinal, value);
    }
    Ok(row)
}
