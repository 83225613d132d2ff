//! Closed scalar type set with stable on-disk tags.

use riff_result::{Error, Result};

/// Scalar types supported by the format.
///
/// The discriminants are the on-disk tags and must never change; decoders
/// reject anything outside this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ScalarType {
    Null = 0,
    Boolean = 1,
    Byte = 2,
    Short = 3,
    Int = 4,
    Long = 5,
    /// UTF-8 string.
    Utf8 = 6,
    /// Days since the epoch, stored as `i32`.
    Date = 7,
    /// Microseconds since the epoch, stored as `i64`.
    Timestamp = 8,
}

impl ScalarType {
    /// Stable on-disk tag for this type.
    #[inline]
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Resolve an on-disk tag back into a scalar type.
    pub fn from_tag(tag: u8) -> Result<ScalarType> {
        match tag {
            0 => Ok(ScalarType::Null),
            1 => Ok(ScalarType::Boolean),
            2 => Ok(ScalarType::Byte),
            3 => Ok(ScalarType::Short),
            4 => Ok(ScalarType::Int),
            5 => Ok(ScalarType::Long),
            6 => Ok(ScalarType::Utf8),
            7 => Ok(ScalarType::Date),
            8 => Ok(ScalarType::Timestamp),
            other => Err(Error::CorruptHeader(format!(
                "unknown scalar type tag {other}"
            ))),
        }
    }

    /// Whether values of this type carry a total order usable for
    /// min/max statistics. Only orderable types may be indexed.
    #[inline]
    pub fn is_orderable(self) -> bool {
        !matches!(self, ScalarType::Null | ScalarType::Boolean)
    }
}

impl std::fmt::Display for ScalarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ScalarType::Null => "null",
            ScalarType::Boolean => "boolean",
            ScalarType::Byte => "byte",
            ScalarType::Short => "short",
            ScalarType::Int => "int",
            ScalarType::Long => "long",
            ScalarType::Utf8 => "string",
            ScalarType::Date => "date",
            ScalarType::Timestamp => "timestamp",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_roundtrip() {
        let all = [
            ScalarType::Null,
            ScalarType::Boolean,
            ScalarType::Byte,
            ScalarType::Short,
            ScalarType::Int,
            ScalarType::Long,
            ScalarType::Utf8,
            ScalarType::Date,
            ScalarType::Timestamp,
        ];
        for dt in all {
            assert_eq!(ScalarType::from_tag(dt.tag()).unwrap(), dt);
        }
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert!(ScalarType::from_tag(9).is_err());
        assert!(ScalarType::from_tag(255).is_err());
    }

    #[test]
    fn orderable_set() {
        assert!(!ScalarType::Null.is_orderable());
        assert!(!ScalarType::Boolean.is_orderable());
        assert!(ScalarType::Byte.is_orderable());
        assert!(ScalarType::Utf8.is_orderable());
        assert!(ScalarType::Timestamp.is_orderable());
    }
}
