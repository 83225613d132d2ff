use std::{fmt, io};
use thiserror::Error;

/// Unified error type for all Riff operations.
///
/// The set of variants is closed: parsing, binding and planning surface
/// everything through this enum, with no out-of-band signalling.
///
/// # Propagation
///
/// Parsing and binding errors are fatal for a read session; per-stripe read
/// errors are fatal to the current session as well (there is no
/// partial-success iteration). Statistics evaluation never faults — a missing
/// or empty statistic is treated as "cannot skip".
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file or stream operations.
    ///
    /// Wraps the standard library error raised while opening the header or
    /// data file, or while reading stripe bytes.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Header bytes do not describe a valid Riff file.
    ///
    /// Raised on magic mismatch, a body length above the decoder cap, a
    /// truncated body, or an unknown scalar type tag.
    #[error("corrupt header: {0}")]
    CorruptHeader(String),

    /// The caller-supplied schema cannot back a type description.
    ///
    /// Raised for duplicate field names, an indexed name that does not exist
    /// in the schema, or an indexed column whose type is not orderable.
    #[error("schema error: {0}")]
    SchemaError(String),

    /// A predicate leaf references a column the type description lacks.
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    /// A predicate literal's type does not match its column's type.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// Operation invoked in the wrong reader-session state.
    ///
    /// For example, planning a read after the session closed.
    #[error("state violation: {0}")]
    StateViolation(String),

    /// Internal invariant violated; indicates a bug, not a user error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a corrupt-header error from any displayable cause.
    #[inline]
    pub fn corrupt_header<E: fmt::Display>(err: E) -> Self {
        Error::CorruptHeader(err.to_string())
    }

    /// Create an internal error from any displayable cause.
    #[inline]
    pub fn internal<E: fmt::Display>(err: E) -> Self {
        Error::Internal(err.to_string())
    }
}
