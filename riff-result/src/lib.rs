//! Error and result definitions for the Riff format crates.
//!
//! Every fallible operation across the workspace returns [`Result<T>`] with a
//! single [`Error`] enum. A unified type keeps propagation with `?` natural
//! across crate boundaries and gives callers one closed set of failure modes
//! to match on.
//!
//! # Error Categories
//!
//! - **I/O errors** ([`Error::Io`]): file-system failures, wrapping the cause
//! - **Format errors** ([`Error::CorruptHeader`]): magic mismatch, length
//!   overflow, truncated or malformed header bytes
//! - **Schema errors** ([`Error::SchemaError`]): duplicate field names,
//!   unknown or non-orderable indexed columns
//! - **Binding errors** ([`Error::UnknownColumn`], [`Error::TypeMismatch`]):
//!   predicate leaves that do not resolve against a type description
//! - **Session errors** ([`Error::StateViolation`]): operations invoked in
//!   the wrong reader-session state
//! - **Internal errors** ([`Error::Internal`]): violated internal invariants

pub mod error;
pub mod result;

pub use error::Error;
pub use result::Result;
