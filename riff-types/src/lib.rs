//! Core value model for the Riff format.
//!
//! This crate hosts the closed scalar type set, the typed [`Value`] literal,
//! the storage-independent [`RowView`] abstraction and the reordered
//! [`TypeDescription`], decoupled from the predicate AST (`riff-expr`) and
//! the on-disk format (`riff-format`).

pub mod data_type;
pub mod row;
pub mod schema;
pub mod value;

pub use data_type::ScalarType;
pub use row::{Row, RowView};
pub use schema::{Field, TypeDescription, TypeSpec};
pub use value::Value;
