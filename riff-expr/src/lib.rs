//! Predicate tree for the Riff format.

pub mod bind;
pub mod expr;
pub mod normalization;

pub use bind::bind;
pub use expr::{Expr, Filter, Operator};
pub use normalization::{simplify, trivial};
