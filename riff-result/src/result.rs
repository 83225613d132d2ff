use crate::error::Error;

/// Result alias used throughout the Riff crates.
pub type Result<T> = std::result::Result<T, Error>;
