//! Run-time configuration.
//!
//! Keys are strings so callers can thread settings through untyped layers;
//! typed getters apply defaults and clamp where the format mandates it.

use rustc_hash::FxHashMap;

/// Read/write buffer size in bytes.
pub const BUFFER_SIZE: &str = "riff.buffer.size";
/// Identifier of the stripe payload compression codec.
pub const COMPRESSION_CODEC: &str = "riff.compression.codec";
/// Rows per stripe (writer only).
pub const STRIPE_ROWS: &str = "riff.stripe.rows";
/// Whether the writer builds per-column bloom filters.
pub const COLUMN_FILTER_ENABLED: &str = "riff.column.filter.enabled";
/// Whether the planner uses the predicate for stripe skipping at all.
pub const FILTER_PUSHDOWN: &str = "riff.filter.pushdown";
/// Whether count-style callers may use the footer record count instead of a
/// stripe scan.
pub const METADATA_COUNT_ENABLED: &str = "riff.metadata.count.enabled";

pub const BUFFER_SIZE_MIN: usize = 4 * 1024;
pub const BUFFER_SIZE_DEFAULT: usize = 256 * 1024;
pub const BUFFER_SIZE_MAX: usize = 512 * 1024;
pub const STRIPE_ROWS_DEFAULT: usize = 10_000;

/// String-keyed configuration with typed accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    entries: FxHashMap<String, String>,
}

impl Config {
    pub fn new() -> Config {
        Config::default()
    }

    /// Set a key; builder-style.
    pub fn set(mut self, key: &str, value: impl ToString) -> Config {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|s| s.as_str())
    }

    fn get_usize(&self, key: &str, default: usize) -> usize {
        self.get(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Buffer size, clamped to `[BUFFER_SIZE_MIN, BUFFER_SIZE_MAX]` on every
    /// path. Malformed values fall back to the default.
    pub fn buffer_size(&self) -> usize {
        self.get_usize(BUFFER_SIZE, BUFFER_SIZE_DEFAULT)
            .clamp(BUFFER_SIZE_MIN, BUFFER_SIZE_MAX)
    }

    pub fn compression_codec(&self) -> &str {
        self.get(COMPRESSION_CODEC).unwrap_or("none")
    }

    pub fn stripe_rows(&self) -> usize {
        self.get_usize(STRIPE_ROWS, STRIPE_ROWS_DEFAULT).max(1)
    }

    pub fn column_filter_enabled(&self) -> bool {
        self.get_bool(COLUMN_FILTER_ENABLED, true)
    }

    pub fn filter_pushdown(&self) -> bool {
        self.get_bool(FILTER_PUSHDOWN, true)
    }

    pub fn metadata_count_enabled(&self) -> bool {
        self.get_bool(METADATA_COUNT_ENABLED, true)
    }
}
