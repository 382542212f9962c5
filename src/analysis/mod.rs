//! Function string analysis.
//!
//! Discovers the string literals each function references, counts them,
//! and packs the result into a `STR: "..."` function comment.

pub mod aggregator;
pub mod composer;
pub mod gate;
pub mod processor;
pub mod runner;
pub mod sanitize;

pub use composer::COMMENT_PREFIX;
pub use runner::{progress_bar, run, CancellationToken};

/// Maximum number of distinct strings kept per function.
pub const MAX_ENTRIES: usize = 10;

/// Maximum size of one quoted comment item, quotes included.
pub const MAX_LABEL_STR: usize = 60;

/// Maximum size of the whole comment line.
pub const MAX_COMMENT: usize = 764;

/// Shortest sanitized string worth reporting.
pub const MIN_STR_LEN: usize = 4;

/// Functions with fewer body bytes are not scanned.
pub const MIN_FUNCTION_SIZE: u64 = 8;

/// Tunable bounds of the analysis pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Functions with fewer body bytes are skipped.
    pub min_function_size: u64,
    /// Sanitized strings shorter than this are ignored.
    pub min_string_len: usize,
    /// Distinct strings kept per function.
    pub max_strings: usize,
    /// Size budget of the comment line.
    pub max_comment: usize,
    /// Size budget of one quoted item.
    pub max_label: usize,
    /// Stop scanning a function once `max_strings` distinct strings are known.
    pub stop_when_full: bool,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            min_function_size: MIN_FUNCTION_SIZE,
            min_string_len: MIN_STR_LEN,
            max_strings: MAX_ENTRIES,
            max_comment: MAX_COMMENT,
            max_label: MAX_LABEL_STR,
            stop_when_full: true,
        }
    }
}

impl Limits {
    /// Longest stored string content; leaves room for the two quotes.
    pub fn max_content_len(&self) -> usize {
        self.max_label.saturating_sub(2)
    }
}

impl From<&crate::config::LimitsConfig> for Limits {
    fn from(config: &crate::config::LimitsConfig) -> Self {
        Self {
            min_function_size: config.min_function_size,
            min_string_len: config.min_string_len,
            max_strings: config.max_strings,
            max_comment: config.max_comment,
            max_label: config.max_label,
            stop_when_full: config.stop_when_full,
        }
    }
}
