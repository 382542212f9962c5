//! Data models for the string associator.
//!
//! This module contains the core data structures shared between the
//! analysis pass, the program database and the report generator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A virtual address inside the analyzed program.
pub type Address = u64;

/// Which of the two function comment slots to read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentKind {
    /// Non-sticky comment, dropped by some re-analyses.
    Regular,
    /// Sticky comment, survives re-analysis. The only slot we write.
    Repeatable,
}

/// Identity and extent of one function in the program database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionHandle {
    /// Position in the database's function list.
    pub index: usize,
    /// Display name of the function.
    pub name: String,
    /// First address of the function body.
    pub start: Address,
    /// One past the last address of the function body.
    pub end: Address,
}

impl FunctionHandle {
    /// Size of the function body in bytes.
    pub fn size(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }
}

/// One unique sanitized string referenced by the function being processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StringEntry {
    /// Sanitized, length-bounded string content.
    pub content: String,
    /// Number of reference sites that produced this content.
    pub occurrences: u32,
}

impl StringEntry {
    /// Creates an entry seen once.
    pub fn new(content: String) -> Self {
        Self {
            content,
            occurrences: 1,
        }
    }
}

/// Why a function was left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Body smaller than the minimum function size.
    TooSmall,
    /// A user comment is already present.
    ExistingComment,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::TooSmall => write!(f, "too small"),
            SkipReason::ExistingComment => write!(f, "existing comment"),
        }
    }
}

/// Terminal state of processing one function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionOutcome {
    /// Not scanned at all.
    Skipped(SkipReason),
    /// Scanned, but no qualifying string was found. Nothing was written.
    NoStrings,
    /// A comment was composed and written to the repeatable slot.
    Committed { comment: String },
}

impl fmt::Display for FunctionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionOutcome::Skipped(reason) => write!(f, "skipped ({})", reason),
            FunctionOutcome::NoStrings => write!(f, "no strings"),
            FunctionOutcome::Committed { comment } => write!(f, "wrote {}", comment),
        }
    }
}

/// A comment written during the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Function name.
    pub function: String,
    /// Function start address.
    pub address: Address,
    /// The comment text that was written.
    pub comment: String,
}

/// Totals for one annotation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// Number of functions in the database.
    pub functions_total: usize,
    /// Number of functions actually visited before finishing or cancelling.
    pub functions_visited: usize,
    /// Number of functions that received a comment.
    pub committed: usize,
    /// Functions skipped for being too small.
    pub skipped_small: usize,
    /// Functions skipped because they already carry a comment.
    pub skipped_existing: usize,
    /// Functions scanned without any qualifying string.
    pub no_strings: usize,
    /// Whether the run was cancelled before visiting every function.
    pub cancelled: bool,
    /// Wall-clock duration of the run in seconds.
    pub duration_seconds: f64,
    /// Every comment written during the run, in function order.
    pub annotations: Vec<Annotation>,
}

impl RunSummary {
    /// Creates an empty summary for a database with `functions_total` functions.
    pub fn new(functions_total: usize) -> Self {
        Self {
            functions_total,
            ..Self::default()
        }
    }

    /// Folds one function's outcome into the totals.
    pub fn record(&mut self, function: &FunctionHandle, outcome: FunctionOutcome) {
        self.functions_visited += 1;

        match outcome {
            FunctionOutcome::Skipped(SkipReason::TooSmall) => self.skipped_small += 1,
            FunctionOutcome::Skipped(SkipReason::ExistingComment) => self.skipped_existing += 1,
            FunctionOutcome::NoStrings => self.no_strings += 1,
            FunctionOutcome::Committed { comment } => {
                self.committed += 1;
                self.annotations.push(Annotation {
                    function: function.name.clone(),
                    address: function.start,
                    comment,
                });
            }
        }
    }
}

/// Metadata about a run report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Path of the program database that was annotated.
    pub database: String,
    /// Date and time the run finished.
    pub analysis_date: DateTime<Utc>,
    /// Version of this tool.
    pub tool_version: String,
    /// Whether the database was written back.
    pub dry_run: bool,
}

/// The complete run report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Metadata about the report.
    pub metadata: ReportMetadata,
    /// Outcome totals and written comments.
    pub summary: RunSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(name: &str, start: Address, end: Address) -> FunctionHandle {
        FunctionHandle {
            index: 0,
            name: name.to_string(),
            start,
            end,
        }
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(
            FunctionOutcome::Skipped(SkipReason::TooSmall).to_string(),
            "skipped (too small)"
        );
        assert_eq!(
            FunctionOutcome::Skipped(SkipReason::ExistingComment).to_string(),
            "skipped (existing comment)"
        );
        assert_eq!(FunctionOutcome::NoStrings.to_string(), "no strings");
        assert_eq!(
            FunctionOutcome::Committed {
                comment: "STR: \"abcd\"".to_string()
            }
            .to_string(),
            "wrote STR: \"abcd\""
        );
    }

    #[test]
    fn test_function_size() {
        assert_eq!(handle("f", 0x1000, 0x1040).size(), 0x40);
        assert_eq!(handle("broken", 0x1040, 0x1000).size(), 0);
    }

    #[test]
    fn test_summary_record() {
        let f = handle("sub_1000", 0x1000, 0x1040);
        let mut summary = RunSummary::new(4);

        summary.record(&f, FunctionOutcome::Skipped(SkipReason::TooSmall));
        summary.record(&f, FunctionOutcome::Skipped(SkipReason::ExistingComment));
        summary.record(&f, FunctionOutcome::NoStrings);
        summary.record(
            &f,
            FunctionOutcome::Committed {
                comment: "STR: \"abcd\"".to_string(),
            },
        );

        assert_eq!(summary.functions_visited, 4);
        assert_eq!(summary.skipped_small, 1);
        assert_eq!(summary.skipped_existing, 1);
        assert_eq!(summary.no_strings, 1);
        assert_eq!(summary.committed, 1);
        assert_eq!(summary.annotations[0].function, "sub_1000");
        assert_eq!(summary.annotations[0].address, 0x1000);
    }

    #[test]
    fn test_comment_kind_serde() {
        let json = serde_json::to_string(&CommentKind::Repeatable).unwrap();
        assert_eq!(json, "\"repeatable\"");
    }
}
