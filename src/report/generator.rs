//! Run report generation.
//!
//! Renders the outcome of an annotation run as Markdown or JSON.

use crate::cli::OutputFormat;
use crate::models::{Report, ReportMetadata, RunSummary};
use anyhow::{Context, Result};
use std::path::Path;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str("# Function String Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata, &report.summary));
    output.push_str(&generate_summary_section(&report.summary));
    output.push_str(&generate_annotations_section(&report.summary));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata, summary: &RunSummary) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Database:** `{}`\n", metadata.database));
    section.push_str(&format!(
        "- **Run Date:** {}\n",
        metadata.analysis_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Tool Version:** {}\n", metadata.tool_version));
    if metadata.dry_run {
        section.push_str("- **Dry Run:** database not modified\n");
    }
    if summary.cancelled {
        section.push_str(&format!(
            "- **Aborted:** after {} of {} functions\n",
            summary.functions_visited, summary.functions_total
        ));
    }
    section.push_str(&format!("- **Duration:** {:.2}s\n", summary.duration_seconds));
    section.push('\n');

    section
}

/// Generate the outcome totals table.
fn generate_summary_section(summary: &RunSummary) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("| Outcome | Functions |\n");
    section.push_str("|:---|:---:|\n");
    section.push_str(&format!("| Commented | {} |\n", summary.committed));
    section.push_str(&format!(
        "| Kept existing comment | {} |\n",
        summary.skipped_existing
    ));
    section.push_str(&format!("| No strings | {} |\n", summary.no_strings));
    section.push_str(&format!("| Too small | {} |\n", summary.skipped_small));
    section.push_str(&format!(
        "| **Visited** | **{} / {}** |\n\n",
        summary.functions_visited, summary.functions_total
    ));

    section
}

/// Generate the table of written comments.
fn generate_annotations_section(summary: &RunSummary) -> String {
    let mut section = String::new();

    section.push_str("## Comments\n\n");

    if summary.annotations.is_empty() {
        section.push_str("No comments were generated.\n\n");
        return section;
    }

    section.push_str("| Address | Function | Comment |\n");
    section.push_str("|:---|:---|:---|\n");

    for annotation in &summary.annotations {
        section.push_str(&format!(
            "| `{:#x}` | `{}` | {} |\n",
            annotation.address,
            annotation.function,
            escape_table_cell(&annotation.comment)
        ));
    }
    section.push('\n');

    section
}

fn escape_table_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Generate the footer.
fn generate_footer() -> String {
    format!(
        "---\n\n*Generated by strassoc v{}*\n",
        env!("CARGO_PKG_VERSION")
    )
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")
}

/// Write the report to a file in the requested format.
pub fn write_report(report: &Report, path: &Path, format: OutputFormat) -> Result<()> {
    let content = match format {
        OutputFormat::Markdown => generate_markdown_report(report),
        OutputFormat::Json => generate_json_report(report)?,
    };

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Annotation;
    use chrono::Utc;

    fn create_test_report() -> Report {
        let metadata = ReportMetadata {
            database: "program.json".to_string(),
            analysis_date: Utc::now(),
            tool_version: "1.0.0".to_string(),
            dry_run: false,
        };

        let summary = RunSummary {
            functions_total: 5,
            functions_visited: 5,
            committed: 2,
            skipped_small: 1,
            skipped_existing: 1,
            no_strings: 1,
            cancelled: false,
            duration_seconds: 0.25,
            annotations: vec![
                Annotation {
                    function: "sub_401000".to_string(),
                    address: 0x401000,
                    comment: "STR: \"Error: bad input\", \"Hello World!!\"".to_string(),
                },
                Annotation {
                    function: "sub_402000".to_string(),
                    address: 0x402000,
                    comment: "STR: \"a|b pipe\"".to_string(),
                },
            ],
        };

        Report { metadata, summary }
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report();
        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("# Function String Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("## Summary"));
        assert!(markdown.contains("## Comments"));
        assert!(markdown.contains("`0x401000`"));
        assert!(markdown.contains("\"Error: bad input\""));
        assert!(markdown.contains("| Commented | 2 |"));
        assert!(!markdown.contains("Aborted"));
    }

    #[test]
    fn test_pipes_escaped_in_table() {
        let markdown = generate_markdown_report(&create_test_report());
        assert!(markdown.contains("a\\|b pipe"));
    }

    #[test]
    fn test_cancelled_run_noted() {
        let mut report = create_test_report();
        report.summary.cancelled = true;
        report.summary.functions_visited = 3;

        let section = generate_metadata_section(&report.metadata, &report.summary);
        assert!(section.contains("Aborted:** after 3 of 5"));
    }

    #[test]
    fn test_empty_annotations() {
        let mut report = create_test_report();
        report.summary.annotations.clear();

        let section = generate_annotations_section(&report.summary);
        assert!(section.contains("No comments were generated."));
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report();
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"database\""));
        assert!(json.contains("\"committed\": 2"));
        assert!(json.contains("\"annotations\""));
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");

        write_report(&create_test_report(), &path, OutputFormat::Json).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let parsed: Report = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed.summary.annotations.len(), 2);
    }
}
