//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// strassoc - tag every function with the strings it references
///
/// Reads a program database snapshot, adds a `STR: "..."` repeatable
/// comment to each function that references string literals, and writes
/// the snapshot back. Functions that already carry an analyst comment
/// are left untouched.
///
/// Examples:
///   strassoc program.json
///   strassoc program.json --output annotated.json --report run.md
///   strassoc program.json --dry-run --report run.json --format json
///   strassoc --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Program database snapshot (JSON) to annotate
    #[arg(value_name = "DATABASE", required_unless_present = "init_config")]
    pub database: Option<PathBuf>,

    /// Write the annotated database here instead of overwriting the input
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write a run report to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Report format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .strassoc.toml in the current directory
    #[arg(short, long, value_name = "FILE", env = "STRASSOC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output, no progress bar)
    #[arg(short, long)]
    pub quiet: bool,

    /// Analyze without writing the database back
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .strassoc.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    /// Skip functions smaller than this many bytes
    #[arg(long, value_name = "BYTES")]
    pub min_function_size: Option<u64>,

    /// Ignore strings shorter than this after cleanup
    #[arg(long, value_name = "CHARS")]
    pub min_string_len: Option<usize>,

    /// Maximum distinct strings per function
    #[arg(long, value_name = "COUNT")]
    pub max_strings: Option<usize>,

    /// Maximum length of a generated comment
    #[arg(long, value_name = "CHARS")]
    pub max_comment: Option<usize>,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        match self.database {
            Some(ref path) if !path.exists() => {
                return Err(format!("Program database does not exist: {}", path.display()));
            }
            Some(ref path) if !path.is_file() => {
                return Err(format!("Program database is not a file: {}", path.display()));
            }
            Some(_) => {}
            None => return Err("A program database path is required".to_string()),
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.dry_run && self.output.is_some() {
            return Err("--output has no effect with --dry-run".to_string());
        }

        if self.max_strings == Some(0) {
            return Err("Max strings must be at least 1".to_string());
        }

        if self.min_string_len == Some(0) {
            return Err("Min string length must be at least 1".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Where the annotated database is written.
    pub fn output_path(&self) -> Option<PathBuf> {
        self.output.clone().or_else(|| self.database.clone())
    }
}
