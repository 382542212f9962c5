//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.strassoc.toml` files.

use crate::analysis::{MAX_COMMENT, MAX_ENTRIES, MAX_LABEL_STR, MIN_FUNCTION_SIZE, MIN_STR_LEN};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = ".strassoc.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Analysis bounds.
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Show a progress bar while processing functions.
    #[serde(default = "default_true")]
    pub show_progress: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Bounds of the string analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Functions with fewer body bytes are skipped.
    #[serde(default = "default_min_function_size")]
    pub min_function_size: u64,

    /// Shortest string (after cleanup) worth reporting.
    #[serde(default = "default_min_string_len")]
    pub min_string_len: usize,

    /// Distinct strings kept per function.
    #[serde(default = "default_max_strings")]
    pub max_strings: usize,

    /// Size budget of the whole comment line.
    #[serde(default = "default_max_comment")]
    pub max_comment: usize,

    /// Size budget of one quoted string. May only be lowered.
    #[serde(default = "default_max_label")]
    pub max_label: usize,

    /// Stop scanning a function once `max_strings` strings are known.
    #[serde(default = "default_true")]
    pub stop_when_full: bool,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            min_function_size: default_min_function_size(),
            min_string_len: default_min_string_len(),
            max_strings: default_max_strings(),
            max_comment: default_max_comment(),
            max_label: default_max_label(),
            stop_when_full: true,
        }
    }
}

fn default_min_function_size() -> u64 {
    MIN_FUNCTION_SIZE
}

fn default_min_string_len() -> usize {
    MIN_STR_LEN
}

fn default_max_strings() -> usize {
    MAX_ENTRIES
}

fn default_max_comment() -> usize {
    MAX_COMMENT
}

fn default_max_label() -> usize {
    MAX_LABEL_STR
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Check that the limits describe a usable analysis.
    pub fn validate(&self) -> Result<()> {
        let limits = &self.limits;

        if limits.max_strings == 0 {
            anyhow::bail!("limits.max_strings must be at least 1");
        }
        if limits.min_string_len == 0 {
            anyhow::bail!("limits.min_string_len must be at least 1");
        }
        if limits.max_label <= 2 {
            anyhow::bail!("limits.max_label must leave room for the quotes (at least 3)");
        }
        if limits.max_label > MAX_LABEL_STR {
            anyhow::bail!("limits.max_label must not exceed {}", MAX_LABEL_STR);
        }
        if limits.max_comment <= crate::analysis::COMMENT_PREFIX.len() + limits.max_label {
            anyhow::bail!("limits.max_comment must be larger than the prefix plus one item");
        }

        Ok(())
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(size) = args.min_function_size {
            self.limits.min_function_size = size;
        }
        if let Some(len) = args.min_string_len {
            self.limits.min_string_len = len;
        }
        if let Some(count) = args.max_strings {
            self.limits.max_strings = count;
        }
        if let Some(len) = args.max_comment {
            self.limits.max_comment = len;
        }

        // Quiet mode always hides the progress bar
        if args.quiet {
            self.general.show_progress = false;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Limits;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.limits.max_strings, 10);
        assert_eq!(config.limits.max_comment, 764);
        assert!(config.general.show_progress);
        assert_eq!(Limits::from(&config.limits), Limits::default());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
show_progress = false

[limits]
max_strings = 5
min_string_len = 6
stop_when_full = false
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert!(!config.general.show_progress);
        assert_eq!(config.limits.max_strings, 5);
        assert_eq!(config.limits.min_string_len, 6);
        assert!(!config.limits.stop_when_full);
        assert_eq!(config.limits.max_comment, 764);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_limits() {
        let mut config = Config::default();
        config.limits.max_strings = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.limits.max_label = 2;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.limits.max_comment = 60;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_caps_max_label() {
        let mut config = Config::default();
        config.limits.max_label = MAX_LABEL_STR;
        assert!(config.validate().is_ok());

        config.limits.max_label = 200;
        assert!(config.validate().is_err());

        let toml_content = "[limits]\nmax_label = 200\n";
        let config: Config = toml::from_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_merge_with_args() {
        use clap::Parser;

        let args = crate::cli::Args::try_parse_from([
            "strassoc",
            "program.json",
            "--quiet",
            "--max-strings",
            "3",
        ])
        .unwrap();

        let mut config = Config::default();
        config.limits.min_string_len = 6;
        config.merge_with_args(&args);

        assert_eq!(config.limits.max_strings, 3);
        assert_eq!(config.limits.min_string_len, 6);
        assert!(!config.general.show_progress);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[limits]\nmin_function_size = 16\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.limits.min_function_size, 16);

        std::fs::write(&path, "[limits]\nmax_strings = 0\n").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[limits]"));
        assert!(toml_str.contains("max_comment = 764"));
    }
}
