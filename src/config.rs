//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.aqv.toml` files.

use crate::analysis::Aggregator;
use crate::models::AccessLevel;
use crate::weights::Weights;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up by default.
pub const CONFIG_FILE_NAME: &str = ".aqv.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// Platform and dimension weight overrides.
    #[serde(default)]
    pub weights: Weights,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
        }
    }
}

fn default_output() -> String {
    "aqv_report.md".to_string()
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Which sections the reader is allowed to see.
    #[serde(default)]
    pub access: AccessLevel,

    /// Width in characters of the contribution bars.
    #[serde(default = "default_bar_width")]
    pub bar_width: usize,

    /// List dropped records in the Markdown report.
    #[serde(default = "default_true")]
    pub show_dropped: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            access: AccessLevel::Full,
            bar_width: default_bar_width(),
            show_dropped: true,
        }
    }
}

fn default_bar_width() -> usize {
    20
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load configuration from an input directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }

        if args.summary_only {
            self.report.access = AccessLevel::Summary;
        }
    }

    /// Build an aggregator from the configured weights, validating them.
    pub fn aggregator(&self) -> Result<Aggregator> {
        Aggregator::new(self.weights).context("Invalid weights in configuration")
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
    use crate::cli::{Args, OutputFormat};
    use std::path::PathBuf;

    fn make_args() -> Args {
        Args {
            input: Some(PathBuf::from("fixtures")),
            output: None,
            config: None,
            format: OutputFormat::Markdown,
            summary_only: false,
            min_score: None,
            dry_run: false,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.output, "aqv_report.md");
        assert_eq!(config.report.access, AccessLevel::Full);
        assert_eq!(config.report.bar_width, 20);
        assert!(config.aggregator().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "custom_report.md"

[report]
access = "summary"
bar_width = 10

[weights.dimensions]
audience_quality = 0.30
engagement_efficiency = 0.20
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, "custom_report.md");
        assert_eq!(config.report.access, AccessLevel::Summary);
        assert_eq!(config.report.bar_width, 10);
        assert!(config.report.show_dropped);
        assert_eq!(config.weights.dimensions.audience_quality, 0.30);
        assert!(config.aggregator().is_ok());
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let toml_content = r#"
[weights.platforms]
kick = 0.5
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        let err = config.aggregator().unwrap_err();
        assert!(err.to_string().contains("Invalid weights"));
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = Config::default();
        let mut args = make_args();
        args.output = Some(PathBuf::from("out.json"));
        args.summary_only = true;

        config.merge_with_args(&args);
        assert_eq!(config.general.output, "out.json");
        assert_eq!(config.report.access, AccessLevel::Summary);
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[report]\nbar_width = 5\n").unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.report.bar_width, 5);

        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[report\n").unwrap();
        assert!(Config::load_from_dir(dir.path()).is_err());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[report]"));
        assert!(toml_str.contains("platforms]"));
        assert!(toml_str.contains("dimensions]"));
        // Verbosity is a command-line concern only.
        assert!(!toml_str.contains("verbose"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert!(parsed.aggregator().is_ok());
    }
}
