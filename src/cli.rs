//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// AQV - cross-platform creator score aggregator
///
/// Combine per-platform quality metrics into a single composite score
/// with a per-platform contribution breakdown. Markdown/JSON reports.
///
/// Examples:
///   aqv --input fixtures/streamer_pro.json
///   aqv --input fixtures/ --format json --output -
///   aqv --input fixtures/streamer_pro.json --summary-only
///   aqv --input fixtures/ --min-score 60
///   aqv --input fixtures/partial_data.json --dry-run
///   aqv --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Platform metrics document, or a directory of documents
    ///
    /// A directory is walked recursively; every .json file becomes one report.
    #[arg(short, long, value_name = "PATH", required_unless_present = "init_config")]
    pub input: Option<PathBuf>,

    /// Output file path for the report ("-" for stdout)
    ///
    /// Defaults to the config file setting, or aqv_report.md
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .aqv.toml in the current directory,
    /// then in the input directory
    #[arg(short, long, value_name = "FILE", env = "AQV_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Only include the composite score and dimensions
    ///
    /// Per-platform contributions are computed but left out of the report.
    #[arg(long)]
    pub summary_only: bool,

    /// Fail if any composite score is below this value
    ///
    /// Useful for CI pipelines. Exit code 2 when a score falls short.
    #[arg(long, value_name = "SCORE")]
    pub min_score: Option<f64>,

    /// Dry run: load and validate input without writing a report
    ///
    /// Prints which records would be used and which would be dropped.
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .aqv.toml configuration file
    #[arg(long)]
    pub init_config: bool,
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

        match self.input {
            None => return Err("An input path is required (--input)".to_string()),
            Some(ref path) if !path.exists() => {
                return Err(format!("Input path does not exist: {}", path.display()));
            }
            _ => {}
        }

        if let Some(score) = self.min_score {
            if !(0.0..=100.0).contains(&score) {
                return Err("Minimum score must be between 0 and 100".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns true if the report should go to stdout.
    pub fn writes_to_stdout(&self) -> bool {
        self.output.as_deref().is_some_and(|p| p.as_os_str() == "-")
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

    /// Log filter: `-v`/`-q` win, then `RUST_LOG`, then the default level.
    pub fn env_filter(&self) -> EnvFilter {
        let level = LevelFilter::from_level(self.log_level());

        if self.verbose || self.quiet {
            return EnvFilter::default().add_directive(level.into());
        }

        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            input: Some(PathBuf::from(env!("CARGO_MANIFEST_DIR"))),
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
    fn test_parse_from_command_line() {
        let args = Args::try_parse_from([
            "aqv",
            "--input",
            "fixtures",
            "--format",
            "json",
            "--min-score",
            "55.5",
            "--summary-only",
            "-o",
            "-",
        ])
        .unwrap();

        assert_eq!(args.input, Some(PathBuf::from("fixtures")));
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.min_score, Some(55.5));
        assert!(args.summary_only);
        assert!(args.writes_to_stdout());
    }

    #[test]
    fn test_input_required_unless_init_config() {
        assert!(Args::try_parse_from(["aqv"]).is_err());
        assert!(Args::try_parse_from(["aqv", "--init-config"]).is_ok());
    }

    #[test]
    fn test_validation_missing_input_path() {
        let mut args = make_args();
        args.input = Some(PathBuf::from("/no/such/metrics.json"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_min_score_range() {
        let mut args = make_args();
        args.min_score = Some(101.0);
        assert!(args.validate().is_err());

        args.min_score = Some(100.0);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_env_filter_follows_flags() {
        let mut args = make_args();
        args.verbose = true;
        assert_eq!(args.env_filter().max_level_hint(), Some(LevelFilter::DEBUG));

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.env_filter().max_level_hint(), Some(LevelFilter::ERROR));
    }
}
