//! AQV - cross-platform creator score aggregator
//!
//! A CLI tool that combines per-platform quality metrics into a composite
//! score with a per-platform contribution breakdown, and writes Markdown or
//! JSON reports.
//!
//! Exit codes:
//!   0 - Success (no score below threshold, or no --min-score set)
//!   1 - Runtime error (bad arguments, unreadable input, invalid config, etc.)
//!   2 - A composite score fell below the --min-score threshold

use anyhow::{Context, Result};
use aqv::cli::{Args, OutputFormat};
use aqv::config::{Config, CONFIG_FILE_NAME};
use aqv::input::{self, MetricsDocument};
use aqv::models::Report;
use aqv::report::{self, RecordStatus};
use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("aqv v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Aggregation failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .aqv.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE_NAME);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize weights, report access and more.");
    Ok(())
}

/// Initialize logging based on verbosity flags and `RUST_LOG`.
fn init_logging(args: &Args) {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(args.env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the complete aggregation workflow. Returns exit code (0 or 2).
fn run(args: Args) -> Result<i32> {
    let input_path = args
        .input
        .clone()
        .context("An input path is required (--input)")?;

    // Load configuration
    let mut config = load_config(&args, &input_path)?;
    config.merge_with_args(&args);

    let aggregator = config.aggregator()?;

    // Step 1: Load platform metrics
    let documents = input::load_path(&input_path)?;
    info!(
        "Loaded {} document(s) from {}",
        documents.len(),
        input_path.display()
    );

    // Handle --dry-run: show per-record decisions and exit
    if args.dry_run {
        return handle_dry_run(&documents);
    }

    // Step 2: Aggregate
    let reports: Vec<Report> = documents
        .iter()
        .map(|doc| report::build_report(doc, &aggregator, config.report.access))
        .collect();

    // Step 3: Render and save the report
    let output = match args.format {
        OutputFormat::Json => report::generate_json(&reports)?,
        OutputFormat::Markdown => report::generate_markdown(&reports, &config.report),
    };

    let to_stdout = args.writes_to_stdout();
    if to_stdout {
        println!("{}", output);
    } else {
        std::fs::write(&config.general.output, &output).with_context(|| {
            format!("Failed to write report to {}", config.general.output)
        })?;
        print_summary(&reports, &config.general.output);
    }

    // Check --min-score threshold
    if let Some(min_score) = args.min_score {
        let below = report::reports_below(&reports, min_score);

        if !below.is_empty() {
            for r in &below {
                warn!(
                    "{} scored {:.1}, below the minimum of {:.1}",
                    r.metadata.creator, r.composite_score, min_score
                );
            }
            eprintln!(
                "\n⛔ {} report(s) below the minimum score of {:.1}. Failing (exit code 2).",
                below.len(),
                min_score
            );
            return Ok(2);
        }
    }

    Ok(0)
}

fn print_summary(reports: &[Report], output: &str) {
    println!("\n📊 Aggregation Summary:");
    for r in reports {
        if r.has_data() {
            println!(
                "   {}: {:.1} / 100 from {} platform(s)",
                r.metadata.creator, r.composite_score, r.metadata.platforms_used
            );
        } else {
            println!("   {}: no usable platform data", r.metadata.creator);
        }
    }
    println!("\n✅ Report saved to: {}", output);
}

/// Handle --dry-run: print which records would be used, exit.
fn handle_dry_run(documents: &[MetricsDocument]) -> Result<i32> {
    println!("\n🔍 Dry run: validating input (no report written)...\n");

    if documents.is_empty() {
        println!("   No input documents found.");
    }

    for doc in documents {
        println!("   📄 {} ({})", doc.creator, doc.source.display());

        let decisions = report::record_decisions(doc);
        let mut usable = 0;

        for decision in &decisions {
            match decision.status {
                RecordStatus::Used(ref record) => {
                    usable += 1;
                    println!(
                        "      ✔ [{}] {} (confidence {:.2})",
                        decision.index, record.platform, record.confidence
                    );
                }
                RecordStatus::Dropped(ref reason) => {
                    println!("      ✖ [{}] {}", decision.index, reason);
                }
            }
        }

        println!(
            "      {} of {} record(s) usable\n",
            usable,
            decisions.len()
        );
    }

    println!("✅ Dry run complete. No report was written.");
    Ok(0)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args, input_path: &Path) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location, then the input directory
    let found = match Config::load_default() {
        Ok(None) if input_path.is_dir() => Config::load_from_dir(input_path),
        other => other,
    };

    match found {
        Ok(Some(config)) => {
            info!("Loaded {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
