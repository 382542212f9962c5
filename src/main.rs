//! strassoc - Function String Associate
//!
//! A CLI tool that tags each function of a disassembled program with a
//! repeatable comment listing the string literals it references, so an
//! analyst can guess what a function does without reading it.
//!
//! Exit codes:
//!   0 - Success (including a run aborted with Ctrl-C)
//!   1 - Runtime error (unreadable database, bad config, failed save, etc.)

mod analysis;
mod cli;
mod config;
mod database;
mod models;
mod report;

use analysis::{CancellationToken, Limits};
use anyhow::{Context, Result};
use chrono::Utc;
use cli::Args;
use config::{Config, CONFIG_FILE_NAME};
use database::{JsonDatabase, ProgramDatabase};
use models::{Report, ReportMetadata, RunSummary};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
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

    info!("strassoc v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run_annotation(args).await {
        error!("Annotation failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .strassoc.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
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

/// Run the complete annotation workflow.
async fn run_annotation(args: Args) -> Result<()> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate().context("Invalid limits")?;
    let limits = Limits::from(&config.limits);
    debug!("Limits: {:?}", limits);

    let database_path = args
        .database
        .clone()
        .context("A program database path is required")?;

    // Step 1: Load the database
    println!("📂 Loading program database: {}", database_path.display());
    let db = JsonDatabase::load(&database_path)?;
    println!(
        "   Functions: {} | String literals: {}",
        db.function_count(),
        db.snapshot().strings.len()
    );

    // Step 2: Annotate, with Ctrl-C requesting a stop between functions
    println!("\n🔬 Associating strings with functions...");
    let cancel = CancellationToken::new();
    let listener = spawn_interrupt_listener(cancel.clone());

    let show_progress = config.general.show_progress;
    let (db, summary) = tokio::task::spawn_blocking(move || -> Result<(JsonDatabase, RunSummary)> {
        let mut db = db;
        let progress = analysis::progress_bar(show_progress);
        let summary = analysis::run(&mut db, &limits, &cancel, &progress)?;
        Ok((db, summary))
    })
    .await
    .context("Annotation task failed")??;

    listener.abort();

    // Step 3: Save what was committed, even after an abort
    if args.dry_run {
        println!("\n🧪 Dry run: database not modified.");
    } else if let Some(output_path) = args.output_path() {
        db.save(&output_path)?;
        println!("\n💾 Saved annotated database to: {}", output_path.display());
    }

    // Step 4: Optional report
    if let Some(ref report_path) = args.report {
        let report = Report {
            metadata: ReportMetadata {
                database: database_path.display().to_string(),
                analysis_date: Utc::now(),
                tool_version: env!("CARGO_PKG_VERSION").to_string(),
                dry_run: args.dry_run,
            },
            summary: summary.clone(),
        };
        report::write_report(&report, report_path, args.format)?;
        info!("Report written to {}", report_path.display());
    }

    print_summary(&summary);
    Ok(())
}

/// Cancel `token` on the first Ctrl-C.
fn spawn_interrupt_listener(token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Interrupt received, stopping after the current function");
                token.cancel();
            }
            Err(e) => {
                debug!("Cannot listen for Ctrl-C: {}", e);
            }
        }
    })
}

fn print_summary(summary: &RunSummary) {
    println!("\n📊 Run Summary:");
    println!(
        "   Functions visited: {} / {}",
        summary.functions_visited, summary.functions_total
    );
    println!("   Comments generated: {}", summary.committed);
    println!(
        "   Skipped: {} with comments | {} too small | {} without strings",
        summary.skipped_existing, summary.skipped_small, summary.no_strings
    );
    println!("   Duration: {:.2}s", summary.duration_seconds);

    if summary.cancelled {
        println!("\n* Aborted *");
    } else {
        println!("\n✅ Done.");
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
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
