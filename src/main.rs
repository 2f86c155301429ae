//! BenchPivot - benchmark throughput summarizer
//!
//! A CLI tool that averages the steady-state throughput of concurrent
//! data-structure benchmark runs and pivots them into one CSV table.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Any error (bad arguments, unreadable input, malformed run file)

mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod report;
mod scanner;

use analysis::PivotOptions;
use anyhow::{Context, Result};
use cli::Args;
use config::Config;
use error::AggregateError;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        if let Err(e) = handle_init_config() {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
        return;
    }

    let (config, source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(&args, config.general.verbose);

    info!("BenchPivot v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Configuration: {}", source);

    if let Err(e) = run_pivot(args, config) {
        let kind = e
            .downcast_ref::<AggregateError>()
            .map(AggregateError::kind)
            .unwrap_or("Error");
        error!("{}: {:#}", kind, e);
        eprintln!("\n❌ Error ({}): {:#}", kind, e);
        std::process::exit(1);
    }
}

/// Handle --init-config: generate a default .benchpivot.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(config::CONFIG_FILE);

    if path.exists() {
        anyhow::bail!(
            "{} already exists. Remove it first or edit it manually.",
            config::CONFIG_FILE
        );
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", config::CONFIG_FILE);
    println!("   Edit it to customize warm-up rows, output file, and label columns.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// `RUST_LOG`, when set to a valid directive, overrides the level chosen by
/// `-v`/`-q` and the config file.
fn init_logging(args: &Args, config_verbose: bool) {
    let level = if config_verbose && !args.quiet {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };
    let filter = log_filter(level, std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref());

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Warning: a tracing subscriber was already installed");
    }
}

/// Build the log filter from a `RUST_LOG` value, falling back to `level`.
fn log_filter(level: tracing::Level, directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(level.as_str().to_lowercase()))
}

/// Load configuration from file or use defaults.
///
/// Returns the merged configuration and a description of where it came from.
fn load_config(args: &Args) -> Result<(Config, String)> {
    let (mut config, source) = if let Some(ref config_path) = args.config {
        (
            Config::load(config_path)?,
            format!("loaded from {}", config_path.display()),
        )
    } else {
        match Config::load_default()? {
            Some(config) => (config, format!("loaded from {}", config::CONFIG_FILE)),
            None => (Config::default(), "defaults".to_string()),
        }
    };

    config.merge_with_args(args);
    Ok((config, source))
}

/// Run the complete pivot workflow.
fn run_pivot(args: Args, config: Config) -> Result<()> {
    let start_time = Instant::now();

    let output = args.output_path(&config.general.output_file);
    let options = PivotOptions {
        output,
        warmup_rows: config.aggregation.warmup_rows,
        columns: config.columns(args.variant),
        format: args.format,
        show_progress: !args.quiet,
        ..PivotOptions::new(args.input_dir(), args.variant)
    };

    if args.dry_run {
        return handle_dry_run(&options);
    }

    println!("📂 Scanning: {}", options.dir.display());

    let outcome = analysis::run(&options)
        .with_context(|| format!("Failed to pivot {}", options.dir.display()))?;

    for summary in &outcome.summaries {
        debug!(
            "{}: {}[{}] = {} ({}/{} rows)",
            summary.path.display(),
            summary.name,
            summary.group_key,
            summary.average,
            summary.rows_used,
            summary.rows_total
        );
    }

    if !outcome.dropped_labels.is_empty() {
        warn!(
            "Labels without an output column were dropped: {}",
            outcome.dropped_labels.join(", ")
        );
    }

    println!("\n📊 Pivot Summary:");
    println!("   Files aggregated: {}", outcome.summaries.len());
    println!(
        "   {} values: {}",
        options.columns.key,
        outcome
            .table
            .rows()
            .map(|(key, _)| key.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("   Duration: {:.2}s", start_time.elapsed().as_secs_f64());
    println!("\n✅ Summary written to: {}", options.output.display());

    Ok(())
}

/// Handle --dry-run: list the inputs, aggregate nothing.
fn handle_dry_run(options: &PivotOptions) -> Result<()> {
    println!("\n🔍 Dry run: scanning {}...\n", options.dir.display());

    let scanner = scanner::InputScanner::new(
        options.dir.clone(),
        scanner::ScanConfig::excluding_output(&options.output),
    );
    let files = scanner.scan()?;

    if files.is_empty() {
        println!("   No CSV input files found.");
    } else {
        println!("   Found {} files that would be aggregated:\n", files.len());
        for file in &files {
            println!("     📄 {} ({} bytes)", file.name, file.size);
        }
        println!("\n   Output would be written to: {}", options.output.display());
    }

    println!("\n✅ Dry run complete. Nothing was written.");
    Ok(())
}
