use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use brick_migrate::batch::{BatchDriver, BatchOptions, BatchSummary, FileStatus};
use brick_migrate::config::Config;
use brick_migrate::emitter::OutputFormat;
use brick_migrate::ontology_loader::load_ontology;
use brick_migrate::rules::RuleRegistry;

/// Migrate building graphs to the current Brick ontology and validate them.
#[derive(Parser)]
#[command(name = "brick-migrate", version, about)]
struct Cli {
    /// Directory of building graphs [default: graphs].
    input: Option<PathBuf>,

    /// Directory for migrated graphs [default: graphs_updated].
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Use the nightly Brick build.
    #[arg(long, conflicts_with = "release")]
    nightly: bool,

    /// Use the pinned Brick release.
    #[arg(long)]
    release: bool,

    /// Local Brick.ttl instead of downloading it.
    #[arg(long, value_name = "FILE")]
    brick_file: Option<PathBuf>,

    /// Local imports zip instead of downloading it.
    #[arg(long, value_name = "FILE")]
    imports_file: Option<PathBuf>,

    /// Output format: turtle, ntriples.
    #[arg(short, long, value_name = "FORMAT")]
    format: Option<String>,

    /// Print the validity line and report for every graph.
    #[arg(long)]
    print_validation: bool,

    /// Only validate the input graphs; conforming ones are written unchanged.
    #[arg(long)]
    validate_only: bool,

    /// Write report graphs of failing buildings to this directory.
    #[arg(long, value_name = "DIR")]
    report_dir: Option<PathBuf>,

    /// Write the per-file summary as JSON.
    #[arg(long, value_name = "FILE")]
    summary_json: Option<PathBuf>,

    /// Verbose output.
    #[arg(short, long)]
    verbose: bool,

    /// Quiet output.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn init_logging(cli: &Cli) {
    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Defaults, then the config file, then flags.
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(input) = &cli.input {
        config.paths.input_dir = input.clone();
    }
    if let Some(output) = &cli.output {
        config.paths.output_dir = output.clone();
    }
    if cli.nightly {
        config.ontology.use_nightly = true;
    }
    if cli.release {
        config.ontology.use_nightly = false;
    }
    if let Some(path) = &cli.brick_file {
        config.ontology.brick_file = Some(path.clone());
    }
    if let Some(path) = &cli.imports_file {
        config.ontology.imports_file = Some(path.clone());
    }
    if let Some(format) = &cli.format {
        config.report.format = format.parse::<OutputFormat>()?;
    }
    if cli.print_validation {
        config.report.print_validation = true;
    }
    Ok(config)
}

fn write_summary(path: &Path, summary: &BatchSummary) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create summary file {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), summary)
        .with_context(|| format!("failed to write summary to {}", path.display()))?;
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;

    let ontology = load_ontology(&config.ontology).context("failed to load the Brick ontology")?;
    let registry = RuleRegistry::brick_migrations();
    let options = BatchOptions {
        input_dir: config.paths.input_dir.clone(),
        output_dir: config.paths.output_dir.clone(),
        format: config.report.format,
        print_validation: config.report.print_validation,
        report_dir: cli.report_dir.clone(),
    };
    let driver = BatchDriver::new(&ontology, &registry, options);

    let summary = if cli.validate_only {
        driver.validate_only()?
    } else {
        driver.run()?
    };

    if !cli.quiet {
        for outcome in &summary.outcomes {
            if let FileStatus::Failed { error, .. } = &outcome.status {
                eprintln!("{}: {error}", outcome.file.display());
            }
        }
        eprintln!(
            "Processed {} graph(s): {} ok, {} failed",
            summary.outcomes.len(),
            summary.succeeded(),
            summary.failed()
        );
    }

    if let Some(path) = &cli.summary_json {
        write_summary(path, &summary)?;
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);
    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
