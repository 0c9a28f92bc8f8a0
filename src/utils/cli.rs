//! Running the CLI

// Allow exits because in this file we ideally handle all errors with known exit codes
#![allow(clippy::exit)]
#![allow(clippy::print_stdout)]

use crate::catalog;
use crate::config::{delimiter_byte, Config};
use crate::dataset::{
    handle_missing_values, load_dataset, write_csv, DataLoader, FeatureMapping, LoadOptions,
    MissingStrategy,
};
use crate::lint;
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Exit code when the lint run found errors.
const EXIT_FINDINGS: i32 = 1;
/// Exit code for I/O, config or dataset failures.
const EXIT_FAILURE: i32 = 2;

/// Tooling for the TinyML battery state estimation catalog:
/// lint the curated project list, and map battery datasets
/// to standard features.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path inside the tinybatt workspace. Defaults to cwd.
    #[arg(short, long, default_value_t = String::from(".").to_owned())]
    workspace: String,
    /// Config file to use instead of the workspace's `.tinybatt/config.toml`.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Also write logs to a daily rotated `tinybatt.log` in this directory.
    #[arg(long)]
    log_dir: Option<PathBuf>,
    /// tinybatt cli subcommands
    #[command(subcommand)]
    subcommands: Subcommands,
}

///
#[derive(Clone, clap::Subcommand)]
enum Subcommands {
    /// Check the catalog document for empty names, bad or duplicate URLs,
    /// the wrong number of entries and broken numbering.
    Lint {
        /// Markdown document listing the projects.
        file: PathBuf,
        /// Expected number of entries. Overrides the config.
        #[arg(short, long)]
        expect: Option<usize>,
        /// Report format.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Show which dataset columns map to which standard features.
    Features {
        /// CSV or JSON dataset.
        dataset: PathBuf,
        /// CSV delimiter. Overrides the config.
        #[arg(short, long)]
        delimiter: Option<char>,
    },
    /// Extract the standard features of a dataset and fill missing values.
    Map {
        /// CSV or JSON dataset.
        dataset: PathBuf,
        /// Missing value strategy: mean, median, drop, forward_fill or backward_fill.
        #[arg(short, long)]
        strategy: Option<String>,
        /// Where to write the processed CSV. Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// CSV delimiter. Overrides the config.
        #[arg(short, long)]
        delimiter: Option<char>,
        /// Explicit `feature=column` mapping; disables detection when given.
        #[arg(short = 'm', long = "map", value_parser = parse_mapping_pair)]
        mapping: Vec<(String, String)>,
    },
}

/// Lint report formats.
#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    /// One finding per line.
    Text,
    /// The full report as JSON.
    Json,
}

/// Parse a `feature=column` pair.
fn parse_mapping_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((feature, column)) if !feature.trim().is_empty() && !column.trim().is_empty() => {
            Ok((feature.trim().to_owned(), column.trim().to_owned()))
        }
        _ => Err(format!("expected `feature=column`, got `{raw}`")),
    }
}

/// Set up logging to stderr, plus a log file when `log_dir` is given.
///
/// The returned guard must be held until exit so buffered file logs are flushed.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = fmt::layer().with_writer(io::stderr);
    if let Some(dir) = log_dir {
        let appender = tracing_appender::rolling::daily(dir, "tinybatt.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .with(fmt::layer().with_ansi(false).with_writer(writer))
            .init();
        Some(guard)
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .init();
        None
    }
}

/// Main entrypoint to application
pub fn run() {
    let cli = Cli::parse();
    let guard = init_tracing(cli.log_dir.as_deref());
    tracing::debug!("Starting application");

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "Couldn't load config");
            drop(guard);
            std::process::exit(EXIT_FAILURE);
        }
    };

    let result = match cli.subcommands {
        Subcommands::Lint {
            file,
            expect,
            format,
        } => lint_catalog(&file, expect, format, &config),
        Subcommands::Features { dataset, delimiter } => {
            show_features(&dataset, delimiter, &config).map(|()| 0)
        }
        Subcommands::Map {
            dataset,
            strategy,
            output,
            delimiter,
            mapping,
        } => map_dataset(
            &dataset,
            strategy.as_deref(),
            output.as_deref(),
            delimiter,
            &mapping,
            &config,
        )
        .map(|()| 0),
    };

    let code = result.unwrap_or_else(|err| {
        tracing::error!("{err:#}");
        EXIT_FAILURE
    });
    drop(guard);
    std::process::exit(code);
}

/// Use `--config` when given, otherwise look up the workspace config.
fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    cli.config.as_ref().map_or_else(
        || Config::discover(Path::new(&cli.workspace)),
        |path| Config::load(path),
    )
}

/// Lint the catalog and print the report. Returns the exit code.
fn lint_catalog(
    file: &Path,
    expect: Option<usize>,
    format: OutputFormat,
    config: &Config,
) -> anyhow::Result<i32> {
    let catalog = catalog::load(file)?;
    let mut lint_config = config.lint.clone();
    if let Some(expected) = expect {
        lint_config.expected_entries = expected;
    }
    let report = lint::check(&catalog, &lint_config);

    match format {
        OutputFormat::Text => {
            for finding in &report.findings {
                let sep = if finding.line.is_some() { ":" } else { ": " };
                println!("{}{sep}{finding}", file.display());
            }
            println!(
                "{}: {} entries, {} errors, {} warnings",
                file.display(),
                report.entries,
                report.errors().count(),
                report.warnings().count()
            );
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(if report.is_clean() { 0 } else { EXIT_FINDINGS })
}

fn load_options(delimiter: Option<char>, config: &Config) -> anyhow::Result<LoadOptions> {
    match delimiter {
        Some(delimiter) => Ok(LoadOptions {
            delimiter: delimiter_byte(delimiter)?,
        }),
        None => config.dataset.load_options(),
    }
}

/// Print the detected `feature -> column` mapping.
fn show_features(dataset: &Path, delimiter: Option<char>, config: &Config) -> anyhow::Result<()> {
    let loader = DataLoader::with_mapper(config.dataset.feature_mapper()?);
    let processed = loader.process_dataset(dataset, &load_options(delimiter, config)?)?;
    for (feature, column) in processed.feature_mapping.iter() {
        println!("{feature} -> {column}");
    }
    let missing: Vec<String> = loader
        .feature_mapper
        .standard_features()
        .into_iter()
        .filter(|feature| processed.feature_mapping.get(feature).is_none())
        .collect();
    if !missing.is_empty() {
        println!("missing: {}", missing.join(", "));
    }
    Ok(())
}

/// Extract features, handle missing values and write the result as CSV.
fn map_dataset(
    dataset: &Path,
    strategy: Option<&str>,
    output: Option<&Path>,
    delimiter: Option<char>,
    mapping: &[(String, String)],
    config: &Config,
) -> anyhow::Result<()> {
    let loader = DataLoader::with_mapper(config.dataset.feature_mapper()?);
    let options = load_options(delimiter, config)?;

    let features = if mapping.is_empty() {
        loader.process_dataset(dataset, &options)?.processed_data
    } else {
        let raw = load_dataset(dataset, &options)?;
        let mut explicit = FeatureMapping::new();
        for (feature, column) in mapping {
            explicit.insert(feature.as_str(), column.as_str());
        }
        loader.feature_mapper.extract_features(&raw, Some(&explicit))
    };

    let strategy = strategy.map_or_else(
        || config.dataset.strategy(),
        MissingStrategy::parse_or_default,
    );
    let clean = handle_missing_values(&features, strategy);

    if let Some(path) = output {
        let file = File::create(path)
            .map_err(|err| anyhow::anyhow!("Couldn't create {}: {err}", path.display()))?;
        write_csv(&clean, BufWriter::new(file))?;
        tracing::info!(path = %path.display(), "Wrote processed dataset");
    } else {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        write_csv(&clean, &mut lock)?;
        lock.flush()?;
    }
    Ok(())
}
