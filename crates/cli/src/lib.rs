// Copyright 2025 Semtest Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI for semtest.
//!
//! Discovers every suite unit under a directory, runs its benchmarks one
//! after the other and prints a summary table.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::{Parser, ValueEnum};
use semtest_adapters::Loader;
use semtest_benchmarks::{BenchmarkReport, Engine};
use semtest_core::{OpenAiEmbeddingClient, Settings};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

/// Log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Verbosity {
    /// Everything, including per-request details.
    Debug,
    /// Progress and per-benchmark metrics.
    Info,
    /// Per-iteration faults and above.
    Warn,
    /// Fatal errors only.
    Error,
    /// Same as `error`.
    Exception,
}

impl Verbosity {
    /// The tracing level this verbosity enables.
    pub fn level(self) -> Level {
        match self {
            Verbosity::Debug => Level::DEBUG,
            Verbosity::Info => Level::INFO,
            Verbosity::Warn => Level::WARN,
            Verbosity::Error | Verbosity::Exception => Level::ERROR,
        }
    }
}

fn existing_dir(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if path.is_dir() {
        Ok(path)
    } else {
        Err(format!("{value} is not a valid directory"))
    }
}

/// semtest CLI.
#[derive(Parser, Debug)]
#[command(name = "semtest")]
#[command(author, version, about = "Run semantic benchmarks against LLM-backed functions", long_about = None)]
pub struct Cli {
    /// Directory to search for benchmark suites.
    #[arg(default_value = ".", value_parser = existing_dir)]
    pub directory: PathBuf,

    /// Log verbosity.
    #[arg(short, long, value_enum, default_value_t = Verbosity::Info)]
    pub verbosity: Verbosity,

    /// Also write raw JSON, combined JSON and markdown results here.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Keep running the remaining benchmarks after one aborts.
    #[arg(short, long)]
    pub keep_going: bool,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub json_logs: bool,
}

/// Install the global subscriber. `RUST_LOG` overrides `verbosity`.
///
/// Logs go to standard error so the summary table on standard output
/// stays clean.
pub fn init_logging(verbosity: Verbosity, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.level().as_str().to_lowercase()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    // A subscriber may already be installed when embedded; keep it.
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

/// Run the CLI with process arguments.
pub fn run() -> anyhow::Result<()> {
    run_with_cli(Cli::parse())
}

/// Run the CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.verbosity, cli.json_logs);

    let mut settings = Settings::load().context("failed to load settings")?;
    settings.continue_on_error |= cli.keep_going;

    let provider = Arc::new(
        OpenAiEmbeddingClient::new(&settings).context("failed to create embedding client")?,
    );
    info!(model = %provider.model(), directory = %cli.directory.display(), "starting semtest");

    let mut loader = Loader::new(&cli.directory, settings.clone(), provider);
    let mut report = BenchmarkReport::stdout();
    if let Some(output) = &cli.output {
        loader = loader.with_exclude(output);
        report = report.with_output_dir(output);
    }

    let mut engine = Engine::new(loader, report).continue_on_error(settings.continue_on_error);
    let results = engine.execute()?;

    let aborted = engine.aborted();
    if !aborted.is_empty() {
        anyhow::bail!(
            "{} of {} benchmarks aborted: {}",
            aborted.len(),
            aborted.len() + results.len(),
            aborted
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    Ok(())
}
