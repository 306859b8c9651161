// Copyright 2025 Semtest Contributors
// SPDX-License-Identifier: Apache-2.0

//! Console and file reporter.

use crate::engine::Reporter;
use crate::metrics::BenchmarkMetrics;
use crate::{io as output, markdown};
use semtest_core::Result;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Renders the summary table to a writer and optionally writes every
/// output file under a directory.
#[derive(Debug)]
pub struct BenchmarkReport<W> {
    benchmarks: Vec<BenchmarkMetrics>,
    writer: W,
    output_dir: Option<PathBuf>,
}

impl BenchmarkReport<std::io::Stdout> {
    /// Report to standard output.
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> BenchmarkReport<W> {
    /// Report to `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            benchmarks: Vec::new(),
            writer,
            output_dir: None,
        }
    }

    /// Also write raw JSON, combined JSON and markdown files under `dir`.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Metrics populated so far.
    pub fn benchmarks(&self) -> &[BenchmarkMetrics] {
        &self.benchmarks
    }

    /// Consume the reporter, returning its writer.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<W: Write> Reporter for BenchmarkReport<W> {
    fn populate(&mut self, metrics: &[BenchmarkMetrics]) {
        self.benchmarks.extend_from_slice(metrics);
    }

    fn report(&mut self) -> Result<()> {
        self.writer
            .write_all(markdown::generate_summary(&self.benchmarks).as_bytes())?;
        self.writer.flush()?;

        if let Some(dir) = &self.output_dir {
            output::write_all_outputs(dir, &self.benchmarks)?;
            info!(dir = %dir.display(), "results written");
        }
        Ok(())
    }
}
