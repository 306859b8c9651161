// Copyright 2025 Semtest Contributors
// SPDX-License-Identifier: Apache-2.0

//! Markdown output generation for benchmark metrics.
//!
//! This module renders the summary table shown on the console and written
//! to `summary.md`, and a detailed per-benchmark report.

use crate::metrics::BenchmarkMetrics;
use std::collections::BTreeSet;
use std::fmt::Write;

/// Placeholder for statistics with no data.
pub const NO_DATA: &str = "n/a";

/// Format an optional statistic with four decimals.
pub fn format_stat(value: Option<f64>) -> String {
    value.map_or_else(|| NO_DATA.to_string(), |v| format!("{v:.4}"))
}

/// Distinct fault kinds of a benchmark, sorted.
fn fault_kinds(metrics: &BenchmarkMetrics) -> String {
    let kinds: BTreeSet<String> = metrics
        .benchmarks
        .exceptions
        .iter()
        .map(|f| f.kind.to_string())
        .collect();
    if kinds.is_empty() {
        "-".to_string()
    } else {
        kinds.into_iter().collect::<Vec<_>>().join(", ")
    }
}

/// Generate a markdown summary table from benchmark metrics.
pub fn generate_summary(results: &[BenchmarkMetrics]) -> String {
    let mut output = String::new();

    writeln!(output, "# Benchmark Summary").unwrap();
    writeln!(output).unwrap();
    writeln!(output, "Generated: {}", chrono::Utc::now().to_rfc3339()).unwrap();
    writeln!(output).unwrap();
    writeln!(
        output,
        "| Benchmark | Iterations | Comparator | Mean Distance | Median Distance | Exceptions | Exception Count |"
    )
    .unwrap();
    writeln!(
        output,
        "|-----------|------------|------------|---------------|-----------------|------------|-----------------|"
    )
    .unwrap();

    for metrics in results {
        writeln!(
            output,
            "| {} | {} | {} | {} | {} | {} | {} |",
            metrics.func,
            metrics.iterations,
            metrics.comparator,
            format_stat(metrics.mean_distance()),
            format_stat(metrics.median_distance()),
            fault_kinds(metrics),
            metrics.failure_count(),
        )
        .unwrap();
    }

    writeln!(output).unwrap();
    writeln!(output, "---").unwrap();
    writeln!(output, "Total benchmarks: {}", results.len()).unwrap();

    output
}

/// Generate a detailed markdown report, one section per benchmark.
pub fn generate_detailed_report(results: &[BenchmarkMetrics]) -> String {
    let mut output = String::new();

    writeln!(output, "# Detailed Benchmark Report").unwrap();
    writeln!(output).unwrap();
    writeln!(output, "Generated: {}", chrono::Utc::now().to_rfc3339()).unwrap();
    writeln!(output).unwrap();

    for metrics in results {
        writeln!(output, "## {}", metrics.func).unwrap();
        writeln!(output).unwrap();
        writeln!(output, "**Expectation:** {}", metrics.expectation_input).unwrap();
        writeln!(output).unwrap();
        writeln!(
            output,
            "**Comparator:** {} | **Iterations:** {} | **Completed:** {}",
            metrics.comparator,
            metrics.iterations,
            metrics.completed_at.to_rfc3339()
        )
        .unwrap();
        writeln!(output).unwrap();

        if !metrics.benchmarks.responses.is_empty() {
            writeln!(output, "| # | Distance | Response |").unwrap();
            writeln!(output, "|---|----------|----------|").unwrap();
            for (i, (response, distance)) in metrics
                .benchmarks
                .responses
                .iter()
                .zip(&metrics.benchmarks.semantic_distances)
                .enumerate()
            {
                writeln!(
                    output,
                    "| {} | {:.4} | {} |",
                    i + 1,
                    distance,
                    response.replace('|', "\\|").replace('\n', " ")
                )
                .unwrap();
            }
            writeln!(output).unwrap();
        }

        for fault in &metrics.benchmarks.exceptions {
            writeln!(output, "- {}", fault).unwrap();
        }
        if !metrics.benchmarks.exceptions.is_empty() {
            writeln!(output).unwrap();
        }
    }

    output
}
