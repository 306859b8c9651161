// Copyright 2025 Semtest Contributors
// SPDX-License-Identifier: Apache-2.0

//! I/O operations for benchmark metrics.
//!
//! This module provides functionality to read and write benchmark
//! metrics under an output directory:
//!
//! - `raw/<benchmark>.json` - one file per benchmark
//! - `all_results.json` - every benchmark, in run order
//! - `summary.md` - markdown summary table
//! - `report.md` - detailed markdown report

use crate::markdown;
use crate::metrics::BenchmarkMetrics;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Raw results subdirectory.
pub const RAW_DIR: &str = "raw";

/// Combined results file name.
pub const ALL_RESULTS_FILE: &str = "all_results.json";

/// Summary file name.
pub const SUMMARY_FILE: &str = "summary.md";

/// Detailed report file name.
pub const REPORT_FILE: &str = "report.md";

/// Ensure the output directory and its raw subdirectory exist.
pub fn ensure_output_dirs(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir.join(RAW_DIR))
}

/// Path of the raw JSON file for `metrics` under `dir`.
pub fn raw_result_path(dir: &Path, metrics: &BenchmarkMetrics) -> PathBuf {
    let file = metrics.func.replace(['/', '\\', ':'], "_");
    dir.join(RAW_DIR).join(format!("{file}.json"))
}

/// Write benchmark metrics to a JSON file.
pub fn write_results_json(results: &[BenchmarkMetrics], path: impl AsRef<Path>) -> io::Result<()> {
    let json = serde_json::to_string_pretty(results).map_err(io::Error::other)?;
    fs::write(path, json)
}

/// Write one benchmark's metrics to the raw directory.
pub fn write_raw_result(dir: &Path, metrics: &BenchmarkMetrics) -> io::Result<()> {
    ensure_output_dirs(dir)?;
    let json = serde_json::to_string_pretty(metrics).map_err(io::Error::other)?;
    fs::write(raw_result_path(dir, metrics), json)
}

/// Write the markdown summary and detailed report.
pub fn write_summary(dir: &Path, results: &[BenchmarkMetrics]) -> io::Result<()> {
    ensure_output_dirs(dir)?;
    fs::write(dir.join(SUMMARY_FILE), markdown::generate_summary(results))?;
    fs::write(dir.join(REPORT_FILE), markdown::generate_detailed_report(results))
}

/// Write all benchmark outputs (raw JSON, combined JSON and markdown).
pub fn write_all_outputs(dir: &Path, results: &[BenchmarkMetrics]) -> io::Result<()> {
    ensure_output_dirs(dir)?;

    for metrics in results {
        write_raw_result(dir, metrics)?;
    }

    write_results_json(results, dir.join(ALL_RESULTS_FILE))?;
    write_summary(dir, results)?;

    Ok(())
}

/// Read metrics from a JSON file written by [`write_results_json`].
pub fn read_results_json(path: impl AsRef<Path>) -> io::Result<Vec<BenchmarkMetrics>> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(io::Error::other)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::SemanticMetrics;
    use chrono::Utc;

    fn sample(name: &str) -> BenchmarkMetrics {
        BenchmarkMetrics {
            func: name.into(),
            iterations: 1,
            comparator: "cosine_similarity".into(),
            expectation_input: "hello friend".into(),
            benchmarks: SemanticMetrics {
                responses: vec!["hello".into()],
                exceptions: vec![],
                semantic_distances: vec![0.9],
                mean_semantic_distance: Some(0.9),
                median_semantic_distance: Some(0.9),
            },
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn test_write_all_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let results = vec![sample("nested_dir.testy.mock_temp_1"), sample("mock_test.mock_prompt_1")];

        write_all_outputs(dir.path(), &results).unwrap();

        assert!(dir.path().join("raw/nested_dir.testy.mock_temp_1.json").exists());
        assert!(dir.path().join("raw/mock_test.mock_prompt_1.json").exists());
        assert!(dir.path().join(SUMMARY_FILE).exists());
        assert!(dir.path().join(REPORT_FILE).exists());

        let read = read_results_json(dir.path().join(ALL_RESULTS_FILE)).unwrap();
        assert_eq!(read, results);
    }

    #[test]
    fn test_raw_result_path_is_flat() {
        let path = raw_result_path(Path::new("out"), &sample("a/b:c"));
        assert_eq!(path, Path::new("out/raw/a_b_c.json"));
    }
}
