// Copyright 2025 Semtest Contributors
// SPDX-License-Identifier: Apache-2.0

//! Benchmark metrics types.
//!
//! This module provides the immutable aggregate produced by one benchmark
//! run, plus the per-response scoring record it is derived from.

use chrono::{DateTime, Utc};
use semtest_core::execution::{ExecutionFault, ExecutionOutcome};
use serde::{Deserialize, Serialize};

/// A successful response with its embedding and distance to the expectation.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredResponse {
    /// Response text.
    pub response: String,
    /// Embedding of the response.
    pub embedding: Vec<f32>,
    /// Comparator output against the expectation embedding.
    pub distance: f64,
}

/// Semantic scores for one benchmark.
///
/// Mean and median are computed over successful iterations only. With no
/// successes both are `None` (serialised as `null`), never zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticMetrics {
    /// Successful responses, in iteration order.
    pub responses: Vec<String>,
    /// Captured faults, in iteration order.
    pub exceptions: Vec<ExecutionFault>,
    /// Distances, aligned with `responses`.
    pub semantic_distances: Vec<f64>,
    /// Mean of `semantic_distances`.
    pub mean_semantic_distance: Option<f64>,
    /// Median of `semantic_distances`.
    pub median_semantic_distance: Option<f64>,
}

impl SemanticMetrics {
    /// Aggregate outcomes and their scored responses.
    pub fn new(outcomes: &[ExecutionOutcome], scored: &[ScoredResponse]) -> Self {
        let semantic_distances: Vec<f64> = scored.iter().map(|s| s.distance).collect();
        Self {
            responses: scored.iter().map(|s| s.response.clone()).collect(),
            exceptions: outcomes.iter().filter_map(|o| o.fault().cloned()).collect(),
            mean_semantic_distance: mean(&semantic_distances),
            median_semantic_distance: median(&semantic_distances),
            semantic_distances,
        }
    }
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median, averaging the middle pair for even lengths. `None` when empty.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Immutable record of one completed benchmark run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkMetrics {
    /// Benchmark name.
    pub func: String,
    /// Configured iteration count.
    pub iterations: usize,
    /// Comparator name.
    pub comparator: String,
    /// Semantic expectation text.
    pub expectation_input: String,
    /// Scores.
    pub benchmarks: SemanticMetrics,
    /// When the run finished.
    pub completed_at: DateTime<Utc>,
}

impl BenchmarkMetrics {
    /// Number of successful iterations.
    pub fn success_count(&self) -> usize {
        self.benchmarks.responses.len()
    }

    /// Number of failed iterations.
    pub fn failure_count(&self) -> usize {
        self.benchmarks.exceptions.len()
    }

    /// Mean distance, if any iteration succeeded.
    pub fn mean_distance(&self) -> Option<f64> {
        self.benchmarks.mean_semantic_distance
    }

    /// Median distance, if any iteration succeeded.
    pub fn median_distance(&self) -> Option<f64> {
        self.benchmarks.median_semantic_distance
    }
}
