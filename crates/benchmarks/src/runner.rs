// Copyright 2025 Semtest Contributors
// SPDX-License-Identifier: Apache-2.0

//! Benchmark execution engine.
//!
//! A [`BenchmarkRunner`] owns one [`BenchmarkDefinition`] and turns it into
//! a [`BenchmarkMetrics`] record:
//!
//! 1. invoke the responder `iterations` times, capturing each fault as an
//!    [`ExecutionOutcome::Failure`] and continuing
//! 2. embed every successful response (embedding failures abort the run)
//! 3. score each embedding against the expectation with the comparator
//! 4. aggregate, once, into an immutable metrics record
//!
//! The record is cached: later calls to [`BenchmarkRunner::run`] return it
//! without invoking anything again.

use crate::metrics::{BenchmarkMetrics, ScoredResponse, SemanticMetrics};
use chrono::Utc;
use semtest_core::execution::{BenchmarkDefinition, ExecutionOutcome};
use semtest_core::{ComparatorError, Result};
use tracing::{debug, info, warn};

/// Executes one benchmark definition and caches its metrics.
#[derive(Debug)]
pub struct BenchmarkRunner {
    definition: BenchmarkDefinition,
    outcomes: Vec<ExecutionOutcome>,
    scored: Vec<ScoredResponse>,
    metrics: Option<BenchmarkMetrics>,
}

impl BenchmarkRunner {
    /// Create a runner for `definition`.
    pub fn new(definition: BenchmarkDefinition) -> Self {
        Self {
            definition,
            outcomes: Vec::new(),
            scored: Vec::new(),
            metrics: None,
        }
    }

    /// The bound definition.
    pub fn definition(&self) -> &BenchmarkDefinition {
        &self.definition
    }

    /// Per-iteration outcomes of the completed run, in iteration order.
    pub fn outcomes(&self) -> &[ExecutionOutcome] {
        &self.outcomes
    }

    /// Scored successful responses, in iteration order.
    pub fn scored_responses(&self) -> &[ScoredResponse] {
        &self.scored
    }

    /// Metrics, once a run has completed.
    pub fn metrics(&self) -> Option<&BenchmarkMetrics> {
        self.metrics.as_ref()
    }

    /// Run the benchmark, forwarding `args` to every iteration.
    ///
    /// # Errors
    ///
    /// Embedding and comparator failures abort the run and are returned.
    /// Responder failures never are; they are recorded in the metrics.
    pub fn run(&mut self, args: &[String]) -> Result<&BenchmarkMetrics> {
        let metrics = match self.metrics.take() {
            Some(cached) => {
                debug!(benchmark = %self.definition.name(), "returning cached metrics");
                cached
            }
            None => self.execute(args)?,
        };
        Ok(self.metrics.insert(metrics))
    }

    fn execute(&mut self, args: &[String]) -> Result<BenchmarkMetrics> {
        let name = self.definition.name().to_string();
        let iterations = self.definition.iterations();
        info!(benchmark = %name, iterations, "running benchmark");

        self.outcomes.clear();
        self.scored.clear();

        for iteration in 0..iterations {
            let outcome = self.definition.invoke(iteration, args);
            if let Some(fault) = outcome.fault() {
                warn!(
                    benchmark = %name,
                    iteration,
                    kind = %fault.kind,
                    error = %fault.message,
                    "iteration failed"
                );
            }
            self.outcomes.push(outcome);
        }

        self.score()?;

        let metrics = BenchmarkMetrics {
            func: name,
            iterations,
            comparator: self.definition.comparator().name().to_string(),
            expectation_input: self.definition.expectation().to_string(),
            benchmarks: SemanticMetrics::new(&self.outcomes, &self.scored),
            completed_at: Utc::now(),
        };

        info!(
            benchmark = %metrics.func,
            successes = metrics.success_count(),
            failures = metrics.failure_count(),
            metrics = %serde_json::to_string(&metrics)?,
            "benchmark complete"
        );
        Ok(metrics)
    }

    fn score(&mut self) -> Result<()> {
        let provider = self.definition.embedding_provider();
        let comparator = self.definition.comparator();
        let expected = self.definition.expectation_embedding();

        let mut scored = Vec::with_capacity(self.outcomes.len());
        for response in self.outcomes.iter().filter_map(ExecutionOutcome::response) {
            let embedding = provider.generate_embedding_vector(response)?;
            let distance = comparator.calculate_distance(expected, &embedding)?;
            if !distance.is_finite() {
                return Err(ComparatorError::NonScalar { value: distance }.into());
            }
            scored.push(ScoredResponse {
                response: response.to_string(),
                embedding,
                distance,
            });
        }
        self.scored = scored;
        Ok(())
    }
}
