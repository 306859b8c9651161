// Copyright 2025 Semtest Contributors
// SPDX-License-Identifier: Apache-2.0

//! Orchestration engine.
//!
//! The engine loads entry points once, invokes them strictly one after the
//! other in discovery order, and hands the collected metrics to a reporter.
//! Benchmarks share a rate-limited embedding service and log output must
//! follow discovery order, so nothing here runs concurrently.

use crate::entry::BenchmarkRegistry;
use crate::metrics::BenchmarkMetrics;
use semtest_core::Result;
use serde::{Deserialize, Serialize};
use tracing::{error, info, info_span};
use uuid::Uuid;

/// Produces the ordered set of entry points for a run.
pub trait EntryPointSource {
    /// Load every entry point.
    fn load(&mut self) -> Result<BenchmarkRegistry>;
}

impl<F> EntryPointSource for F
where
    F: FnMut() -> Result<BenchmarkRegistry>,
{
    fn load(&mut self) -> Result<BenchmarkRegistry> {
        self()
    }
}

/// Sink for a run's metrics.
pub trait Reporter {
    /// Hand over the ordered metrics of a run.
    fn populate(&mut self, metrics: &[BenchmarkMetrics]);

    /// Emit the report.
    fn report(&mut self) -> Result<()>;
}

/// A benchmark that aborted with a fatal error while the engine kept going.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbortedBenchmark {
    /// Entry point name.
    pub name: String,
    /// Rendered error.
    pub error: String,
}

/// Drives discovery, execution and reporting.
#[derive(Debug)]
pub struct Engine<S, R> {
    source: S,
    reporter: R,
    continue_on_error: bool,
    aborted: Vec<AbortedBenchmark>,
}

impl<S: EntryPointSource, R: Reporter> Engine<S, R> {
    /// Create an engine that stops at the first fatal benchmark error.
    pub fn new(source: S, reporter: R) -> Self {
        Self {
            source,
            reporter,
            continue_on_error: false,
            aborted: Vec::new(),
        }
    }

    /// Keep running the remaining benchmarks after a fatal benchmark error.
    pub fn continue_on_error(mut self, enabled: bool) -> Self {
        self.continue_on_error = enabled;
        self
    }

    /// Benchmarks skipped by the last [`Engine::execute`].
    pub fn aborted(&self) -> &[AbortedBenchmark] {
        &self.aborted
    }

    /// The reporter.
    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Load, run and report every benchmark.
    ///
    /// # Errors
    ///
    /// Discovery errors are always returned. Benchmark errors (embedding or
    /// comparator failures) are returned immediately unless
    /// `continue_on_error` is set, in which case they are logged and
    /// collected in [`Engine::aborted`].
    pub fn execute(&mut self) -> Result<Vec<BenchmarkMetrics>> {
        let run_id = Uuid::new_v4();
        let span = info_span!("semtest_run", %run_id);
        let _enter = span.enter();

        self.aborted.clear();
        let registry = self.source.load()?;
        info!(benchmarks = registry.len(), "loaded benchmarks");

        let mut results = Vec::with_capacity(registry.len());
        for mut entry in registry.into_entries() {
            match entry.invoke() {
                Ok(metrics) => results.push(metrics),
                Err(err) if self.continue_on_error => {
                    error!(benchmark = %entry.name(), error = %err, "benchmark aborted");
                    self.aborted.push(AbortedBenchmark {
                        name: entry.name().to_string(),
                        error: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        self.reporter.populate(&results);
        self.reporter.report()?;

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{BenchmarkEntryPoint, BoundBenchmark};
    use semtest_core::embedding::StaticEmbeddingProvider;
    use semtest_core::error::{BoxError, DiscoveryError, EmbeddingError, Error};
    use semtest_core::execution::BenchmarkDefinition;
    use std::path::PathBuf;
    use std::sync::Arc;

    #[derive(Default)]
    struct RecordingReporter {
        populated: Vec<String>,
        reported: usize,
    }

    impl Reporter for RecordingReporter {
        fn populate(&mut self, metrics: &[BenchmarkMetrics]) {
            self.populated.extend(metrics.iter().map(|m| m.func.clone()));
        }

        fn report(&mut self) -> Result<()> {
            self.reported += 1;
            Ok(())
        }
    }

    struct Broken(&'static str);

    impl BenchmarkEntryPoint for Broken {
        fn name(&self) -> &str {
            self.0
        }

        fn invoke(&mut self) -> Result<BenchmarkMetrics> {
            Err(EmbeddingError::Request("connection refused".into()).into())
        }
    }

    fn bench(name: &str) -> BoundBenchmark {
        let provider = StaticEmbeddingProvider::new()
            .with("hello friend", vec![1.0, 0.0])
            .with("hi", vec![0.7, 0.7]);
        BoundBenchmark::new(
            BenchmarkDefinition::builder()
                .name(name)
                .responder(|_: &[String]| -> std::result::Result<String, BoxError> { Ok("hi".into()) })
                .expectation("hello friend")
                .embedding_provider(Arc::new(provider))
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_execute_runs_in_discovery_order() {
        let source = || -> Result<BenchmarkRegistry> {
            let mut registry = BenchmarkRegistry::new();
            registry.register(bench("second_file"));
            registry.register(bench("first_file"));
            Ok(registry)
        };
        let mut engine = Engine::new(source, RecordingReporter::default());

        let results = engine.execute().unwrap();
        let names: Vec<_> = results.iter().map(|m| m.func.as_str()).collect();
        assert_eq!(names, vec!["second_file", "first_file"]);
        assert_eq!(engine.reporter().populated, vec!["second_file", "first_file"]);
        assert_eq!(engine.reporter().reported, 1);
    }

    #[test]
    fn test_execute_with_no_benchmarks() {
        let mut engine = Engine::new(
            || -> Result<BenchmarkRegistry> { Ok(BenchmarkRegistry::new()) },
            RecordingReporter::default(),
        );
        assert!(engine.execute().unwrap().is_empty());
        assert_eq!(engine.reporter().reported, 1);
    }

    #[test]
    fn test_discovery_error_is_fatal() {
        let source = || -> Result<BenchmarkRegistry> {
            Err(DiscoveryError::InvalidDirectory(PathBuf::from("missing")).into())
        };
        let mut engine = Engine::new(source, RecordingReporter::default());
        assert!(matches!(engine.execute(), Err(Error::Discovery(_))));
        assert_eq!(engine.reporter().reported, 0);
    }

    #[test]
    fn test_benchmark_error_halts_run_by_default() {
        let source = || -> Result<BenchmarkRegistry> {
            let mut registry = BenchmarkRegistry::new();
            registry.register(bench("ok"));
            registry.register(Broken("broken"));
            registry.register(bench("never_runs"));
            Ok(registry)
        };
        let mut engine = Engine::new(source, RecordingReporter::default());

        let err = engine.execute().unwrap_err();
        assert!(err.is_embedding());
        assert_eq!(engine.reporter().reported, 0);
    }

    #[test]
    fn test_continue_on_error_skips_broken_benchmark() {
        let source = || -> Result<BenchmarkRegistry> {
            let mut registry = BenchmarkRegistry::new();
            registry.register(bench("ok"));
            registry.register(Broken("broken"));
            registry.register(bench("still_runs"));
            Ok(registry)
        };
        let mut engine = Engine::new(source, RecordingReporter::default()).continue_on_error(true);

        let results = engine.execute().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(engine.aborted().len(), 1);
        assert_eq!(engine.aborted()[0].name, "broken");
        assert!(engine.aborted()[0].error.contains("connection refused"));
        assert_eq!(engine.reporter().populated, vec!["ok", "still_runs"]);
    }
}
