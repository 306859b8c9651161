// Copyright 2025 Semtest Contributors
// SPDX-License-Identifier: Apache-2.0

//! Benchmark entry points.
//!
//! An entry point is the nullary unit the orchestration engine invokes. Units
//! register entry points into an explicit [`BenchmarkRegistry`] rather than
//! being found by introspection.

use crate::metrics::BenchmarkMetrics;
use crate::runner::BenchmarkRunner;
use semtest_core::execution::BenchmarkDefinition;
use semtest_core::Result;

/// A runnable benchmark.
///
/// Implement this trait for anything the engine should run.
pub trait BenchmarkEntryPoint {
    /// Identifier used in logs and reports.
    fn name(&self) -> &str;

    /// Run the benchmark and return its metrics.
    fn invoke(&mut self) -> Result<BenchmarkMetrics>;
}

/// A runner bound to the argument list it forwards on every iteration.
#[derive(Debug)]
pub struct BoundBenchmark {
    runner: BenchmarkRunner,
    args: Vec<String>,
}

impl BoundBenchmark {
    /// Bind `definition` with no forwarded arguments.
    pub fn new(definition: BenchmarkDefinition) -> Self {
        Self::with_args(definition, Vec::new())
    }

    /// Bind `definition` with `args`.
    pub fn with_args(definition: BenchmarkDefinition, args: Vec<String>) -> Self {
        Self {
            runner: BenchmarkRunner::new(definition),
            args,
        }
    }

    /// Forwarded arguments.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The underlying runner.
    pub fn runner(&self) -> &BenchmarkRunner {
        &self.runner
    }
}

impl BenchmarkEntryPoint for BoundBenchmark {
    fn name(&self) -> &str {
        self.runner.definition().name()
    }

    fn invoke(&mut self) -> Result<BenchmarkMetrics> {
        self.runner.run(&self.args).cloned()
    }
}

/// Ordered collection of entry points.
///
/// Registration order is preserved; it is the order the engine runs them in.
#[derive(Default)]
pub struct BenchmarkRegistry {
    entries: Vec<Box<dyn BenchmarkEntryPoint>>,
}

impl std::fmt::Debug for BenchmarkRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| e.name()))
            .finish()
    }
}

impl BenchmarkRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry point.
    pub fn register(&mut self, entry: impl BenchmarkEntryPoint + 'static) {
        self.entries.push(Box::new(entry));
    }

    /// Append an already boxed entry point.
    pub fn register_boxed(&mut self, entry: Box<dyn BenchmarkEntryPoint>) {
        self.entries.push(entry);
    }

    /// Append every entry of `other`, keeping its order.
    pub fn extend(&mut self, other: BenchmarkRegistry) {
        self.entries.extend(other.entries);
    }

    /// Number of registered entry points.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name()).collect()
    }

    /// Consume the registry, yielding entry points in registration order.
    pub fn into_entries(self) -> Vec<Box<dyn BenchmarkEntryPoint>> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use semtest_core::embedding::StaticEmbeddingProvider;
    use semtest_core::error::BoxError;
    use std::sync::Arc;

    fn definition(name: &str) -> BenchmarkDefinition {
        let provider = StaticEmbeddingProvider::new()
            .with("hello friend", vec![1.0, 0.0])
            .with("hello", vec![0.9, 0.1])
            .with("hello pal", vec![0.8, 0.3]);
        BenchmarkDefinition::builder()
            .name(name)
            .responder(|args: &[String]| -> std::result::Result<String, BoxError> {
                Ok(if args.is_empty() {
                    "hello".to_string()
                } else {
                    format!("hello {}", args.join(" "))
                })
            })
            .expectation("hello friend")
            .iterations(2)
            .embedding_provider(Arc::new(provider))
            .build()
            .unwrap()
    }

    #[test]
    fn test_bound_benchmark_invoke() {
        let mut entry = BoundBenchmark::new(definition("greeting"));
        assert_eq!(entry.name(), "greeting");
        let metrics = entry.invoke().unwrap();
        assert_eq!(metrics.benchmarks.responses, vec!["hello", "hello"]);
    }

    #[test]
    fn test_bound_benchmark_forwards_args() {
        let mut entry = BoundBenchmark::with_args(definition("greeting"), vec!["pal".into()]);
        assert_eq!(entry.args(), ["pal"]);
        let metrics = entry.invoke().unwrap();
        assert_eq!(metrics.benchmarks.responses, vec!["hello pal", "hello pal"]);
    }

    #[test]
    fn test_invoke_twice_returns_cached_metrics() {
        let mut entry = BoundBenchmark::new(definition("greeting"));
        let first = entry.invoke().unwrap();
        let second = entry.invoke().unwrap();
        assert_eq!(first, second);
        assert_eq!(entry.runner().outcomes().len(), 2);
    }

    #[test]
    fn test_registry_preserves_order() {
        let mut registry = BenchmarkRegistry::new();
        assert!(registry.is_empty());
        registry.register(BoundBenchmark::new(definition("b")));
        registry.register(BoundBenchmark::new(definition("a")));

        let mut other = BenchmarkRegistry::new();
        other.register_boxed(Box::new(BoundBenchmark::new(definition("c"))));
        registry.extend(other);

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.names(), vec!["b", "a", "c"]);
        assert_eq!(format!("{registry:?}"), r#"["b", "a", "c"]"#);
    }
}
