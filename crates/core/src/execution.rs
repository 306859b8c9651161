// Copyright 2025 Semtest Contributors
// SPDX-License-Identifier: Apache-2.0

//! Benchmark definitions and per-iteration execution outcomes.
//!
//! A [`BenchmarkDefinition`] binds a text-producing [`Responder`] to a
//! semantic expectation, an iteration count, a comparator and an embedding
//! provider. The expectation is embedded exactly once, when the definition
//! is built. Apart from the responder's own internal cursor, nothing in a
//! definition changes after construction.
//!
//! # Invariants
//!
//! ```text
//! iterations >= 1
//! expectation_embedding == provider(expectation)   (computed once)
//! invoke() never unwinds: errors and panics become ExecutionOutcome::Failure
//! ```

use crate::comparator::{Comparator, CosineSimilarity};
use crate::embedding::EmbeddingProvider;
use crate::error::BoxError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::debug;

/// The wrapped callable: produces one response text per call.
///
/// The same argument list is forwarded on every iteration. Implementations
/// may keep state across calls; determinism is their own concern.
pub trait Responder {
    /// Produce one response.
    fn respond(&mut self, args: &[String]) -> Result<String, BoxError>;
}

impl<F> Responder for F
where
    F: FnMut(&[String]) -> Result<String, BoxError>,
{
    fn respond(&mut self, args: &[String]) -> Result<String, BoxError> {
        self(args)
    }
}

/// How an iteration failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    /// The responder returned an error.
    Error,
    /// The responder panicked.
    Panic,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultKind::Error => f.write_str("error"),
            FaultKind::Panic => f.write_str("panic"),
        }
    }
}

/// A fault captured from one iteration. Recorded, never propagated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionFault {
    /// Zero-based iteration that failed.
    pub iteration: usize,
    /// Error or panic.
    pub kind: FaultKind,
    /// Rendered error or panic payload.
    pub message: String,
}

impl fmt::Display for ExecutionFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "iteration {} {}: {}", self.iteration, self.kind, self.message)
    }
}

/// Result of one iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    /// The responder produced text.
    Success {
        /// The response.
        response: String,
    },
    /// The responder failed.
    Failure(ExecutionFault),
}

impl ExecutionOutcome {
    /// Whether this is a [`ExecutionOutcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionOutcome::Success { .. })
    }

    /// The response text, if successful.
    pub fn response(&self) -> Option<&str> {
        match self {
            ExecutionOutcome::Success { response } => Some(response),
            ExecutionOutcome::Failure(_) => None,
        }
    }

    /// The fault, if failed.
    pub fn fault(&self) -> Option<&ExecutionFault> {
        match self {
            ExecutionOutcome::Success { .. } => None,
            ExecutionOutcome::Failure(fault) => Some(fault),
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// A registered benchmark.
pub struct BenchmarkDefinition {
    name: String,
    responder: Box<dyn Responder>,
    expectation: String,
    iterations: usize,
    comparator: Arc<dyn Comparator>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    expectation_embedding: Vec<f32>,
}

impl fmt::Debug for BenchmarkDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BenchmarkDefinition")
            .field("name", &self.name)
            .field("expectation", &self.expectation)
            .field("iterations", &self.iterations)
            .field("comparator", &self.comparator.name())
            .field("embedding_dims", &self.expectation_embedding.len())
            .finish_non_exhaustive()
    }
}

impl BenchmarkDefinition {
    /// Create a new builder.
    pub fn builder() -> BenchmarkDefinitionBuilder {
        BenchmarkDefinitionBuilder::default()
    }

    /// Benchmark name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Semantic expectation text.
    pub fn expectation(&self) -> &str {
        &self.expectation
    }

    /// Number of iterations per run.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Bound comparator.
    pub fn comparator(&self) -> &dyn Comparator {
        self.comparator.as_ref()
    }

    /// Bound embedding provider.
    pub fn embedding_provider(&self) -> &dyn EmbeddingProvider {
        self.embedding_provider.as_ref()
    }

    /// Embedding of the expectation, computed at build time.
    pub fn expectation_embedding(&self) -> &[f32] {
        &self.expectation_embedding
    }

    /// Call the responder once, converting errors and panics into
    /// [`ExecutionOutcome::Failure`].
    pub fn invoke(&mut self, iteration: usize, args: &[String]) -> ExecutionOutcome {
        let responder = &mut self.responder;
        match catch_unwind(AssertUnwindSafe(|| responder.respond(args))) {
            Ok(Ok(response)) => ExecutionOutcome::Success { response },
            Ok(Err(err)) => ExecutionOutcome::Failure(ExecutionFault {
                iteration,
                kind: FaultKind::Error,
                message: err.to_string(),
            }),
            Err(payload) => ExecutionOutcome::Failure(ExecutionFault {
                iteration,
                kind: FaultKind::Panic,
                message: panic_message(payload),
            }),
        }
    }
}

/// Builder for [`BenchmarkDefinition`].
#[derive(Default)]
pub struct BenchmarkDefinitionBuilder {
    name: Option<String>,
    responder: Option<Box<dyn Responder>>,
    expectation: Option<String>,
    iterations: Option<usize>,
    comparator: Option<Arc<dyn Comparator>>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
}

impl BenchmarkDefinitionBuilder {
    /// Set the benchmark name (required).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the responder (required).
    pub fn responder(mut self, responder: impl Responder + 'static) -> Self {
        self.responder = Some(Box::new(responder));
        self
    }

    /// Set an already boxed responder (required).
    pub fn boxed_responder(mut self, responder: Box<dyn Responder>) -> Self {
        self.responder = Some(responder);
        self
    }

    /// Set the semantic expectation (required).
    pub fn expectation(mut self, expectation: impl Into<String>) -> Self {
        self.expectation = Some(expectation.into());
        self
    }

    /// Set the iteration count (default: 1).
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = Some(iterations);
        self
    }

    /// Set the comparator (default: [`CosineSimilarity`]).
    pub fn comparator(mut self, comparator: Arc<dyn Comparator>) -> Self {
        self.comparator = Some(comparator);
        self
    }

    /// Set the embedding provider (required).
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Build the [`BenchmarkDefinition`], embedding the expectation.
    ///
    /// Returns `Err` if required fields are missing, the iteration count is
    /// zero, or the embedding provider fails.
    pub fn build(self) -> crate::Result<BenchmarkDefinition> {
        let name = self
            .name
            .ok_or_else(|| crate::Error::invalid_input("name is required"))?;
        let responder = self
            .responder
            .ok_or_else(|| crate::Error::invalid_input("responder is required"))?;
        let expectation = self
            .expectation
            .ok_or_else(|| crate::Error::invalid_input("expectation is required"))?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| crate::Error::invalid_input("embedding_provider is required"))?;
        let iterations = self.iterations.unwrap_or(1);
        if iterations == 0 {
            return Err(crate::Error::invalid_input(format!(
                "iterations must be positive for benchmark {name}"
            )));
        }
        let comparator = self
            .comparator
            .unwrap_or_else(|| Arc::new(CosineSimilarity));

        debug!(benchmark = %name, "embedding semantic expectation");
        let expectation_embedding = embedding_provider.generate_embedding_vector(&expectation)?;

        Ok(BenchmarkDefinition {
            name,
            responder,
            expectation,
            iterations,
            comparator,
            embedding_provider,
            expectation_embedding,
        })
    }
}
