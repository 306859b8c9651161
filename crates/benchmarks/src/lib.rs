// Copyright 2025 Semtest Contributors
// SPDX-License-Identifier: Apache-2.0

//! Benchmark execution and reporting for semtest.
//!
//! This crate runs semantic benchmarks and aggregates their results.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use semtest_benchmarks::{BenchmarkRegistry, BenchmarkReport, BoundBenchmark, Engine};
//! use semtest_core::{BenchmarkDefinition, BoxError, OpenAiEmbeddingClient, Result, Settings};
//!
//! # fn main() -> Result<()> {
//! let provider = Arc::new(OpenAiEmbeddingClient::new(&Settings::load()?)?);
//!
//! let source = move || -> Result<BenchmarkRegistry> {
//!     let definition = BenchmarkDefinition::builder()
//!         .name("greeting")
//!         .responder(|_: &[String]| -> std::result::Result<String, BoxError> {
//!             Ok("hi there".into())
//!         })
//!         .expectation("a friendly greeting")
//!         .iterations(3)
//!         .embedding_provider(provider.clone())
//!         .build()?;
//!
//!     let mut registry = BenchmarkRegistry::new();
//!     registry.register(BoundBenchmark::new(definition));
//!     Ok(registry)
//! };
//!
//! let mut engine = Engine::new(source, BenchmarkReport::stdout());
//! engine.execute()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`runner`] - the per-benchmark execution engine
//! - [`metrics`] - the immutable `BenchmarkMetrics` record
//! - [`entry`] - entry points and the registry units register into
//! - [`engine`] - orchestration of discovery, execution and reporting
//! - [`report`], [`markdown`], [`io`] - report rendering and output files

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod engine;
pub mod entry;
pub mod io;
pub mod markdown;
pub mod metrics;
pub mod report;
pub mod runner;

pub use engine::{AbortedBenchmark, Engine, EntryPointSource, Reporter};
pub use entry::{BenchmarkEntryPoint, BenchmarkRegistry, BoundBenchmark};
pub use metrics::{BenchmarkMetrics, ScoredResponse, SemanticMetrics};
pub use report::BenchmarkReport;
pub use runner::BenchmarkRunner;
