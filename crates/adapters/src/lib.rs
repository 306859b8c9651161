// Copyright 2025 Semtest Contributors
// SPDX-License-Identifier: Apache-2.0

//! Suite discovery and responder adapters for semtest.
//!
//! Benchmarks are declared in suite files (`.toml` or `.json`) anywhere
//! under a root directory. The [`Loader`] finds them, resolves responder
//! references across units and registers one entry point per benchmark.
//!
//! ```no_run
//! use std::sync::Arc;
//! use semtest_adapters::Loader;
//! use semtest_benchmarks::{BenchmarkReport, Engine};
//! use semtest_core::{OpenAiEmbeddingClient, Result, Settings};
//!
//! # fn main() -> Result<()> {
//! let settings = Settings::load()?;
//! let provider = Arc::new(OpenAiEmbeddingClient::new(&settings)?);
//! let loader = Loader::new("benchmarks", settings, provider);
//!
//! Engine::new(loader, BenchmarkReport::stdout()).execute()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod loader;
pub mod resolver;
pub mod responder;
pub mod suite;

pub use loader::{discover_units, DiscoveredUnit, Loader};
pub use resolver::{module_name, ResolverScope, UnitResolver};
pub use responder::{build_responder, ChatResponder, CommandResponder, FixtureResponder, ResponderError};
pub use suite::{BenchmarkSpec, ResponderRef, ResponderSpec, SuiteFormat, SuiteUnit};
