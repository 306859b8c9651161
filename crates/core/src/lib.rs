// Copyright 2025 Semtest Contributors
// SPDX-License-Identifier: Apache-2.0

//! Core types for semtest.
//!
//! This crate holds the pieces every other semtest crate builds on:
//!
//! - [`comparator`] - distance/similarity strategies between embeddings
//! - [`embedding`] - the embedding provider abstraction and OpenAI client
//! - [`execution`] - benchmark definitions and per-iteration outcomes
//! - [`config`] - runtime settings
//! - [`error`] - the shared error taxonomy

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod comparator;
pub mod config;
pub mod embedding;
pub mod error;
pub mod execution;

pub use comparator::{comparator_by_name, Comparator, CosineSimilarity};
pub use config::Settings;
pub use embedding::{EmbeddingProvider, OpenAiEmbeddingClient, StaticEmbeddingProvider};
pub use error::{BoxError, ComparatorError, DiscoveryError, EmbeddingError, Error, Result};
pub use execution::{
    BenchmarkDefinition, BenchmarkDefinitionBuilder, ExecutionFault, ExecutionOutcome, FaultKind,
    Responder,
};
