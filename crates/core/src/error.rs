// Copyright 2025 Semtest Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy shared by every semtest crate.
//!
//! Only per-iteration faults raised by a benchmarked responder are recovered
//! locally (see [`crate::execution::ExecutionFault`]). Everything here is
//! fatal to the operation that raised it and propagates to the caller.

use std::path::PathBuf;
use thiserror::Error;

/// Boxed error returned by benchmarked responders.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while discovering benchmark units.
///
/// Every variant aborts the whole discovery pass; no partial results are
/// returned.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The root path does not exist or is not a directory.
    #[error("{} is not a valid directory", .0.display())]
    InvalidDirectory(PathBuf),

    /// Two files normalise to the same logical module name.
    #[error("duplicate module name '{name}': {} and {}", .first.display(), .second.display())]
    DuplicateModuleName {
        /// The colliding module name.
        name: String,
        /// File that claimed the name first.
        first: PathBuf,
        /// File that collided with it.
        second: PathBuf,
    },

    /// A unit failed to load.
    #[error("failed to import module '{module}': {reason}")]
    Import {
        /// Logical module name of the failing unit.
        module: String,
        /// Human-readable cause.
        reason: String,
    },

    /// A qualified reference named a module that is not on the search path.
    #[error("module '{module}' referenced from '{from}' could not be resolved")]
    UnresolvedModule {
        /// Module that could not be found.
        module: String,
        /// Module holding the reference.
        from: String,
    },

    /// A benchmark referenced a responder binding that does not exist.
    #[error("module '{module}' has no responder named '{name}'")]
    UnknownResponder {
        /// Binding name.
        name: String,
        /// Module expected to define it.
        module: String,
    },

    /// Two benchmarks in one unit resolve to the same binding name.
    #[error("module '{module}' defines benchmark '{name}' more than once")]
    DuplicateBenchmarkName {
        /// The repeated binding name.
        name: String,
        /// Module defining it.
        module: String,
    },

    /// A benchmark named a comparator that is not registered.
    #[error("unknown comparator '{0}'")]
    UnknownComparator(String),
}

/// Failures of the embedding service.
///
/// These are infrastructure faults: they abort the current benchmark run.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// The request could not be sent or the body could not be read.
    #[error("embedding request failed: {0}")]
    Request(String),

    /// The service answered with a non-success status.
    #[error("embedding service returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, verbatim.
        body: String,
    },

    /// The service answered without any embedding data.
    #[error("failed to generate embedding vector for input '{input}' (model={model})")]
    EmptyResponse {
        /// Text that was submitted.
        input: String,
        /// Model that was asked.
        model: String,
    },

    /// The response could not be interpreted as an embedding.
    #[error("failed to parse embedding response: {0}")]
    MalformedResponse(String),
}

/// A comparator produced something other than a well-formed scalar.
#[derive(Debug, Error, PartialEq)]
pub enum ComparatorError {
    /// The computed value is not a finite number.
    #[error("failed to generate a consistent similarity metric from {value}")]
    NonScalar {
        /// The offending value.
        value: f64,
    },

    /// The two vectors have different dimensionality.
    #[error("vector dimensions differ: {left} vs {right}")]
    DimensionMismatch {
        /// Length of the first vector.
        left: usize,
        /// Length of the second vector.
        right: usize,
    },

    /// One of the vectors is empty.
    #[error("cannot compare empty vectors")]
    EmptyVector,
}

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid argument or missing builder field.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Discovery pass failed.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// Embedding service failed.
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    /// Comparator produced a malformed result.
    #[error(transparent)]
    Comparator(#[from] ComparatorError),

    /// Settings could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem or stream I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Build an [`Error::InvalidInput`].
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Whether this error came from the embedding service.
    pub fn is_embedding(&self) -> bool {
        matches!(self, Error::Embedding(_))
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

/// Result alias used across semtest.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_directory_message() {
        let err = DiscoveryError::InvalidDirectory(PathBuf::from("/nope"));
        assert_eq!(err.to_string(), "/nope is not a valid directory");
    }

    #[test]
    fn test_discovery_error_converts_transparently() {
        let err: Error = DiscoveryError::UnknownComparator("manhattan".into()).into();
        assert!(matches!(err, Error::Discovery(_)));
        assert_eq!(err.to_string(), "unknown comparator 'manhattan'");
    }

    #[test]
    fn test_is_embedding() {
        let err: Error = EmbeddingError::Request("connection reset".into()).into();
        assert!(err.is_embedding());
        assert!(!Error::invalid_input("x").is_embedding());
    }
}
