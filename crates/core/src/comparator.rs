// Copyright 2025 Semtest Contributors
// SPDX-License-Identifier: Apache-2.0

//! Embedding vector comparison strategies.
//!
//! A [`Comparator`] is a stateless strategy that reduces two embedding
//! vectors to a single scalar. The execution engine depends only on the
//! trait, so new variants can be added without touching it.
//!
//! # Example
//!
//! ```
//! use semtest_core::comparator::{Comparator, CosineSimilarity};
//!
//! let cosine = CosineSimilarity;
//! let score = cosine.calculate_distance(&[1.0, 0.0], &[1.0, 0.0]).unwrap();
//! assert!((score - 1.0).abs() < 1e-9);
//! ```

use crate::error::ComparatorError;
use std::fmt;
use std::sync::Arc;

/// Name of the default comparator.
pub const DEFAULT_COMPARATOR: &str = CosineSimilarity::NAME;

/// Distance or similarity strategy between two embedding vectors.
pub trait Comparator: Send + Sync {
    /// Reduce two vectors to a scalar.
    fn calculate_distance(&self, a: &[f32], b: &[f32]) -> Result<f64, ComparatorError>;

    /// Stable identifier reported in benchmark metrics.
    fn name(&self) -> &'static str;
}

impl fmt::Debug for dyn Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn check_shape(a: &[f32], b: &[f32]) -> Result<(), ComparatorError> {
    if a.is_empty() || b.is_empty() {
        return Err(ComparatorError::EmptyVector);
    }
    if a.len() != b.len() {
        return Err(ComparatorError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(())
}

fn dot(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| f64::from(*x) * f64::from(*y))
        .sum()
}

fn norm(v: &[f32]) -> f64 {
    dot(v, v).sqrt()
}

fn scalar(value: f64) -> Result<f64, ComparatorError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ComparatorError::NonScalar { value })
    }
}

/// Cosine similarity: `a·b / (|a| |b|)`, in `[-1, 1]`.
///
/// A zero-norm input has no direction and scores `0.0` against anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct CosineSimilarity;

impl CosineSimilarity {
    /// Registered name.
    pub const NAME: &'static str = "cosine_similarity";
}

impl Comparator for CosineSimilarity {
    fn calculate_distance(&self, a: &[f32], b: &[f32]) -> Result<f64, ComparatorError> {
        check_shape(a, b)?;
        let norms = norm(a) * norm(b);
        if norms == 0.0 {
            return Ok(0.0);
        }
        let similarity = dot(a, b) / norms;
        // Rounding can push identical directions a hair past the bounds.
        scalar(similarity).map(|s| s.clamp(-1.0, 1.0))
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}

/// Euclidean (L2) distance. Lower is closer.
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanDistance;

impl EuclideanDistance {
    /// Registered name.
    pub const NAME: &'static str = "euclidean_distance";
}

impl Comparator for EuclideanDistance {
    fn calculate_distance(&self, a: &[f32], b: &[f32]) -> Result<f64, ComparatorError> {
        check_shape(a, b)?;
        let sum: f64 = a
            .iter()
            .zip(b)
            .map(|(x, y)| {
                let d = f64::from(*x) - f64::from(*y);
                d * d
            })
            .sum();
        scalar(sum.sqrt())
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}

/// Raw dot product. Equals cosine similarity for unit-normalised embeddings.
#[derive(Debug, Clone, Copy, Default)]
pub struct DotProduct;

impl DotProduct {
    /// Registered name.
    pub const NAME: &'static str = "dot_product";
}

impl Comparator for DotProduct {
    fn calculate_distance(&self, a: &[f32], b: &[f32]) -> Result<f64, ComparatorError> {
        check_shape(a, b)?;
        scalar(dot(a, b))
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}

/// Names of every built-in comparator.
pub fn comparator_names() -> &'static [&'static str] {
    &[
        CosineSimilarity::NAME,
        EuclideanDistance::NAME,
        DotProduct::NAME,
    ]
}

/// Look up a built-in comparator by its registered name.
pub fn comparator_by_name(name: &str) -> Option<Arc<dyn Comparator>> {
    match name {
        CosineSimilarity::NAME => Some(Arc::new(CosineSimilarity)),
        EuclideanDistance::NAME => Some(Arc::new(EuclideanDistance)),
        DotProduct::NAME => Some(Arc::new(DotProduct)),
        _ => None,
    }
}
