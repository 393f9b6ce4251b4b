//! Distance metrics for dense and sparse vectors.
//!
//! Every metric is a small strategy object implementing [`DistanceMetric`] for both
//! [`DenseVector`] and [`SparseVector`]. Each offers two distances:
//!
//! - [`DistanceMetric::distance`]: in the raw vector space.
//! - [`DistanceMetric::unit_sphere_distance`]: after L2-normalizing both operands.
//!   This is the space the streaming classifier thresholds in, since it makes a
//!   threshold in `[0, 1]` meaningful regardless of vector magnitude.
//!
//! ## Important nuance
//!
//! [`Cosine`] returns a *distance*, $1 - \cos(a,b)$, in `[0, 2]`, not a similarity.
//!
//! For sparse operands, raw [`Manhattan`] and [`Euclidean`] only sum over dimensions
//! stored in *both* vectors; a dimension present on one side only contributes
//! nothing. Unit-sphere distances align both operands on the union of their keys
//! first, so they do not share this caveat.

use crate::error::Result;
use crate::vector::{DenseVector, SparseVector};

/// Guard against dividing by a near-zero magnitude product.
const COSINE_EPSILON: f64 = 1e-10;

/// A distance between two vectors of type `V`.
///
/// Implementations are pure and, up to floating-point summation order, symmetric.
pub trait DistanceMetric<V>: Send + Sync {
    /// Distance in the raw vector space.
    fn distance(&self, a: &V, b: &V) -> Result<f32>;

    /// Distance after normalizing both operands to unit length.
    fn unit_sphere_distance(&self, a: &V, b: &V) -> Result<f32>;
}

/// Manhattan (L1) distance: $\sum_i |a_i - b_i|$.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Manhattan;

/// Euclidean (L2) distance: $\sqrt{\sum_i (a_i - b_i)^2}$.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Euclidean;

/// Cosine distance: $1 - \frac{a \cdot b}{\max(|a||b|, \epsilon)}$.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cosine;

fn manhattan(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| f64::from(x - y).abs())
        .sum::<f64>() as f32
}

fn euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = f64::from(x - y);
            d * d
        })
        .sum::<f64>()
        .sqrt() as f32
}

fn cosine_from_parts(dot: f64, sq_a: f64, sq_b: f64) -> f32 {
    let magnitude = (sq_a.sqrt() * sq_b.sqrt()).max(COSINE_EPSILON);
    (1.0 - dot / magnitude) as f32
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let (mut dot, mut sq_a, mut sq_b) = (0.0f64, 0.0f64, 0.0f64);
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        sq_a += x * x;
        sq_b += y * y;
    }
    cosine_from_parts(dot, sq_a, sq_b)
}

fn sparse_manhattan(a: &SparseVector, b: &SparseVector) -> f32 {
    a.intersection(b)
        .map(|(_, x, y)| f64::from(x - y).abs())
        .sum::<f64>() as f32
}

fn sparse_euclidean(a: &SparseVector, b: &SparseVector) -> f32 {
    a.intersection(b)
        .map(|(_, x, y)| {
            let d = f64::from(x - y);
            d * d
        })
        .sum::<f64>()
        .sqrt() as f32
}

fn sparse_cosine(a: &SparseVector, b: &SparseVector) -> f32 {
    let dot = a
        .intersection(b)
        .map(|(_, x, y)| f64::from(x) * f64::from(y))
        .sum::<f64>();
    let sq = |v: &SparseVector| v.iter().map(|(_, x)| f64::from(x) * f64::from(x)).sum::<f64>();
    cosine_from_parts(dot, sq(a), sq(b))
}

macro_rules! impl_metric {
    ($metric:ty, $dense:ident, $sparse:ident) => {
        impl DistanceMetric<DenseVector> for $metric {
            fn distance(&self, a: &DenseVector, b: &DenseVector) -> Result<f32> {
                a.check_dim(b)?;
                Ok($dense(a.as_slice(), b.as_slice()))
            }

            fn unit_sphere_distance(&self, a: &DenseVector, b: &DenseVector) -> Result<f32> {
                a.check_dim(b)?;
                Ok($dense(a.to_unit().as_slice(), b.to_unit().as_slice()))
            }
        }

        impl DistanceMetric<SparseVector> for $metric {
            fn distance(&self, a: &SparseVector, b: &SparseVector) -> Result<f32> {
                Ok($sparse(a, b))
            }

            fn unit_sphere_distance(&self, a: &SparseVector, b: &SparseVector) -> Result<f32> {
                let (a, b) = SparseVector::align(a, b);
                <Self as DistanceMetric<DenseVector>>::unit_sphere_distance(self, &a, &b)
            }
        }
    };
}

impl_metric!(Manhattan, manhattan, sparse_manhattan);
impl_metric!(Euclidean, euclidean, sparse_euclidean);
impl_metric!(Cosine, cosine, sparse_cosine);

/// Runtime-selectable metric, for when the choice comes from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MetricKind {
    /// See [`Manhattan`].
    Manhattan,
    /// See [`Euclidean`].
    Euclidean,
    /// See [`Cosine`].
    #[default]
    Cosine,
}

impl<V> DistanceMetric<V> for MetricKind
where
    Manhattan: DistanceMetric<V>,
    Euclidean: DistanceMetric<V>,
    Cosine: DistanceMetric<V>,
{
    fn distance(&self, a: &V, b: &V) -> Result<f32> {
        match self {
            MetricKind::Manhattan => Manhattan.distance(a, b),
            MetricKind::Euclidean => Euclidean.distance(a, b),
            MetricKind::Cosine => Cosine.distance(a, b),
        }
    }

    fn unit_sphere_distance(&self, a: &V, b: &V) -> Result<f32> {
        match self {
            MetricKind::Manhattan => Manhattan.unit_sphere_distance(a, b),
            MetricKind::Euclidean => Euclidean.unit_sphere_distance(a, b),
            MetricKind::Cosine => Cosine.unit_sphere_distance(a, b),
        }
    }
}
