use std::ops::Index;

use super::{fnv1a, value_bits, EmbeddingVector, NORM_EPSILON};
use crate::error::{Error, Result};

/// Dense embedding vector: a fixed-length array of `f32`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DenseVector {
    data: Vec<f32>,
}

impl DenseVector {
    /// Wrap an owned buffer.
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    /// View the underlying values.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Consume the vector and return its buffer.
    pub fn into_inner(self) -> Vec<f32> {
        self.data
    }

    /// Euclidean (L2) norm, accumulated in `f64`.
    pub fn norm(&self) -> f32 {
        self.data
            .iter()
            .map(|&x| f64::from(x) * f64::from(x))
            .sum::<f64>()
            .sqrt() as f32
    }

    /// Same direction, unit length.
    ///
    /// A vector with (near-)zero norm maps to the zero vector of the same length.
    pub fn to_unit(&self) -> Self {
        let n = self.norm();
        if n < NORM_EPSILON {
            return Self::new(vec![0.0; self.data.len()]);
        }
        Self::new(self.data.iter().map(|x| x / n).collect())
    }

    /// Fail unless `other` has the same length.
    pub(crate) fn check_dim(&self, other: &Self) -> Result<()> {
        if self.data.len() != other.data.len() {
            return Err(Error::DimensionMismatch {
                expected: self.data.len(),
                found: other.data.len(),
            });
        }
        Ok(())
    }
}

impl From<Vec<f32>> for DenseVector {
    fn from(data: Vec<f32>) -> Self {
        Self::new(data)
    }
}

impl FromIterator<f32> for DenseVector {
    fn from_iter<I: IntoIterator<Item = f32>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Index<usize> for DenseVector {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.data[index]
    }
}

impl EmbeddingVector for DenseVector {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn get(&self, index: usize) -> Option<f32> {
        self.data.get(index).copied()
    }

    fn centroid_blend(&self, other: &Self, weight: f32) -> Result<Self> {
        self.check_dim(other)?;
        let half = weight * 0.5;
        Ok(self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(&a, &b)| a + half * (b - a))
            .collect())
    }

    fn content_key(&self) -> u64 {
        fnv1a(self.data.iter().map(|&x| value_bits(x)))
    }
}
