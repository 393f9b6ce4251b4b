//! Embedding vectors.
//!
//! Two representations are provided:
//!
//! - [`DenseVector`]: a fixed-length array, indexed by position. Typical output of a
//!   deep-embedding model.
//! - [`SparseVector`]: a map from dimension to value, every other dimension being
//!   implicitly zero. Typical output of a bag-of-words or TF-IDF vectorizer.
//!
//! Both implement [`EmbeddingVector`], the capability set the classifier needs:
//! length, indexed read, a centroid blend, and a content-derived key.
//!
//! ## Centroid blend
//!
//! Clusters do not recompute a mean. Each time a vector joins a cluster the centroid
//! drifts toward it:
//!
//! ```text
//! c' = c + (w / 2) * (v - c)
//! ```
//!
//! With `w = 1` the centroid moves halfway toward `v`; with `w = 0` it stays put.
//!
//! ```rust
//! use eddy::vector::{DenseVector, EmbeddingVector};
//!
//! let c = DenseVector::new(vec![0.0, 0.0]);
//! let v = DenseVector::new(vec![2.0, 4.0]);
//! let moved = c.centroid_blend(&v, 1.0).unwrap();
//! assert_eq!(moved.as_slice(), &[1.0, 2.0]);
//! ```

mod dense;
mod sparse;

pub use dense::DenseVector;
pub use sparse::SparseVector;

use crate::error::Result;

/// Capability set shared by dense and sparse vectors.
pub trait EmbeddingVector: Clone + std::fmt::Debug + Send + Sync {
    /// Number of stored dimensions.
    ///
    /// For sparse vectors this is the number of explicitly stored entries, not the
    /// size of the ambient space.
    fn len(&self) -> usize;

    /// Whether the vector stores no dimensions at all.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw lookup. `None` means "out of range" (dense) or "not stored" (sparse).
    fn get(&self, index: usize) -> Option<f32>;

    /// Drift `self` toward `other`: `self + weight / 2 * (other - self)` per dimension.
    ///
    /// Returns a new vector; `self` is left untouched.
    fn centroid_blend(&self, other: &Self, weight: f32) -> Result<Self>;

    /// Deterministic key derived from the vector's content.
    ///
    /// Equal vectors produce equal keys: `-0.0` hashes like `0.0`, and a stored sparse
    /// zero hashes like an absent entry. Distinct vectors may collide.
    fn content_key(&self) -> u64;
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a over a stream of 32-bit words.
pub(crate) fn fnv1a(words: impl IntoIterator<Item = u32>) -> u64 {
    let mut hash = FNV_OFFSET;
    for word in words {
        for byte in word.to_le_bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(FNV_PRIME);
        }
    }
    hash
}

/// Bit pattern of `x` with `-0.0` folded onto `0.0`, so equal values hash equally.
pub(crate) fn value_bits(x: f32) -> u32 {
    if x == 0.0 {
        0
    } else {
        x.to_bits()
    }
}

/// Below this norm a vector is treated as the zero vector.
pub(crate) const NORM_EPSILON: f32 = 1e-10;
