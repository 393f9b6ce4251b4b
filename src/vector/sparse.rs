use std::collections::BTreeMap;

use super::{fnv1a, value_bits, DenseVector, EmbeddingVector};
use crate::error::Result;

/// Sparse embedding vector: explicit `dimension -> value` entries, zero elsewhere.
///
/// Entries are kept sorted by dimension, which makes iteration, alignment and
/// [`EmbeddingVector::content_key`] deterministic.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SparseVector {
    data: BTreeMap<usize, f32>,
}

impl SparseVector {
    /// Wrap an owned map.
    pub fn new(data: BTreeMap<usize, f32>) -> Self {
        Self { data }
    }

    /// Value at `key`, treating an absent entry as zero.
    pub fn value(&self, key: usize) -> f32 {
        self.data.get(&key).copied().unwrap_or(0.0)
    }

    /// Whether `key` is explicitly stored.
    pub fn contains_key(&self, key: usize) -> bool {
        self.data.contains_key(&key)
    }

    /// Stored entries in ascending dimension order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f32)> + '_ {
        self.data.iter().map(|(&k, &v)| (k, v))
    }

    /// Stored entries present in both operands, as `(key, self value, other value)`.
    pub(crate) fn intersection<'a>(
        &'a self,
        other: &'a Self,
    ) -> impl Iterator<Item = (usize, f32, f32)> + 'a {
        self.data
            .iter()
            .filter_map(|(&k, &a)| other.data.get(&k).map(|&b| (k, a, b)))
    }

    /// Project both operands onto the sorted union of their keys.
    ///
    /// The returned dense vectors have equal length; position `i` of each holds the
    /// value of the `i`-th smallest key, or zero where that operand lacks it.
    pub fn align(a: &Self, b: &Self) -> (DenseVector, DenseVector) {
        let keys: Vec<usize> = union_keys(a, b).collect();
        let project = |v: &Self| keys.iter().map(|&k| v.value(k)).collect::<DenseVector>();
        (project(a), project(b))
    }
}

/// Sorted, deduplicated union of both operands' keys.
fn union_keys<'a>(a: &'a SparseVector, b: &'a SparseVector) -> impl Iterator<Item = usize> + 'a {
    let mut left = a.data.keys().copied().peekable();
    let mut right = b.data.keys().copied().peekable();
    std::iter::from_fn(move || match (left.peek().copied(), right.peek().copied()) {
        (Some(l), Some(r)) if l == r => {
            left.next();
            right.next()
        }
        (Some(l), Some(r)) if l < r => left.next(),
        (Some(_), Some(_)) => right.next(),
        (Some(_), None) => left.next(),
        (None, _) => right.next(),
    })
}

impl FromIterator<(usize, f32)> for SparseVector {
    fn from_iter<I: IntoIterator<Item = (usize, f32)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl From<BTreeMap<usize, f32>> for SparseVector {
    fn from(data: BTreeMap<usize, f32>) -> Self {
        Self::new(data)
    }
}

impl EmbeddingVector for SparseVector {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn get(&self, index: usize) -> Option<f32> {
        self.data.get(&index).copied()
    }

    fn centroid_blend(&self, other: &Self, weight: f32) -> Result<Self> {
        let half = weight * 0.5;
        Ok(union_keys(self, other)
            .map(|k| {
                let a = self.value(k);
                let b = other.value(k);
                (k, a + half * (b - a))
            })
            .collect())
    }

    fn content_key(&self) -> u64 {
        // Stored zeros read the same as absent entries, so they are skipped.
        fnv1a(
            self.data
                .iter()
                .filter(|&(_, &v)| v != 0.0)
                .flat_map(|(&k, &v)| {
                    let k = k as u64;
                    [(k >> 32) as u32, k as u32, value_bits(v)]
                }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sv(entries: &[(usize, f32)]) -> SparseVector {
        entries.iter().copied().collect()
    }

    #[test]
    fn blend_covers_union_of_keys() {
        let a = sv(&[(0, 2.0), (3, 4.0)]);
        let b = sv(&[(3, 0.0), (7, 2.0)]);
        let c = a.centroid_blend(&b, 1.0).unwrap();
        assert_eq!(c.len(), 3);
        assert_eq!(c.get(0), Some(1.0));
        assert_eq!(c.get(3), Some(2.0));
        assert_eq!(c.get(7), Some(1.0));
    }

    #[test]
    fn absent_key_is_none_but_reads_as_zero() {
        let a = sv(&[(2, 5.0)]);
        assert_eq!(a.get(1), None);
        assert_eq!(a.value(1), 0.0);
        assert!(a.contains_key(2));
        assert!(!a.contains_key(1));
    }

    #[test]
    fn align_projects_onto_sorted_union() {
        let a = sv(&[(5, 1.0), (1, 2.0)]);
        let b = sv(&[(3, 3.0), (5, 4.0)]);
        let (da, db) = SparseVector::align(&a, &b);
        assert_eq!(da.as_slice(), &[2.0, 0.0, 1.0]);
        assert_eq!(db.as_slice(), &[0.0, 3.0, 4.0]);
    }

    #[test]
    fn content_key_ignores_insertion_order() {
        let a = sv(&[(1, 1.0), (9, 2.0)]);
        let b = sv(&[(9, 2.0), (1, 1.0)]);
        let c = sv(&[(1, 2.0), (9, 1.0)]);
        assert_eq!(a.content_key(), b.content_key());
        assert_ne!(a.content_key(), c.content_key());
    }

    #[test]
    fn content_key_ignores_stored_zeros() {
        let explicit = sv(&[(3, 0.0), (5, 1.5)]);
        let implicit = sv(&[(5, 1.5)]);
        assert_eq!(explicit.content_key(), implicit.content_key());
        assert_eq!(sv(&[(3, -0.0)]).content_key(), SparseVector::default().content_key());
    }

    #[test]
    fn intersection_only_yields_shared_keys() {
        let a = sv(&[(0, 1.0), (1, 2.0)]);
        let b = sv(&[(1, 5.0), (2, 6.0)]);
        let shared: Vec<_> = a.intersection(&b).collect();
        assert_eq!(shared, vec![(1, 2.0, 5.0)]);
    }
}
