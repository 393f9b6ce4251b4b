use std::collections::HashMap;
use std::fmt;

use uuid::Uuid;

/// Opaque cluster label.
///
/// Every cluster, including one produced by a merge, gets a fresh random id, so ids
/// are unique within a run and differ between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ClusterId(Uuid);

impl ClusterId {
    pub(crate) fn fresh() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Per-input labels and outlier scores, parallel to the classifier's input.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClusteringResult {
    /// Cluster label of each input vector.
    pub labels: Vec<ClusterId>,
    /// `1 / size` of each input vector's cluster, in `(0, 1]`. `1.0` marks a singleton.
    pub outlier_scores: Vec<f32>,
}

impl ClusteringResult {
    /// Number of labelled inputs.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the input was empty.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of distinct labels.
    pub fn n_clusters(&self) -> usize {
        self.partition().len()
    }

    /// `(label, outlier score)` pairs in input order.
    pub fn iter(&self) -> impl Iterator<Item = (ClusterId, f32)> + '_ {
        self.labels
            .iter()
            .copied()
            .zip(self.outlier_scores.iter().copied())
    }

    /// Input positions grouped by label.
    ///
    /// Groups are ordered by their first position. This is the id-independent shape
    /// of the result: two runs over the same input yield equal partitions even though
    /// their labels differ.
    pub fn partition(&self) -> Vec<Vec<usize>> {
        let mut group_of: HashMap<ClusterId, usize> = HashMap::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for (position, label) in self.labels.iter().enumerate() {
            let idx = *group_of.entry(*label).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[idx].push(position);
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_are_distinct() {
        assert_ne!(ClusterId::fresh(), ClusterId::fresh());
    }

    #[test]
    fn partition_groups_by_first_occurrence() {
        let (a, b) = (ClusterId::fresh(), ClusterId::fresh());
        let result = ClusteringResult {
            labels: vec![b, a, b, a, a],
            outlier_scores: vec![0.5, 1.0 / 3.0, 0.5, 1.0 / 3.0, 1.0 / 3.0],
        };
        assert_eq!(result.partition(), vec![vec![0, 2], vec![1, 3, 4]]);
        assert_eq!(result.n_clusters(), 2);
        assert_eq!(result.len(), 5);
    }

    #[test]
    fn empty_result() {
        let result = ClusteringResult::default();
        assert!(result.is_empty());
        assert_eq!(result.n_clusters(), 0);
        assert_eq!(result.iter().count(), 0);
    }
}
