use super::result::ClusteringResult;
use crate::error::Result;

/// Common interface for classifiers that label a sequence of vectors.
pub trait ClusterClassifier<V> {
    /// Label every input vector and score how much of an outlier it is.
    ///
    /// The result has the same length and order as `vectors`.
    fn classify(&mut self, vectors: &[V]) -> Result<ClusteringResult>;

    /// Number of clusters left by the most recent [`classify`](Self::classify) call.
    ///
    /// Returns 0 before the first call.
    fn n_clusters(&self) -> usize;
}
