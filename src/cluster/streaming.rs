//! Single-pass streaming classifier.
//!
//! # Algorithm
//!
//! The classifier never needs the number of clusters up front. It runs in two phases:
//!
//! 1. **Greedy assignment.** Vectors are visited once, in input order. Each one is
//!    compared with every live centroid by unit-sphere distance. If the nearest
//!    centroid (first one wins on ties) is within the distance threshold, the vector
//!    joins that cluster and the centroid drifts toward it; otherwise it seeds a new
//!    cluster. Assignments are never revisited, so the outcome depends on input order.
//!
//! 2. **Merge to fixpoint.** Centroids that drifted within threshold of each other
//!    are merged. Each pass builds the "within threshold" graph over all centroids,
//!    takes its connected components with a union-find, and collapses every component
//!    of two or more clusters into one fresh cluster. Passes repeat until one merges
//!    nothing; each merging pass strictly shrinks the cluster count, so this halts.
//!
//! Each input's outlier score is `1 / size` of the cluster it ends up in.
//!
//! # Threshold convention
//!
//! Callers give a similarity in `(0, 1]`; the classifier thresholds on the distance
//! `1 - similarity_threshold`, measured in the metric's unit-sphere space.
//!
//! # Member identity
//!
//! By default members are keyed by input position ([`MemberIdentity::Sequence`]), so
//! duplicates are counted individually. [`MemberIdentity::Content`] keys members by
//! [`EmbeddingVector::content_key`] instead: identical inputs collapse into one member,
//! and distinct inputs whose keys collide are silently conflated.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, trace};

use super::result::{ClusterId, ClusteringResult};
use super::traits::ClusterClassifier;
use super::util::UnionFind;
use crate::error::{Error, Result};
use crate::metric::DistanceMetric;
use crate::vector::EmbeddingVector;

/// How input vectors are identified inside a cluster's member set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MemberIdentity {
    /// Input position. Every input is a distinct member.
    #[default]
    Sequence,
    /// Content key. Equal inputs share one member.
    Content,
}

/// Parameters of a [`StreamingClassifier`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StreamingParams {
    /// Minimum similarity for a vector to join a cluster, in `(0, 1]`.
    pub similarity_threshold: f32,
    /// Weight passed to [`EmbeddingVector::centroid_blend`], in `[0, 1]`.
    ///
    /// `1.0` moves a centroid halfway toward each new member; `0.0` freezes it.
    pub drift_resistance: f32,
    /// How members are keyed.
    pub identity: MemberIdentity,
}

impl Default for StreamingParams {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.9,
            drift_resistance: 1.0,
            identity: MemberIdentity::Sequence,
        }
    }
}

impl StreamingParams {
    /// Create params with the given similarity threshold and drift resistance.
    pub fn new(similarity_threshold: f32, drift_resistance: f32) -> Self {
        Self {
            similarity_threshold,
            drift_resistance,
            ..Default::default()
        }
    }

    /// Set the similarity threshold.
    pub fn with_similarity_threshold(mut self, similarity_threshold: f32) -> Self {
        self.similarity_threshold = similarity_threshold;
        self
    }

    /// Set the drift resistance.
    pub fn with_drift_resistance(mut self, drift_resistance: f32) -> Self {
        self.drift_resistance = drift_resistance;
        self
    }

    /// Set how members are keyed.
    pub fn with_identity(mut self, identity: MemberIdentity) -> Self {
        self.identity = identity;
        self
    }

    /// Check that both numeric parameters lie in their valid ranges.
    pub fn validate(&self) -> Result<()> {
        let sim = self.similarity_threshold;
        if sim.is_nan() || sim <= 0.0 || sim > 1.0 {
            return Err(Error::InvalidParameter {
                name: "similarity_threshold",
                message: "must be in (0, 1]",
            });
        }
        if !(0.0..=1.0).contains(&self.drift_resistance) {
            return Err(Error::InvalidParameter {
                name: "drift_resistance",
                message: "must be in [0, 1]",
            });
        }
        Ok(())
    }

    /// Unit-sphere distance at or below which two vectors are considered similar.
    pub fn distance_threshold(&self) -> f32 {
        1.0 - self.similarity_threshold
    }
}

/// A live cluster: a drifting centroid plus the keys of its members.
#[derive(Debug, Clone)]
pub struct Cluster<V> {
    id: ClusterId,
    centroid: V,
    members: BTreeSet<u64>,
}

impl<V> Cluster<V> {
    fn new(centroid: V, members: BTreeSet<u64>) -> Self {
        Self {
            id: ClusterId::fresh(),
            centroid,
            members,
        }
    }

    fn singleton(centroid: V, key: u64) -> Self {
        Self::new(centroid, BTreeSet::from([key]))
    }

    /// Cluster label.
    pub fn id(&self) -> ClusterId {
        self.id
    }

    /// Current centroid.
    pub fn centroid(&self) -> &V {
        &self.centroid
    }

    /// Member keys: input positions or content keys, depending on [`MemberIdentity`].
    pub fn members(&self) -> &BTreeSet<u64> {
        &self.members
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false for clusters produced by the classifier.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// `1 / len`. A singleton scores `1.0`.
    pub fn outlier_score(&self) -> f32 {
        1.0 / self.members.len() as f32
    }
}

/// Streaming, single-pass cluster classifier.
///
/// Not meant to be shared across concurrent `classify` calls: cluster state is
/// rebuilt by each call and kept afterwards for inspection via [`clusters`](Self::clusters).
///
/// ```rust
/// use eddy::{ClusterClassifier, DenseVector, Euclidean, StreamingClassifier, StreamingParams};
///
/// let data: Vec<DenseVector> = vec![
///     DenseVector::new(vec![1.0, 0.0]),
///     DenseVector::new(vec![0.99, 0.05]),
///     DenseVector::new(vec![0.0, 1.0]),
/// ];
/// let mut classifier = StreamingClassifier::new(Euclidean, StreamingParams::new(0.9, 1.0)).unwrap();
/// let result = classifier.classify(&data).unwrap();
/// assert_eq!(result.labels[0], result.labels[1]);
/// assert_ne!(result.labels[0], result.labels[2]);
/// assert_eq!(result.outlier_scores[2], 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct StreamingClassifier<V, M> {
    metric: M,
    params: StreamingParams,
    clusters: Vec<Cluster<V>>,
}

impl<V, M> StreamingClassifier<V, M>
where
    V: EmbeddingVector,
    M: DistanceMetric<V>,
{
    /// Create a classifier, rejecting out-of-range parameters.
    pub fn new(metric: M, params: StreamingParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            metric,
            params,
            clusters: Vec::new(),
        })
    }

    /// Configured parameters.
    pub fn params(&self) -> &StreamingParams {
        &self.params
    }

    /// Distance strategy.
    pub fn metric(&self) -> &M {
        &self.metric
    }

    /// Clusters left by the most recent `classify`, in slot order.
    pub fn clusters(&self) -> &[Cluster<V>] {
        &self.clusters
    }

    /// Merge clusters whose centroids are within threshold until none are.
    ///
    /// Returns the number of merge groups collapsed. Calling this again right after
    /// it returns always yields 0.
    pub fn merge_to_fixpoint(&mut self) -> Result<usize> {
        let mut total = 0;
        let mut pass = 0;
        loop {
            let merged = self.merge_pass()?;
            pass += 1;
            debug!(pass, merged, n_clusters = self.clusters.len(), "merge pass");
            if merged == 0 {
                return Ok(total);
            }
            total += merged;
        }
    }

    fn member_key(&self, position: usize, vector: &V) -> u64 {
        match self.params.identity {
            MemberIdentity::Sequence => position as u64,
            MemberIdentity::Content => vector.content_key(),
        }
    }

    /// Nearest centroid by unit-sphere distance. Ties go to the lowest slot.
    fn nearest(&self, vector: &V) -> Result<Option<(usize, f32)>> {
        let mut best: Option<(usize, f32)> = None;
        for (slot, cluster) in self.clusters.iter().enumerate() {
            let d = self.metric.unit_sphere_distance(vector, &cluster.centroid)?;
            let better = match best {
                None => true,
                Some((_, b)) => d < b || b.is_nan(),
            };
            if better {
                best = Some((slot, d));
            }
        }
        Ok(best)
    }

    fn assign(&mut self, vectors: &[V]) -> Result<()> {
        let threshold = self.params.distance_threshold();
        let drift = self.params.drift_resistance;

        for (position, vector) in vectors.iter().enumerate() {
            let key = self.member_key(position, vector);
            match self.nearest(vector)? {
                Some((slot, d)) if d <= threshold => {
                    let cluster = &mut self.clusters[slot];
                    cluster.members.insert(key);
                    cluster.centroid = cluster.centroid.centroid_blend(vector, drift)?;
                }
                nearest => {
                    let cluster = Cluster::singleton(vector.clone(), key);
                    trace!(
                        position,
                        id = %cluster.id,
                        nearest_distance = ?nearest.map(|(_, d)| d),
                        "new cluster"
                    );
                    self.clusters.push(cluster);
                }
            }
        }
        Ok(())
    }

    /// Pairs of slots `(i, j)`, `i < j`, whose centroids are within threshold.
    fn adjacent_pairs(&self, threshold: f32) -> Result<Vec<(usize, usize)>> {
        let n = self.clusters.len();
        let row = |i: usize| -> Result<Vec<(usize, usize)>> {
            let mut out = Vec::new();
            for j in (i + 1)..n {
                let d = self
                    .metric
                    .unit_sphere_distance(&self.clusters[i].centroid, &self.clusters[j].centroid)?;
                if d <= threshold {
                    out.push((i, j));
                }
            }
            Ok(out)
        };

        #[cfg(feature = "parallel")]
        let rows: Vec<Vec<(usize, usize)>> = {
            use rayon::prelude::*;
            (0..n).into_par_iter().map(row).collect::<Result<_>>()?
        };
        #[cfg(not(feature = "parallel"))]
        let rows: Vec<Vec<(usize, usize)>> = (0..n).map(row).collect::<Result<_>>()?;

        Ok(rows.into_iter().flatten().collect())
    }

    /// One merge pass. Returns the number of groups collapsed.
    fn merge_pass(&mut self) -> Result<usize> {
        let n = self.clusters.len();
        if n < 2 {
            return Ok(0);
        }
        let drift = self.params.drift_resistance;

        let mut uf = UnionFind::new(n);
        for (i, j) in self.adjacent_pairs(self.params.distance_threshold())? {
            uf.union(i, j);
        }
        let groups: Vec<Vec<usize>> = uf
            .components()
            .into_iter()
            .filter(|group| group.len() > 1)
            .collect();
        if groups.is_empty() {
            return Ok(0);
        }

        // Build every merged cluster before touching `self.clusters`, so an error
        // leaves the pre-pass state intact.
        let mut absorbed = vec![false; n];
        let mut merged = Vec::with_capacity(groups.len());
        for group in &groups {
            let Some((&last, rest)) = group.split_last() else {
                continue;
            };
            let mut centroid = self.clusters[last].centroid.clone();
            for &slot in rest {
                centroid = centroid.centroid_blend(&self.clusters[slot].centroid, drift)?;
            }
            let mut members = BTreeSet::new();
            for &slot in group {
                members.extend(self.clusters[slot].members.iter().copied());
                absorbed[slot] = true;
            }
            let cluster = Cluster::new(centroid, members);
            trace!(id = %cluster.id, absorbed = group.len(), size = cluster.len(), "merged clusters");
            merged.push(cluster);
        }

        let previous = std::mem::take(&mut self.clusters);
        self.clusters = previous
            .into_iter()
            .zip(absorbed)
            .filter_map(|(cluster, gone)| (!gone).then_some(cluster))
            .collect();
        self.clusters.extend(merged);
        Ok(groups.len())
    }

    fn assemble(&self, vectors: &[V]) -> Result<ClusteringResult> {
        // With content identity a key may sit in several clusters; the lowest slot wins.
        let mut slot_of: HashMap<u64, usize> = HashMap::new();
        for (slot, cluster) in self.clusters.iter().enumerate() {
            for &key in &cluster.members {
                slot_of.entry(key).or_insert(slot);
            }
        }

        let mut labels = Vec::with_capacity(vectors.len());
        let mut outlier_scores = Vec::with_capacity(vectors.len());
        for (position, vector) in vectors.iter().enumerate() {
            let key = self.member_key(position, vector);
            let slot = *slot_of
                .get(&key)
                .ok_or_else(|| Error::Other(format!("input {position} is not in any cluster")))?;
            let cluster = &self.clusters[slot];
            labels.push(cluster.id);
            outlier_scores.push(cluster.outlier_score());
        }
        Ok(ClusteringResult {
            labels,
            outlier_scores,
        })
    }
}

impl<V, M> ClusterClassifier<V> for StreamingClassifier<V, M>
where
    V: EmbeddingVector,
    M: DistanceMetric<V>,
{
    fn classify(&mut self, vectors: &[V]) -> Result<ClusteringResult> {
        self.clusters.clear();
        debug!(
            n_vectors = vectors.len(),
            similarity_threshold = self.params.similarity_threshold,
            drift_resistance = self.params.drift_resistance,
            identity = ?self.params.identity,
            "classify"
        );
        if vectors.is_empty() {
            return Ok(ClusteringResult::default());
        }

        self.assign(vectors)?;
        debug!(n_clusters = self.clusters.len(), "greedy assignment done");

        let merges = self.merge_to_fixpoint()?;
        let result = self.assemble(vectors)?;
        debug!(n_clusters = self.clusters.len(), merges, "classify done");
        Ok(result)
    }

    fn n_clusters(&self) -> usize {
        self.clusters.len()
    }
}
