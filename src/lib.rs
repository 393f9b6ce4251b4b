//! Streaming clustering for embedding vectors.
//!
//! `eddy` groups a stream of dense or sparse vectors into clusters in a single pass,
//! without knowing the number of clusters in advance, and scores each input by how
//! much of an outlier it is.
//!
//! The crate is organized as:
//! - [`vector`]: dense and sparse vectors with a drift-style centroid blend
//! - [`metric`]: Manhattan, Euclidean and Cosine distances, raw and on the unit sphere
//! - [`cluster`]: the streaming classifier (greedy assignment, then merge to fixpoint)
//! - [`pipeline`]: contracts for vectorizers and embedding models feeding the classifier

#![forbid(unsafe_code)]

pub mod cluster;
pub mod error;
pub mod metric;
pub mod pipeline;
pub mod vector;

pub use cluster::{
    Cluster, ClusterClassifier, ClusterId, ClusteringResult, MemberIdentity, StreamingClassifier,
    StreamingParams,
};
pub use error::{Error, Result};
pub use metric::{Cosine, DistanceMetric, Euclidean, Manhattan, MetricKind};
pub use pipeline::{Embedder, Vectorizer};
pub use vector::{DenseVector, EmbeddingVector, SparseVector};
