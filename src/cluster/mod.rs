//! Streaming clustering of embedding vectors.
//!
//! ## Streaming vs batch clustering
//!
//! Batch algorithms (k-means, DBSCAN) look at the whole dataset at once and usually
//! need either the number of clusters or a density radius in advance. The
//! [`StreamingClassifier`] instead makes one pass over the input, opening a new
//! cluster whenever a vector is not similar enough to any existing one. The number
//! of clusters falls out of the similarity threshold.
//!
//! The price is order dependence: the partition is greedy, not globally optimal, and
//! feeding the same vectors in a different order can give a different partition.
//! Feeding the same order always gives the same partition (labels are fresh random
//! ids, so compare [`ClusteringResult::partition`] rather than raw labels).
//!
//! ## Outlier scores
//!
//! Every input gets `1 / size` of its final cluster. A vector that ends up alone
//! scores `1.0`, the maximal outlier.
//!
//! ## Usage
//!
//! ```rust
//! use eddy::cluster::{ClusterClassifier, StreamingClassifier, StreamingParams};
//! use eddy::metric::Cosine;
//! use eddy::vector::DenseVector;
//!
//! let data: Vec<DenseVector> = vec![
//!     DenseVector::new(vec![1.0, 0.1]),
//!     DenseVector::new(vec![0.9, 0.0]),
//!     DenseVector::new(vec![0.0, 1.0]),
//! ];
//!
//! let mut classifier = StreamingClassifier::new(Cosine, StreamingParams::new(0.9, 0.5)).unwrap();
//! let result = classifier.classify(&data).unwrap();
//! assert_eq!(result.labels[0], result.labels[1]);
//! assert_eq!(result.outlier_scores[2], 1.0);
//! ```

mod result;
mod streaming;
mod traits;
mod util;

pub use result::{ClusterId, ClusteringResult};
pub use streaming::{Cluster, MemberIdentity, StreamingClassifier, StreamingParams};
pub use traits::ClusterClassifier;
