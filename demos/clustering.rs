//! Streaming clustering of a small 2D dataset, dense and sparse.
//!
//! Run with `RUST_LOG=eddy=debug cargo run --example clustering` to see merge passes.

use eddy::{
    ClusterClassifier, DenseVector, MetricKind, SparseVector, StreamingClassifier,
    StreamingParams,
};
use tracing_subscriber::EnvFilter;

fn main() -> eddy::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Three directions, plus one vector pointing somewhere else entirely.
    let data: Vec<DenseVector> = [
        // Cluster A (along +x)
        [1.0, 0.0],
        [2.0, 0.1],
        [0.9, -0.05],
        // Cluster B (along +y)
        [0.0, 3.0],
        [0.1, 1.0],
        [-0.05, 2.0],
        // Cluster C (along -x)
        [-1.0, 0.0],
        [-4.0, 0.2],
        // Outlier
        [1.0, -1.0],
    ]
    .iter()
    .map(|p| DenseVector::new(p.to_vec()))
    .collect();

    for metric in [MetricKind::Manhattan, MetricKind::Euclidean, MetricKind::Cosine] {
        let mut classifier: StreamingClassifier<DenseVector, _> =
            StreamingClassifier::new(metric, StreamingParams::new(0.8, 0.5))?;
        let result = classifier.classify(&data)?;
        println!("=== {metric:?} ({} clusters) ===", result.n_clusters());
        for (i, (label, score)) in result.iter().enumerate() {
            println!(
                "  point {:2} ({:5.2}, {:5.2}) => cluster {} (outlier score {:.2})",
                i, data[i][0], data[i][1], label, score
            );
        }
    }

    // Bag-of-words style sparse vectors.
    let docs: Vec<SparseVector> = vec![
        [(0, 1.0), (1, 2.0)].into_iter().collect(),
        [(0, 1.0), (1, 1.0), (4, 0.2)].into_iter().collect(),
        [(7, 3.0)].into_iter().collect(),
    ];
    let mut classifier: StreamingClassifier<SparseVector, _> =
        StreamingClassifier::new(MetricKind::Cosine, StreamingParams::new(0.7, 1.0))?;
    let result = classifier.classify(&docs)?;
    println!("\n=== sparse, cosine ===");
    for (i, (label, score)) in result.iter().enumerate() {
        println!("  doc {i} => cluster {label} (outlier score {score:.2})");
    }

    Ok(())
}
