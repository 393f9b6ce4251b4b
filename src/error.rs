use thiserror::Error;

/// Errors returned by vectors, metrics and classifiers in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// A classifier parameter is out of range; raised by `StreamingParams::validate`.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Field of `StreamingParams` that was rejected.
        name: &'static str,
        /// Accepted range.
        message: &'static str,
    },

    /// Two dense vectors of different widths met in a distance or centroid blend.
    ///
    /// Inside the classifier, `expected` is the incoming vector's width and `found`
    /// the width of the centroid it was compared with.
    #[error("vector width mismatch: {expected} vs {found}")]
    DimensionMismatch {
        /// Width of the left-hand operand.
        expected: usize,
        /// Width of the right-hand operand.
        found: usize,
    },

    /// A vectorizer or embedder failed or returned the wrong number of vectors, or an
    /// input went missing from every cluster during result assembly.
    #[error("{0}")]
    Other(String),
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
