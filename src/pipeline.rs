//! Contracts for the components that turn documents into vectors.
//!
//! Tokenization, vocabulary construction and model inference live outside this
//! crate. Anything implementing [`Vectorizer`] or [`Embedder`] can be plugged in
//! front of a [`ClusterClassifier`]; the classifier only ever sees the resulting
//! vector sequence, so the producer must hand it over in a deterministic order.

use crate::cluster::{ClusterClassifier, ClusteringResult};
use crate::error::{Error, Result};
use crate::vector::{DenseVector, EmbeddingVector};

/// A fitted document vectorizer, e.g. bag-of-words or TF-IDF.
pub trait Vectorizer {
    /// Vector type produced, usually [`SparseVector`](crate::vector::SparseVector).
    type Output: EmbeddingVector;

    /// Learn vocabulary and statistics from `docs`.
    fn fit<S: AsRef<str>>(&mut self, docs: &[S]) -> Result<()>;

    /// Vectorize `docs` with the fitted state. Output order matches input order.
    fn transform<S: AsRef<str>>(&self, docs: &[S]) -> Result<Vec<Self::Output>>;

    /// [`fit`](Self::fit) then [`transform`](Self::transform) on the same documents.
    fn fit_transform<S: AsRef<str>>(&mut self, docs: &[S]) -> Result<Vec<Self::Output>> {
        self.fit(docs)?;
        self.transform(docs)
    }

    /// Forget everything learned by `fit`.
    fn reset(&mut self);
}

/// A pretrained model mapping documents to fixed-width dense vectors.
pub trait Embedder {
    /// Width of every produced vector.
    fn dim(&self) -> usize;

    /// Embed `docs`. Output order matches input order; batching is up to the implementor.
    fn embed<S: AsRef<str>>(&self, docs: &[S]) -> Result<Vec<DenseVector>>;
}

/// Fit `vectorizer` on `docs`, then classify the vectors it produces.
pub fn cluster_documents<T, C, S>(
    vectorizer: &mut T,
    classifier: &mut C,
    docs: &[S],
) -> Result<ClusteringResult>
where
    T: Vectorizer,
    C: ClusterClassifier<T::Output>,
    S: AsRef<str>,
{
    let vectors = vectorizer.fit_transform(docs)?;
    check_count(docs.len(), vectors.len())?;
    classifier.classify(&vectors)
}

/// Embed `docs` with `embedder`, then classify the embeddings.
pub fn cluster_embeddings<E, C, S>(
    embedder: &E,
    classifier: &mut C,
    docs: &[S],
) -> Result<ClusteringResult>
where
    E: Embedder,
    C: ClusterClassifier<DenseVector>,
    S: AsRef<str>,
{
    let vectors = embedder.embed(docs)?;
    check_count(docs.len(), vectors.len())?;
    let dim = embedder.dim();
    if let Some(bad) = vectors.iter().find(|v| v.len() != dim) {
        return Err(Error::DimensionMismatch {
            expected: dim,
            found: bad.len(),
        });
    }
    classifier.classify(&vectors)
}

fn check_count(docs: usize, vectors: usize) -> Result<()> {
    if docs != vectors {
        return Err(Error::Other(format!(
            "producer returned {vectors} vectors for {docs} documents"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::cluster::{StreamingClassifier, StreamingParams};
    use crate::metric::Cosine;
    use crate::vector::SparseVector;

    /// Whitespace bag-of-words over a vocabulary learned by `fit`.
    #[derive(Default)]
    struct WordCounts {
        vocab: BTreeMap<String, usize>,
    }

    impl Vectorizer for WordCounts {
        type Output = SparseVector;

        fn fit<S: AsRef<str>>(&mut self, docs: &[S]) -> Result<()> {
            for doc in docs {
                for word in doc.as_ref().split_whitespace() {
                    let next = self.vocab.len();
                    self.vocab.entry(word.to_lowercase()).or_insert(next);
                }
            }
            Ok(())
        }

        fn transform<S: AsRef<str>>(&self, docs: &[S]) -> Result<Vec<SparseVector>> {
            Ok(docs
                .iter()
                .map(|doc| {
                    let mut counts = BTreeMap::new();
                    for word in doc.as_ref().split_whitespace() {
                        if let Some(&idx) = self.vocab.get(&word.to_lowercase()) {
                            *counts.entry(idx).or_insert(0.0) += 1.0;
                        }
                    }
                    SparseVector::new(counts)
                })
                .collect())
        }

        fn reset(&mut self) {
            self.vocab.clear();
        }
    }

    /// Embeds a document as (vowel count, consonant count).
    struct Letters {
        broken: bool,
    }

    impl Embedder for Letters {
        fn dim(&self) -> usize {
            2
        }

        fn embed<S: AsRef<str>>(&self, docs: &[S]) -> Result<Vec<DenseVector>> {
            Ok(docs
                .iter()
                .map(|doc| {
                    let letters = doc.as_ref().chars().filter(|c| c.is_ascii_alphabetic());
                    let (vowels, consonants) = letters.fold((0.0f32, 0.0f32), |(v, c), ch| {
                        if "aeiouAEIOU".contains(ch) {
                            (v + 1.0, c)
                        } else {
                            (v, c + 1.0)
                        }
                    });
                    if self.broken {
                        DenseVector::new(vec![vowels])
                    } else {
                        DenseVector::new(vec![vowels, consonants])
                    }
                })
                .collect())
        }
    }

    fn classifier<V>() -> StreamingClassifier<V, Cosine>
    where
        Cosine: crate::metric::DistanceMetric<V>,
        V: EmbeddingVector,
    {
        StreamingClassifier::new(Cosine, StreamingParams::new(0.7, 1.0)).unwrap()
    }

    #[test]
    fn documents_with_shared_words_cluster_together() {
        let docs = [
            "rust borrow checker",
            "the borrow checker in rust",
            "sourdough bread recipe",
        ];
        let mut vectorizer = WordCounts::default();
        let mut clf: StreamingClassifier<SparseVector, Cosine> = classifier();
        let result = cluster_documents(&mut vectorizer, &mut clf, &docs).unwrap();
        assert_eq!(result.labels[0], result.labels[1]);
        assert_ne!(result.labels[0], result.labels[2]);
        assert_eq!(result.outlier_scores[2], 1.0);
    }

    #[test]
    fn reset_clears_vocabulary() {
        let mut vectorizer = WordCounts::default();
        vectorizer.fit(&["a b c"]).unwrap();
        vectorizer.reset();
        let out = vectorizer.transform(&["a b c"]).unwrap();
        assert!(out[0].is_empty());
    }

    #[test]
    fn embeddings_are_classified_in_order() {
        let mut clf: StreamingClassifier<DenseVector, Cosine> = classifier();
        let docs = ["aeiou", "eiaoua", "bcdfg"];
        let result = cluster_embeddings(&Letters { broken: false }, &mut clf, &docs).unwrap();
        assert_eq!(result.len(), 3);
        assert_eq!(result.labels[0], result.labels[1]);
        assert_ne!(result.labels[0], result.labels[2]);
    }

    #[test]
    fn wrong_width_embeddings_are_rejected() {
        let mut clf: StreamingClassifier<DenseVector, Cosine> = classifier();
        let err = cluster_embeddings(&Letters { broken: true }, &mut clf, &["abc"]).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { expected: 2, found: 1 }));
    }
}
