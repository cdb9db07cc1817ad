//! Weighted cosine similarity between relation contexts.

use serde::{Deserialize, Serialize};

use crate::nlp::{context::ContextVectors, embeddings::cosine};

/// Per-component weights (alpha, beta, gamma, delta, epsilon).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityWeights {
    /// alpha
    pub before: f64,
    /// beta
    pub between: f64,
    /// gamma
    pub after: f64,
    /// delta
    pub cause: f64,
    /// epsilon
    pub emotion: f64,
}

impl SimilarityWeights {
    pub const fn new(alpha: f64, beta: f64, gamma: f64, delta: f64, epsilon: f64) -> Self {
        Self {
            before: alpha,
            between: beta,
            after: gamma,
            cause: delta,
            emotion: epsilon,
        }
    }

    /// Weighting used against accepted seeds: mostly positional context.
    pub const fn positive_default() -> Self {
        Self::new(0.2, 0.5, 0.2, 0.0, 0.1)
    }

    /// Weighting used against rejected seeds. Bad relations tend to share a
    /// pronoun-like cause or the emotion verb itself.
    pub const fn negative_default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.5, 0.5)
    }

    pub fn total(&self) -> f64 {
        self.before + self.between + self.after + self.cause + self.emotion
    }
}

/// Weighted sum of per-component cosine similarities.
pub fn score(seed: &ContextVectors, candidate: &ContextVectors, weights: &SimilarityWeights) -> f64 {
    weights.before * cosine(&seed.before, &candidate.before)
        + weights.between * cosine(&seed.between, &candidate.between)
        + weights.after * cosine(&seed.after, &candidate.after)
        + weights.cause * cosine(&seed.cause, &candidate.cause)
        + weights.emotion * cosine(&seed.emotion, &candidate.emotion)
}
