//! Context vectors around an emotion/cause pair.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::nlp::{embeddings::EmbeddingTable, tree::Sentence};

/// Five additive embeddings describing a relation in its sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextVectors {
    pub before: Array1<f64>,
    pub between: Array1<f64>,
    pub after: Array1<f64>,
    pub emotion: Array1<f64>,
    pub cause: Array1<f64>,
}

impl ContextVectors {
    pub fn dims(&self) -> usize {
        self.before.len()
    }
}

/// Compute the before/between/after contexts and span embeddings.
///
/// Spans hold 1-based token indices sorted ascending; the span whose smallest
/// index comes first is treated as the earlier one.
pub fn vectorize(
    sentence: &Sentence,
    emotion_span: &[usize],
    cause_span: &[usize],
    table: &EmbeddingTable,
) -> ContextVectors {
    let (earlier, later) = if span_start(emotion_span) < span_start(cause_span) {
        (emotion_span, cause_span)
    } else {
        (cause_span, emotion_span)
    };
    let words: Vec<String> = sentence.tokens.iter().map(|t| t.to_lowercase()).collect();
    let n = words.len();

    // 1-based positions converted to half-open 0-based ranges.
    let before_end = span_start(earlier).saturating_sub(1).min(n);
    let between_start = span_end(earlier).min(n);
    let between_end = span_start(later).saturating_sub(1).min(n).max(between_start);
    let after_start = span_end(later).min(n);

    let slice = |from: usize, to: usize| words[from..to].iter().map(String::as_str);
    let span_words = |span: &[usize]| {
        span.iter()
            .filter_map(|&i| i.checked_sub(1).and_then(|p| words.get(p)))
            .map(String::as_str)
            .collect::<Vec<_>>()
    };

    ContextVectors {
        before: table.sum(slice(0, before_end)),
        between: table.sum(slice(between_start, between_end)),
        after: table.sum(slice(after_start, n)),
        emotion: table.sum(span_words(emotion_span)),
        cause: table.sum(span_words(cause_span)),
    }
}

fn span_start(span: &[usize]) -> usize {
    span.iter().copied().min().unwrap_or(0)
}

fn span_end(span: &[usize]) -> usize {
    span.iter().copied().max().unwrap_or(0)
}
