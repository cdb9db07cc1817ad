//! Error types shared by the extraction and bootstrapping layers.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading resources or assembling parsed sentences.
#[derive(Debug, Error)]
pub enum EmoCauseError {
    /// A token row or sentence tree could not be interpreted. Fatal for the
    /// affected sentence only.
    #[error("malformed input in sentence {sentence}: {reason}")]
    MalformedInput { sentence: usize, reason: String },

    /// A resource required for the whole run is absent.
    #[error("missing {resource} at {}", path.display())]
    MissingResource {
        resource: &'static str,
        path: PathBuf,
    },

    /// A resource exists but its contents cannot be used for this run.
    #[error("invalid {resource}: {reason}")]
    InvalidResource {
        resource: &'static str,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EmoCauseError {
    pub(crate) fn malformed(sentence: usize, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            sentence,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(resource: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidResource {
            resource,
            reason: reason.into(),
        }
    }

    /// Whether the error only invalidates a single sentence.
    pub fn is_sentence_local(&self) -> bool {
        matches!(self, Self::MalformedInput { .. })
    }
}

pub type Result<T, E = EmoCauseError> = std::result::Result<T, E>;
