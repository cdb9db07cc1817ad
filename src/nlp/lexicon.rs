//! Emotion keyword lexicon used to flag emotion-bearing tokens.

use std::{collections::HashSet, path::Path};

use tracing::info;

use crate::{
    error::{EmoCauseError, Result},
    nlp::tree::{Node, Sentence},
};

/// Set of lowercase emotion keywords.
#[derive(Debug, Clone, Default)]
pub struct EmotionLexicon {
    words: HashSet<String>,
}

impl EmotionLexicon {
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// Load one keyword per line; blank lines and `#` comments are ignored.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(EmoCauseError::MissingResource {
                resource: "emotion lexicon",
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path)?;
        let lexicon =
            Self::from_words(text.lines().filter(|line| !line.trim_start().starts_with('#')));
        info!(path = %path.display(), words = lexicon.len(), "loaded emotion lexicon");
        Ok(lexicon)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Verbs and adjectives whose lowercase text is a keyword.
    pub fn is_emotion(&self, node: &Node) -> bool {
        (node.pos.is_verb_like() || node.pos.is_adjective()) && self.contains(&node.lower)
    }

    pub fn mark(&self, sentence: &mut Sentence) {
        sentence.mark_emotions(|node| self.is_emotion(node));
    }
}
