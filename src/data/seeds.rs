//! Seed dictionaries: emotion text mapped to known cause texts.

use std::path::Path;

use anyhow::Context;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{EmoCauseError, Result};

/// Exact-match lookup of trusted (or distrusted) emotion/cause pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeedDictionary {
    pairs: IndexMap<String, Vec<String>>,
}

impl SeedDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw pairs, skipping entries whose emotion or cause has no tokens.
    pub fn from_map(raw: IndexMap<String, Vec<String>>) -> Self {
        let mut dictionary = Self::new();
        for (emotion, causes) in raw {
            for cause in causes {
                if !dictionary.insert(&emotion, &cause) {
                    warn!(%emotion, %cause, "skipping seed entry without tokens");
                }
            }
        }
        dictionary
    }

    /// Add a pair; returns `false` when either side is empty.
    pub fn insert(&mut self, emotion: &str, cause: &str) -> bool {
        if emotion.split_whitespace().next().is_none() || cause.split_whitespace().next().is_none()
        {
            return false;
        }
        let causes = self.pairs.entry(emotion.to_string()).or_default();
        if !causes.iter().any(|c| c == cause) {
            causes.push(cause.to_string());
        }
        true
    }

    pub fn matches(&self, emotion: &str, cause: &str) -> bool {
        self.pairs
            .get(emotion)
            .is_some_and(|causes| causes.iter().any(|c| c == cause))
    }

    /// Number of emotion keys.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pair_count(&self) -> usize {
        self.pairs.values().map(Vec::len).sum()
    }

    /// Load a JSON object of `emotion -> [cause, ...]`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(EmoCauseError::MissingResource {
                resource: "seed dictionary",
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path)?;
        let raw: IndexMap<String, Vec<String>> = serde_json::from_str(&text).map_err(|err| {
            EmoCauseError::invalid("seed dictionary", format!("{}: {err}", path.display()))
        })?;
        let dictionary = Self::from_map(raw);
        info!(
            path = %path.display(),
            emotions = dictionary.len(),
            pairs = dictionary.pair_count(),
            "loaded seed dictionary"
        );
        Ok(dictionary)
    }

    /// Load when a path is configured, otherwise an empty dictionary.
    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::new()),
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
        info!(path = %path.display(), pairs = self.pair_count(), "saved seed dictionary");
        Ok(())
    }

    /// Convert BIO-labelled sentences into seed pairs.
    ///
    /// `tokens` holds one sentence per line (`word` or `word:extra` items) and
    /// `labels` the matching `B-E I-E B-C I-C O` tags. Lines that do not line
    /// up are skipped and counted.
    pub fn from_bio(tokens: &str, labels: &str) -> (Self, usize) {
        let mut dictionary = Self::new();
        let mut skipped = 0;
        for (line_no, (token_line, label_line)) in tokens.lines().zip(labels.lines()).enumerate() {
            let words: Vec<String> = token_line
                .split_whitespace()
                .map(|w| w.split(':').next().unwrap_or(w).to_lowercase())
                .collect();
            let tags: Vec<&str> = label_line.split_whitespace().collect();
            match bio_pairs(&words, &tags) {
                Ok(pairs) => {
                    for (emotion, cause) in pairs {
                        dictionary.insert(&emotion, &cause);
                    }
                }
                Err(reason) => {
                    warn!(line = line_no + 1, %reason, "skipping labelled sentence");
                    skipped += 1;
                }
            }
        }
        (dictionary, skipped)
    }
}

#[derive(Default)]
struct BioState {
    emotion: Vec<String>,
    cause: Vec<String>,
    in_emotion: bool,
    in_cause: bool,
    pairs: Vec<(String, String)>,
}

impl BioState {
    /// Emit the pending pair once both sides have words.
    fn close(&mut self) {
        if !self.emotion.is_empty() && !self.cause.is_empty() {
            self.pairs.push((self.emotion.join(" "), self.cause.join(" ")));
            self.emotion.clear();
            self.cause.clear();
        }
    }
}

fn bio_pairs(
    words: &[String],
    tags: &[&str],
) -> std::result::Result<Vec<(String, String)>, String> {
    if words.len() != tags.len() {
        return Err(format!("{} tokens but {} labels", words.len(), tags.len()));
    }
    let mut state = BioState::default();
    for (word, tag) in words.iter().zip(tags) {
        match *tag {
            "I-E" => state.emotion.push(word.clone()),
            "I-C" => state.cause.push(word.clone()),
            "O" => {
                if state.in_emotion {
                    state.in_emotion = false;
                    state.close();
                } else if state.in_cause {
                    state.in_cause = false;
                    state.close();
                }
            }
            "B-E" => {
                if state.in_cause {
                    state.in_cause = false;
                    state.close();
                }
                state.emotion.push(word.clone());
                state.in_emotion = true;
            }
            "B-C" => {
                if state.in_emotion {
                    state.in_emotion = false;
                    state.close();
                }
                state.cause.push(word.clone());
                state.in_cause = true;
            }
            other => return Err(format!("unknown label {other:?}")),
        }
    }
    if state.in_emotion || state.in_cause {
        state.close();
    }
    Ok(state.pairs)
}
