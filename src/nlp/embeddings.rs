//! Word embedding lookup table loaded from GloVe text files.

use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{EmoCauseError, Result};

/// Fill value of an empty context sum. Never zero, so cosine stays defined.
pub const EMPTY_CONTEXT_FILL: f64 = 1.0e-28;

/// Supported embedding dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum EmbeddingSize {
    #[default]
    #[value(name = "25")]
    D25,
    #[value(name = "50")]
    D50,
    #[value(name = "100")]
    D100,
    #[value(name = "200")]
    D200,
}

impl EmbeddingSize {
    pub fn dims(self) -> usize {
        match self {
            Self::D25 => 25,
            Self::D50 => 50,
            Self::D100 => 100,
            Self::D200 => 200,
        }
    }

    pub fn from_dims(dims: usize) -> Option<Self> {
        match dims {
            25 => Some(Self::D25),
            50 => Some(Self::D50),
            100 => Some(Self::D100),
            200 => Some(Self::D200),
            _ => None,
        }
    }

    /// Conventional file name for a GloVe table of this size.
    pub fn file_name(self) -> String {
        format!("glove{}.txt", self.dims())
    }
}

/// Lowercase word to fixed-length vector mapping.
#[derive(Debug, Clone)]
pub struct EmbeddingTable {
    dims: usize,
    vectors: HashMap<String, Array1<f64>>,
}

impl EmbeddingTable {
    pub fn new(size: EmbeddingSize) -> Self {
        Self {
            dims: size.dims(),
            vectors: HashMap::new(),
        }
    }

    /// Insert a vector, checking its dimension.
    pub fn insert(&mut self, word: impl Into<String>, vector: Vec<f64>) -> Result<()> {
        let word = word.into();
        if vector.len() != self.dims {
            return Err(EmoCauseError::invalid(
                "embedding table",
                format!(
                    "vector for {word:?} has {} dimensions, expected {}",
                    vector.len(),
                    self.dims
                ),
            ));
        }
        self.vectors.insert(word.to_lowercase(), Array1::from(vector));
        Ok(())
    }

    /// Load `word v1 … vd` lines. A missing file is fatal for the run.
    pub fn load(path: &Path, size: EmbeddingSize) -> Result<Self> {
        if !path.exists() {
            return Err(EmoCauseError::MissingResource {
                resource: "embedding table",
                path: path.to_path_buf(),
            });
        }
        let reader = BufReader::new(File::open(path)?);
        let mut table = Self::new(size);
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let mut parts = line.split_whitespace();
            let Some(word) = parts.next() else {
                continue;
            };
            let vector = parts
                .map(str::parse::<f64>)
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|err| {
                    EmoCauseError::invalid(
                        "embedding table",
                        format!("line {}: {err}", line_no + 1),
                    )
                })?;
            table.insert(word, vector)?;
        }
        info!(path = %path.display(), words = table.len(), dims = table.dims, "loaded embeddings");
        Ok(table)
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn get(&self, word: &str) -> Option<&Array1<f64>> {
        self.vectors.get(word)
    }

    /// The vector an empty context sums to.
    pub fn empty_context(&self) -> Array1<f64> {
        Array1::from_elem(self.dims, EMPTY_CONTEXT_FILL)
    }

    /// Additive bag-of-words embedding; unknown words contribute nothing.
    pub fn sum<'a, I>(&self, words: I) -> Array1<f64>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut total = self.empty_context();
        for word in words {
            if let Some(vector) = self.vectors.get(word) {
                total += vector;
            }
        }
        total
    }
}

/// Cosine similarity, `1 - cosine distance`. Zero when either side has no norm.
pub fn cosine(a: &Array1<f64>, b: &Array1<f64>) -> f64 {
    let dot = a.dot(b);
    let norm_a = a.dot(a).sqrt();
    let norm_b = b.dot(b).sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_words_leave_the_sentinel() {
        let table = EmbeddingTable::new(EmbeddingSize::D25);
        let total = table.sum(["nothing", "here"]);
        assert!(total.iter().all(|&v| v == EMPTY_CONTEXT_FILL));
    }

    #[test]
    fn rejects_wrong_dimension() {
        let mut table = EmbeddingTable::new(EmbeddingSize::D25);
        assert!(table.insert("love", vec![0.1; 24]).is_err());
    }

    #[test]
    fn sentinel_vectors_are_parallel() {
        let table = EmbeddingTable::new(EmbeddingSize::D50);
        let sim = cosine(&table.empty_context(), &table.empty_context());
        assert!((sim - 1.0).abs() < 1e-9);
    }
}
