//! Loader for dependency-parsed tweets in tab-separated CoNLL-like format.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::{
    error::EmoCauseError,
    nlp::tree::{assemble, Sentence, TokenRow},
};

/// Sentences assembled from a corpus plus the ones that had to be skipped.
#[derive(Debug, Default)]
pub struct Corpus {
    pub sentences: Vec<Sentence>,
    pub skipped: Vec<EmoCauseError>,
}

impl Corpus {
    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }
}

/// Parse blank-line separated sentences. Malformed sentences are skipped; ids
/// count every block so they stay stable when a neighbour is dropped.
pub fn parse_corpus(text: &str, first_id: usize) -> Corpus {
    let mut corpus = Corpus::default();
    for (offset, block) in sentence_blocks(text).into_iter().enumerate() {
        let id = first_id + offset;
        let parsed = block
            .iter()
            .map(|line| TokenRow::parse(line, id))
            .collect::<Result<Vec<_>, _>>()
            .and_then(|rows| assemble(id, rows));
        match parsed {
            Ok(sentence) => corpus.sentences.push(sentence),
            Err(err) => {
                warn!(sentence = id, error = %err, "skipping malformed sentence");
                corpus.skipped.push(err);
            }
        }
    }
    corpus
}

fn sentence_blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

/// Parsed files under `path`: the file itself, or `.conll`/`.txt` files of a
/// directory in sorted order.
pub fn corpus_files(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.exists() {
        anyhow::bail!("parsed input {} does not exist", path.display());
    }
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|p| matches!(p.extension().and_then(|s| s.to_str()), Some("conll" | "txt")))
        .collect();
    files.sort();
    Ok(files)
}

/// Read every parsed file under `path` into one corpus.
pub fn load_corpus(path: &Path) -> Result<Corpus> {
    let mut corpus = Corpus::default();
    let mut next_id = 0;
    for file in corpus_files(path)? {
        let bytes = std::fs::read(&file).with_context(|| format!("read {}", file.display()))?;
        let text = String::from_utf8_lossy(&bytes);
        let blocks = sentence_blocks(&text).len();
        let part = parse_corpus(&text, next_id);
        next_id += blocks;
        corpus.sentences.extend(part.sentences);
        corpus.skipped.extend(part.skipped);
    }
    info!(
        path = %path.display(),
        sentences = corpus.sentences.len(),
        skipped = corpus.skipped.len(),
        "loaded parsed corpus"
    );
    Ok(corpus)
}
