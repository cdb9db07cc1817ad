//! Persistence for seed pool snapshots and ranked relation outputs.

use std::{
    collections::HashMap,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::EmoCauseError,
    nlp::{
        bootstrap::{BootstrapConfig, Relation, SeedPool},
        rules::Candidate,
        tree::Sentence,
    },
};

/// Seed pool written at the end of a training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub created_at: DateTime<Utc>,
    pub embedding_dims: usize,
    pub config: BootstrapConfig,
    pub pool: SeedPool,
}

impl PoolSnapshot {
    pub fn new(pool: SeedPool, config: BootstrapConfig, embedding_dims: usize) -> Self {
        Self {
            created_at: Utc::now(),
            embedding_dims,
            config,
            pool,
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
        serde_json::to_writer(BufWriter::new(file), self)?;
        info!(
            path = %path.display(),
            accepted = self.pool.accepted.len(),
            rejected = self.pool.rejected.len(),
            "saved seed pool"
        );
        Ok(())
    }

    /// Load a snapshot, checking it was built with `embedding_dims`-sized vectors.
    pub fn load(path: &Path, embedding_dims: usize) -> Result<Self, EmoCauseError> {
        if !path.exists() {
            return Err(EmoCauseError::MissingResource {
                resource: "seed pool snapshot",
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path)?;
        let snapshot: Self = serde_json::from_str(&text).map_err(|err| {
            EmoCauseError::invalid("seed pool snapshot", format!("{}: {err}", path.display()))
        })?;
        let stored = snapshot.pool.dims().unwrap_or(snapshot.embedding_dims);
        if snapshot.embedding_dims != embedding_dims || stored != embedding_dims {
            return Err(EmoCauseError::invalid(
                "seed pool snapshot",
                format!("built with {stored}-d embeddings, run uses {embedding_dims}-d"),
            ));
        }
        info!(
            path = %path.display(),
            accepted = snapshot.pool.accepted.len(),
            rejected = snapshot.pool.rejected.len(),
            "loaded frozen seed pool"
        );
        Ok(snapshot)
    }
}

/// One ranked output row.
#[derive(Debug, Clone, Serialize)]
pub struct RelationRow<'a> {
    pub rank: usize,
    pub sentence_id: usize,
    pub emotion: &'a str,
    pub cause: &'a str,
    pub confidence: f64,
    pub cycle: usize,
    pub rule: &'a str,
    pub sentence: &'a str,
}

impl<'a> RelationRow<'a> {
    pub fn from_relation(rank: usize, relation: &'a Relation) -> Self {
        Self {
            rank,
            sentence_id: relation.sentence_id,
            emotion: &relation.emotion_surface,
            cause: &relation.cause_surface,
            confidence: relation.status.confidence().unwrap_or(0.0),
            cycle: relation.status.cycle().unwrap_or(0),
            rule: relation.rule.as_str(),
            sentence: &relation.sentence_text,
        }
    }
}

/// Write ranked relations as CSV.
pub fn write_relations_csv(path: &Path, ranked: &[&Relation]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    for (rank, relation) in ranked.iter().enumerate() {
        writer.serialize(RelationRow::from_relation(rank + 1, relation))?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = ranked.len(), "wrote ranked relations");
    Ok(())
}

/// Write the human-readable report: score, emotion, cause and tweet per block.
///
/// Scores always carry a decimal point (`1.0`, never `1`).
pub fn write_report<W: Write>(mut out: W, ranked: &[&Relation]) -> Result<()> {
    for relation in ranked {
        writeln!(
            out,
            "{:?} EMOTION: {}\tCAUSE: {}\tTWEET: {}",
            relation.status.confidence().unwrap_or(0.0),
            relation.emotion_surface,
            relation.cause_surface,
            relation.sentence_text
        )?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_report_file(path: &Path, ranked: &[&Relation]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_report(BufWriter::new(file), ranked)?;
    info!(path = %path.display(), rows = ranked.len(), "wrote relation report");
    Ok(())
}

#[derive(Debug, Serialize)]
struct CandidateRow<'a> {
    sentence_id: usize,
    emotion: String,
    cause: String,
    rule: &'a str,
    sentence: &'a str,
}

/// Write rule-extracted candidates, before any bootstrapping, as CSV.
pub fn write_candidates_csv(
    path: &Path,
    candidates: &[Candidate],
    sentences: &[Sentence],
) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let by_id: HashMap<usize, &Sentence> = sentences.iter().map(|s| (s.id, s)).collect();
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    let mut rows = 0;
    for candidate in candidates {
        let Some(sentence) = by_id.get(&candidate.sentence_id) else {
            continue;
        };
        writer.serialize(CandidateRow {
            sentence_id: candidate.sentence_id,
            emotion: sentence.surface(&candidate.emotion_span),
            cause: sentence.surface(&candidate.cause_span),
            rule: candidate.rule.as_str(),
            sentence: &sentence.raw_text,
        })?;
        rows += 1;
    }
    writer.flush()?;
    info!(path = %path.display(), rows, "wrote candidate relations");
    Ok(rows)
}
