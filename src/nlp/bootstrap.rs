//! Seed-driven bootstrapping of emotion/cause relations.
//!
//! Candidates start `Unevaluated`. Pre-seeding moves exact dictionary matches
//! into the pool, then every cycle scores the remaining candidates against a
//! read-only snapshot of the pool. Decisions from cycle *k* only become visible
//! to cycle *k + 1*.

use std::{cmp::Ordering, collections::HashMap};

use rayon::{prelude::*, ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    data::seeds::SeedDictionary,
    error::{EmoCauseError, Result},
    nlp::{
        context::{self, ContextVectors},
        embeddings::EmbeddingTable,
        rules::{Candidate, RuleKind},
        similarity::{self, SimilarityWeights},
        tree::Sentence,
    },
};

/// Thresholds, weights and cycle budget for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Acceptance threshold; a score must be strictly greater.
    pub tau: f64,
    /// Rejection threshold against rejected seeds.
    pub neg_tau: f64,
    pub cycles: usize,
    pub positive: SimilarityWeights,
    pub negative: SimilarityWeights,
    /// Scoring threads; `0` uses the rayon default.
    pub workers: usize,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            tau: 0.8,
            neg_tau: 0.9,
            cycles: 10,
            positive: SimilarityWeights::positive_default(),
            negative: SimilarityWeights::negative_default(),
            workers: 0,
        }
    }
}

/// Classification state of a relation. Leaves `Unevaluated` at most once.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SeedStatus {
    Unevaluated,
    Accepted { confidence: f64, cycle: usize },
    Rejected { confidence: f64, cycle: usize },
}

impl SeedStatus {
    pub fn is_unevaluated(&self) -> bool {
        matches!(self, Self::Unevaluated)
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    pub fn confidence(&self) -> Option<f64> {
        match self {
            Self::Unevaluated => None,
            Self::Accepted { confidence, .. } | Self::Rejected { confidence, .. } => {
                Some(*confidence)
            }
        }
    }

    pub fn cycle(&self) -> Option<usize> {
        match self {
            Self::Unevaluated => None,
            Self::Accepted { cycle, .. } | Self::Rejected { cycle, .. } => Some(*cycle),
        }
    }
}

/// A vectorized candidate relation carrying its classification state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub sentence_id: usize,
    pub sentence_text: String,
    pub emotion_span: Vec<usize>,
    pub cause_span: Vec<usize>,
    /// Lowercase emotion text, the key for seed dictionary matching.
    pub emotion_text: String,
    /// Lowercase cause text, matched against dictionary causes.
    pub cause_text: String,
    pub emotion_surface: String,
    pub cause_surface: String,
    pub rule: RuleKind,
    pub vectors: ContextVectors,
    pub status: SeedStatus,
}

impl Relation {
    pub fn new(candidate: &Candidate, sentence: &Sentence, table: &EmbeddingTable) -> Self {
        Self {
            sentence_id: sentence.id,
            sentence_text: sentence.raw_text.clone(),
            emotion_text: sentence.normalized(&candidate.emotion_span),
            cause_text: sentence.normalized(&candidate.cause_span),
            emotion_surface: sentence.surface(&candidate.emotion_span),
            cause_surface: sentence.surface(&candidate.cause_span),
            vectors: context::vectorize(
                sentence,
                &candidate.emotion_span,
                &candidate.cause_span,
                table,
            ),
            emotion_span: candidate.emotion_span.clone(),
            cause_span: candidate.cause_span.clone(),
            rule: candidate.rule,
            status: SeedStatus::Unevaluated,
        }
    }
}

/// Attach context vectors to every candidate whose sentence is available.
pub fn prepare_relations(
    candidates: &[Candidate],
    sentences: &[Sentence],
    table: &EmbeddingTable,
) -> Vec<Relation> {
    let by_id: HashMap<usize, &Sentence> = sentences.iter().map(|s| (s.id, s)).collect();
    candidates
        .iter()
        .filter_map(|candidate| {
            by_id
                .get(&candidate.sentence_id)
                .map(|sentence| Relation::new(candidate, sentence, table))
        })
        .collect()
}

/// Accepted ("good") and rejected ("bad") seeds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedPool {
    pub accepted: Vec<Relation>,
    pub rejected: Vec<Relation>,
}

impl SeedPool {
    pub fn len(&self) -> usize {
        self.accepted.len() + self.rejected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty() && self.rejected.is_empty()
    }

    /// Embedding dimension of the stored vectors, if any seed exists.
    pub fn dims(&self) -> Option<usize> {
        self.accepted
            .iter()
            .chain(&self.rejected)
            .next()
            .map(|seed| seed.vectors.dims())
    }

    fn admit(&mut self, relation: &Relation) {
        match relation.status {
            SeedStatus::Accepted { .. } => self.accepted.push(relation.clone()),
            SeedStatus::Rejected { .. } => self.rejected.push(relation.clone()),
            SeedStatus::Unevaluated => {}
        }
    }
}

/// Counts from pre-seeding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreSeedReport {
    pub accepted: usize,
    pub rejected: usize,
}

/// Decisions made in one propagation cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub cycle: usize,
    pub accepted: usize,
    pub rejected: usize,
}

impl CycleReport {
    pub fn is_fixed_point(&self) -> bool {
        self.accepted == 0 && self.rejected == 0
    }
}

/// Outcome of a full run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: Vec<CycleReport>,
    pub accepted: usize,
    pub rejected: usize,
    pub undetermined: usize,
}

/// The propagation state machine.
#[derive(Debug)]
pub struct Bootstrapper {
    config: BootstrapConfig,
    relations: Vec<Relation>,
    pool: SeedPool,
    frozen: bool,
    cycle: usize,
    workers: Option<ThreadPool>,
}

impl Bootstrapper {
    /// Training run: the pool starts empty and grows from pre-seeding.
    pub fn new(config: BootstrapConfig, relations: Vec<Relation>) -> Result<Self> {
        Self::build(config, relations, SeedPool::default(), false)
    }

    /// Inference run against a previously persisted pool that never grows.
    pub fn with_frozen_pool(
        config: BootstrapConfig,
        relations: Vec<Relation>,
        pool: SeedPool,
    ) -> Result<Self> {
        Self::build(config, relations, pool, true)
    }

    fn build(
        config: BootstrapConfig,
        relations: Vec<Relation>,
        pool: SeedPool,
        frozen: bool,
    ) -> Result<Self> {
        let workers = match config.workers {
            0 => None,
            n => Some(
                ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|err| EmoCauseError::invalid("worker pool", err.to_string()))?,
            ),
        };
        Ok(Self {
            config,
            relations,
            pool,
            frozen,
            cycle: 0,
            workers,
        })
    }

    pub fn config(&self) -> &BootstrapConfig {
        &self.config
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    pub fn pool(&self) -> &SeedPool {
        &self.pool
    }

    pub fn into_pool(self) -> SeedPool {
        self.pool
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Move exact dictionary matches out of `Unevaluated`.
    ///
    /// Negative matches win over positive ones. Candidates already decided are
    /// left alone, so calling this twice yields the same partition.
    pub fn pre_seed(
        &mut self,
        positive: &SeedDictionary,
        negative: &SeedDictionary,
    ) -> PreSeedReport {
        let mut report = PreSeedReport::default();
        for relation in &mut self.relations {
            if !relation.status.is_unevaluated() {
                continue;
            }
            if negative.matches(&relation.emotion_text, &relation.cause_text) {
                relation.status = SeedStatus::Rejected {
                    confidence: 0.0,
                    cycle: 0,
                };
                report.rejected += 1;
            } else if positive.matches(&relation.emotion_text, &relation.cause_text) {
                relation.status = SeedStatus::Accepted {
                    confidence: 1.0,
                    cycle: 0,
                };
                report.accepted += 1;
            } else {
                continue;
            }
            if !self.frozen {
                self.pool.admit(relation);
            }
        }
        info!(
            accepted = report.accepted,
            rejected = report.rejected,
            "pre-seeded relations"
        );
        report
    }

    /// Score every undecided relation against the current pool and apply the
    /// decisions at the cycle boundary.
    pub fn run_cycle(&mut self) -> CycleReport {
        let cycle = if self.frozen { 0 } else { self.cycle + 1 };
        let pending: Vec<usize> = self
            .relations
            .iter()
            .enumerate()
            .filter(|(_, relation)| relation.status.is_unevaluated())
            .map(|(idx, _)| idx)
            .collect();

        let decisions: Vec<(usize, SeedStatus)> = {
            let pool = &self.pool;
            let config = &self.config;
            let relations = &self.relations;
            let score_all = || -> Vec<(usize, SeedStatus)> {
                pending
                    .par_iter()
                    .filter_map(|&idx| {
                        decide(&relations[idx].vectors, pool, config, cycle)
                            .map(|status| (idx, status))
                    })
                    .collect()
            };
            match &self.workers {
                Some(workers) => workers.install(score_all),
                None => score_all(),
            }
        };

        let mut report = CycleReport {
            cycle,
            ..CycleReport::default()
        };
        for (idx, status) in decisions {
            let relation = &mut self.relations[idx];
            relation.status = status;
            if status.is_accepted() {
                report.accepted += 1;
            } else {
                report.rejected += 1;
            }
            if !self.frozen {
                self.pool.admit(relation);
            }
        }
        self.cycle = cycle;
        debug!(
            cycle,
            pending = pending.len(),
            accepted = report.accepted,
            rejected = report.rejected,
            "finished cycle"
        );
        report
    }

    /// Training runs cycle until the budget is spent or a cycle changes
    /// nothing; frozen runs perform exactly one cycle.
    pub fn run(&mut self) -> RunSummary {
        let mut cycles = Vec::new();
        if self.frozen {
            cycles.push(self.run_cycle());
        } else {
            for _ in 0..self.config.cycles {
                let report = self.run_cycle();
                cycles.push(report);
                if report.is_fixed_point() {
                    break;
                }
            }
        }
        let summary = self.summary(cycles);
        info!(
            cycles = summary.cycles.len(),
            accepted = summary.accepted,
            rejected = summary.rejected,
            undetermined = summary.undetermined,
            "bootstrapping finished"
        );
        summary
    }

    fn summary(&self, cycles: Vec<CycleReport>) -> RunSummary {
        let mut summary = RunSummary {
            cycles,
            ..RunSummary::default()
        };
        for relation in &self.relations {
            match relation.status {
                SeedStatus::Accepted { .. } => summary.accepted += 1,
                SeedStatus::Rejected { .. } => summary.rejected += 1,
                SeedStatus::Unevaluated => summary.undetermined += 1,
            }
        }
        summary
    }

    /// Accepted relations by descending confidence; ties keep candidate order.
    pub fn ranked(&self) -> Vec<&Relation> {
        let mut accepted: Vec<&Relation> = self
            .relations
            .iter()
            .filter(|relation| relation.status.is_accepted())
            .collect();
        accepted.sort_by(|a, b| {
            let a = a.status.confidence().unwrap_or(0.0);
            let b = b.status.confidence().unwrap_or(0.0);
            b.partial_cmp(&a).unwrap_or(Ordering::Equal)
        });
        accepted
    }
}

/// Rejection is a veto checked before acceptance.
fn decide(
    candidate: &ContextVectors,
    pool: &SeedPool,
    config: &BootstrapConfig,
    cycle: usize,
) -> Option<SeedStatus> {
    let vetoed = pool
        .rejected
        .iter()
        .any(|seed| similarity::score(&seed.vectors, candidate, &config.negative) > config.neg_tau);
    if vetoed {
        return Some(SeedStatus::Rejected {
            confidence: 0.0,
            cycle,
        });
    }
    let best = pool
        .accepted
        .iter()
        .map(|seed| similarity::score(&seed.vectors, candidate, &config.positive))
        .fold(f64::NEG_INFINITY, f64::max);
    (best > config.tau).then_some(SeedStatus::Accepted {
        confidence: best,
        cycle,
    })
}
