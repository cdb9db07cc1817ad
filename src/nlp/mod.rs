//! Emotion/cause extraction orchestration layer.

pub mod bootstrap;
pub mod context;
pub mod embeddings;
pub mod lexicon;
pub mod rules;
pub mod similarity;
pub mod tree;

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{info, warn};

use crate::{
    config::Settings,
    data::{
        conll,
        seeds::SeedDictionary,
        store::{self, PoolSnapshot},
    },
};
use bootstrap::{Bootstrapper, RunSummary};
use embeddings::EmbeddingTable;
use lexicon::EmotionLexicon;
use rules::{Candidate, CandidatePolicy, RuleExtractor};
use tree::Sentence;

/// Read-only lookup tables shared by every stage of a run.
#[derive(Debug, Clone)]
pub struct Resources {
    pub lexicon: EmotionLexicon,
    pub embeddings: EmbeddingTable,
}

impl Resources {
    /// Load the lexicon and embedding table; either one missing aborts the run.
    pub fn load(settings: &Settings) -> Result<Self> {
        let lexicon = EmotionLexicon::load(&settings.lexicon_path)?;
        let embeddings = EmbeddingTable::load(&settings.embeddings_file(), settings.embedding_size)?;
        Ok(Self {
            lexicon,
            embeddings,
        })
    }
}

/// Flag emotion nodes and apply the dependency rules.
pub fn extract(
    sentences: &mut [Sentence],
    lexicon: &EmotionLexicon,
    policy: CandidatePolicy,
) -> Vec<Candidate> {
    for sentence in sentences.iter_mut() {
        lexicon.mark(sentence);
    }
    let emotions: usize = sentences.iter().map(|s| s.emotion_nodes.len()).sum();
    let candidates = RuleExtractor::new(policy).build_candidate_list(sentences);
    info!(
        sentences = sentences.len(),
        emotions,
        candidates = candidates.len(),
        "extracted candidates"
    );
    candidates
}

/// Run the rules only and write the candidate list.
pub async fn extract_candidates(
    settings: &Settings,
    input: &Path,
    policy: CandidatePolicy,
    output: Option<PathBuf>,
) -> Result<()> {
    let lexicon = EmotionLexicon::load(&settings.lexicon_path)?;
    let mut corpus = conll::load_corpus(input)?;
    let candidates = extract(&mut corpus.sentences, &lexicon, policy);
    let path = output.unwrap_or_else(|| settings.join_output("candidates.csv"));
    store::write_candidates_csv(&path, &candidates, &corpus.sentences)?;
    Ok(())
}

/// Extract candidates and bootstrap them into ranked relations.
///
/// Training mode pre-seeds from the seed dictionaries, cycles to a fixed point
/// and persists the pool; test mode scores once against the persisted pool.
pub async fn run_bootstrap(
    settings: &Settings,
    input: &Path,
    policy: CandidatePolicy,
    output_stem: &str,
) -> Result<RunSummary> {
    let resources = Resources::load(settings)?;
    let dims = resources.embeddings.dims();

    // Every resource is resolved before the first cycle.
    let frozen = if settings.test_mode {
        Some(PoolSnapshot::load(&settings.pool_path, dims)?)
    } else {
        None
    };
    let seeds = if frozen.is_none() {
        Some((
            SeedDictionary::load(&settings.seeds_path)?,
            SeedDictionary::load_optional(settings.negative_seeds_path.as_deref())?,
        ))
    } else {
        None
    };

    let mut corpus = conll::load_corpus(input)?;
    let candidates = extract(&mut corpus.sentences, &resources.lexicon, policy);
    let relations =
        bootstrap::prepare_relations(&candidates, &corpus.sentences, &resources.embeddings);

    let config = settings.bootstrap.clone();
    let mut engine = match frozen {
        Some(snapshot) => Bootstrapper::with_frozen_pool(config, relations, snapshot.pool)?,
        None => Bootstrapper::new(config, relations)?,
    };
    if let Some((positive, negative)) = &seeds {
        let report = engine.pre_seed(positive, negative);
        if report.accepted == 0 {
            warn!("no candidate matched the seed dictionary; nothing can propagate");
        }
    }

    let summary = engine.run();
    let ranked = engine.ranked();
    store::write_relations_csv(&settings.join_output(format!("{output_stem}.csv")), &ranked)?;
    store::write_report_file(&settings.join_output(format!("{output_stem}.txt")), &ranked)?;

    if !engine.is_frozen() {
        let config = engine.config().clone();
        PoolSnapshot::new(engine.into_pool(), config, dims).save(&settings.pool_path)?;
    }
    Ok(summary)
}
