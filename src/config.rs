//! Runtime configuration utilities for emocause.

use std::{
    env,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{anyhow, Context};

use crate::nlp::{
    bootstrap::BootstrapConfig, embeddings::EmbeddingSize, similarity::SimilarityWeights,
};

/// Application configuration resolved from `.env`, the environment and defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Root folder for lexicons, embeddings and seed files.
    pub data_dir: PathBuf,
    /// Root folder for ranked outputs.
    pub outputs_dir: PathBuf,
    /// Emotion keyword list, one word per line.
    pub lexicon_path: PathBuf,
    /// Directory holding `glove<size>.txt` tables.
    pub embeddings_dir: PathBuf,
    /// Explicit embedding file overriding `embeddings_dir`.
    pub embeddings_path: Option<PathBuf>,
    /// Positive seed dictionary (JSON).
    pub seeds_path: PathBuf,
    /// Optional negative seed dictionary (JSON).
    pub negative_seeds_path: Option<PathBuf>,
    /// Seed pool snapshot written by training and read in test mode.
    pub pool_path: PathBuf,
    pub embedding_size: EmbeddingSize,
    /// Run one frozen-pool cycle instead of training.
    pub test_mode: bool,
    pub bootstrap: BootstrapConfig,
}

impl Settings {
    /// Load configuration from `.env` (or `config_file`) and the environment.
    pub fn load(config_file: Option<&Path>) -> anyhow::Result<Self> {
        match config_file {
            Some(path) => {
                dotenvy::from_path(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
            }
            None => {
                dotenvy::dotenv().ok();
            }
        }

        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));
        let outputs_dir = env::var("OUTPUTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./outputs"));
        let lexicon_path = env::var("LEXICON_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("emotion_keywords.txt"));
        let embeddings_dir = env::var("EMBEDDINGS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("glove"));
        let embeddings_path = env::var("EMBEDDINGS_PATH").ok().map(PathBuf::from);
        let seeds_path = env::var("SEEDS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("seeds/train_seeds.json"));
        let negative_seeds_path = env::var("NEGATIVE_SEEDS_PATH").ok().map(PathBuf::from);
        let pool_path = env::var("POOL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("seeds/seed_pool.json"));

        let dims: usize = parsed("EMBEDDING_SIZE", 25)?;
        let embedding_size = EmbeddingSize::from_dims(dims)
            .ok_or_else(|| anyhow!("EMBEDDING_SIZE must be 25, 50, 100 or 200, got {dims}"))?;
        let test_mode = flag("TEST_MODE")?;

        let positive = SimilarityWeights::positive_default();
        let negative = SimilarityWeights::negative_default();
        let bootstrap = BootstrapConfig {
            tau: parsed("TAU", 0.8)?,
            neg_tau: parsed("NEG_TAU", 0.9)?,
            cycles: parsed("CYCLES", 10)?,
            positive: SimilarityWeights::new(
                parsed("ALPHA", positive.before)?,
                parsed("BETA", positive.between)?,
                parsed("GAMMA", positive.after)?,
                parsed("DELTA", positive.cause)?,
                parsed("EPSILON", positive.emotion)?,
            ),
            negative: SimilarityWeights::new(
                parsed("NEG_ALPHA", negative.before)?,
                parsed("NEG_BETA", negative.between)?,
                parsed("NEG_GAMMA", negative.after)?,
                parsed("NEG_DELTA", negative.cause)?,
                parsed("NEG_EPSILON", negative.emotion)?,
            ),
            workers: parsed("WORKERS", 0)?,
        };

        std::fs::create_dir_all(&outputs_dir).context("creating outputs dir")?;

        Ok(Self {
            data_dir,
            outputs_dir,
            lexicon_path,
            embeddings_dir,
            embeddings_path,
            seeds_path,
            negative_seeds_path,
            pool_path,
            embedding_size,
            test_mode,
            bootstrap,
        })
    }

    /// Embedding table for the configured size.
    pub fn embeddings_file(&self) -> PathBuf {
        self.embeddings_path
            .clone()
            .unwrap_or_else(|| self.embeddings_dir.join(self.embedding_size.file_name()))
    }

    /// Convenience helper for derived output path segments.
    pub fn join_output<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.outputs_dir.join(path)
    }
}

fn parsed<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|err| anyhow!("invalid {key}={raw:?}: {err}")),
        _ => Ok(default),
    }
}

fn flag(key: &str) -> anyhow::Result<bool> {
    match env::var(key).map(|v| v.trim().to_ascii_lowercase()) {
        Ok(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Ok(v) if matches!(v.as_str(), "" | "0" | "false" | "no" | "off") => Ok(false),
        Ok(v) => Err(anyhow!("invalid {key}={v:?}: expected a boolean")),
        Err(_) => Ok(false),
    }
}
