//! CLI entry-point for seed bootstrapping.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{
    config::Settings,
    nlp,
    nlp::{embeddings::EmbeddingSize, rules::CandidatePolicy, similarity::SimilarityWeights},
};

/// Args for the `bootstrap` command. Flags override the environment.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Parsed tweet file, or a directory of `.conll`/`.txt` files.
    pub input: PathBuf,
    /// Score once against the saved seed pool instead of training.
    #[arg(long)]
    pub test: bool,
    #[arg(long)]
    pub tau: Option<f64>,
    #[arg(long)]
    pub neg_tau: Option<f64>,
    #[arg(long)]
    pub cycles: Option<usize>,
    /// Positive weights as `before,between,after,cause,emotion`.
    #[arg(long, value_delimiter = ',')]
    pub weights: Option<Vec<f64>>,
    /// Negative weights as `before,between,after,cause,emotion`.
    #[arg(long, value_delimiter = ',')]
    pub neg_weights: Option<Vec<f64>>,
    #[arg(long, value_enum)]
    pub embedding_size: Option<EmbeddingSize>,
    /// Scoring threads, `0` for one per core.
    #[arg(long)]
    pub workers: Option<usize>,
    #[arg(long, default_value = "all", value_enum)]
    pub policy: CandidatePolicy,
    /// Seed pool snapshot to write (training) or read (`--test`).
    #[arg(long)]
    pub pool: Option<PathBuf>,
    /// Output file stem under `OUTPUTS_DIR`.
    #[arg(long, default_value = "relations")]
    pub output_stem: String,
}

impl Args {
    /// Fold command-line overrides into the loaded settings.
    pub fn apply(&self, mut settings: Settings) -> Result<Settings> {
        let config = &mut settings.bootstrap;
        if let Some(tau) = self.tau {
            config.tau = tau;
        }
        if let Some(neg_tau) = self.neg_tau {
            config.neg_tau = neg_tau;
        }
        if let Some(cycles) = self.cycles {
            config.cycles = cycles;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(values) = &self.weights {
            config.positive = weights("--weights", values)?;
        }
        if let Some(values) = &self.neg_weights {
            config.negative = weights("--neg-weights", values)?;
        }
        if let Some(size) = self.embedding_size {
            settings.embedding_size = size;
        }
        if let Some(pool) = &self.pool {
            settings.pool_path = pool.clone();
        }
        settings.test_mode |= self.test;
        Ok(settings)
    }
}

fn weights(flag: &str, values: &[f64]) -> Result<SimilarityWeights> {
    match *values {
        [a, b, g, d, e] => Ok(SimilarityWeights::new(a, b, g, d, e)),
        _ => bail!("{flag} takes five comma-separated values, got {}", values.len()),
    }
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let settings = args.apply(settings)?;
    let summary =
        nlp::run_bootstrap(&settings, &args.input, args.policy, &args.output_stem).await?;
    info!(
        test_mode = settings.test_mode,
        cycles = summary.cycles.len(),
        accepted = summary.accepted,
        rejected = summary.rejected,
        undetermined = summary.undetermined,
        "bootstrap complete"
    );
    Ok(())
}
