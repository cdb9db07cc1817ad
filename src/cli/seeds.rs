//! CLI entry-point for building a seed dictionary from BIO labels.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::{info, instrument, warn};

use crate::{config::Settings, data::seeds::SeedDictionary};

/// Args for the `seeds` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Tokenised sentences, one per line.
    #[arg(long)]
    pub tokens: PathBuf,
    /// BIO labels aligned with `--tokens`.
    #[arg(long)]
    pub labels: PathBuf,
    /// Destination, defaults to `SEEDS_PATH`.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let tokens = tokio::fs::read_to_string(&args.tokens)
        .await
        .with_context(|| format!("read {}", args.tokens.display()))?;
    let labels = tokio::fs::read_to_string(&args.labels)
        .await
        .with_context(|| format!("read {}", args.labels.display()))?;
    if tokens.lines().count() != labels.lines().count() {
        warn!("token and label files have different line counts; extra lines are ignored");
    }

    let (dictionary, skipped) = SeedDictionary::from_bio(&tokens, &labels);
    let output = args.output.unwrap_or(settings.seeds_path);
    dictionary.save(&output)?;
    info!(
        emotions = dictionary.len(),
        pairs = dictionary.pair_count(),
        skipped,
        "built seed dictionary"
    );
    Ok(())
}
