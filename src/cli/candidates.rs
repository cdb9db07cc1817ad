//! CLI entry-point for rule-only candidate extraction.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{config::Settings, nlp, nlp::rules::CandidatePolicy};

/// Args for the `candidates` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Parsed tweet file, or a directory of `.conll`/`.txt` files.
    pub input: PathBuf,
    /// Which rule matches become candidates.
    #[arg(long, default_value = "all", value_enum)]
    pub policy: CandidatePolicy,
    /// CSV destination, defaults to `<OUTPUTS_DIR>/candidates.csv`.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    nlp::extract_candidates(&settings, &args.input, args.policy, args.output).await
}
