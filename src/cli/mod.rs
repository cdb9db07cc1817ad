//! Command-line interface wiring for emocause.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::Settings;

pub mod bootstrap;
pub mod candidates;
pub mod seeds;

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Rule-seeded bootstrapping of emotion/cause relations from tweets",
    long_about = None
)]
pub struct Cli {
    /// Key/value config file read instead of `.env`.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn config_file(&self) -> Option<&Path> {
        self.config.as_deref()
    }

    /// Dispatch the selected sub-command.
    pub async fn dispatch(self, settings: Settings) -> Result<()> {
        match self.command {
            Commands::Candidates(args) => candidates::run(args, settings).await,
            Commands::Bootstrap(args) => bootstrap::run(args, settings).await,
            Commands::Seeds(args) => seeds::run(args, settings).await,
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply the dependency rules and dump candidate relations.
    Candidates(candidates::Args),
    /// Bootstrap candidates into ranked emotion/cause relations.
    Bootstrap(bootstrap::Args),
    /// Convert BIO-labelled sentences into a seed dictionary.
    Seeds(seeds::Args),
}
