//! Entry point wiring CLI dispatch to the extraction pipeline.

use anyhow::Result;
use emocause::{cli::Cli, config::Settings, logging};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_tracing()?;
    let cli = Cli::parse();
    let settings = Settings::load(cli.config_file())?;

    info!(?cli, "starting command");
    cli.dispatch(settings).await
}
