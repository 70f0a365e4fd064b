mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use fixture_core::{read_model, run_fixture, ModelSummary, FIXTURE_FILE_NAME};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log).context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cwd = std::env::current_dir().context("failed to resolve working directory")?;
    let written = run_fixture(&cwd)?;

    let summary = ModelSummary::from(&read_model(&written.path)?);
    tracing::info!(?summary, byte_len = written.byte_len, "fixture verified");

    println!("Created {FIXTURE_FILE_NAME} with IR version {}", summary.ir_version);
    Ok(())
}
