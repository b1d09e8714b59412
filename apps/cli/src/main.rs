//! Forager CLI — goal-directed web information gathering.
//!
//! Give it a natural-language goal ("find 10 recruiter email addresses")
//! and it plans queries, searches, fetches, extracts, and converges.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
