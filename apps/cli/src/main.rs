//! SearchBridge CLI — publish markdown documentation into a remote search index.
//!
//! Extracts a local content tree, maps each document to an external item,
//! and replaces the items in a pre-provisioned index connection.

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
