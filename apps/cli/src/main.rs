//! instructgen CLI: instruction file generator for AI coding assistants.
//!
//! Turns project settings into a Markdown instruction document assembled
//! from remote template fragments.

mod commands;

use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
