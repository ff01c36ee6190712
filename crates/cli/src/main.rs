// SPDX-License-Identifier: MIT

//! fuku - a local developer-workstation service supervisor.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod commands;
mod exit_error;
mod logging;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::exit_error::ExitError;

#[derive(Parser)]
#[command(name = "fuku", version, about = "Local developer-workstation service supervisor")]
struct Cli {
    /// Path to the config file
    #[arg(short = 'c', long = "config", global = true, default_value = "fuku.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a profile, run preflight, and supervise every service
    Run(commands::run::RunArgs),
    /// Load and validate the config file without starting anything
    Validate,
    /// Print the tiers and services a profile would start
    Services(commands::services::ServicesArgs),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        let code = e.downcast_ref::<ExitError>().map_or(1, |c| c.code);
        eprintln!("Error: {e}");
        std::process::exit(code);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => commands::run::handle(&cli.config, args).await,
        Commands::Validate => commands::validate::handle(&cli.config),
        Commands::Services(args) => commands::services::handle(&cli.config, args),
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
