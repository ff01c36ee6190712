// SPDX-License-Identifier: MIT

//! `fuku services [PROFILE]` - print the tiers and services a profile would
//! start, without starting anything.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use fuku_core::Config;

use crate::exit_error::ExitError;

#[derive(Args)]
pub struct ServicesArgs {
    /// Profile to resolve
    #[arg(default_value = "default")]
    pub profile: String,
}

pub fn handle(config_path: &Path, args: ServicesArgs) -> Result<()> {
    let config = Config::load(config_path).map_err(|e| ExitError::new(1, e.to_string()))?;

    let tiers = fuku_engine::resolve_profile(&config, &args.profile)
        .map_err(|e| ExitError::new(1, e.to_string()))?;

    for tier in &tiers {
        println!("{}:", tier.name);
        for service in &tier.services {
            println!("  {service}");
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "services_tests.rs"]
mod tests;
