// SPDX-License-Identifier: MIT

//! `fuku validate` - load and validate the config file without starting
//! anything.

use std::path::Path;

use anyhow::Result;
use fuku_core::Config;

use crate::exit_error::ExitError;

pub fn handle(config_path: &Path) -> Result<()> {
    match Config::load(config_path) {
        Ok(_) => {
            println!("{} is valid", config_path.display());
            Ok(())
        }
        Err(e) => Err(ExitError::new(1, e.to_string()).into()),
    }
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
