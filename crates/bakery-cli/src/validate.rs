//! # Validate Subcommand
//!
//! Loads the configuration document and reports either a summary of the
//! resolved model or the exact validation defect. Running this in CI
//! keeps a broken configuration from ever reaching issuance or synthesis.

use std::path::Path;

use anyhow::Result;
use clap::Args;

use bakery_config::ConfigModel;

/// Arguments for the `bakery validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {}

/// Execute the validate subcommand.
///
/// Returns exit code 0 on success, 1 on validation failure.
pub fn run_validate(_args: &ValidateArgs, config_path: &Path) -> Result<u8> {
    match ConfigModel::load(config_path) {
        Ok(model) => {
            println!("OK: {}", config_path.display());
            println!("  Issuers: {}", model.issuers().len());
            println!("  Badges:  {}", model.badges().len());
            println!("  Inputs:  {}", model.inputs().len());
            Ok(0)
        }
        Err(e) => {
            eprintln!("FAIL: {e}");
            Ok(1)
        }
    }
}
