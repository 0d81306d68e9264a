//! # Synth Subcommand
//!
//! Regenerates the derived repository artifacts (`request-form.yml` and
//! the public issuer documents) from the configuration. Output is
//! wholesale and deterministic, so a clean working tree after running it
//! means the artifacts are up to date.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use crate::load_model;

/// Arguments for the `bakery synth` subcommand.
#[derive(Args, Debug)]
pub struct SynthArgs {
    /// Directory to write artifacts into.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}

/// Execute the synth subcommand.
pub fn run_synth(args: &SynthArgs, config_path: &Path) -> Result<u8> {
    let model = load_model(config_path)?;
    let report = bakery_synth::synthesize(&model, &args.out_dir)
        .with_context(|| format!("synthesis into {} failed", args.out_dir.display()))?;
    for path in &report.written {
        println!("{}", path.display());
    }
    println!("wrote {} artifact(s)", report.written.len());
    Ok(0)
}
