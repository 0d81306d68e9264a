//! # bakery CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bakery_cli::issue::{run_issue, IssueArgs};
use bakery_cli::synth::{run_synth, SynthArgs};
use bakery_cli::validate::{run_validate, ValidateArgs};
use bakery_cli::verify::{run_verify, VerifyArgs};

/// Badge Bakery — verifiable badge toolchain.
///
/// Validates the badge configuration, regenerates the request form and
/// public issuer documents, and issues cryptographically signed badges
/// baked into PNG images.
#[derive(Parser, Debug)]
#[command(name = "bakery", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the badge configuration document.
    #[arg(long, global = true, default_value = "badges.yml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load and validate the badge configuration.
    Validate(ValidateArgs),

    /// Regenerate the request form and public issuer documents.
    Synth(SynthArgs),

    /// Issue a badge: build the assertion, sign it, bake it into a PNG.
    Issue(IssueArgs),

    /// Verify the assertion embedded in a baked PNG.
    Verify(VerifyArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args, &cli.config),
        Commands::Synth(args) => run_synth(&args, &cli.config),
        Commands::Issue(args) => run_issue(&args, &cli.config),
        Commands::Verify(args) => run_verify(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}
