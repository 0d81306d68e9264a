//! # Verify Subcommand
//!
//! Consumer-side check of a baked badge: extract the embedded JWS from
//! the PNG, verify the signature against a public key PEM, and print the
//! recovered assertion. Needs no configuration document, the artifact is
//! self-contained.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use bakery_badge::{extract, verify_signed};

/// Arguments for the `bakery verify` subcommand.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Path to the baked badge PNG.
    #[arg(long)]
    pub image: PathBuf,

    /// Path to the issuer's public key PEM.
    #[arg(long)]
    pub public_key: PathBuf,
}

/// Execute the verify subcommand.
pub fn run_verify(args: &VerifyArgs) -> Result<u8> {
    let png = std::fs::read(&args.image)
        .with_context(|| format!("cannot read image {}", args.image.display()))?;
    let Some(jws) = extract(&png)? else {
        bail!("{} carries no embedded badge assertion", args.image.display());
    };

    let public_key_pem = std::fs::read_to_string(&args.public_key)
        .with_context(|| format!("cannot read public key {}", args.public_key.display()))?;
    let assertion = verify_signed(&jws, &public_key_pem)?;

    println!("signature OK");
    println!("  badge:     {}", assertion.badge.name);
    println!("  assertion: {}", assertion.id);
    println!("  recipient: {}", assertion.recipient.identity.as_str());
    println!("  issuedOn:  {}", assertion.issued_on.to_canonical_string());
    println!("{}", serde_json::to_string_pretty(&assertion)?);
    Ok(0)
}
