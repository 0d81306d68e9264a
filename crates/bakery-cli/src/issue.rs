//! # Issue Subcommand
//!
//! The full issuance path: build the assertion, sign it with the issuer's
//! private key, bake the JWS into the badge's PNG template, and write the
//! baked artifact. Any failure along the way leaves no output file.
//!
//! ## Security Invariant
//!
//! The private key PEM is held in one local buffer and zeroized as soon
//! as the signing call returns, before the result is even inspected. The
//! recipient email is hashed before it reaches the assertion builder and
//! is never logged.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use uuid::Uuid;
use zeroize::Zeroize;

use bakery_badge::{bake, build_assertion, sign_assertion};
use bakery_core::{HashedIdentity, Timestamp};

use crate::{load_model, parse_inputs, SALT_ENV};

/// Arguments for the `bakery issue` subcommand.
#[derive(Args, Debug)]
pub struct IssueArgs {
    /// Id of the badge to issue.
    #[arg(long)]
    pub badge: String,

    /// Recipient email address. Hashed with the deployment salt; the
    /// plaintext never appears in the artifact.
    #[arg(long)]
    pub recipient: String,

    /// Supplied input values, repeatable.
    #[arg(long = "input", value_name = "ID=VALUE")]
    pub inputs: Vec<String>,

    /// Read the issuer's private key PEM from this file instead of the
    /// environment variable named by the issuer's secret reference.
    #[arg(long)]
    pub key_file: Option<PathBuf>,

    /// Recipient salt. Falls back to the RECIPIENT_SALT environment
    /// variable.
    #[arg(long)]
    pub salt: Option<String>,

    /// Directory to write the baked badge into.
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,
}

/// Execute the issue subcommand.
pub fn run_issue(args: &IssueArgs, config_path: &Path) -> Result<u8> {
    let model = load_model(config_path)?;
    let inputs = parse_inputs(&args.inputs)?;
    let salt = resolve_salt(args)?;

    let (_, issuer) = model.issuer_for(&args.badge)?;
    let badge = model.badge(&args.badge)?;

    let recipient = HashedIdentity::from_identity(&args.recipient, &salt);
    let assertion_id = Uuid::new_v4();
    let assertion = build_assertion(
        &model,
        &args.badge,
        &recipient,
        &salt,
        &inputs,
        assertion_id,
        Timestamp::now(),
    )?;

    let mut key_pem = read_private_key(args, &issuer.private_key_secret_name)?;
    let signed = sign_assertion(&assertion, &key_pem);
    key_pem.zeroize();
    let signed = signed?;

    let template_path = template_path(config_path, &badge.image);
    let template = std::fs::read(&template_path).with_context(|| {
        format!("cannot read badge template {}", template_path.display())
    })?;
    let baked = bake(&template, &signed)?;

    std::fs::create_dir_all(&args.output_dir).with_context(|| {
        format!("cannot create output directory {}", args.output_dir.display())
    })?;
    let output = args
        .output_dir
        .join(format!("{}-{assertion_id}.png", args.badge));
    write_atomic(&output, &baked)?;

    tracing::info!(
        badge = %args.badge,
        assertion_id = %assertion_id,
        path = %output.display(),
        "issued badge"
    );
    println!("{}", output.display());
    Ok(0)
}

fn resolve_salt(args: &IssueArgs) -> Result<String> {
    if let Some(salt) = &args.salt {
        return Ok(salt.clone());
    }
    match std::env::var(SALT_ENV) {
        Ok(salt) if !salt.is_empty() => Ok(salt),
        _ => bail!("no recipient salt: pass --salt or set {SALT_ENV}"),
    }
}

fn read_private_key(args: &IssueArgs, secret_name: &str) -> Result<String> {
    if let Some(path) = &args.key_file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("cannot read key file {}", path.display()));
    }
    std::env::var(secret_name)
        .with_context(|| format!("private key secret {secret_name} is not set"))
}

/// Template images are declared relative to the configuration file.
fn template_path(config_path: &Path, image: &str) -> PathBuf {
    match config_path.parent() {
        Some(parent) if parent != Path::new("") => parent.join(image),
        _ => PathBuf::from(image),
    }
}

/// Write via a temp file in the destination directory, then rename, so a
/// failed run never leaves a partial artifact at the published name.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);
    let ctx = || format!("cannot write {}", path.display());
    std::fs::write(&tmp, bytes).with_context(ctx)?;
    std::fs::rename(&tmp, path).with_context(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_path_is_relative_to_config() {
        let p = template_path(Path::new("repo/badges.yml"), "badges/x.png");
        assert_eq!(p, Path::new("repo/badges/x.png"));
    }

    #[test]
    fn template_path_with_bare_config_name() {
        let p = template_path(Path::new("badges.yml"), "badges/x.png");
        assert_eq!(p, Path::new("badges/x.png"));
    }

    #[test]
    fn salt_flag_wins() {
        let args = IssueArgs {
            badge: "b".into(),
            recipient: "r@example.org".into(),
            inputs: vec![],
            key_file: None,
            salt: Some("pepper".into()),
            output_dir: PathBuf::from("."),
        };
        assert_eq!(resolve_salt(&args).unwrap(), "pepper");
    }

    #[test]
    fn missing_required_input_leaves_no_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("badges.yml");
        std::fs::write(
            &config_path,
            r#"
repository_url: https://badges.example.org
issuers:
  acme:
    name: Acme Corp
    url: https://acme.example
    email: badges@acme.example
    publicKey: https://badges.example.org/public/acme-pubkey.pem
    private_key_secret_name: ACME_PRIVATE_KEY
global_inputs:
  evidence_url:
    description: Link to the contribution
badges:
  contributor:
    name: Contributor
    description: Awarded for a merged contribution
    image: badges/contributor.png
    criteria: https://badges.example.org/criteria/contributor
    issuer_id: acme
    inputs:
      evidence_url: true
"#,
        )
        .unwrap();

        let out_dir = dir.path().join("out");
        let args = IssueArgs {
            badge: "contributor".into(),
            recipient: "dev@example.org".into(),
            inputs: vec![],
            key_file: None,
            salt: Some("s".into()),
            output_dir: out_dir.clone(),
        };

        let err = run_issue(&args, &config_path).unwrap_err();
        assert!(format!("{err}").contains("evidence_url"));
        assert!(!out_dir.exists());
    }
}
