//! # bakery-cli — Badge Bakery Command-Line Interface
//!
//! Provides the `bakery` binary.
//!
//! ## Subcommands
//!
//! - `bakery validate` — load and validate the configuration document.
//! - `bakery synth` — regenerate the request form and issuer documents.
//! - `bakery issue` — issue a badge: build, sign, and bake into a PNG.
//! - `bakery verify` — verify the signature embedded in a baked PNG.
//!
//! All subcommands share the global `--config` flag (default
//! `badges.yml`) and the `-v` verbosity count.

pub mod issue;
pub mod synth;
pub mod validate;
pub mod verify;

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};

use bakery_config::ConfigModel;

/// Environment variable supplying the deployment recipient salt when
/// `--salt` is not given.
pub const SALT_ENV: &str = "RECIPIENT_SALT";

/// Load and validate the configuration document, with CLI-level context.
pub fn load_model(config_path: &Path) -> Result<ConfigModel> {
    let model = ConfigModel::load(config_path)
        .with_context(|| format!("invalid configuration: {}", config_path.display()))?;
    tracing::debug!(
        issuers = model.issuers().len(),
        badges = model.badges().len(),
        inputs = model.inputs().len(),
        "configuration loaded"
    );
    Ok(model)
}

/// Parse repeated `--input ID=VALUE` flags into a map.
pub fn parse_inputs(pairs: &[String]) -> Result<BTreeMap<String, String>> {
    let mut inputs = BTreeMap::new();
    for pair in pairs {
        let Some((id, value)) = pair.split_once('=') else {
            bail!("malformed --input {pair:?}: expected ID=VALUE");
        };
        if inputs.insert(id.to_string(), value.to_string()).is_some() {
            bail!("input {id:?} supplied more than once");
        }
    }
    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_inputs_splits_on_first_equals() {
        let inputs =
            parse_inputs(&["evidence_url=https://x?a=b".to_string()]).unwrap();
        assert_eq!(inputs["evidence_url"], "https://x?a=b");
    }

    #[test]
    fn parse_inputs_rejects_missing_equals() {
        let err = parse_inputs(&["evidence_url".to_string()]).unwrap_err();
        assert!(format!("{err}").contains("ID=VALUE"));
    }

    #[test]
    fn parse_inputs_rejects_duplicates() {
        let err = parse_inputs(&["a=1".to_string(), "a=2".to_string()]).unwrap_err();
        assert!(format!("{err}").contains("more than once"));
    }
}
