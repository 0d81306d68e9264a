//! # Configuration Loading
//!
//! YAML parsing and placeholder resolution for the badge configuration
//! document. Parsing errors carry the file path; duplicate mapping keys
//! and missing mandatory fields are rejected by serde_yaml itself and
//! surface through the same [`ConfigError::Parse`] variant, naming the
//! offending key.
//!
//! ## Placeholder Resolution
//!
//! String fields of issuers and badges may reference the configured base
//! URL as `{repository_url}`. Resolution happens once at load time, so
//! downstream code only ever sees fully expanded strings.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{BadgeDefinition, ConfigModel, InputDefinition, IssuerProfile};
use crate::validation;

/// The placeholder token expanded to the configured base URL.
const REPOSITORY_URL_PLACEHOLDER: &str = "{repository_url}";

/// The configuration document as parsed, before cross-reference
/// validation and placeholder resolution.
#[derive(Debug, Deserialize)]
pub(crate) struct RawConfig {
    /// Base URL for generated identifiers and served documents.
    pub repository_url: String,
    /// Issuer profiles by id.
    #[serde(default)]
    pub issuers: BTreeMap<String, IssuerProfile>,
    /// Global input definitions by id.
    #[serde(default)]
    pub global_inputs: BTreeMap<String, InputDefinition>,
    /// Badge definitions by id.
    #[serde(default)]
    pub badges: BTreeMap<String, BadgeDefinition>,
}

/// Load and validate the configuration document at `path`.
pub fn load(path: &Path) -> ConfigResult<ConfigModel> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io(e)
        }
    })?;
    let raw: RawConfig = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    resolve_raw(raw)
}

/// Parse and validate a configuration document held in memory.
///
/// Used by tests and by callers that obtain the document from somewhere
/// other than the filesystem.
pub fn from_yaml_str(raw: &str) -> ConfigResult<ConfigModel> {
    let raw: RawConfig = serde_yaml::from_str(raw).map_err(|e| ConfigError::Parse {
        path: "<inline>".into(),
        source: e,
    })?;
    resolve_raw(raw)
}

impl ConfigModel {
    /// Load and validate the configuration document at `path`.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        load(path)
    }

    /// Parse and validate a configuration document held in memory.
    pub fn from_yaml_str(raw: &str) -> ConfigResult<Self> {
        from_yaml_str(raw)
    }
}

/// Expand placeholders, then run the cross-reference validation pass.
fn resolve_raw(mut raw: RawConfig) -> ConfigResult<ConfigModel> {
    let base_url = raw.repository_url.trim_end_matches('/').to_string();

    for issuer in raw.issuers.values_mut() {
        expand(&mut issuer.name, &base_url);
        expand(&mut issuer.url, &base_url);
        expand(&mut issuer.email, &base_url);
        expand(&mut issuer.public_key, &base_url);
    }
    for badge in raw.badges.values_mut() {
        expand(&mut badge.name, &base_url);
        expand(&mut badge.description, &base_url);
        expand(&mut badge.image, &base_url);
        expand(&mut badge.criteria, &base_url);
    }

    validation::resolve(base_url, raw.issuers, raw.global_inputs, raw.badges)
}

fn expand(field: &mut String, base_url: &str) {
    if field.contains(REPOSITORY_URL_PLACEHOLDER) {
        *field = field.replace(REPOSITORY_URL_PLACEHOLDER, base_url);
    }
}
