//! # Cross-Reference Validation
//!
//! The graph-validation pass that turns a parsed document into a
//! [`ConfigModel`]. Runs once at load time; downstream components operate
//! on already-resolved references instead of looking ids up lazily.
//!
//! ## Validation Layers
//!
//! 1. **Structural**: handled upstream by serde_yaml (missing fields,
//!    duplicate keys, wrong types).
//! 2. **Scalar**: mandatory string fields must be non-empty.
//! 3. **Referential**: every `issuer_id` resolves to a declared issuer;
//!    every badge input id exists in `global_inputs`.
//! 4. **Reservation**: no input id shadows a reserved assertion key.
//!
//! Any failure aborts the whole load — a partial configuration must never
//! produce partial artifacts.

use std::collections::BTreeMap;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{
    BadgeDefinition, ConfigModel, InputDefinition, IssuerProfile, RESERVED_ASSERTION_KEYS,
};

/// Validate cross-references and construct the resolved model.
pub(crate) fn resolve(
    base_url: String,
    issuers: BTreeMap<String, IssuerProfile>,
    inputs: BTreeMap<String, InputDefinition>,
    badges: BTreeMap<String, BadgeDefinition>,
) -> ConfigResult<ConfigModel> {
    if base_url.is_empty() {
        return Err(ConfigError::EmptyField {
            entity: "configuration",
            id: String::new(),
            field: "repository_url",
        });
    }

    for (id, issuer) in &issuers {
        check_scalar("issuer", id, "name", &issuer.name)?;
        check_scalar("issuer", id, "url", &issuer.url)?;
        check_scalar("issuer", id, "email", &issuer.email)?;
        check_scalar("issuer", id, "publicKey", &issuer.public_key)?;
        check_scalar(
            "issuer",
            id,
            "private_key_secret_name",
            &issuer.private_key_secret_name,
        )?;
    }

    for (id, input) in &inputs {
        check_scalar("input", id, "description", &input.description)?;
    }

    for (badge_id, badge) in &badges {
        check_scalar("badge", badge_id, "name", &badge.name)?;
        check_scalar("badge", badge_id, "description", &badge.description)?;
        check_scalar("badge", badge_id, "image", &badge.image)?;
        check_scalar("badge", badge_id, "criteria", &badge.criteria)?;
        check_scalar("badge", badge_id, "issuer_id", &badge.issuer_id)?;

        if !issuers.contains_key(&badge.issuer_id) {
            return Err(ConfigError::UnknownIssuer {
                badge_id: badge_id.clone(),
                issuer_id: badge.issuer_id.clone(),
            });
        }

        for input_id in badge.inputs.keys() {
            if !inputs.contains_key(input_id) {
                return Err(ConfigError::UnknownInput {
                    badge_id: badge_id.clone(),
                    input_id: input_id.clone(),
                });
            }
            if RESERVED_ASSERTION_KEYS.contains(&input_id.as_str()) {
                return Err(ConfigError::ReservedInput {
                    badge_id: badge_id.clone(),
                    input_id: input_id.clone(),
                });
            }
        }
    }

    Ok(ConfigModel::from_parts(base_url, issuers, inputs, badges))
}

fn check_scalar(entity: &'static str, id: &str, field: &'static str, value: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::EmptyField {
            entity,
            id: id.to_string(),
            field,
        });
    }
    Ok(())
}
