//! # Assertion Construction
//!
//! Builds the Open Badges v2 assertion document: the claim that a specific
//! (hashed) recipient was awarded a specific badge by a specific issuer.
//! The document embeds the full `BadgeClass` and the issuer's public
//! profile document, so a verifier needs nothing beyond the artifact and
//! the issuer's public key.
//!
//! ## Required-Input Policy
//!
//! The builder re-validates supplied inputs against
//! [`ConfigModel::required_inputs_for`] — the same source of truth the
//! synthesizer projects into the request form. A request missing a
//! required input fails with [`BadgeError::MissingInput`] naming it, and
//! no document is produced.
//!
//! Supplied input values are emitted as top-level assertion keys.
//! Collisions with structural keys are impossible here because
//! configuration load rejects reserved input ids.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bakery_config::{ConfigModel, IssuerDocument, OPENBADGES_CONTEXT};
use bakery_core::{HashedIdentity, Timestamp};

use crate::error::{BadgeError, BadgeResult};

/// The recipient descriptor: hashed identity plus the salt needed to
/// re-derive it from a candidate email at verification time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    /// Identity type (`email`).
    #[serde(rename = "type")]
    pub recipient_type: String,
    /// Salted hash in `sha256$<hex>` form; never the raw identity.
    pub identity: HashedIdentity,
    /// Always true — this system never embeds plaintext identities.
    pub hashed: bool,
    /// The deployment salt used to compute `identity`.
    pub salt: String,
}

/// Criteria narrative for a badge class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criteria {
    /// What a recipient did to earn the badge.
    pub narrative: String,
}

/// The badge class embedded in an assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeClass {
    /// Document type (`BadgeClass`).
    #[serde(rename = "type")]
    pub class_type: String,
    /// Canonical badge identifier URL.
    pub id: String,
    /// Badge display name.
    pub name: String,
    /// What the badge certifies.
    pub description: String,
    /// Badge image reference.
    pub image: String,
    /// Criteria for earning the badge.
    pub criteria: Criteria,
    /// The issuer's public profile document.
    pub issuer: IssuerDocument,
}

/// The verification descriptor: how a consumer checks the signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    /// Verification method (`SignedBadge`).
    #[serde(rename = "type")]
    pub verification_type: String,
    /// URL of the issuer's public key.
    pub creator: String,
}

/// A fully resolved badge assertion. Immutable once built; consumed by the
/// signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeAssertion {
    /// JSON-LD context.
    #[serde(rename = "@context")]
    pub context: String,
    /// Document type (`Assertion`).
    #[serde(rename = "type")]
    pub assertion_type: String,
    /// Canonical assertion identifier URL.
    pub id: String,
    /// The hashed recipient.
    pub recipient: Recipient,
    /// The badge class, with embedded issuer profile.
    pub badge: BadgeClass,
    /// How to verify the signature.
    pub verification: Verification,
    /// Issuance time, UTC.
    #[serde(rename = "issuedOn")]
    pub issued_on: Timestamp,
    /// Supplied input values, flattened to top-level keys (input id →
    /// value). Reserved-key collisions are rejected at config load.
    #[serde(flatten)]
    pub evidence: BTreeMap<String, String>,
}

/// Build the assertion document for one issuance request.
///
/// `assertion_id` becomes `<base_url>/assertions/<uuid>.json`; the caller
/// allocates it so the artifact filename and the embedded identifier can
/// share the same UUID. `now` is injected rather than read from the clock
/// so construction is deterministic under test.
///
/// Inputs whose values are empty after trimming are treated as absent:
/// they neither satisfy a required input nor appear in the document.
pub fn build_assertion(
    model: &ConfigModel,
    badge_id: &str,
    recipient: &HashedIdentity,
    salt: &str,
    inputs: &BTreeMap<String, String>,
    assertion_id: Uuid,
    now: Timestamp,
) -> BadgeResult<BadgeAssertion> {
    let badge = model.badge(badge_id)?;
    let (issuer_id, issuer) = model.issuer_for(badge_id)?;

    let supplied: BTreeMap<&str, &str> = inputs
        .iter()
        .filter(|(_, v)| !v.trim().is_empty())
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();

    let declared = model.declared_inputs_for(badge_id)?;
    for input_id in supplied.keys() {
        if !declared.contains(input_id) {
            return Err(BadgeError::UndeclaredInput {
                badge_id: badge_id.to_string(),
                input_id: input_id.to_string(),
            });
        }
    }

    // Sorted, so a request missing several inputs reports a stable one.
    for input_id in model.required_inputs_for(badge_id)? {
        if !supplied.contains_key(input_id) {
            return Err(BadgeError::MissingInput {
                badge_id: badge_id.to_string(),
                input_id: input_id.to_string(),
            });
        }
    }

    let issuer_document = model
        .issuer_document(issuer_id)
        .ok_or_else(|| BadgeError::Config(bakery_config::ConfigError::UnknownIssuer {
            badge_id: badge_id.to_string(),
            issuer_id: issuer_id.to_string(),
        }))?;

    let evidence = supplied
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    Ok(BadgeAssertion {
        context: OPENBADGES_CONTEXT.to_string(),
        assertion_type: "Assertion".to_string(),
        id: format!("{}/assertions/{assertion_id}.json", model.base_url()),
        recipient: Recipient {
            recipient_type: "email".to_string(),
            identity: recipient.clone(),
            hashed: true,
            salt: salt.to_string(),
        },
        badge: BadgeClass {
            class_type: "BadgeClass".to_string(),
            id: format!("{}/badges/{badge_id}", model.base_url()),
            name: badge.name.clone(),
            description: badge.description.clone(),
            image: badge.image.clone(),
            criteria: Criteria {
                narrative: badge.criteria.clone(),
            },
            issuer: issuer_document,
        },
        verification: Verification {
            verification_type: "SignedBadge".to_string(),
            creator: issuer.public_key.clone(),
        },
        issued_on: now,
        evidence,
    })
}
