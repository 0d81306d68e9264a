//! # Configuration Entities
//!
//! The in-memory representation of the badge configuration document:
//! issuers, global input definitions, and badge definitions, keyed by id.
//! [`ConfigModel`] is produced only by [`validation`](crate::validation)
//! after every cross-reference has resolved, so holders of a model never
//! see a dangling id.
//!
//! All mappings are `BTreeMap`s: iteration order is the sorted key order,
//! which is what makes synthesized artifacts byte-stable across runs.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// The JSON-LD context every Open Badges v2 document declares.
pub const OPENBADGES_CONTEXT: &str = "https://w3id.org/openbadges/v2";

/// Assertion keys that supplied inputs must not shadow.
///
/// Supplied input values are emitted as top-level assertion keys, so an
/// input id equal to one of these would clobber a structural field of the
/// signed document. Validation rejects such configurations at load time.
pub const RESERVED_ASSERTION_KEYS: &[&str] = &[
    "@context",
    "type",
    "id",
    "recipient",
    "badge",
    "verification",
    "issuedOn",
];

/// An issuing organization, as declared under `issuers:`.
///
/// Immutable once loaded. `private_key_secret_name` is an opaque reference
/// to an externally managed secret — key material itself never appears in
/// the configuration or in this model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerProfile {
    /// Human-readable organization name.
    pub name: String,
    /// Organization homepage URL.
    pub url: String,
    /// Contact email.
    pub email: String,
    /// URL of the issuer's public verification key.
    #[serde(rename = "publicKey")]
    pub public_key: String,
    /// Name of the externally managed secret holding the private key.
    pub private_key_secret_name: String,
}

/// A global input definition, as declared under `global_inputs:`.
///
/// Pure metadata — an input carries no value until an issuance request
/// supplies one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDefinition {
    /// Human-readable prompt shown on the request form.
    pub description: String,
}

/// A badge definition, as declared under `badges:`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeDefinition {
    /// Badge display name.
    pub name: String,
    /// What the badge certifies.
    pub description: String,
    /// Path to the badge's PNG template image, relative to the
    /// configuration file.
    pub image: String,
    /// Criteria narrative or URL.
    pub criteria: String,
    /// Id of the issuing organization; resolved against `issuers:`.
    pub issuer_id: String,
    /// Inputs collected for this badge: input id → required flag.
    /// `true` means the issuance request must supply a value; `false`
    /// means the input is collected when present but may be omitted.
    #[serde(default)]
    pub inputs: BTreeMap<String, bool>,
}

impl BadgeDefinition {
    /// Ids of the inputs that are mandatory for this badge, sorted.
    pub fn required_input_ids(&self) -> BTreeSet<&str> {
        self.inputs
            .iter()
            .filter(|(_, required)| **required)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Ids of every input this badge declares (required or optional), sorted.
    pub fn declared_input_ids(&self) -> BTreeSet<&str> {
        self.inputs.keys().map(String::as_str).collect()
    }
}

/// The public issuer profile document, as served at
/// `<base_url>/public/<issuer_id>-issuer.json` and as embedded inside
/// signed assertions.
///
/// Contains exactly the public fields — never the secret reference. Both
/// the synthesizer and the assertion builder obtain this via
/// [`ConfigModel::issuer_document`], so the served document and the
/// embedded issuer object cannot diverge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerDocument {
    /// JSON-LD context (`https://w3id.org/openbadges/v2`).
    #[serde(rename = "@context")]
    pub context: String,
    /// Document type (`Issuer`).
    #[serde(rename = "type")]
    pub doc_type: String,
    /// Canonical URL of this document.
    pub id: String,
    /// Organization name.
    pub name: String,
    /// Organization homepage URL.
    pub url: String,
    /// Contact email.
    pub email: String,
    /// URL of the issuer's public verification key.
    #[serde(rename = "publicKey")]
    pub public_key: String,
}

/// The parsed, validated, fully resolved configuration.
///
/// Constructed only by [`crate::validation::resolve`]; every `issuer_id`
/// and input reference is guaranteed to resolve.
#[derive(Debug, Clone)]
pub struct ConfigModel {
    /// Base URL under which generated identifiers and documents live.
    base_url: String,
    /// Issuers by id.
    issuers: BTreeMap<String, IssuerProfile>,
    /// Global input definitions by id.
    inputs: BTreeMap<String, InputDefinition>,
    /// Badge definitions by id.
    badges: BTreeMap<String, BadgeDefinition>,
}

impl ConfigModel {
    pub(crate) fn from_parts(
        base_url: String,
        issuers: BTreeMap<String, IssuerProfile>,
        inputs: BTreeMap<String, InputDefinition>,
        badges: BTreeMap<String, BadgeDefinition>,
    ) -> Self {
        Self {
            base_url,
            issuers,
            inputs,
            badges,
        }
    }

    /// The configured base URL, without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// All issuers, sorted by id.
    pub fn issuers(&self) -> &BTreeMap<String, IssuerProfile> {
        &self.issuers
    }

    /// All global input definitions, sorted by id.
    pub fn inputs(&self) -> &BTreeMap<String, InputDefinition> {
        &self.inputs
    }

    /// All badge definitions, sorted by id.
    pub fn badges(&self) -> &BTreeMap<String, BadgeDefinition> {
        &self.badges
    }

    /// Look up a badge definition by id.
    pub fn badge(&self, badge_id: &str) -> ConfigResult<&BadgeDefinition> {
        self.badges.get(badge_id).ok_or_else(|| ConfigError::UnknownBadge {
            badge_id: badge_id.to_string(),
        })
    }

    /// The issuer responsible for a badge, with its id.
    ///
    /// Cannot dangle on a validated model; the error arm exists only for
    /// unknown badge ids supplied at request time.
    pub fn issuer_for(&self, badge_id: &str) -> ConfigResult<(&str, &IssuerProfile)> {
        let badge = self.badge(badge_id)?;
        let (id, issuer) = self
            .issuers
            .get_key_value(&badge.issuer_id)
            .ok_or_else(|| ConfigError::UnknownIssuer {
                badge_id: badge_id.to_string(),
                issuer_id: badge.issuer_id.clone(),
            })?;
        Ok((id.as_str(), issuer))
    }

    /// The set of input ids an issuance request for `badge_id` must supply.
    ///
    /// Single source of truth for per-badge mandatory-field policy: both
    /// request validation and synthesis consult this method, so the two
    /// can never disagree.
    pub fn required_inputs_for(&self, badge_id: &str) -> ConfigResult<BTreeSet<&str>> {
        Ok(self.badge(badge_id)?.required_input_ids())
    }

    /// The set of input ids declared (required or optional) for `badge_id`.
    pub fn declared_inputs_for(&self, badge_id: &str) -> ConfigResult<BTreeSet<&str>> {
        Ok(self.badge(badge_id)?.declared_input_ids())
    }

    /// The union of input ids referenced by any badge, sorted.
    ///
    /// This is the field set the request form must expose.
    pub fn referenced_inputs(&self) -> BTreeSet<&str> {
        self.badges
            .values()
            .flat_map(|b| b.inputs.keys().map(String::as_str))
            .collect()
    }

    /// Canonical URL of an issuer's public profile document.
    pub fn issuer_document_url(&self, issuer_id: &str) -> String {
        format!("{}/public/{issuer_id}-issuer.json", self.base_url)
    }

    /// Build the public profile document for an issuer.
    pub fn issuer_document(&self, issuer_id: &str) -> Option<IssuerDocument> {
        let issuer = self.issuers.get(issuer_id)?;
        Some(IssuerDocument {
            context: OPENBADGES_CONTEXT.to_string(),
            doc_type: "Issuer".to_string(),
            id: self.issuer_document_url(issuer_id),
            name: issuer.name.clone(),
            url: issuer.url.clone(),
            email: issuer.email.clone(),
            public_key: issuer.public_key.clone(),
        })
    }
}
