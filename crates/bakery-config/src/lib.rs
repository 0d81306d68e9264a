#![deny(missing_docs)]

//! # bakery-config — Configuration Model and Validator
//!
//! Loads the declarative badge configuration document (`badges.yml`) into a
//! fully resolved, validated [`ConfigModel`]. The configuration is the
//! single source of truth for issuers, global inputs, and badge
//! definitions; both the issuance pipeline and the synthesizer consume the
//! same model so they can never disagree about what exists or what is
//! required.
//!
//! ## Fail-Fast Invariant
//!
//! `ConfigModel::load()` either returns a model in which every
//! cross-reference resolves (badge → issuer, badge → input), or it returns
//! a [`ConfigError`] naming the offending badge, issuer, input, or field.
//! There is no partially constructed model, so downstream code operates on
//! already-resolved references and never dispatches on unresolved ids.

pub mod error;
pub mod loader;
pub mod model;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use model::{
    BadgeDefinition, ConfigModel, InputDefinition, IssuerDocument, IssuerProfile,
    OPENBADGES_CONTEXT, RESERVED_ASSERTION_KEYS,
};
