//! # Issuance Errors
//!
//! Structured errors for the issuance pipeline. Request-scoped failures
//! (missing input, bad key, malformed image) are fatal for that request
//! only and always name the offending badge, input, or chunk; no variant
//! is a generic "something went wrong".

use thiserror::Error;

use bakery_config::ConfigError;
use bakery_core::CanonicalizationError;

/// Errors that can occur while building, signing, or baking a badge.
#[derive(Debug, Error)]
pub enum BadgeError {
    /// A required input was not supplied for the selected badge.
    #[error("badge {badge_id:?} requires input {input_id:?}, which was not supplied")]
    MissingInput {
        /// The badge being issued.
        badge_id: String,
        /// The absent required input.
        input_id: String,
    },

    /// A supplied input is not declared for the selected badge.
    #[error("badge {badge_id:?} does not declare input {input_id:?}")]
    UndeclaredInput {
        /// The badge being issued.
        badge_id: String,
        /// The unexpected input.
        input_id: String,
    },

    /// Configuration lookup failed (unknown badge id at request time).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Canonical serialization of the assertion failed.
    #[error(transparent)]
    Canonicalization(#[from] CanonicalizationError),

    /// Key material is malformed or the algorithm/key-size pairing is
    /// unsupported.
    #[error("signing failed: {reason}")]
    Signing {
        /// What was wrong with the key or signing operation.
        reason: String,
    },

    /// Signature verification of an embedded assertion failed.
    #[error("verification failed: {reason}")]
    Verification {
        /// What failed during verification.
        reason: String,
    },

    /// The template image is not a structurally valid PNG.
    #[error("invalid PNG image: {reason}")]
    InvalidImage {
        /// Which structural check failed, and where.
        reason: String,
    },

    /// The signed assertion cannot be encoded into a single chunk.
    #[error("chunk encoding failed: {reason}")]
    Encoding {
        /// Why the payload cannot be embedded.
        reason: String,
    },
}

/// Result type alias for issuance operations.
pub type BadgeResult<T> = Result<T, BadgeError>;
