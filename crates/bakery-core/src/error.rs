//! # Core Error Types
//!
//! Error types for the foundational crate. All errors use `thiserror` for
//! derive-based `Display` and `Error` implementations; downstream crates
//! wrap these in their own taxonomies rather than stringifying them.

use thiserror::Error;

/// Errors during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    /// Counts and amounts must be strings or integers.
    #[error("float values are not permitted in canonical representations; use string or integer: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed during canonicalization.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
