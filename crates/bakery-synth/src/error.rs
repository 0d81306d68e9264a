//! # Synthesis Errors
//!
//! I/O and serialization failures during artifact regeneration, with the
//! artifact path attached so the operator knows which output was being
//! produced.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while synthesizing generated artifacts.
#[derive(Debug, Error)]
pub enum SynthError {
    /// Writing an artifact failed.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// The artifact being written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Creating an output directory failed.
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        /// The directory being created.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// YAML rendering of the request form failed.
    #[error("YAML rendering failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON rendering of an issuer document failed.
    #[error("JSON rendering failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for synthesis operations.
pub type SynthResult<T> = Result<T, SynthError>;
