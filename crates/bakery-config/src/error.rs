//! # Configuration Errors
//!
//! Structured errors for configuration loading and validation. Every
//! variant carries enough context (path, entity id, field name) to point
//! the operator at the exact defect; a bare "invalid config" is never
//! acceptable for a document humans edit by hand.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or validating the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed. serde_yaml also reports duplicate mapping keys
    /// and missing mandatory fields through this variant, naming them.
    #[error("failed to parse configuration at {}: {source}", path.display())]
    Parse {
        /// Path of the configuration document.
        path: PathBuf,
        /// The underlying parser error.
        source: serde_yaml::Error,
    },

    /// The configuration file was not found.
    #[error("configuration file not found: {}", path.display())]
    FileNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// A mandatory scalar field is empty.
    #[error("{entity} {id:?}: field {field:?} must not be empty")]
    EmptyField {
        /// Entity kind ("issuer", "badge", "input", "configuration").
        entity: &'static str,
        /// Entity id within its mapping.
        id: String,
        /// The empty field.
        field: &'static str,
    },

    /// A badge references an issuer that is not declared.
    #[error("badge {badge_id:?} references undefined issuer {issuer_id:?}")]
    UnknownIssuer {
        /// The referencing badge.
        badge_id: String,
        /// The dangling issuer id.
        issuer_id: String,
    },

    /// A badge references an input that is not declared in `global_inputs`.
    #[error("badge {badge_id:?} references undefined input {input_id:?}")]
    UnknownInput {
        /// The referencing badge.
        badge_id: String,
        /// The dangling input id.
        input_id: String,
    },

    /// An input id collides with a reserved assertion key.
    #[error("input {input_id:?} (badge {badge_id:?}) collides with a reserved assertion key")]
    ReservedInput {
        /// The badge declaring the input.
        badge_id: String,
        /// The colliding input id.
        input_id: String,
    },

    /// A badge id was looked up that does not exist in the model.
    #[error("unknown badge: {badge_id:?}")]
    UnknownBadge {
        /// The unknown badge id.
        badge_id: String,
    },

    /// I/O error reading the configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
