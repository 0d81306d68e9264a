#![deny(missing_docs)]

//! # bakery-core — Foundational Types for the Badge Bakery
//!
//! This crate defines the types every other crate in the workspace depends
//! on. It has no internal crate dependencies — only `serde`, `serde_json`,
//! `thiserror`, `chrono`, and `sha2` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **[`CanonicalBytes`] is the sole path to hashing and signing.** Every
//!    byte sequence that ends up under a digest or an RSA signature flows
//!    through `CanonicalBytes::new()`, which applies deterministic
//!    canonicalization (sorted keys, compact separators, float rejection,
//!    UTC datetime normalization).
//!
//! 2. **[`HashedIdentity`] is the only recipient representation.** The raw
//!    recipient identity never leaves the hashing function; downstream
//!    code cannot accidentally embed it in an artifact because the builder
//!    APIs only accept the hashed form.
//!
//! 3. **UTC-only [`Timestamp`].** Issued badges are verified in arbitrary
//!    time zones; all timestamps are UTC with second precision and a `Z`
//!    suffix so canonical serialization is byte-stable.

pub mod canonical;
pub mod error;
pub mod recipient;
pub mod temporal;

pub use canonical::CanonicalBytes;
pub use error::CanonicalizationError;
pub use recipient::HashedIdentity;
pub use temporal::Timestamp;
