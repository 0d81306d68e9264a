#![deny(missing_docs)]

//! # bakery-badge — Issuance Pipeline
//!
//! The per-request pipeline that turns a validated configuration, a hashed
//! recipient, and a set of supplied inputs into a self-contained verifiable
//! artifact:
//!
//! 1. [`assertion::build_assertion`] — construct the Open Badges assertion
//!    document, enforcing the badge's required-input policy.
//! 2. [`signer::sign_assertion`] — RSASSA-PKCS1-v1_5/SHA-256 over the
//!    canonical serialization, emitted as a compact JWS so the artifact
//!    carries both the signed payload and the signature.
//! 3. [`baker::bake`] — embed the JWS into the badge's PNG template as an
//!    `iTXt` chunk with the `openbadges` keyword, preserving image
//!    validity.
//!
//! ## Security Invariant
//!
//! The signer accepts only [`bakery_core::CanonicalBytes`]-derived input,
//! and the builder accepts only [`bakery_core::HashedIdentity`] — neither a
//! non-canonical payload nor a raw recipient email can reach an artifact
//! by construction. Private key material is scoped to the signing call and
//! never written by this crate.

pub mod assertion;
pub mod baker;
pub mod error;
pub mod signer;

pub use assertion::{build_assertion, BadgeAssertion, BadgeClass, Recipient, Verification};
pub use baker::{bake, extract};
pub use error::{BadgeError, BadgeResult};
pub use signer::{sign_assertion, verify_signed, SignatureAlgorithm, SignedAssertion};
