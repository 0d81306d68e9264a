//! # Recipient Hashing
//!
//! Salted, one-way hashing of recipient identities. A baked badge is a
//! public artifact, so the recipient's email must never appear in it —
//! only the salted digest does, in the Open Badges `sha256$<hex>` form.
//!
//! ## Deployment Invariant
//!
//! The salt is injected by the caller and must stay fixed for the lifetime
//! of a deployment. Rotating it does not fail anything in-process, but it
//! silently breaks equality checks against every previously issued badge:
//! a verifier re-hashing the same email with the new salt will no longer
//! match the identity embedded in old assertions. This crate only consumes
//! the salt as a parameter; it never stores or generates one.

use sha2::{Digest, Sha256};

/// The fixed recipient-type prefix mixed into the digest input.
///
/// Recipients are identified by email; the prefix binds the hash to that
/// identity type so a future identity type with the same string value
/// cannot produce a colliding digest.
const RECIPIENT_TYPE: &str = "email";

/// A salted SHA-256 digest of a normalized recipient identity.
///
/// Renders as `sha256$<lowercase-hex>`. The raw identity is consumed by
/// [`HashedIdentity::from_identity`] and never retained.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct HashedIdentity(String);

impl HashedIdentity {
    /// Hash a recipient identity with the deployment salt.
    ///
    /// The identity is normalized first (surrounding whitespace trimmed,
    /// lowercased) so `" Foo@Bar.com "` and `"foo@bar.com"` hash equal.
    /// The digest input is the concatenation of the fixed recipient-type
    /// prefix, the salt, and the normalized identity.
    pub fn from_identity(identity: &str, salt: &str) -> Self {
        let normalized = normalize(identity);
        let mut hasher = Sha256::new();
        hasher.update(RECIPIENT_TYPE.as_bytes());
        hasher.update(salt.as_bytes());
        hasher.update(normalized.as_bytes());
        let digest = hasher.finalize();
        let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
        Self(format!("sha256${hex}"))
    }

    /// Reconstruct from an already-rendered `sha256$<hex>` string, as read
    /// back out of an embedded assertion.
    pub fn from_rendered(rendered: impl Into<String>) -> Self {
        Self(rendered.into())
    }

    /// The `sha256$<hex>` rendering embedded in assertions.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for HashedIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trim surrounding whitespace and lowercase the identity.
fn normalize(identity: &str) -> String {
    identity.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn normalization_makes_equivalent_identities_equal() {
        let a = HashedIdentity::from_identity(" Foo@Bar.com ", "s3cr3t");
        let b = HashedIdentity::from_identity("foo@bar.com", "s3cr3t");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_identities_differ() {
        let a = HashedIdentity::from_identity("foo@bar.com", "s3cr3t");
        let b = HashedIdentity::from_identity("foo@baz.com", "s3cr3t");
        assert_ne!(a, b);
    }

    #[test]
    fn distinct_salts_differ() {
        let a = HashedIdentity::from_identity("foo@bar.com", "salt-one");
        let b = HashedIdentity::from_identity("foo@bar.com", "salt-two");
        assert_ne!(a, b);
    }

    #[test]
    fn deterministic_across_calls() {
        let a = HashedIdentity::from_identity("foo@bar.com", "s3cr3t");
        let b = HashedIdentity::from_identity("foo@bar.com", "s3cr3t");
        assert_eq!(a.as_str(), b.as_str());
    }

    #[test]
    fn rendering_is_sha256_dollar_hex() {
        let h = HashedIdentity::from_identity("foo@bar.com", "s3cr3t");
        let s = h.as_str();
        assert!(s.starts_with("sha256$"));
        let hex = &s["sha256$".len()..];
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn raw_identity_absent_from_rendering() {
        let h = HashedIdentity::from_identity("foo@bar.com", "s3cr3t");
        assert!(!h.as_str().contains("foo"));
        assert!(!h.as_str().contains("bar.com"));
    }

    proptest! {
        #[test]
        fn hash_invariant_under_case_and_surrounding_whitespace(
            local in "[a-z0-9]{1,12}",
            domain in "[a-z0-9]{1,12}",
            salt in "[a-z0-9]{1,8}",
            pad_left in "[ \t]{0,3}",
            pad_right in "[ \t]{0,3}",
        ) {
            let email = format!("{local}@{domain}.org");
            let decorated = format!("{pad_left}{}{pad_right}", email.to_uppercase());
            prop_assert_eq!(
                HashedIdentity::from_identity(&email, &salt),
                HashedIdentity::from_identity(&decorated, &salt)
            );
        }
    }
}
