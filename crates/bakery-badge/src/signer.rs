//! # Assertion Signing
//!
//! RSASSA-PKCS1-v1_5 with SHA-256 over the canonical assertion
//! serialization, emitted as a JWS compact string
//! (`base64url(header).base64url(payload).base64url(signature)`, header
//! `{"alg":"RS256"}`). The JWS carries both the signed payload and the
//! signature, so the PNG-embedded document is the sole input a verifier
//! needs — there is no separate channel for the plaintext assertion.
//!
//! ## Security Invariant
//!
//! The payload segment is produced from [`CanonicalBytes`], the workspace's
//! only canonicalization path; signing a non-canonical rendition is a
//! compile error. Only RSA keys of at least 2048 bits are accepted.
//! Private key material lives for the duration of [`sign_assertion`] and
//! is never written anywhere by this module; `rsa`'s key types zeroize
//! their internals on drop.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::sha2::Sha256;
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};

use bakery_core::CanonicalBytes;

use crate::assertion::BadgeAssertion;
use crate::error::{BadgeError, BadgeResult};

/// Minimum accepted RSA modulus size in bits.
const MIN_RSA_BITS: usize = 2048;

/// The signing algorithm identifier recorded in the JWS header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureAlgorithm {
    /// RSASSA-PKCS1-v1_5 with SHA-256.
    #[serde(rename = "RS256")]
    Rs256,
}

impl SignatureAlgorithm {
    /// The JOSE algorithm identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rs256 => "RS256",
        }
    }
}

impl std::fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWS protected header.
#[derive(Debug, Serialize, Deserialize)]
struct JwsHeader {
    alg: SignatureAlgorithm,
}

/// An assertion plus its signature, ready for embedding. Immutable;
/// consumed by the PNG baker.
#[derive(Debug, Clone)]
pub struct SignedAssertion {
    assertion: BadgeAssertion,
    algorithm: SignatureAlgorithm,
    jws: String,
}

impl SignedAssertion {
    /// The assertion that was signed.
    pub fn assertion(&self) -> &BadgeAssertion {
        &self.assertion
    }

    /// The algorithm used to sign.
    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    /// The compact JWS embedded into the badge image.
    pub fn jws(&self) -> &str {
        &self.jws
    }
}

/// Sign an assertion with an issuer's RSA private key.
///
/// Accepts PKCS#8 (`BEGIN PRIVATE KEY`) or PKCS#1
/// (`BEGIN RSA PRIVATE KEY`) PEM. Fails with [`BadgeError::Signing`] if
/// the key does not parse or its modulus is shorter than 2048 bits.
pub fn sign_assertion(
    assertion: &BadgeAssertion,
    private_key_pem: &str,
) -> BadgeResult<SignedAssertion> {
    let private_key = parse_private_key(private_key_pem)?;
    if private_key.size() * 8 < MIN_RSA_BITS {
        return Err(BadgeError::Signing {
            reason: format!(
                "RSA key is {} bits; at least {MIN_RSA_BITS} bits required",
                private_key.size() * 8
            ),
        });
    }

    let header = CanonicalBytes::new(&JwsHeader {
        alg: SignatureAlgorithm::Rs256,
    })?;
    let payload = CanonicalBytes::new(assertion)?;

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header.as_bytes()),
        URL_SAFE_NO_PAD.encode(payload.as_bytes())
    );

    let signing_key = SigningKey::<Sha256>::new(private_key);
    let signature = signing_key
        .try_sign(signing_input.as_bytes())
        .map_err(|e| BadgeError::Signing {
            reason: format!("RSA signing operation failed: {e}"),
        })?;

    let jws = format!(
        "{signing_input}.{}",
        URL_SAFE_NO_PAD.encode(signature.to_bytes())
    );

    tracing::debug!(
        assertion_id = %assertion.id,
        payload_len = payload.len(),
        "signed assertion"
    );

    Ok(SignedAssertion {
        assertion: assertion.clone(),
        algorithm: SignatureAlgorithm::Rs256,
        jws,
    })
}

/// Verify a compact JWS against an issuer's RSA public key and return the
/// decoded assertion.
///
/// This is the consumer-side counterpart of [`sign_assertion`]: given the
/// string extracted from a baked PNG and the public key the assertion's
/// verification descriptor points at, it checks the signature and decodes
/// the payload.
pub fn verify_signed(jws: &str, public_key_pem: &str) -> BadgeResult<BadgeAssertion> {
    let mut segments = jws.split('.');
    let (header_b64, payload_b64, signature_b64) =
        match (segments.next(), segments.next(), segments.next(), segments.next()) {
            (Some(h), Some(p), Some(s), None) => (h, p, s),
            _ => {
                return Err(BadgeError::Verification {
                    reason: "JWS must have exactly three dot-separated segments".into(),
                })
            }
        };

    let header_bytes = decode_segment(header_b64, "header")?;
    let header: JwsHeader =
        serde_json::from_slice(&header_bytes).map_err(|e| BadgeError::Verification {
            reason: format!("JWS header is not valid JSON: {e}"),
        })?;
    // Single-variant enum: deserialization already rejected foreign algs.
    let SignatureAlgorithm::Rs256 = header.alg;

    let public_key = parse_public_key(public_key_pem)?;
    let verifying_key = VerifyingKey::<Sha256>::new(public_key);

    let signature_bytes = decode_segment(signature_b64, "signature")?;
    let signature =
        Signature::try_from(signature_bytes.as_slice()).map_err(|e| BadgeError::Verification {
            reason: format!("malformed signature segment: {e}"),
        })?;

    let signing_input = format!("{header_b64}.{payload_b64}");
    verifying_key
        .verify(signing_input.as_bytes(), &signature)
        .map_err(|e| BadgeError::Verification {
            reason: format!("signature does not match payload: {e}"),
        })?;

    let payload_bytes = decode_segment(payload_b64, "payload")?;
    serde_json::from_slice(&payload_bytes).map_err(|e| BadgeError::Verification {
        reason: format!("payload is not a valid assertion: {e}"),
    })
}

fn parse_private_key(pem: &str) -> BadgeResult<RsaPrivateKey> {
    RsaPrivateKey::from_pkcs8_pem(pem)
        .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
        .map_err(|e| BadgeError::Signing {
            reason: format!("private key is not valid PKCS#8 or PKCS#1 PEM: {e}"),
        })
}

fn parse_public_key(pem: &str) -> BadgeResult<RsaPublicKey> {
    RsaPublicKey::from_public_key_pem(pem)
        .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
        .map_err(|e| BadgeError::Verification {
            reason: format!("public key is not valid SPKI or PKCS#1 PEM: {e}"),
        })
}

fn decode_segment(segment: &str, name: &str) -> BadgeResult<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| BadgeError::Verification {
            reason: format!("JWS {name} segment is not valid base64url: {e}"),
        })
}
