//! End-to-end issuance: configuration → assertion → signature → baked PNG
//! → extraction → verification, with the recipient hash recomputed from
//! the plaintext email the way a consumer would.

use std::collections::BTreeMap;

use chrono::TimeZone;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use bakery_badge::{bake, build_assertion, extract, sign_assertion, verify_signed};
use bakery_config::ConfigModel;
use bakery_core::{HashedIdentity, Timestamp};

const CONFIG: &str = r#"
repository_url: https://badges.example.org/
issuers:
  acme:
    name: Acme Corp
    url: https://acme.example
    email: badges@acme.example
    publicKey: "{repository_url}/public/acme-pubkey.pem"
    private_key_secret_name: ACME_PRIVATE_KEY
global_inputs:
  evidence_url:
    description: Link to the contribution
  mentor:
    description: Who mentored the work
badges:
  contributor:
    name: Contributor
    description: Awarded for a merged contribution
    image: badges/contributor.png
    criteria: "{repository_url}/criteria/contributor"
    issuer_id: acme
    inputs:
      evidence_url: true
      mentor: false
"#;

fn model() -> ConfigModel {
    ConfigModel::from_yaml_str(CONFIG).unwrap()
}

fn keypair() -> (String, String) {
    let mut rng = rand::thread_rng();
    let private_key = RsaPrivateKey::new(&mut rng, 2048).unwrap();
    let public_key = RsaPublicKey::from(&private_key);
    (
        private_key
            .to_pkcs8_pem(rsa::pkcs8::LineEnding::LF)
            .unwrap()
            .to_string(),
        public_key
            .to_public_key_pem(rsa::pkcs8::LineEnding::LF)
            .unwrap(),
    )
}

fn chunk(chunk_type: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    let crc = hasher.finalize();

    let mut out = Vec::new();
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(chunk_type);
    out.extend_from_slice(data);
    out.extend_from_slice(&crc.to_be_bytes());
    out
}

/// A structurally valid 1x1 grayscale PNG.
fn tiny_png() -> Vec<u8> {
    let mut png = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    let ihdr = [0, 0, 0, 1, 0, 0, 0, 1, 8, 0, 0, 0, 0];
    png.extend(chunk(b"IHDR", &ihdr));
    png.extend(chunk(b"IDAT", &[0x78, 0x9C, 0x62, 0x00, 0x01, 0x00, 0x00, 0x05, 0x00, 0x01]));
    png.extend(chunk(b"IEND", &[]));
    png
}

fn issued_on() -> Timestamp {
    Timestamp::from_datetime(chrono::Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap())
}

#[test]
fn issue_bake_extract_verify_roundtrip() {
    let model = model();
    let (private_pem, public_pem) = keypair();

    let salt = "deployment-salt";
    let recipient = HashedIdentity::from_identity("Dev@Example.org", salt);
    let inputs: BTreeMap<String, String> = [
        ("evidence_url".to_string(), "https://git.example/pr/42".to_string()),
        ("mentor".to_string(), "Sam".to_string()),
    ]
    .into();

    let assertion_id = Uuid::new_v4();
    let assertion = build_assertion(
        &model,
        "contributor",
        &recipient,
        salt,
        &inputs,
        assertion_id,
        issued_on(),
    )
    .unwrap();

    let signed = sign_assertion(&assertion, &private_pem).unwrap();
    let baked = bake(&tiny_png(), &signed).unwrap();

    let jws = extract(&baked).unwrap().expect("baked image carries a JWS");
    let recovered = verify_signed(&jws, &public_pem).unwrap();
    assert_eq!(recovered, assertion);

    assert_eq!(
        recovered.id,
        format!("https://badges.example.org/assertions/{assertion_id}.json")
    );
    assert_eq!(recovered.badge.name, "Contributor");
    assert_eq!(recovered.evidence["evidence_url"], "https://git.example/pr/42");
    assert_eq!(recovered.evidence["mentor"], "Sam");
}

#[test]
fn embedded_recipient_hash_matches_independent_recomputation() {
    let salt = "deployment-salt";
    let recipient = HashedIdentity::from_identity(" Dev@Example.org ", salt);

    // A consumer holding the candidate email re-derives the digest:
    // sha256("email" + salt + trimmed lowercased identity).
    let mut hasher = Sha256::new();
    hasher.update(b"email");
    hasher.update(salt.as_bytes());
    hasher.update(b"dev@example.org");
    let hex: String = hasher.finalize().iter().map(|b| format!("{b:02x}")).collect();

    assert_eq!(recipient.as_str(), format!("sha256${hex}"));
}

#[test]
fn plaintext_email_never_appears_in_artifact() {
    let model = model();
    let (private_pem, _) = keypair();
    let email = "dev@example.org";
    let recipient = HashedIdentity::from_identity(email, "s");
    let inputs: BTreeMap<String, String> =
        [("evidence_url".to_string(), "https://x".to_string())].into();

    let assertion = build_assertion(
        &model,
        "contributor",
        &recipient,
        "s",
        &inputs,
        Uuid::new_v4(),
        issued_on(),
    )
    .unwrap();
    let signed = sign_assertion(&assertion, &private_pem).unwrap();
    let baked = bake(&tiny_png(), &signed).unwrap();

    let haystack = String::from_utf8_lossy(&baked);
    assert!(!haystack.contains(email));
}

#[test]
fn rebaking_replaces_the_embedded_assertion() {
    let model = model();
    let (private_pem, public_pem) = keypair();
    let recipient = HashedIdentity::from_identity("dev@example.org", "s");
    let inputs: BTreeMap<String, String> =
        [("evidence_url".to_string(), "https://x".to_string())].into();

    let first_id = Uuid::new_v4();
    let second_id = Uuid::new_v4();
    let make = |id| {
        build_assertion(&model, "contributor", &recipient, "s", &inputs, id, issued_on()).unwrap()
    };

    let once = bake(&tiny_png(), &sign_assertion(&make(first_id), &private_pem).unwrap()).unwrap();
    let twice = bake(&once, &sign_assertion(&make(second_id), &private_pem).unwrap()).unwrap();

    let jws = extract(&twice).unwrap().unwrap();
    let recovered = verify_signed(&jws, &public_pem).unwrap();
    assert!(recovered.id.contains(&second_id.to_string()));
    assert!(!recovered.id.contains(&first_id.to_string()));
}

#[test]
fn unrelated_chunks_pass_through_byte_identical() {
    let model = model();
    let (private_pem, _) = keypair();
    let recipient = HashedIdentity::from_identity("dev@example.org", "s");
    let inputs: BTreeMap<String, String> =
        [("evidence_url".to_string(), "https://x".to_string())].into();
    let assertion = build_assertion(
        &model,
        "contributor",
        &recipient,
        "s",
        &inputs,
        Uuid::new_v4(),
        issued_on(),
    )
    .unwrap();
    let signed = sign_assertion(&assertion, &private_pem).unwrap();

    let template = tiny_png();
    let baked = bake(&template, &signed).unwrap();

    // The original IDAT and IEND encodings survive verbatim.
    let idat = chunk(b"IDAT", &[0x78, 0x9C, 0x62, 0x00, 0x01, 0x00, 0x00, 0x05, 0x00, 0x01]);
    let iend = chunk(b"IEND", &[]);
    assert!(baked.windows(idat.len()).any(|w| w == idat.as_slice()));
    assert!(baked.windows(iend.len()).any(|w| w == iend.as_slice()));
}
