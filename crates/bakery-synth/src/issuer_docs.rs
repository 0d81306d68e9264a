//! # Issuer Document Projection
//!
//! Renders one public profile document per issuer. The document is built
//! by [`ConfigModel::issuer_document`] — the same projection the assertion
//! builder embeds — so the served JSON and the signed assertion's issuer
//! object are structurally identical, and the document's `id` equals the
//! URL at which it is served.

use bakery_config::ConfigModel;

use crate::error::SynthResult;

/// Filename of an issuer's public profile document under `public/`.
pub fn issuer_document_filename(issuer_id: &str) -> String {
    format!("{issuer_id}-issuer.json")
}

/// Render an issuer's public profile document as pretty-printed JSON.
///
/// Struct field order is fixed, so output is byte-stable for an unchanged
/// issuer. Returns `None` for an unknown issuer id (cannot happen when
/// iterating a validated model's own issuers).
pub fn render_issuer_document(model: &ConfigModel, issuer_id: &str) -> SynthResult<Option<String>> {
    let Some(document) = model.issuer_document(issuer_id) else {
        return Ok(None);
    };
    let mut json = serde_json::to_string_pretty(&document)?;
    json.push('\n');
    Ok(Some(json))
}
