#![deny(missing_docs)]

//! # bakery-synth — Deterministic Artifact Synthesis
//!
//! Derives the two downstream artifacts the configuration document is the
//! source of truth for:
//!
//! - the **request form** (`request-form.yml`): the full set of fields the
//!   request-time surface must expose — badge selection, recipient email,
//!   and every input any badge references;
//! - the **issuer documents** (`public/<issuer_id>-issuer.json`): one
//!   public profile per issuer, served at exactly the URL the signed
//!   assertion's verification metadata references.
//!
//! ## Determinism Invariant
//!
//! Both artifacts are regenerated wholesale on every run — never diffed or
//! patched — and all orderings are sorted, so repeated runs on an
//! unchanged [`bakery_config::ConfigModel`] are byte-identical. Equality
//! of output is therefore a direct test of equality of meaningful
//! configuration state. Writes go through a temp file and rename, so a
//! failed run leaves no partial artifact behind.

pub mod error;
pub mod issuer_docs;
pub mod request_form;
pub mod writer;

pub use error::{SynthError, SynthResult};
pub use issuer_docs::{issuer_document_filename, render_issuer_document};
pub use request_form::{render_request_form, REQUEST_FORM_FILE};
pub use writer::{synthesize, SynthReport};
