//! # Artifact Writing
//!
//! Writes the synthesized artifacts to disk. Every artifact is rendered
//! fully in memory first and written through a temp file plus rename in
//! the destination directory, so an interrupted or failed run never
//! leaves a truncated artifact at a published path.

use std::path::{Path, PathBuf};

use bakery_config::ConfigModel;

use crate::error::{SynthError, SynthResult};
use crate::issuer_docs::{issuer_document_filename, render_issuer_document};
use crate::request_form::{render_request_form, REQUEST_FORM_FILE};

/// Subdirectory holding the publicly served issuer documents.
const PUBLIC_DIR: &str = "public";

/// What a synthesis run produced.
#[derive(Debug)]
pub struct SynthReport {
    /// Paths written, in write order.
    pub written: Vec<PathBuf>,
}

/// Regenerate all artifacts from the model into `out_dir`.
///
/// Renders everything before writing anything, so a rendering failure
/// leaves all existing artifacts untouched.
pub fn synthesize(model: &ConfigModel, out_dir: &Path) -> SynthResult<SynthReport> {
    let form = render_request_form(model)?;
    let mut issuer_files = Vec::new();
    for issuer_id in model.issuers().keys() {
        if let Some(json) = render_issuer_document(model, issuer_id)? {
            issuer_files.push((issuer_document_filename(issuer_id), json));
        }
    }

    create_dir(out_dir)?;
    let public_dir = out_dir.join(PUBLIC_DIR);
    create_dir(&public_dir)?;

    let mut written = Vec::new();

    let form_path = out_dir.join(REQUEST_FORM_FILE);
    write_atomic(&form_path, form.as_bytes())?;
    tracing::info!(path = %form_path.display(), "wrote request form");
    written.push(form_path);

    for (filename, json) in issuer_files {
        let path = public_dir.join(filename);
        write_atomic(&path, json.as_bytes())?;
        tracing::info!(path = %path.display(), "wrote issuer document");
        written.push(path);
    }

    Ok(SynthReport { written })
}

fn create_dir(path: &Path) -> SynthResult<()> {
    std::fs::create_dir_all(path).map_err(|source| SynthError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

/// Write via a temp file in the same directory, then rename into place.
fn write_atomic(path: &Path, bytes: &[u8]) -> SynthResult<()> {
    let tmp = tmp_path(path);
    let write_err = |source| SynthError::Write {
        path: path.to_path_buf(),
        source,
    };
    std::fs::write(&tmp, bytes).map_err(write_err)?;
    std::fs::rename(&tmp, path).map_err(write_err)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
