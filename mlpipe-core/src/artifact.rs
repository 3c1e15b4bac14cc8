//! Filesystem helpers for the artifact store.
//!
//! Artifacts are plain files addressed by path; one stage writes them, the
//! next stage reads them. These helpers cover the two operations every stage
//! shares: idempotent directory creation and atomic JSON writes.

use crate::error::PipelineError;
use std::path::Path;

/// Create a directory and its parents if absent.
///
/// Never fails on an existing directory and leaves existing contents
/// untouched.
pub fn create_dir(path: &Path) -> Result<(), PipelineError> {
    std::fs::create_dir_all(path)?;
    tracing::debug!(path = %path.display(), "artifact directory ready");
    Ok(())
}

/// Write a value as pretty-printed JSON via a temp file and rename.
pub fn atomic_write_json<T: serde::Serialize>(path: &Path, data: &T) -> Result<(), PipelineError> {
    let content = serde_json::to_string_pretty(data)?;
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, &content)?;
    std::fs::rename(&tmp, path)?;
    tracing::info!(path = %path.display(), "json artifact saved");
    Ok(())
}
