//! Atomic output writing.
//!
//! The whole output batch for a pass (bundle, binary artifact, copied
//! assets) goes through a two-phase commit: everything is written to
//! `.kiln-tmp` siblings first, then renamed into place. A failure at any
//! point deletes the temp files and leaves the previous output exactly as it
//! was, so a running page never observes a half-written bundle.
//!
//! Every relative path is validated against the output directory before
//! writing; a path that escapes it fails the pass.

use crate::error::{Error, Result};
use path_clean::PathClean;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Write `files` (output-relative path, content) into `out_dir` atomically.
pub fn write_atomic(out_dir: &Path, files: &[(String, &[u8])]) -> Result<()> {
    fs::create_dir_all(out_dir).map_err(|e| {
        Error::WriteFailure(format!(
            "failed to create output directory '{}': {e}",
            out_dir.display()
        ))
    })?;

    let mut staged: Vec<(PathBuf, PathBuf)> = Vec::new();

    for (rel_path, bytes) in files {
        let target = match validate_output_path(out_dir, rel_path) {
            Ok(target) => target,
            Err(e) => {
                rollback(&staged);
                return Err(e);
            }
        };

        if let Some(parent) = target.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                rollback(&staged);
                return Err(Error::WriteFailure(format!(
                    "failed to create '{}': {e}",
                    parent.display()
                )));
            }
        }

        let temp = temp_sibling(&target);
        if let Err(e) = fs::write(&temp, bytes) {
            rollback(&staged);
            return Err(Error::WriteFailure(format!(
                "failed to write '{}': {e}",
                temp.display()
            )));
        }
        staged.push((temp, target));
    }

    for (temp, target) in &staged {
        if let Err(e) = fs::rename(temp, target) {
            rollback(&staged);
            return Err(Error::WriteFailure(format!(
                "failed to rename '{}' to '{}': {e}",
                temp.display(),
                target.display()
            )));
        }
        debug!("wrote {}", target.display());
    }

    Ok(())
}

/// Reject paths that would land outside the output directory.
fn validate_output_path(out_dir: &Path, rel_path: &str) -> Result<PathBuf> {
    if rel_path.contains('\0') {
        return Err(Error::InvalidOutputPath(
            "path contains a null byte".to_string(),
        ));
    }

    let full = out_dir.join(Path::new(rel_path)).clean();
    if !full.starts_with(out_dir) {
        return Err(Error::InvalidOutputPath(format!(
            "'{rel_path}' escapes output directory '{}'",
            out_dir.display()
        )));
    }
    Ok(full)
}

/// Temp file next to the target so the final rename stays on one filesystem.
fn temp_sibling(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".kiln-tmp");
    target.with_file_name(name)
}

/// Best-effort removal of staged temp files after a failure.
fn rollback(staged: &[(PathBuf, PathBuf)]) {
    for (temp, _) in staged {
        let _ = fs::remove_file(temp);
    }
}
