//! Output target resolution.
//!
//! Pure path computation: join segments onto a base directory and produce a
//! cleaned absolute path. No filesystem side effects; the writer creates
//! directories later.

use crate::error::{Error, Result};
use path_clean::PathClean;
use std::path::{Path, PathBuf};

/// Resolve `segments` against `base` into an absolute, cleaned path.
///
/// A relative `base` is anchored at the process working directory. Fails
/// with [`Error::PathResolution`] when no absolute anchor can be determined.
/// Deterministic and idempotent: resolving an already-resolved path returns
/// it unchanged.
pub fn resolve_target<S: AsRef<Path>>(base: &Path, segments: &[S]) -> Result<PathBuf> {
    let anchored = if base.is_absolute() {
        base.to_path_buf()
    } else {
        let cwd = std::env::current_dir().map_err(|e| Error::PathResolution {
            path: base.to_path_buf(),
            reason: format!("cannot determine working directory: {e}"),
        })?;
        cwd.join(base)
    };

    let mut resolved = anchored;
    for segment in segments {
        let segment = segment.as_ref();
        if segment.is_absolute() {
            return Err(Error::PathResolution {
                path: segment.to_path_buf(),
                reason: "segments must be relative".to_string(),
            });
        }
        resolved = resolved.join(segment);
    }

    Ok(resolved.clean())
}
