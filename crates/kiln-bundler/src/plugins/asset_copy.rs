//! Static asset propagation.
//!
//! Copies files matching glob patterns verbatim from the project root into
//! the output directory, preserving relative sub-paths. Copies go through
//! the pass's atomic write batch, so a failed pass never leaves a partial
//! asset set behind. Existing destination files are overwritten
//! unconditionally; there is no timestamp or checksum comparison.
//!
//! A pattern matching zero files fails the pass in strict mode (the
//! default) and is skipped with a warning in permissive mode.

use crate::error::{Error, Result};
use crate::plugin::{BuildContext, Plugin};
use globset::{Glob, GlobMatcher};
use kiln_graph::VirtualModules;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Pipeline stage that propagates static files into the output target.
pub struct AssetCopyPlugin {
    patterns: Vec<String>,
    strict: bool,
}

impl AssetCopyPlugin {
    /// Create a plugin that fails the pass when a pattern matches nothing.
    pub fn strict<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
            strict: true,
        }
    }

    /// Create a plugin that skips zero-match patterns with a warning.
    pub fn permissive<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
            strict: false,
        }
    }

    /// Resolve every pattern against `from` and queue matches onto `ctx`.
    fn propagate(&self, ctx: &mut BuildContext) -> Result<()> {
        let from = ctx.cwd.clone();
        let matchers: Vec<(String, GlobMatcher)> = self
            .patterns
            .iter()
            .map(|pattern| {
                Glob::new(pattern)
                    .map(|g| (pattern.clone(), g.compile_matcher()))
                    .map_err(|e| Error::Config(format!("bad asset pattern '{pattern}': {e}")))
            })
            .collect::<Result<_>>()?;

        let files = collect_files(&from, &ctx.out_dir);

        for (pattern, matcher) in &matchers {
            let mut matched = false;
            for rel in &files {
                if matcher.is_match(rel) {
                    matched = true;
                    let bytes = std::fs::read(from.join(rel))?;
                    debug!("asset: {} ({} bytes)", rel.display(), bytes.len());
                    ctx.emit_asset(rel.to_string_lossy().replace('\\', "/"), bytes);
                }
            }
            if !matched {
                if self.strict {
                    return Err(Error::AssetNotFound {
                        pattern: pattern.clone(),
                    });
                }
                warn!("asset pattern '{pattern}' matched no files, skipping");
            }
        }

        Ok(())
    }
}

impl Plugin for AssetCopyPlugin {
    fn name(&self) -> &str {
        "asset-copy"
    }

    fn inject_assets(&self, ctx: &mut BuildContext, _virtuals: &mut VirtualModules) -> Result<()> {
        self.propagate(ctx)
    }
}

/// Walk the project root collecting candidate files as root-relative paths.
/// The output directory, dependency trees, and dot-directories are skipped.
fn collect_files(from: &Path, out_dir: &Path) -> Vec<std::path::PathBuf> {
    WalkDir::new(from)
        .into_iter()
        .filter_entry(|entry| {
            let path = entry.path();
            if path == from {
                return true;
            }
            if path == out_dir {
                return false;
            }
            let name = entry.file_name().to_string_lossy();
            !(name == "node_modules" || name == "target" || name.starts_with('.'))
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.path().strip_prefix(from).ok().map(|p| p.to_path_buf()))
        .collect()
}
