//! File system watchers.
//!
//! Two sources of change events behind one channel type: a notify-backed
//! recursive watcher, and a polling fallback that diffs mtime snapshots for
//! filesystems without native change notification. Both filter out the
//! output directory, dependency trees, and hidden files before sending.

use crate::error::{CliError, Result};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::sync::mpsc;
use walkdir::WalkDir;

/// File change event type.
#[derive(Debug, Clone)]
pub enum FileChange {
    /// File was modified
    Modified(PathBuf),
    /// File was created
    Created(PathBuf),
    /// File was removed
    Removed(PathBuf),
}

impl FileChange {
    /// Path affected by this change.
    pub fn path(&self) -> &Path {
        match self {
            FileChange::Modified(p) | FileChange::Created(p) | FileChange::Removed(p) => p,
        }
    }
}

/// Notify-backed recursive watcher.
///
/// Sends raw (filtered, not debounced) change events; coalescing is the
/// rebuild loop's job.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    root: PathBuf,
}

impl FileWatcher {
    /// Watch `root` recursively, ignoring `ignore_patterns` plus the usual
    /// noise (hidden files, `node_modules`, `target`).
    pub fn new(
        root: PathBuf,
        ignore_patterns: Vec<String>,
    ) -> Result<(Self, mpsc::Receiver<FileChange>)> {
        if !root.exists() {
            return Err(CliError::FileNotFound(root));
        }

        let (tx, rx) = mpsc::channel(256);
        let root_clone = root.clone();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    crate::ui::warning(&format!("watch error: {e}"));
                    return;
                }
            };
            for path in &event.paths {
                if should_ignore(path, &root_clone, &ignore_patterns) {
                    continue;
                }
                let change = match event.kind {
                    notify::EventKind::Create(_) => FileChange::Created(path.clone()),
                    notify::EventKind::Modify(_) => FileChange::Modified(path.clone()),
                    notify::EventKind::Remove(_) => FileChange::Removed(path.clone()),
                    _ => continue,
                };
                let _ = tx.blocking_send(change);
            }
        })
        .map_err(CliError::Watch)?;

        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(CliError::Watch)?;

        Ok((
            Self {
                _watcher: watcher,
                root,
            },
            rx,
        ))
    }

    /// Root directory being watched.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Polling fallback: snapshots file mtimes on an interval and diffs.
pub struct PollWatcher;

impl PollWatcher {
    /// Watch `root` by polling every `interval`.
    ///
    /// Spawns a background thread; it stops when the receiver is dropped.
    pub fn spawn(
        root: PathBuf,
        ignore_patterns: Vec<String>,
        interval: Duration,
    ) -> Result<mpsc::Receiver<FileChange>> {
        if !root.exists() {
            return Err(CliError::FileNotFound(root));
        }

        let (tx, rx) = mpsc::channel(256);

        std::thread::spawn(move || {
            let mut previous = snapshot(&root, &ignore_patterns);
            loop {
                std::thread::sleep(interval);
                let current = snapshot(&root, &ignore_patterns);

                for (path, mtime) in &current {
                    match previous.get(path) {
                        None => {
                            if tx.blocking_send(FileChange::Created(path.clone())).is_err() {
                                return;
                            }
                        }
                        Some(old) if old != mtime => {
                            if tx
                                .blocking_send(FileChange::Modified(path.clone()))
                                .is_err()
                            {
                                return;
                            }
                        }
                        Some(_) => {}
                    }
                }
                for path in previous.keys() {
                    if !current.contains_key(path)
                        && tx.blocking_send(FileChange::Removed(path.clone())).is_err()
                    {
                        return;
                    }
                }

                previous = current;
            }
        });

        Ok(rx)
    }
}

/// Collect (path, mtime) for all watchable files under `root`.
fn snapshot(root: &Path, ignore_patterns: &[String]) -> HashMap<PathBuf, SystemTime> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| !should_ignore(entry.path(), root, ignore_patterns))
        .filter_map(|entry| {
            let mtime = entry.metadata().ok()?.modified().ok()?;
            Some((entry.path().to_path_buf(), mtime))
        })
        .collect()
}

/// Whether a path is outside the watch scope.
fn should_ignore(path: &Path, root: &Path, ignore_patterns: &[String]) -> bool {
    // Only react to files within the watched root
    if !path.starts_with(root) {
        return true;
    }

    let rel_path = match path.strip_prefix(root) {
        Ok(p) => p,
        Err(_) => return true,
    };

    let path_str = rel_path.to_string_lossy();

    for pattern in ignore_patterns {
        if let Some(ext) = pattern.strip_prefix('*') {
            if path_str.ends_with(ext) {
                return true;
            }
        } else if path_str.starts_with(pattern.as_str())
            || path_str.contains(&format!("/{}", pattern))
        {
            return true;
        }
    }

    for component in rel_path.components() {
        if let Some(name) = component.as_os_str().to_str() {
            if name.starts_with('.') && name != "." && name != ".." {
                return true;
            }
        }
    }

    false
}
