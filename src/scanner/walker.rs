//! Directory walker feeding the size index.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a directory
//! tree and recording every qualifying regular file in a [`SizeIndex`].
//! It uses [`walkdir`] with sorted entries, so traversal order — and with it
//! referent selection downstream — is deterministic for a given tree.
//!
//! # Skip rules
//!
//! - Bundle-like package directories (names ending in a configured suffix)
//!   are not recursed into.
//! - Symlinks and other non-regular entries are ignored.
//! - Pseudo-filesystem roots (`/proc`, `/sys`, `/dev`, `/run`) are never
//!   entered; the check compares the canonicalized absolute path against
//!   the denylist, not substrings.
//!
//! An unreadable directory aborts only its own subtree with a warning;
//! the walk continues with siblings.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use walkdir::WalkDir;

use super::WalkerConfig;
use crate::dedupe::SizeIndex;

/// Pseudo-filesystem roots that must never be recursed into.
pub const PSEUDO_FS_ROOTS: [&str; 4] = ["/proc", "/sys", "/dev", "/run"];

/// Counters from one traversal pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Files recorded in the size index during this pass.
    pub files_indexed: u64,
    /// Subtrees or entries skipped because of I/O errors.
    pub errors: u64,
}

/// Directory walker for one traversal pass.
///
/// Visits every descendant regular file of the root exactly once and
/// records those that pass the configured size window.
#[derive(Debug)]
pub struct Walker {
    root: PathBuf,
    config: WalkerConfig,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given root directory.
    #[must_use]
    pub fn new(root: &Path, config: WalkerConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            config,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set, the walker stops iteration as soon as possible.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Walk the tree, recording qualifying files into `index`.
    ///
    /// Errors never abort the pass: an unreadable directory or entry is
    /// warned about, counted in [`WalkStats::errors`], and skipped.
    pub fn walk(&self, index: &mut SizeIndex) -> WalkStats {
        let mut stats = WalkStats::default();
        let skip_suffixes = self.config.skip_suffixes.clone();

        let iter = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| {
                // Never filter the root itself; that would end the walk.
                if entry.depth() == 0 {
                    return true;
                }
                if entry.file_type().is_dir() {
                    !skip_dir(entry.path(), &skip_suffixes)
                } else {
                    true
                }
            });

        for result in iter {
            if self.is_shutdown_requested() {
                log::debug!("walker: shutdown requested, stopping traversal");
                break;
            }

            match result {
                Ok(entry) => {
                    // Symlinks and special files are neither directory nor
                    // regular file here and fall through.
                    if !entry.file_type().is_file() {
                        continue;
                    }

                    let meta = match entry.metadata() {
                        Ok(m) => m,
                        Err(e) => {
                            log::warn!("cannot stat {}: {}", entry.path().display(), e);
                            stats.errors += 1;
                            continue;
                        }
                    };

                    let size = meta.len();
                    if size == 0 {
                        log::trace!("skipping empty file: {}", entry.path().display());
                        continue;
                    }
                    if !self.config.filter.matches(size) {
                        continue;
                    }

                    index.record(entry.into_path(), size);
                    stats.files_indexed += 1;
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| self.root.clone(), Path::to_path_buf);
                    log::warn!("cannot read {}: {} (skipping subtree)", path.display(), e);
                    stats.errors += 1;
                }
            }
        }

        stats
    }
}

/// Whether a directory must be skipped entirely (no recursion).
fn skip_dir(path: &Path, suffixes: &[String]) -> bool {
    if is_pseudo_fs_root(path) {
        log::debug!(
            "not descending into pseudo-filesystem: {}",
            path.display()
        );
        return true;
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if suffixes.iter().any(|s| name.ends_with(s.as_str())) {
        log::trace!("skipping bundle directory: {}", path.display());
        return true;
    }

    false
}

/// Whether a path is one of the denylisted pseudo-filesystem roots.
///
/// The comparison is a set-membership test against the canonicalized
/// absolute path, so relative spellings like `./proc` from `/` are caught
/// while ordinary directories that merely contain "proc" in their name
/// are not.
#[must_use]
pub fn is_pseudo_fs_root(path: &Path) -> bool {
    let canonical = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    PSEUDO_FS_ROOTS
        .iter()
        .any(|root| canonical == Path::new(root))
}
