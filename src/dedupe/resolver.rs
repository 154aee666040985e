//! Hardlink merging for verified duplicate groups.
//!
//! # Overview
//!
//! For each fingerprint group the resolver picks a referent (a member that
//! already carries extra hardlinks when one exists, otherwise the first in
//! traversal order), verifies every other member byte-for-byte against it,
//! and replaces the member's directory entry with a hardlink to the
//! referent.
//!
//! # Safety
//!
//! - A candidate whose byte comparison fails or errors is left untouched;
//!   the fingerprint is only an equality proxy, never the final word.
//! - The remove-then-link transition is guarded by [`RelinkGuard`]: once the
//!   old entry is removed, link creation is attempted on every exit path,
//!   including panic unwind. The only unprotected window is the OS-level
//!   gap between the two syscalls.

use std::fs::{self, File, Metadata};
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::report::RunTotals;

/// Chunk size for the byte-exact comparison.
const COMPARE_CHUNK: usize = 64 * 1024;

/// Resolves one fingerprint group into a referent plus relinked members.
#[derive(Debug, Clone, Default)]
pub struct LinkResolver {
    dry_run: bool,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl LinkResolver {
    /// Create a resolver. With `dry_run` set, transitions are reported and
    /// accounted for but the filesystem is never touched.
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// The flag is polled between candidates, never inside a
    /// remove-then-link transition.
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

    /// Merge one fingerprint group with 2+ members.
    ///
    /// Every recoverable failure (vanished member, comparison error, failed
    /// remove or link) is logged, counted in `totals`, and skipped; the
    /// group's remaining candidates are still processed.
    pub fn resolve_group(&self, size: u64, members: &[PathBuf], totals: &mut RunTotals) {
        // Stat every member up front; entries that vanished since the scan
        // drop out here.
        let mut live: Vec<(&PathBuf, Metadata)> = Vec::with_capacity(members.len());
        for path in members {
            match fs::symlink_metadata(path) {
                Ok(meta) => live.push((path, meta)),
                Err(e) => {
                    log::warn!("skipping {}: {}", path.display(), e);
                    totals.recoverable_errors += 1;
                }
            }
        }
        if live.len() < 2 {
            return;
        }

        // A member that already has extra names is the natural anchor:
        // linking others to it costs no extra bookkeeping.
        let referent_idx = live
            .iter()
            .position(|(_, meta)| link_count(meta) > 1)
            .unwrap_or(0);

        let unmatched = live
            .iter()
            .filter(|(_, meta)| link_count(meta) == 1)
            .count();
        if unmatched == 0 {
            log::debug!(
                "group of {} file(s) at {} bytes already fully linked",
                live.len(),
                size
            );
            return;
        }

        totals.groups_considered += 1;
        let (referent, referent_meta) = {
            let (path, meta) = &live[referent_idx];
            ((*path).clone(), meta.clone())
        };
        log::info!(
            "merging {} cop(ies) of {} bytes into {}",
            live.len() - 1,
            size,
            referent.display()
        );

        for (i, (candidate, meta)) in live.iter().enumerate() {
            if self.is_shutdown_requested() {
                log::debug!("resolver: shutdown requested, leaving remaining candidates");
                return;
            }
            if i == referent_idx {
                continue;
            }
            // Identity check on (device, inode), not on the path string, so
            // duplicate path entries and already-linked members are no-ops.
            if same_file(&referent_meta, meta, &referent, candidate) {
                log::trace!("{} already links to referent", candidate.display());
                continue;
            }
            self.transition(&referent, candidate, size, totals);
        }
    }

    /// Perform (or preview) one remove-then-link transition.
    fn transition(&self, referent: &Path, candidate: &Path, size: u64, totals: &mut RunTotals) {
        // Fingerprint-collision backstop: byte-exact comparison before any
        // mutation. An I/O failure counts as a mismatch.
        match files_identical(referent, candidate) {
            Ok(true) => {}
            Ok(false) => {
                log::warn!(
                    "content mismatch despite equal fingerprint, leaving {} untouched",
                    candidate.display()
                );
                return;
            }
            Err(e) => {
                log::warn!(
                    "cannot compare {} against {}: {}",
                    candidate.display(),
                    referent.display(),
                    e
                );
                totals.recoverable_errors += 1;
                return;
            }
        }

        if self.dry_run {
            log::info!(
                "would link {} -> {}",
                candidate.display(),
                referent.display()
            );
            totals.record_relink(size);
            return;
        }

        let mut guard = RelinkGuard::new(referent, candidate);
        if let Err(e) = fs::remove_file(candidate) {
            log::warn!("failed to remove {}: {}", candidate.display(), e);
            totals.recoverable_errors += 1;
            return;
        }
        guard.armed = true;

        match guard.complete() {
            Ok(()) => {
                log::debug!("linked {} -> {}", candidate.display(), referent.display());
                totals.record_relink(size);
            }
            Err(e) => {
                // The guard's Drop retries the link once more on the way out.
                log::error!(
                    "failed to link {} -> {}: {}",
                    candidate.display(),
                    referent.display(),
                    e
                );
                totals.recoverable_errors += 1;
            }
        }
    }
}

/// Guarantees the link-creation attempt once the candidate entry is removed.
///
/// Armed after a successful `remove_file`. On drop — normal exit, early
/// return, or unwind — it re-creates the path as a hardlink to the referent
/// if the path is still absent.
struct RelinkGuard<'a> {
    referent: &'a Path,
    path: &'a Path,
    armed: bool,
}

impl<'a> RelinkGuard<'a> {
    fn new(referent: &'a Path, path: &'a Path) -> Self {
        Self {
            referent,
            path,
            armed: false,
        }
    }

    /// Create the hardlink and disarm on success.
    fn complete(&mut self) -> io::Result<()> {
        fs::hard_link(self.referent, self.path)?;
        self.armed = false;
        Ok(())
    }
}

impl Drop for RelinkGuard<'_> {
    fn drop(&mut self) {
        if self.armed && !self.path.exists() {
            if let Err(e) = fs::hard_link(self.referent, self.path) {
                log::error!(
                    "cleanup failed to restore {} as link to {}: {}",
                    self.path.display(),
                    self.referent.display(),
                    e
                );
            }
        }
    }
}

/// Hardlink count reported by the filesystem.
#[cfg(unix)]
fn link_count(meta: &Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    meta.nlink()
}

#[cfg(not(unix))]
fn link_count(_meta: &Metadata) -> u64 {
    1
}

/// Whether two directory entries name the same underlying file.
#[cfg(unix)]
fn same_file(a: &Metadata, b: &Metadata, _a_path: &Path, _b_path: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    a.dev() == b.dev() && a.ino() == b.ino()
}

#[cfg(not(unix))]
fn same_file(_a: &Metadata, _b: &Metadata, a_path: &Path, b_path: &Path) -> bool {
    a_path == b_path
}

/// Byte-exact comparison of two files, streamed in fixed-size chunks.
fn files_identical(a: &Path, b: &Path) -> io::Result<bool> {
    if fs::metadata(a)?.len() != fs::metadata(b)?.len() {
        return Ok(false);
    }

    let mut reader_a = BufReader::with_capacity(COMPARE_CHUNK, File::open(a)?);
    let mut reader_b = BufReader::with_capacity(COMPARE_CHUNK, File::open(b)?);
    let mut buf_b = Vec::new();

    loop {
        let (len, equal) = {
            let chunk = reader_a.fill_buf()?;
            if chunk.is_empty() {
                (0, true)
            } else {
                buf_b.resize(chunk.len(), 0);
                reader_b.read_exact(&mut buf_b)?;
                (chunk.len(), chunk == &buf_b[..])
            }
        };
        if len == 0 {
            // Both must be exhausted together.
            return Ok(reader_b.fill_buf()?.is_empty());
        }
        if !equal {
            return Ok(false);
        }
        reader_a.consume(len);
    }
}
