//! Run orchestration: traversal passes, grouping, and resolution.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::{group_bucket, DedupeError, LinkResolver, SizeIndex};
use crate::report::RunTotals;
use crate::scanner::walker::is_pseudo_fs_root;
use crate::scanner::{Fingerprinter, SizeFilter, Walker, WalkerConfig};

/// Configuration for one dedup run.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Input roots (directories or single files).
    pub roots: Vec<PathBuf>,
    /// Size boundary between the large-file and small-file passes.
    pub threshold: u64,
    /// Report transitions without performing them.
    pub dry_run: bool,
    /// Directory-name suffixes to skip; empty means the built-in defaults.
    pub skip_suffixes: Vec<String>,
}

/// Orchestrates the full pipeline over every input root.
///
/// Each root is walked twice — a large-file pass and a small-file pass —
/// into one shared size index, so verbose output distinguishes the two
/// scans while grouping and linking run once over the union.
pub struct Runner {
    config: RunnerConfig,
    fingerprinter: Box<dyn Fingerprinter>,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Runner {
    /// Create a runner with the fingerprint implementation chosen for
    /// this run.
    #[must_use]
    pub fn new(config: RunnerConfig, fingerprinter: Box<dyn Fingerprinter>) -> Self {
        Self {
            config,
            fingerprinter,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
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

    /// Execute the run, accumulating into `totals`.
    ///
    /// Bad roots are reported and skipped; the run continues with the
    /// remaining roots. `totals` is valid for reporting whether this
    /// returns `Ok` or was interrupted.
    ///
    /// # Errors
    ///
    /// Returns [`DedupeError::Interrupted`] when the shutdown flag was
    /// observed between units of work.
    pub fn run(&self, totals: &mut RunTotals) -> Result<(), DedupeError> {
        let mut index = SizeIndex::new();

        for root in &self.config.roots {
            if self.is_shutdown_requested() {
                return Err(DedupeError::Interrupted);
            }
            self.scan_root(root, &mut index, totals);
        }

        totals.files_indexed = index.file_count() as u64;
        totals.size_buckets = index.len() as u64;
        log::info!(
            "indexed {} file(s) in {} size bucket(s)",
            totals.files_indexed,
            totals.size_buckets
        );

        let mut resolver = LinkResolver::new(self.config.dry_run);
        if let Some(flag) = &self.shutdown_flag {
            resolver = resolver.with_shutdown_flag(Arc::clone(flag));
        }
        for (size, members) in index.candidate_buckets() {
            if self.is_shutdown_requested() {
                return Err(DedupeError::Interrupted);
            }

            let (groups, errors) = group_bucket(size, members, self.fingerprinter.as_ref());
            totals.recoverable_errors += errors;

            for (_, group) in &groups {
                if self.is_shutdown_requested() {
                    return Err(DedupeError::Interrupted);
                }
                if group.len() >= 2 {
                    resolver.resolve_group(size, group, totals);
                }
            }
        }

        Ok(())
    }

    /// Feed one root into the index: two passes for a directory, a direct
    /// record for a regular file, a warning for anything else.
    fn scan_root(&self, root: &std::path::Path, index: &mut SizeIndex, totals: &mut RunTotals) {
        let meta = match fs::metadata(root) {
            Ok(meta) => meta,
            Err(e) => {
                log::error!("skipping root {}: {}", root.display(), e);
                totals.recoverable_errors += 1;
                return;
            }
        };

        if meta.is_file() {
            let size = meta.len();
            if size > 0 {
                index.record(root.to_path_buf(), size);
            }
            return;
        }

        if !meta.is_dir() {
            log::error!(
                "skipping root {}: neither a directory nor a regular file",
                root.display()
            );
            totals.recoverable_errors += 1;
            return;
        }

        if is_pseudo_fs_root(root) {
            log::error!(
                "skipping root {}: pseudo-filesystem trees carry no deduplicable files",
                root.display()
            );
            totals.recoverable_errors += 1;
            return;
        }

        for (label, filter) in [
            ("large", SizeFilter::large(self.config.threshold)),
            ("small", SizeFilter::small(self.config.threshold)),
        ] {
            log::info!("{} file scan: {}", label, root.display());
            let config = WalkerConfig::new(filter, self.config.skip_suffixes.clone());
            let mut walker = Walker::new(root, config);
            if let Some(flag) = &self.shutdown_flag {
                walker = walker.with_shutdown_flag(Arc::clone(flag));
            }
            let stats = walker.walk(index);
            log::debug!(
                "{} file scan of {} found {} file(s), {} error(s)",
                label,
                root.display(),
                stats.files_indexed,
                stats.errors
            );
            totals.recoverable_errors += stats.errors;
        }
    }
}
