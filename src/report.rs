//! Run accounting and the final reclaimed-bytes summary.
//!
//! `RunTotals` is the single accumulator for a run. It is owned by the
//! caller and threaded through the pipeline by mutable reference, so the
//! summary can be printed even when a stage stops early.

use bytesize::ByteSize;

/// Process-scoped totals for one dedup run.
///
/// Zeroed at run start, updated monotonically while the pipeline executes,
/// read once at the end for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTotals {
    /// Regular files recorded in the size index.
    pub files_indexed: u64,
    /// Distinct size buckets observed.
    pub size_buckets: u64,
    /// Fingerprint groups that entered the link resolver with 2+ members.
    pub groups_considered: u64,
    /// Paths replaced by hardlinks (or that would be, in dry-run mode).
    pub files_relinked: u64,
    /// Bytes reclaimed (pre-removal sizes of relinked paths).
    pub bytes_reclaimed: u64,
    /// Recoverable errors logged during the run (skipped subtrees, files,
    /// or candidates).
    pub recoverable_errors: u64,
}

impl RunTotals {
    /// Account for one completed (or previewed) remove-then-link transition.
    pub fn record_relink(&mut self, size: u64) {
        self.files_relinked += 1;
        self.bytes_reclaimed += size;
    }

    /// Human-readable end-of-run summary line.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Relinked {} file(s), reclaimed {} ({} bytes)",
            self.files_relinked,
            ByteSize::b(self.bytes_reclaimed).display().iec(),
            self.bytes_reclaimed
        )
    }
}
