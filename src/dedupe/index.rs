//! Size-keyed index of discovered files.
//!
//! Grouping by size is the cheap first stage of duplicate detection: files
//! of different sizes cannot be duplicates, so fingerprinting is only ever
//! spent on multi-member buckets.

use std::collections::BTreeMap;
use std::path::PathBuf;

/// Mapping from file size to the paths observed at that size.
///
/// Paths within a bucket keep traversal order. The index only grows during
/// a run; it is mutated by the walker passes and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct SizeIndex {
    buckets: BTreeMap<u64, Vec<PathBuf>>,
}

impl SizeIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `path` to the bucket for `size`, creating it if absent.
    pub fn record(&mut self, path: PathBuf, size: u64) {
        self.buckets.entry(size).or_default().push(path);
    }

    /// Number of distinct size buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether no file has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of recorded paths.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Iterate over all buckets, largest size first.
    pub fn buckets_desc(&self) -> impl Iterator<Item = (u64, &[PathBuf])> {
        self.buckets
            .iter()
            .rev()
            .map(|(size, paths)| (*size, paths.as_slice()))
    }

    /// Iterate over buckets that can contain duplicates (2+ members),
    /// largest size first.
    ///
    /// Largest first, since big buckets offer the most savings per
    /// comparison and surface the biggest wins early in verbose output.
    pub fn candidate_buckets(&self) -> impl Iterator<Item = (u64, &[PathBuf])> {
        self.buckets_desc().filter(|(_, paths)| paths.len() >= 2)
    }
}
