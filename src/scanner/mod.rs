//! Scanner module for directory traversal and content fingerprinting.
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal feeding the size index
//! - [`fingerprint`]: Content fingerprinting (built-in BLAKE3 or external tool)

pub mod fingerprint;
pub mod walker;

use std::path::PathBuf;

pub use fingerprint::{Digest, Fingerprinter};
pub use walker::Walker;

/// Default directory-name suffixes that are skipped without recursing.
///
/// These are opaque, bundle-like package directories whose internals are
/// managed by other software; hardlinking inside them is asking for trouble.
pub const DEFAULT_SKIP_SUFFIXES: [&str; 6] = [
    ".app",
    ".framework",
    ".bundle",
    ".photoslibrary",
    ".dmg",
    ".sparsebundle",
];

/// Size window for one traversal pass.
///
/// A file is included when `size >= min` (if a minimum is set) and
/// `size < max` (if a maximum is set). Empty files never match: they all
/// compare equal and linking them reclaims nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeFilter {
    /// Inclusive lower bound in bytes.
    pub min: Option<u64>,
    /// Exclusive upper bound in bytes.
    pub max: Option<u64>,
}

impl SizeFilter {
    /// Filter for the large-file pass: everything at or above `threshold`.
    #[must_use]
    pub fn large(threshold: u64) -> Self {
        Self {
            min: Some(threshold),
            max: None,
        }
    }

    /// Filter for the small-file pass: everything below `threshold`.
    #[must_use]
    pub fn small(threshold: u64) -> Self {
        Self {
            min: None,
            max: Some(threshold),
        }
    }

    /// Whether a file of `size` bytes falls inside this window.
    #[must_use]
    pub fn matches(&self, size: u64) -> bool {
        if size == 0 {
            return false;
        }
        if let Some(min) = self.min {
            if size < min {
                return false;
            }
        }
        if let Some(max) = self.max {
            if size >= max {
                return false;
            }
        }
        true
    }
}

/// Configuration for one traversal pass.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Size window for this pass.
    pub filter: SizeFilter,
    /// Directory-name suffixes skipped without recursing.
    /// [`WalkerConfig::new`] fills in [`DEFAULT_SKIP_SUFFIXES`] when empty.
    pub skip_suffixes: Vec<String>,
}

impl WalkerConfig {
    /// Create a configuration for the given size window.
    ///
    /// An empty `skip_suffixes` falls back to [`DEFAULT_SKIP_SUFFIXES`].
    #[must_use]
    pub fn new(filter: SizeFilter, skip_suffixes: Vec<String>) -> Self {
        let skip_suffixes = if skip_suffixes.is_empty() {
            DEFAULT_SKIP_SUFFIXES.iter().map(ToString::to_string).collect()
        } else {
            skip_suffixes
        };
        Self {
            filter,
            skip_suffixes,
        }
    }
}

/// Errors that can occur while computing a content fingerprint.
#[derive(thiserror::Error, Debug)]
pub enum FingerprintError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_filter_excludes_empty_files() {
        assert!(!SizeFilter::default().matches(0));
        assert!(!SizeFilter::large(0).matches(0));
        assert!(!SizeFilter::small(u64::MAX).matches(0));
    }

    #[test]
    fn test_size_filter_min_is_inclusive() {
        let filter = SizeFilter::large(100);
        assert!(!filter.matches(99));
        assert!(filter.matches(100));
        assert!(filter.matches(101));
    }

    #[test]
    fn test_size_filter_max_is_exclusive() {
        let filter = SizeFilter::small(100);
        assert!(filter.matches(99));
        assert!(!filter.matches(100));
        assert!(!filter.matches(101));
    }

    #[test]
    fn test_size_filter_passes_partition() {
        // The large and small passes partition all non-zero sizes.
        let threshold = 4096;
        for size in [1, 4095, 4096, 4097, 1 << 30] {
            let in_large = SizeFilter::large(threshold).matches(size);
            let in_small = SizeFilter::small(threshold).matches(size);
            assert!(in_large ^ in_small, "size {size} must be in exactly one pass");
        }
    }

    #[test]
    fn test_walker_config_defaults_suffixes() {
        let config = WalkerConfig::new(SizeFilter::default(), Vec::new());
        assert!(config.skip_suffixes.contains(&".app".to_string()));

        let config = WalkerConfig::new(SizeFilter::default(), vec![".git".to_string()]);
        assert_eq!(config.skip_suffixes, vec![".git".to_string()]);
    }

    #[test]
    fn test_fingerprint_error_display() {
        let err = FingerprintError::NotFound(PathBuf::from("/test"));
        assert_eq!(err.to_string(), "File not found: /test");

        let err = FingerprintError::PermissionDenied(PathBuf::from("/secret"));
        assert_eq!(err.to_string(), "Permission denied: /secret");
    }
}
