//! Duplicate detection and hardlink merging.
//!
//! The pipeline runs in stages:
//! 1. [`index`]: accumulate a size → paths mapping during traversal
//! 2. [`grouper`]: fingerprint the members of each multi-file size bucket
//! 3. [`resolver`]: verify candidates byte-for-byte and relink them to a referent
//! 4. [`runner`]: orchestrate the passes over every input root

pub mod grouper;
pub mod index;
pub mod resolver;
pub mod runner;

pub use grouper::group_bucket;
pub use index::SizeIndex;
pub use resolver::LinkResolver;
pub use runner::{Runner, RunnerConfig};

/// Errors that abort a dedup run.
///
/// Everything else in the pipeline is recoverable at the granularity of a
/// subtree, file, or candidate and surfaces as a logged warning instead.
#[derive(thiserror::Error, Debug)]
pub enum DedupeError {
    /// The run was interrupted by the user.
    #[error("Interrupted by user")]
    Interrupted,
}
