//! Fingerprint grouping within a size bucket.
//!
//! Fingerprinting is `O(file size)` per file and dominates the pipeline,
//! which is exactly why the size pre-filter exists. Within a bucket the
//! files are independent, so the digests are computed on the rayon pool;
//! the grouping itself preserves traversal order, keeping referent
//! selection deterministic.

use std::collections::HashMap;
use std::path::PathBuf;

use rayon::prelude::*;

use crate::scanner::{Digest, Fingerprinter};

/// Partition the members of one size bucket by content fingerprint.
///
/// Returns the groups in first-seen order (members keep traversal order)
/// and the number of members dropped because their fingerprint failed.
/// Failed members are warned about and excluded from this bucket only.
pub fn group_bucket(
    size: u64,
    members: &[PathBuf],
    hasher: &dyn Fingerprinter,
) -> (Vec<(Digest, Vec<PathBuf>)>, u64) {
    log::debug!("fingerprinting {} file(s) of {} bytes", members.len(), size);

    // Parallel digest computation; collect() preserves input order.
    let digests: Vec<Option<Digest>> = members
        .par_iter()
        .map(|path| match hasher.fingerprint(path) {
            Ok(digest) => Some(digest),
            Err(e) => {
                log::warn!("failed to fingerprint {}: {}", path.display(), e);
                None
            }
        })
        .collect();

    let mut groups: Vec<(Digest, Vec<PathBuf>)> = Vec::new();
    let mut slots: HashMap<Digest, usize> = HashMap::new();
    let mut errors = 0u64;

    for (path, digest) in members.iter().zip(digests) {
        match digest {
            Some(digest) => {
                let slot = *slots.entry(digest).or_insert_with(|| {
                    groups.push((digest, Vec::new()));
                    groups.len() - 1
                });
                groups[slot].1.push(path.clone());
            }
            None => errors += 1,
        }
    }

    (groups, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::fingerprint::Blake3Fingerprinter;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        File::create(&path).unwrap().write_all(content).unwrap();
        path
    }

    #[test]
    fn test_identical_files_form_one_group() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a", b"same bytes");
        let b = write_file(&dir, "b", b"same bytes");
        let c = write_file(&dir, "c", b"same bytes");

        let members = vec![a.clone(), b.clone(), c.clone()];
        let (groups, errors) = group_bucket(10, &members, &Blake3Fingerprinter::new());

        assert_eq!(errors, 0);
        assert_eq!(groups.len(), 1);
        // Members keep traversal order.
        assert_eq!(groups[0].1, vec![a, b, c]);
    }

    #[test]
    fn test_same_size_different_content_splits() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a", b"content AA");
        let b = write_file(&dir, "b", b"content BB");

        let members = vec![a.clone(), b.clone()];
        let (groups, errors) = group_bucket(10, &members, &Blake3Fingerprinter::new());

        assert_eq!(errors, 0);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].1, vec![a]);
        assert_eq!(groups[1].1, vec![b]);
    }

    #[test]
    fn test_unreadable_member_is_dropped() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a", b"still here");
        let gone = dir.path().join("vanished");

        let members = vec![a.clone(), gone];
        let (groups, errors) = group_bucket(10, &members, &Blake3Fingerprinter::new());

        assert_eq!(errors, 1);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].1, vec![a]);
    }
}
