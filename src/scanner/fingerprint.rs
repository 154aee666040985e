//! Content fingerprinting strategies.
//!
//! # Overview
//!
//! A [`Fingerprinter`] turns a file path into a fixed-size content digest.
//! Two implementations exist:
//!
//! - [`Blake3Fingerprinter`]: built-in streaming BLAKE3, reading fixed-size
//!   chunks so large files never sit in memory whole.
//! - [`CommandFingerprinter`]: shells out to an accelerated hashing tool
//!   (`b3sum` by default) and parses its `<hex-digest> <filename>` output.
//!
//! Both emit BLAKE3 digests, so their value spaces coincide and a subprocess
//! failure can fall back to the built-in path for that file without mixing
//! digest families. Which implementation drives a run is still decided once
//! at startup via [`select_fingerprinter`].
//!
//! The digest is a cheap equality proxy: the link resolver confirms every
//! candidate byte-for-byte before mutating anything, so collision resistance
//! here is a backstop, not the safety mechanism.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Command, Stdio};

use super::FingerprintError;

/// Fixed-size content digest (BLAKE3, 32 bytes).
pub type Digest = [u8; 32];

/// Chunk size for streaming reads.
const READ_CHUNK: usize = 64 * 1024;

/// Strategy interface for content fingerprinting.
///
/// Implementations must be deterministic: the same file content always
/// yields the same digest within a run.
pub trait Fingerprinter: Send + Sync {
    /// Compute the content digest of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`FingerprintError`] when the file cannot be read.
    fn fingerprint(&self, path: &Path) -> Result<Digest, FingerprintError>;

    /// Short name for logging.
    fn name(&self) -> &'static str;
}

/// Built-in streaming BLAKE3 fingerprinter.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3Fingerprinter;

impl Blake3Fingerprinter {
    /// Create a new built-in fingerprinter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Fingerprinter for Blake3Fingerprinter {
    fn fingerprint(&self, path: &Path) -> Result<Digest, FingerprintError> {
        let file = File::open(path).map_err(|e| io_error(path, e))?;
        let mut reader = BufReader::with_capacity(READ_CHUNK, file);
        let mut hasher = blake3::Hasher::new();

        loop {
            let consumed = {
                let chunk = reader.fill_buf().map_err(|e| io_error(path, e))?;
                if chunk.is_empty() {
                    break;
                }
                hasher.update(chunk);
                chunk.len()
            };
            reader.consume(consumed);
        }

        Ok(*hasher.finalize().as_bytes())
    }

    fn name(&self) -> &'static str {
        "builtin"
    }
}

/// Fingerprinter that delegates to an external hashing executable.
///
/// The tool is invoked with the file path as its single argument and is
/// expected to print the hex digest followed by the filename on one line
/// and exit zero. Any non-zero exit, spawn failure, or malformed output
/// falls back to the built-in digest for that file.
#[derive(Debug, Clone)]
pub struct CommandFingerprinter {
    command: String,
    fallback: Blake3Fingerprinter,
}

impl CommandFingerprinter {
    /// Create a fingerprinter for the given command name.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
            fallback: Blake3Fingerprinter::new(),
        }
    }

    /// Check whether the external command is available.
    #[must_use]
    pub fn probe(command: &str) -> bool {
        Command::new(command)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn run_tool(&self, path: &Path) -> Result<Digest, String> {
        let output = Command::new(&self.command)
            .arg(path)
            .stderr(Stdio::null())
            .output()
            .map_err(|e| e.to_string())?;

        if !output.status.success() {
            return Err(format!("exit status {}", output.status));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let token = stdout
            .split_whitespace()
            .next()
            .ok_or_else(|| "empty output".to_string())?;
        let hash = blake3::Hash::from_hex(token).map_err(|e| e.to_string())?;
        Ok(*hash.as_bytes())
    }
}

impl Fingerprinter for CommandFingerprinter {
    fn fingerprint(&self, path: &Path) -> Result<Digest, FingerprintError> {
        match self.run_tool(path) {
            Ok(digest) => Ok(digest),
            Err(reason) => {
                log::debug!(
                    "hasher command '{}' failed for {} ({}), using built-in digest",
                    self.command,
                    path.display(),
                    reason
                );
                self.fallback.fingerprint(path)
            }
        }
    }

    fn name(&self) -> &'static str {
        "command"
    }
}

/// Pick the fingerprint implementation for the run.
///
/// Probes for the external command once; the chosen implementation is used
/// for every file afterwards.
#[must_use]
pub fn select_fingerprinter(command: &str) -> Box<dyn Fingerprinter> {
    if CommandFingerprinter::probe(command) {
        log::debug!("external hasher '{command}' available");
        Box::new(CommandFingerprinter::new(command))
    } else {
        log::debug!("external hasher '{command}' not available, using built-in digest");
        Box::new(Blake3Fingerprinter::new())
    }
}

fn io_error(path: &Path, source: std::io::Error) -> FingerprintError {
    use std::io::ErrorKind;

    match source.kind() {
        ErrorKind::NotFound => FingerprintError::NotFound(path.to_path_buf()),
        ErrorKind::PermissionDenied => FingerprintError::PermissionDenied(path.to_path_buf()),
        _ => FingerprintError::Io {
            path: path.to_path_buf(),
            source,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        File::create(&path).unwrap().write_all(content).unwrap();
        path
    }

    #[test]
    fn test_builtin_matches_reference_hash() {
        let dir = TempDir::new().unwrap();
        let content = b"some file content for hashing";
        let path = write_file(&dir, "a.txt", content);

        let digest = Blake3Fingerprinter::new().fingerprint(&path).unwrap();
        assert_eq!(digest, *blake3::hash(content).as_bytes());
    }

    #[test]
    fn test_builtin_streams_multiple_chunks() {
        let dir = TempDir::new().unwrap();
        // Larger than one read chunk to exercise the streaming loop.
        let content = vec![0xabu8; READ_CHUNK * 2 + 17];
        let path = write_file(&dir, "big.bin", &content);

        let digest = Blake3Fingerprinter::new().fingerprint(&path).unwrap();
        assert_eq!(digest, *blake3::hash(&content).as_bytes());
    }

    #[test]
    fn test_identical_content_same_digest() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a", b"twin content");
        let b = write_file(&dir, "b", b"twin content");
        let c = write_file(&dir, "c", b"other content");

        let hasher = Blake3Fingerprinter::new();
        assert_eq!(
            hasher.fingerprint(&a).unwrap(),
            hasher.fingerprint(&b).unwrap()
        );
        assert_ne!(
            hasher.fingerprint(&a).unwrap(),
            hasher.fingerprint(&c).unwrap()
        );
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = Blake3Fingerprinter::new()
            .fingerprint(Path::new("/no/such/file"))
            .unwrap_err();
        assert!(matches!(err, FingerprintError::NotFound(_)));
    }

    #[test]
    fn test_probe_missing_command() {
        assert!(!CommandFingerprinter::probe("definitely-not-a-real-hasher-xyz"));
    }

    #[test]
    fn test_command_falls_back_to_builtin() {
        let dir = TempDir::new().unwrap();
        let content = b"fallback content";
        let path = write_file(&dir, "f.txt", content);

        // The command does not exist, so the built-in digest must be used.
        let hasher = CommandFingerprinter::new("definitely-not-a-real-hasher-xyz");
        let digest = hasher.fingerprint(&path).unwrap();
        assert_eq!(digest, *blake3::hash(content).as_bytes());
    }

    #[test]
    fn test_select_falls_back_when_unavailable() {
        let hasher = select_fingerprinter("definitely-not-a-real-hasher-xyz");
        assert_eq!(hasher.name(), "builtin");
    }
}
