//! Command-line interface definitions for linkdupe.
//!
//! This module defines all CLI arguments using the clap derive API.
//!
//! # Example
//!
//! ```bash
//! # Preview what would be hardlinked under the current directory
//! linkdupe --dry-run
//!
//! # Deduplicate two trees, reporting every merge
//! linkdupe -v ~/archive ~/backups
//!
//! # Treat files of 1GiB and above as the "large" pass
//! linkdupe --threshold 1GiB ~/media
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Reclaim disk space by hardlinking byte-identical files.
///
/// linkdupe scans the given directory trees, groups files by size and content
/// hash (BLAKE3), verifies candidates byte-for-byte, and replaces redundant
/// copies with hardlinks to a single referent file.
#[derive(Debug, Parser)]
#[command(name = "linkdupe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory trees (or single files) to deduplicate
    #[arg(value_name = "PATH", default_value = ".")]
    pub roots: Vec<PathBuf>,

    /// Report what would be linked without touching the filesystem
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors and the final summary
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Size boundary between the large-file and small-file scan passes
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(
        long,
        value_name = "SIZE",
        value_parser = parse_size,
        default_value = "64MiB",
        env = "LINKDUPE_THRESHOLD"
    )]
    pub threshold: u64,

    /// Directory name suffixes to skip without recursing (can be repeated)
    ///
    /// Replaces the built-in list of opaque bundle suffixes
    /// (.app, .framework, .bundle, .photoslibrary, .dmg, .sparsebundle).
    #[arg(long = "skip-suffix", value_name = "SUFFIX")]
    pub skip_suffixes: Vec<String>,

    /// Content hashing backend
    #[arg(long, value_enum, default_value = "auto")]
    pub hasher: HasherChoice,

    /// External hashing command to probe for (must print "<hex> <file>")
    #[arg(long, value_name = "COMMAND", default_value = "b3sum")]
    pub hasher_cmd: String,
}

/// Which fingerprint implementation to use for the run.
///
/// One implementation is selected at startup and used for every file;
/// digest families are never mixed mid-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HasherChoice {
    /// Probe for the external command, fall back to the built-in digest
    Auto,
    /// Always use the built-in streaming BLAKE3 digest
    Builtin,
    /// Always invoke the external hashing command
    Command,
}

impl std::fmt::Display for HasherChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HasherChoice::Auto => write!(f, "auto"),
            HasherChoice::Builtin => write!(f, "builtin"),
            HasherChoice::Command => write!(f, "command"),
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB.
/// Case-insensitive. Numbers without suffix are treated as bytes.
///
/// # Examples
///
/// ```
/// use linkdupe::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1KB").unwrap(), 1000);
/// assert_eq!(parse_size("1KiB").unwrap(), 1024);
/// assert_eq!(parse_size("1MiB").unwrap(), 1_048_576);
/// ```
///
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid number,
/// a negative number, or an unknown size suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    // Find where the number ends and the suffix begins
    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    if num < 0.0 {
        return Err("Size cannot be negative".to_string());
    }

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size_bytes() {
        assert_eq!(parse_size("1024").unwrap(), 1024);
        assert_eq!(parse_size("1024B").unwrap(), 1024);
        assert_eq!(parse_size("0").unwrap(), 0);
    }

    #[test]
    fn test_parse_size_binary_suffixes() {
        assert_eq!(parse_size("1KiB").unwrap(), 1_024);
        assert_eq!(parse_size("1kib").unwrap(), 1_024); // Case insensitive
        assert_eq!(parse_size("1MiB").unwrap(), 1_048_576);
        assert_eq!(parse_size("1GiB").unwrap(), 1_073_741_824);
        assert_eq!(parse_size("1TiB").unwrap(), 1_099_511_627_776);
    }

    #[test]
    fn test_parse_size_decimal_suffixes() {
        assert_eq!(parse_size("1KB").unwrap(), 1_000);
        assert_eq!(parse_size("1K").unwrap(), 1_000);
        assert_eq!(parse_size("10MB").unwrap(), 10_000_000);
        assert_eq!(parse_size("1GB").unwrap(), 1_000_000_000);
    }

    #[test]
    fn test_parse_size_fractional() {
        assert_eq!(parse_size("1.5MB").unwrap(), 1_500_000);
        assert_eq!(parse_size("0.5GiB").unwrap(), 536_870_912);
    }

    #[test]
    fn test_parse_size_with_whitespace() {
        assert_eq!(parse_size("  1024  ").unwrap(), 1024);
        assert_eq!(parse_size("1 MB").unwrap(), 1_000_000);
    }

    #[test]
    fn test_parse_size_errors() {
        assert!(parse_size("").is_err());
        assert!(parse_size("abc").is_err());
        assert!(parse_size("1XB").is_err());
        assert!(parse_size("-1MB").is_err());
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["linkdupe"]).unwrap();
        assert_eq!(cli.roots, vec![PathBuf::from(".")]);
        assert!(!cli.dry_run);
        assert!(!cli.quiet);
        assert_eq!(cli.verbose, 0);
        assert_eq!(cli.threshold, 64 * 1024 * 1024);
        assert_eq!(cli.hasher, HasherChoice::Auto);
        assert_eq!(cli.hasher_cmd, "b3sum");
        assert!(cli.skip_suffixes.is_empty());
    }

    #[test]
    fn test_cli_multiple_roots() {
        let cli = Cli::try_parse_from(["linkdupe", "/a", "/b", "/c"]).unwrap();
        assert_eq!(
            cli.roots,
            vec![
                PathBuf::from("/a"),
                PathBuf::from("/b"),
                PathBuf::from("/c")
            ]
        );
    }

    #[test]
    fn test_cli_dry_run_and_threshold() {
        let cli =
            Cli::try_parse_from(["linkdupe", "-n", "--threshold", "1GiB", "/data"]).unwrap();
        assert!(cli.dry_run);
        assert_eq!(cli.threshold, 1_073_741_824);
    }

    #[test]
    fn test_cli_hasher_choice() {
        let cli = Cli::try_parse_from(["linkdupe", "--hasher", "builtin"]).unwrap();
        assert_eq!(cli.hasher, HasherChoice::Builtin);

        let cli = Cli::try_parse_from(["linkdupe", "--hasher", "command", "--hasher-cmd", "xxh"])
            .unwrap();
        assert_eq!(cli.hasher, HasherChoice::Command);
        assert_eq!(cli.hasher_cmd, "xxh");
    }

    #[test]
    fn test_cli_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["linkdupe", "-q", "-v"]).is_err());
    }
}
