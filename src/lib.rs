//! linkdupe - Duplicate File Hardlinker
//!
//! A Rust CLI application that reclaims disk space by replacing byte-identical
//! file copies with hardlinks to a single on-disk instance. Candidates are
//! grouped by size first and content hash (BLAKE3) second, and every merge is
//! confirmed by a byte-exact comparison before any directory entry is touched.

pub mod cli;
pub mod dedupe;
pub mod error;
pub mod logging;
pub mod report;
pub mod scanner;
pub mod signal;

use anyhow::Context;

use crate::cli::{Cli, HasherChoice};
use crate::dedupe::{DedupeError, Runner, RunnerConfig};
use crate::error::ExitCode;
use crate::report::RunTotals;
use crate::scanner::fingerprint::{
    select_fingerprinter, Blake3Fingerprinter, CommandFingerprinter, Fingerprinter,
};

/// Run the application with parsed CLI arguments.
///
/// Initializes logging and signal handling, executes the dedup pipeline, and
/// always prints the reclaimed-bytes summary before returning, even when the
/// run stops early.
///
/// # Errors
///
/// Returns an error when the signal handler cannot be installed. Pipeline
/// failures are recoverable and surface through the exit code instead.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let handler = signal::install_handler().context("failed to install signal handler")?;

    // Pick one fingerprint implementation for the whole run.
    let fingerprinter: Box<dyn Fingerprinter> = match cli.hasher {
        HasherChoice::Builtin => Box::new(Blake3Fingerprinter::new()),
        HasherChoice::Command => Box::new(CommandFingerprinter::new(&cli.hasher_cmd)),
        HasherChoice::Auto => select_fingerprinter(&cli.hasher_cmd),
    };
    log::debug!("using {} fingerprinter", fingerprinter.name());

    let config = RunnerConfig {
        roots: cli.roots,
        threshold: cli.threshold,
        dry_run: cli.dry_run,
        skip_suffixes: cli.skip_suffixes,
    };
    let runner = Runner::new(config, fingerprinter).with_shutdown_flag(handler.get_flag());

    let mut totals = RunTotals::default();
    let outcome = runner.run(&mut totals);

    // Best-effort reporting: the summary is emitted no matter how the run ended.
    println!("{}", totals.summary());

    match outcome {
        Ok(()) => Ok(if totals.recoverable_errors > 0 {
            ExitCode::PartialSuccess
        } else {
            ExitCode::Success
        }),
        Err(DedupeError::Interrupted) => Ok(ExitCode::Interrupted),
    }
}
