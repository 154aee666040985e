//! Signal handling for graceful shutdown.
//!
//! This module provides centralized Ctrl+C handling. It uses an `AtomicBool`
//! flag shared across threads to signal when shutdown has been requested.
//! The walker and link resolver poll the flag between units of work; the
//! resolver in particular never stops inside a remove-then-link transition,
//! so an interrupted run leaves every already-processed path in its final
//! linked state.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::ExitCode;

/// Centralized shutdown handler for graceful application termination.
///
/// Wraps an `AtomicBool` flag set when a Ctrl+C signal is received. Clones
/// of the flag are handed to the walker and resolver for coordinated
/// shutdown.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// Create a new shutdown handler with the flag initially unset.
    #[must_use]
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Check if shutdown has been requested.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Manually request a shutdown.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Get a clone of the shutdown flag for passing to worker components.
    #[must_use]
    pub fn get_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }
}

/// Install the process-wide Ctrl+C handler and return its shutdown handle.
///
/// The first signal sets the flag and lets the pipeline wind down cleanly.
/// A second signal forces an immediate exit with code 130.
///
/// # Errors
///
/// Returns an error if the underlying handler could not be registered
/// (for example, when one is already installed).
pub fn install_handler() -> Result<ShutdownHandler, ctrlc::Error> {
    let handler = ShutdownHandler::new();
    let flag = handler.get_flag();

    ctrlc::set_handler(move || {
        if flag.swap(true, Ordering::SeqCst) {
            // Second signal: the user really means it.
            let _ = writeln!(std::io::stderr(), "Forced exit.");
            std::process::exit(ExitCode::Interrupted.as_i32());
        }
        let _ = writeln!(
            std::io::stderr(),
            "Interrupted. Finishing pending relinks..."
        );
    })?;

    Ok(handler)
}
