//! linkdupe - Duplicate File Hardlinker
//!
//! Entry point for the linkdupe CLI application.

use clap::Parser;
use linkdupe::{cli::Cli, error::ExitCode};

fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();

    // Run the application logic. Interruption surfaces as an Ok exit code,
    // so any Err here is a genuine failure.
    match linkdupe::run_app(cli) {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            let exit_code = ExitCode::GeneralError;
            eprintln!("[{}] Error: {}", exit_code.code_prefix(), err);
            std::process::exit(exit_code.as_i32());
        }
    }
}
