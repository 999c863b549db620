//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `email_audit` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - Exit codes
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use email_audit::initialization::{init_crypto_provider, init_logger_with};
use email_audit::{run_audit, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments into Config
    let config = Config::parse();

    // Initialize logger based on config
    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    // Initialize crypto provider for STARTTLS probing
    init_crypto_provider();

    let fail_on = config.fail_on;
    match run_audit(config).await {
        Ok(report) => process::exit(report.exit_code(fail_on)),
        Err(e) => {
            eprintln!("email_audit error: {:#}", e);
            process::exit(1);
        }
    }
}
