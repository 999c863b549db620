//! Error handling and audit statistics.
//!
//! This module provides:
//! - Error type definitions for startup, DNS resolution and SMTP probing
//! - Thread-safe counters of reported findings
//!
//! Errors are categorized into:
//! - **Initialization errors**: fatal, raised before any check runs
//! - **Resolve errors**: contained in the issue stream of the check that hit them
//! - **Probe errors**: a mail server could not be probed, reported as a Warning

mod stats;
mod types;

// Re-export public API
pub use stats::AuditStats;
pub use types::{InitializationError, ProbeError, ResolveError, StreamClosed};
