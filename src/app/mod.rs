//! Main application modules.
//!
//! This module provides terminal rendering of findings and the statistics
//! printed once an audit has finished.

pub mod output;
pub mod statistics;

// Re-export public API
pub use output::Renderer;
pub use statistics::print_audit_statistics;
