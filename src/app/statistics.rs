//! Statistics printing.

use log::{info, warn};

use crate::run::AuditSummary;

/// Logs the per-severity counts of a finished audit.
pub fn print_audit_statistics(summary: &AuditSummary) {
    info!(
        "Finding counts ({} total): {} error, {} warning, {} ok, {} info, {} debug",
        summary.total(),
        summary.errors,
        summary.warnings,
        summary.ok,
        summary.info,
        summary.debug
    );
    if summary.failed_tasks > 0 {
        warn!(
            "{} check task{} failed; their findings may be incomplete",
            summary.failed_tasks,
            if summary.failed_tasks == 1 { "" } else { "s" }
        );
    }
    print_simple_summary(summary);
}

/// Prints a one-line summary of the run.
fn print_simple_summary(summary: &AuditSummary) {
    info!(
        "✅ Audited {} domain{} with {} plugin{} in {:.1}s",
        summary.domains,
        if summary.domains == 1 { "" } else { "s" },
        summary.plugins,
        if summary.plugins == 1 { "" } else { "s" },
        summary.elapsed_seconds
    );
}
