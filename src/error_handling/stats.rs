//! Audit statistics tracking.
//!
//! This module provides thread-safe counters of reported findings per severity.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use crate::issue::Severity;

/// Thread-safe count of reported issues, keyed by severity.
///
/// Every severity is initialized to zero on creation, so lookups never miss.
/// Shared across per-domain tasks with `Arc`.
pub struct AuditStats {
    counts: HashMap<Severity, AtomicUsize>,
}

impl AuditStats {
    pub fn new() -> Self {
        let mut counts = HashMap::new();
        for severity in Severity::iter() {
            counts.insert(severity, AtomicUsize::new(0));
        }
        AuditStats { counts }
    }

    /// Records one reported issue.
    pub fn record(&self, severity: Severity) {
        if let Some(counter) = self.counts.get(&severity) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to record severity {:?} which is not in the map. \
                 This indicates a bug in AuditStats initialization.",
                severity
            );
        }
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.counts
            .get(&severity)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().map(|c| c.load(Ordering::Relaxed)).sum()
    }
}

impl Default for AuditStats {
    fn default() -> Self {
        Self::new()
    }
}
