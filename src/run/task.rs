//! Per-domain task processing.
//!
//! This module contains the logic for draining one check for one domain.

use std::sync::Arc;

use futures::StreamExt;
use log::warn;

use crate::app::Renderer;
use crate::error_handling::AuditStats;
use crate::plugins::{check, Plugin};

/// Runs `plugin` for `domain`, rendering and counting each finding as it arrives.
///
/// Returns once the check's stream has ended.
pub(crate) async fn drain_check(
    plugin: Arc<dyn Plugin>,
    domain: String,
    renderer: Arc<Renderer>,
    stats: Arc<AuditStats>,
) {
    let name = plugin.name();
    let mut issues = check(plugin, &domain);

    while let Some(issue) = issues.next().await {
        stats.record(issue.severity);
        if let Err(e) = renderer.issue(&domain, &issue) {
            warn!("Failed to write {name} finding for {domain}: {e}");
        }
    }
}
