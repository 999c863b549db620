//! Checks and the registry that orders them.
//!
//! A check is a [`Plugin`]: it has a display name and, for a given domain,
//! produces a stream of graded [`Issue`]s. [`check`] runs one plugin against one
//! domain as a background task and hands back the stream.
//!
//! Plugins are stateless across calls; the same instance is invoked
//! concurrently for many domains.

mod dkim;
mod dmarc;
mod dnssec;
mod domainkey;
mod grab;
mod record;
mod spf;


use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use log::{debug, error, warn};

use crate::config::ISSUE_CHANNEL_CAPACITY;
use crate::dns::Resolve;
use crate::error_handling::StreamClosed;
use crate::issue::{self, Issue, IssueSink, IssueStream};
use crate::smtp::MailProbe;

// Re-export public API
pub use dkim::DkimPlugin;
pub use dmarc::DmarcPlugin;
pub use dnssec::DnssecPlugin;
pub use domainkey::{parse_domainkey_policy, DomainKeyPlugin, DomainKeyPolicy};
pub use grab::{report_issues, GrabPlugin};
pub use record::RecordListPlugin;
pub use spf::SpfPlugin;

/// A single check.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Fixed display label, also used by the `--plugin` filter.
    fn name(&self) -> &'static str;

    /// Runs the check for `domain`, emitting findings into `sink` in order.
    ///
    /// Lookup failures are reported as issues, never returned.
    ///
    /// # Errors
    ///
    /// Returns [`StreamClosed`] only when the consumer stopped listening.
    async fn run(&self, domain: &str, sink: &IssueSink) -> Result<(), StreamClosed>;
}

/// Starts `plugin` for `domain` on the runtime and returns its issue stream.
///
/// The stream ends once the check has finished. Dropping the stream early
/// makes the check stop at its next emitted issue. A check that panics ends
/// its stream with an Error issue.
pub fn check(plugin: Arc<dyn Plugin>, domain: &str) -> IssueStream {
    let (sink, stream) = issue::channel(ISSUE_CHANNEL_CAPACITY);
    let domain = domain.to_string();
    tokio::spawn(async move {
        let outcome = AssertUnwindSafe(plugin.run(&domain, &sink))
            .catch_unwind()
            .await;
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(StreamClosed)) => {
                debug!(
                    "{} check for {} stopped: consumer went away",
                    plugin.name(),
                    domain
                );
            }
            Err(_) => {
                error!("{} check for {} panicked", plugin.name(), domain);
                let _ = sink
                    .emit(Issue::error(format!(
                        "{} check aborted unexpectedly",
                        plugin.name()
                    )))
                    .await;
            }
        }
    });
    stream
}

/// Builds the fully-qualified query name `<prefix><domain>.`.
///
/// Accepts domains with or without a trailing dot.
pub(crate) fn query_name(prefix: &str, domain: &str) -> String {
    format!("{prefix}{}.", domain.trim_end_matches('.'))
}

/// Which plugins to build.
#[derive(Debug, Clone, Default)]
pub struct PluginOptions {
    /// Build the banner-grabbing plugin (connects to port 25 of every MX)
    pub banner: bool,
    /// Keep only plugins with these names (case-insensitive); empty keeps all
    pub only: Vec<String>,
}

/// Builds the active plugins in execution order.
///
/// Order: DKIM, DMARC, DNSSEC, DomainKey, Banner (when enabled), MX, NS, SPF, TXT.
pub fn registry(
    resolver: Arc<dyn Resolve>,
    probe: Arc<dyn MailProbe>,
    options: &PluginOptions,
) -> Vec<Arc<dyn Plugin>> {
    let mut plugins: Vec<Arc<dyn Plugin>> = vec![
        Arc::new(DkimPlugin::new(Arc::clone(&resolver))),
        Arc::new(DmarcPlugin::new(Arc::clone(&resolver))),
        Arc::new(DnssecPlugin::new(Arc::clone(&resolver))),
        Arc::new(DomainKeyPlugin::new(Arc::clone(&resolver))),
    ];
    if options.banner {
        plugins.push(Arc::new(GrabPlugin::new(Arc::clone(&resolver), probe)));
    }
    plugins.push(Arc::new(RecordListPlugin::mx(Arc::clone(&resolver))));
    plugins.push(Arc::new(RecordListPlugin::ns(Arc::clone(&resolver))));
    plugins.push(Arc::new(SpfPlugin::new(Arc::clone(&resolver))));
    plugins.push(Arc::new(RecordListPlugin::txt(resolver)));

    if !options.only.is_empty() {
        for wanted in &options.only {
            if !plugins.iter().any(|p| p.name().eq_ignore_ascii_case(wanted)) {
                warn!("Unknown or disabled plugin '{wanted}' ignored");
            }
        }
        plugins.retain(|p| {
            options
                .only
                .iter()
                .any(|wanted| wanted.eq_ignore_ascii_case(p.name()))
        });
    }
    plugins
}
