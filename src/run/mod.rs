//! Audit orchestration.
//!
//! Plugins run one after another in registry order. Within one plugin every
//! domain is checked concurrently, and all of them finish before the next
//! plugin's header is printed.

mod task;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use log::{error, info, warn};

use crate::app::{print_audit_statistics, Renderer};
use crate::config::{Config, FailOn};
use crate::error_handling::AuditStats;
use crate::initialization::{init_resolver, nameservers_from_config};
use crate::issue::Severity;
use crate::plugins::{registry, Plugin, PluginOptions};
use crate::smtp::SmtpProbe;

use task::drain_check;

/// Counts from a finished audit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditSummary {
    /// Number of domains audited
    pub domains: usize,
    /// Number of plugins run against each domain
    pub plugins: usize,
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
    pub debug: usize,
    pub ok: usize,
    /// Domain tasks that panicked instead of finishing
    pub failed_tasks: usize,
    pub elapsed_seconds: f64,
}

impl AuditSummary {
    /// Total number of findings, Debug included.
    pub fn total(&self) -> usize {
        self.errors + self.warnings + self.info + self.debug + self.ok
    }
}

/// Results of an audit run.
#[derive(Debug, Clone)]
pub struct AuditReport {
    pub summary: AuditSummary,
    /// Nameservers the resolver queried
    pub nameservers: Vec<SocketAddr>,
}

impl AuditReport {
    /// Process exit code under the given failure policy: 0, or 2 when triggered.
    pub fn exit_code(&self, fail_on: FailOn) -> i32 {
        let triggered = match fail_on {
            FailOn::Never => false,
            FailOn::Error => self.summary.errors > 0,
            FailOn::Warning => self.summary.errors > 0 || self.summary.warnings > 0,
        };
        if triggered {
            2
        } else {
            0
        }
    }
}

/// Runs plugins against domains and renders what they find.
pub struct Auditor {
    plugins: Vec<Arc<dyn Plugin>>,
    renderer: Arc<Renderer>,
}

impl Auditor {
    pub fn new(plugins: Vec<Arc<dyn Plugin>>, renderer: Arc<Renderer>) -> Self {
        Self { plugins, renderer }
    }

    /// Runs every plugin against every domain.
    ///
    /// Failures inside a check are findings, so this never fails; a domain task
    /// that panics is logged and counted in [`AuditSummary::failed_tasks`].
    pub async fn audit(&self, domains: &[String]) -> AuditSummary {
        let start_time = Instant::now();
        let stats = Arc::new(AuditStats::new());
        let mut failed_tasks = 0;

        for plugin in &self.plugins {
            if let Err(e) = self.renderer.header(plugin.name()) {
                warn!("Failed to write header for {}: {e}", plugin.name());
            }

            let mut tasks = FuturesUnordered::new();
            for domain in domains {
                tasks.push(tokio::spawn(drain_check(
                    Arc::clone(plugin),
                    domain.clone(),
                    Arc::clone(&self.renderer),
                    Arc::clone(&stats),
                )));
            }

            while let Some(result) = tasks.next().await {
                if let Err(e) = result {
                    failed_tasks += 1;
                    error!("{} task failed: {e}", plugin.name());
                }
            }
        }

        AuditSummary {
            domains: domains.len(),
            plugins: self.plugins.len(),
            errors: stats.count(Severity::Error),
            warnings: stats.count(Severity::Warning),
            info: stats.count(Severity::Info),
            debug: stats.count(Severity::Debug),
            ok: stats.count(Severity::Ok),
            failed_tasks,
            elapsed_seconds: start_time.elapsed().as_secs_f64(),
        }
    }
}

/// Runs an audit with the provided configuration, rendering to stdout.
///
/// This is the main entry point for the library. The logger and the TLS crypto
/// provider should be initialized first.
///
/// # Errors
///
/// Returns an error if no domain was given or the resolver cannot be set up
/// (no usable nameserver). Lookup failures during the audit are findings, not
/// errors.
///
/// # Example
///
/// ```no_run
/// use email_audit::{run_audit, Config};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config {
///     domains: vec!["example.com".to_string()],
///     ..Default::default()
/// };
/// let report = run_audit(config).await?;
/// println!("{} errors", report.summary.errors);
/// # Ok(())
/// # }
/// ```
pub async fn run_audit(config: Config) -> Result<AuditReport> {
    anyhow::ensure!(!config.domains.is_empty(), "No domains to audit");

    let nameservers =
        nameservers_from_config(&config).context("Failed to determine nameservers")?;
    info!(
        "Resolving through {} nameserver{}",
        nameservers.len(),
        if nameservers.len() == 1 { "" } else { "s" }
    );
    let resolver = init_resolver(&nameservers, config.retry_backoff_ms)
        .context("Failed to initialize DNS resolver")?;

    let probe = Arc::new(SmtpProbe::new(config.ehlo_domain.clone()));
    let options = PluginOptions {
        banner: config.banner,
        only: config.plugins.clone(),
    };
    let plugins = registry(Arc::new(resolver), probe, &options);
    if plugins.is_empty() {
        warn!("No plugins selected; nothing to do");
    }

    let renderer = Arc::new(Renderer::stdout(config.show_debug));
    let summary = Auditor::new(plugins, renderer)
        .audit(&config.domains)
        .await;
    print_audit_statistics(&summary);

    Ok(AuditReport {
        summary,
        nameservers,
    })
}
