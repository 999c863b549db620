//! email_audit library: email-security DNS auditing
//!
//! This library checks how well a domain protects the mail it sends and
//! receives. It queries the records that govern mail authentication (SPF,
//! DKIM, DMARC, DomainKeys), DNSSEC, the MX/NS/TXT records, and can optionally
//! connect to the domain's mail servers to grab their banners and test STARTTLS.
//! Every finding is graded Error, Warning, Info, Debug or OK.
//!
//! # Example
//!
//! ```no_run
//! use email_audit::{run_audit, Config, FailOn};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     domains: vec!["example.com".to_string()],
//!     fail_on: FailOn::Error,
//!     ..Default::default()
//! };
//!
//! let report = run_audit(config.clone()).await?;
//! println!(
//!     "{} errors, {} warnings",
//!     report.summary.errors, report.summary.warnings
//! );
//! std::process::exit(report.exit_code(config.fail_on));
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

pub mod app;
pub mod config;
pub mod dns;
pub mod error_handling;
pub mod initialization;
pub mod issue;
pub mod plugins;
mod run;
pub mod smtp;
pub mod spf;

// Re-export public API
pub use app::Renderer;
pub use config::{Config, FailOn, LogFormat, LogLevel};
pub use issue::{Issue, IssueSink, IssueStream, Severity};
pub use plugins::{check, registry, Plugin, PluginOptions};
pub use run::{run_audit, AuditReport, AuditSummary, Auditor};
