//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::net::{IpAddr, SocketAddr};

use clap::{Parser, ValueEnum};

use crate::config::constants::{DEFAULT_EHLO_DOMAIN, DNS_PORT};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Exit code policy applied once every plugin has finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FailOn {
    /// Always exit 0 after a completed audit
    Never,
    /// Exit 2 if any Error finding was reported
    Error,
    /// Exit 2 if any Error or Warning finding was reported
    Warning,
}

/// Audit configuration.
///
/// Parsed from the command line by the binary, or constructed programmatically
/// with `..Default::default()`.
///
/// # Examples
///
/// ```no_run
/// use email_audit::Config;
///
/// let config = Config {
///     domains: vec!["example.com".to_string()],
///     show_debug: true,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "email_audit",
    version,
    about = "Audits SMTP and email DNS configuration"
)]
pub struct Config {
    /// Domains to audit
    #[arg(required = true)]
    pub domains: Vec<String>,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Nameserver to query (IP or IP:port), repeatable. Defaults to the system resolver configuration.
    #[arg(long = "nameserver", value_parser = parse_nameserver)]
    pub nameservers: Vec<SocketAddr>,

    /// Initial delay between resolver retries in milliseconds (0 retries immediately)
    #[arg(long, default_value_t = 0)]
    pub retry_backoff_ms: u64,

    /// Only run the named plugins (case-insensitive), repeatable
    #[arg(long = "plugin")]
    pub plugins: Vec<String>,

    /// Connect to each MX host and grab SMTP banners and STARTTLS details
    #[arg(long)]
    pub banner: bool,

    /// Domain announced in EHLO while grabbing banners
    #[arg(long, default_value = DEFAULT_EHLO_DOMAIN)]
    pub ehlo_domain: String,

    /// Also print Debug findings (non-success DNS response codes, protocol chatter)
    #[arg(long)]
    pub show_debug: bool,

    /// Exit with code 2 when findings at or above this severity were reported
    #[arg(long, value_enum, default_value_t = FailOn::Never)]
    pub fail_on: FailOn,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            domains: Vec::new(),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            nameservers: Vec::new(),
            retry_backoff_ms: 0,
            plugins: Vec::new(),
            banner: false,
            ehlo_domain: DEFAULT_EHLO_DOMAIN.to_string(),
            show_debug: false,
            fail_on: FailOn::Never,
        }
    }
}

/// Parses `--nameserver` values, accepting a bare IP address (port 53) or a socket address.
pub fn parse_nameserver(value: &str) -> Result<SocketAddr, String> {
    if let Ok(addr) = value.parse::<SocketAddr>() {
        return Ok(addr);
    }
    value
        .parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, DNS_PORT))
        .map_err(|_| format!("invalid nameserver address: {value}"))
}
