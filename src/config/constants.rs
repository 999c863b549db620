//! Configuration constants.
//!
//! This module defines the constants used throughout the application,
//! including resolver retry bounds, timeouts, and check parameters.

use std::time::Duration;

// Resolver
/// Number of additional attempts after the first failed DNS exchange.
/// Set to 5 = initial attempt + 5 retries (total 6 attempts)
pub const RESOLVER_MAX_RETRIES: usize = 5;
/// Capacity of the resolver request queue
pub const RESOLVER_QUEUE_CAPACITY: usize = 1024;
/// Standard DNS port, used when a nameserver is given without a port
pub const DNS_PORT: u16 = 53;

// Network operation timeouts
/// DNS exchange timeout in seconds (per attempt, covers connect + round trip)
pub const DNS_TIMEOUT_SECS: u64 = 5;
/// SMTP connect and per-reply timeout in seconds
/// Some mail servers delay the greeting on purpose (tarpitting), so this is generous
pub const SMTP_TIMEOUT_SECS: u64 = 30;
/// TLS handshake timeout in seconds
pub const TLS_HANDSHAKE_TIMEOUT_SECS: u64 = 10;
/// SMTP submission port probed by the banner plugin
pub const SMTP_PORT: u16 = 25;

// Retry strategy (only used when --retry-backoff-ms is non-zero)
/// Factor by which retry delay is multiplied on each attempt
pub const RETRY_FACTOR: u64 = 2;
/// Maximum delay between retries
pub const RETRY_MAX_DELAY: Duration = Duration::from_secs(5);

// Checks
/// DKIM selectors probed under `_domainkey`
pub const DKIM_SELECTORS: &[&str] = &["dkim", "default"];
/// Buffered issues per check before the producer waits for the consumer
pub const ISSUE_CHANNEL_CAPACITY: usize = 16;
/// Default domain announced in EHLO during banner grabbing
pub const DEFAULT_EHLO_DOMAIN: &str = "localhost";
/// Longest SMTP reply accepted from a probed server, in bytes
pub const MAX_SMTP_REPLY_BYTES: usize = 16 * 1024;

// Output
/// Width of the per-plugin header rule
pub const HEADER_WIDTH: usize = 80;
