//! Error type definitions.
//!
//! This module defines the errors raised during startup and DNS resolution.
//! Per-domain findings are not errors; they travel as issues.

use std::net::SocketAddr;

use hickory_resolver::proto::error::ProtoError;
use log::SetLoggerError;
use thiserror::Error;

/// Error types for initialization failures.
///
/// All of these are fatal: they are raised before any check runs.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// The system resolver configuration could not be read.
    #[error("DNS resolver configuration error: {0}")]
    ResolverConfigError(String),

    /// No nameserver is configured, so no query can be issued.
    #[error("DNS resolver configuration error: no nameservers configured")]
    NoNameserversError,
}

/// Error types for a single DNS resolution.
///
/// The resolver retries transport failures itself; callers only see the
/// error from the last attempt.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The query name is not a valid fully-qualified domain name.
    #[error("invalid query name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// Network failure talking to a nameserver.
    #[error("I/O error talking to {server}: {source}")]
    Io {
        server: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The nameserver did not answer in time.
    #[error("timed out waiting for {server}")]
    Timeout { server: SocketAddr },

    /// The message could not be encoded or the reply could not be decoded.
    #[error("malformed DNS message: {0}")]
    Proto(#[from] ProtoError),

    /// The reply carried a different message ID than the query.
    #[error("reply from {server} has ID {received}, expected {expected}")]
    IdMismatch {
        server: SocketAddr,
        expected: u16,
        received: u16,
    },

    /// The resolver worker is no longer running.
    #[error("DNS resolver service is unavailable")]
    ServiceUnavailable,
}

/// Error types for one SMTP probe of a mail server.
///
/// A failed probe becomes a Warning finding; it never aborts the audit.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The TCP connection could not be established.
    #[error("connection to {addr} failed: {source}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The server did not respond within the timeout.
    #[error("timed out during {stage}")]
    Timeout { stage: &'static str },

    /// Network failure after connecting.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The server sent a line that is not an SMTP reply.
    #[error("malformed SMTP reply: {0:?}")]
    MalformedReply(String),

    /// The server closed the connection mid-conversation.
    #[error("connection closed by server")]
    ConnectionClosed,

    /// A reply exceeded the size limit.
    #[error("SMTP reply exceeds {limit} bytes")]
    ReplyTooLong { limit: usize },
}

/// The consumer of an issue stream has gone away.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("issue stream closed by consumer")]
pub struct StreamClosed;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_nameservers_message() {
        let err = InitializationError::NoNameserversError;
        assert!(err.to_string().contains("no nameservers"));
    }

    #[test]
    fn test_io_error_names_server() {
        let server: SocketAddr = "192.0.2.1:53".parse().unwrap();
        let err = ResolveError::Io {
            server,
            source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
        };
        let msg = err.to_string();
        assert!(msg.contains("192.0.2.1:53"));
        assert!(msg.contains("refused"));
    }

    #[test]
    fn test_probe_timeout_names_stage() {
        let err = ProbeError::Timeout { stage: "EHLO" };
        assert_eq!(err.to_string(), "timed out during EHLO");
    }

    #[test]
    fn test_invalid_name_message() {
        let err = ResolveError::InvalidName {
            name: "example.com".to_string(),
            reason: "not fully qualified".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid query name 'example.com': not fully qualified"
        );
    }
}
