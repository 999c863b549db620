//! Graded findings and the streams that carry them.
//!
//! Every check reports its results as a sequence of [`Issue`]s. A check runs
//! as a background task that pushes issues into an [`IssueSink`]; the consumer
//! drains the matching [`IssueStream`] until it ends.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use strum_macros::EnumIter;
use tokio::sync::mpsc;

use crate::error_handling::StreamClosed;

/// Severity of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Severity {
    /// A security weakness or a failed lookup
    Error,
    /// A weakness worth fixing, or a missing optional record
    Warning,
    /// Record contents and other context
    Info,
    /// Expected noise such as non-success DNS response codes
    Debug,
    /// A check passed
    Ok,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
            Severity::Ok => "OK",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single finding produced by a check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub severity: Severity,
    pub message: String,
    /// Longer rationale, used by findings that grade a policy
    pub description: Option<String>,
}

impl Issue {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            description: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn debug(message: impl Into<String>) -> Self {
        Self::new(Severity::Debug, message)
    }

    pub fn ok(message: impl Into<String>) -> Self {
        Self::new(Severity::Ok, message)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Creates a connected sink/stream pair with the given buffer capacity.
pub fn channel(capacity: usize) -> (IssueSink, IssueStream) {
    let (tx, rx) = mpsc::channel(capacity);
    (IssueSink { tx }, IssueStream { rx })
}

/// Producer half of an issue stream.
///
/// The stream ends when every clone of the sink has been dropped.
#[derive(Debug, Clone)]
pub struct IssueSink {
    tx: mpsc::Sender<Issue>,
}

impl IssueSink {
    /// Sends one issue, waiting while the buffer is full.
    ///
    /// # Errors
    ///
    /// Returns [`StreamClosed`] once the consumer has dropped its stream. Producers
    /// should stop working at that point, which `?` does for them.
    pub async fn emit(&self, issue: Issue) -> Result<(), StreamClosed> {
        self.tx.send(issue).await.map_err(|_| StreamClosed)
    }
}

/// Consumer half of an issue stream.
///
/// Yields issues in the order the producer emitted them and ends exactly once.
#[derive(Debug)]
pub struct IssueStream {
    rx: mpsc::Receiver<Issue>,
}

impl Stream for IssueStream {
    type Item = Issue;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Issue>> {
        self.get_mut().rx.poll_recv(cx)
    }
}
