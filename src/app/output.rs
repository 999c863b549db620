//! Terminal rendering of findings.

use std::io::{self, Write};
use std::sync::Mutex;

use colored::*;

use crate::config::HEADER_WIDTH;
use crate::issue::{Issue, Severity};

/// Writes plugin headers and findings to an output stream.
///
/// Each call writes whole lines under one lock, so lines from concurrent
/// domain tasks never interleave.
pub struct Renderer {
    out: Mutex<Box<dyn Write + Send>>,
    show_debug: bool,
}

impl Renderer {
    pub fn new(out: Box<dyn Write + Send>, show_debug: bool) -> Self {
        Self {
            out: Mutex::new(out),
            show_debug,
        }
    }

    pub fn stdout(show_debug: bool) -> Self {
        Self::new(Box::new(io::stdout()), show_debug)
    }

    /// Writes the banner announcing a plugin.
    pub fn header(&self, plugin: &str) -> io::Result<()> {
        self.write(&format!("\n{}\n", header_line(plugin)))
    }

    /// Writes one finding for `domain`. Debug findings are skipped unless enabled.
    pub fn issue(&self, domain: &str, issue: &Issue) -> io::Result<()> {
        if issue.severity == Severity::Debug && !self.show_debug {
            return Ok(());
        }
        self.write(&format_issue(domain, issue))
    }

    fn write(&self, text: &str) -> io::Result<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| io::Error::other("output lock poisoned"))?;
        out.write_all(text.as_bytes())?;
        out.flush()
    }
}

fn header_line(plugin: &str) -> String {
    format!("{:-<width$}", format!("---- {plugin} "), width = HEADER_WIDTH)
}

fn tag(severity: Severity) -> ColoredString {
    match severity {
        Severity::Error => "[!!]".red().bold(),
        Severity::Warning => "[! ]".red(),
        Severity::Ok => "[OK]".green(),
        Severity::Info => "[  ]".normal(),
        Severity::Debug => "[..]".dimmed(),
    }
}

/// Formats a finding as one line, plus an indented line for its description.
fn format_issue(domain: &str, issue: &Issue) -> String {
    let mut text = format!("{} {}: {}\n", tag(issue.severity), domain, issue.message);
    if let Some(description) = &issue.description {
        text.push_str(&format!("     {description}\n"));
    }
    text
}
