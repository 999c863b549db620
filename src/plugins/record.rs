//! The shared record-check pattern.
//!
//! Every DNS check resolves a name, reports a lookup failure as a single issue,
//! and walks the answer section. [`lookup`] and [`unexpected`] implement the
//! shared steps; [`RecordListPlugin`] is the complete pattern for checks that
//! just list what they find (MX, NS, TXT).

use std::sync::Arc;

use async_trait::async_trait;

use super::{query_name, Plugin};
use crate::dns::{answers, Answer, Message, RecordType, Resolve, ResponseCode};
use crate::error_handling::StreamClosed;
use crate::issue::{Issue, IssueSink};

/// Resolves `name` and reports failures.
///
/// Returns `None` after emitting exactly one issue when the lookup failed:
/// an Error for a transport failure, a Debug for a non-success response code.
/// The caller should end its check in that case.
pub(crate) async fn lookup(
    resolver: &dyn Resolve,
    sink: &IssueSink,
    name: &str,
    record_type: RecordType,
) -> Result<Option<Message>, StreamClosed> {
    match resolver.resolve(name, record_type).await {
        Err(e) => {
            sink.emit(Issue::error(format!(
                "Error retrieving {record_type} records: {e}"
            )))
            .await?;
            Ok(None)
        }
        Ok(reply) if reply.response_code() != ResponseCode::NoError => {
            sink.emit(Issue::debug(format!(
                "Error retrieving {record_type} record: {}",
                reply.response_code()
            )))
            .await?;
            Ok(None)
        }
        Ok(reply) => Ok(Some(reply)),
    }
}

/// Reports an answer record of a type the check did not ask for.
pub(crate) async fn unexpected(
    sink: &IssueSink,
    name: &str,
    answer: &Answer,
) -> Result<(), StreamClosed> {
    sink.emit(Issue::debug(format!(
        "Unexpected record in answer for {name}: {answer:?}"
    )))
    .await
}

/// Lists one record type at the domain apex, one Info issue per answer.
pub struct RecordListPlugin {
    name: &'static str,
    record_type: RecordType,
    describe: fn(&Answer) -> Option<String>,
    resolver: Arc<dyn Resolve>,
}

impl RecordListPlugin {
    pub fn mx(resolver: Arc<dyn Resolve>) -> Self {
        Self {
            name: "MX",
            record_type: RecordType::MX,
            describe: |answer| match answer {
                Answer::Mx {
                    preference,
                    exchange,
                } => Some(format!(
                    "mail server {exchange} with preference {preference}"
                )),
                _ => None,
            },
            resolver,
        }
    }

    pub fn ns(resolver: Arc<dyn Resolve>) -> Self {
        Self {
            name: "NS",
            record_type: RecordType::NS,
            describe: |answer| match answer {
                Answer::Ns(host) => Some(format!("name server {host}")),
                _ => None,
            },
            resolver,
        }
    }

    pub fn txt(resolver: Arc<dyn Resolve>) -> Self {
        Self {
            name: "TXT",
            record_type: RecordType::TXT,
            describe: |answer| match answer {
                Answer::Txt(text) => Some(text.clone()),
                _ => None,
            },
            resolver,
        }
    }
}

#[async_trait]
impl Plugin for RecordListPlugin {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn run(&self, domain: &str, sink: &IssueSink) -> Result<(), StreamClosed> {
        let name = query_name("", domain);
        let Some(reply) = lookup(&*self.resolver, sink, &name, self.record_type).await? else {
            return Ok(());
        };

        for answer in answers(&reply) {
            match (self.describe)(&answer) {
                Some(message) => sink.emit(Issue::info(message)).await?,
                None => unexpected(sink, &name, &answer).await?,
            }
        }
        Ok(())
    }
}
