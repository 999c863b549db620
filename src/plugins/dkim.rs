//! DKIM selector check.
//!
//! There is no way to list a domain's selectors, so this probes the common
//! ones in turn.

use std::sync::Arc;

use async_trait::async_trait;

use super::record::unexpected;
use super::{query_name, Plugin};
use crate::config::DKIM_SELECTORS;
use crate::dns::{answers, Answer, RecordType, Resolve, ResponseCode};
use crate::error_handling::StreamClosed;
use crate::issue::{Issue, IssueSink};

pub struct DkimPlugin {
    resolver: Arc<dyn Resolve>,
}

impl DkimPlugin {
    pub fn new(resolver: Arc<dyn Resolve>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl Plugin for DkimPlugin {
    fn name(&self) -> &'static str {
        "DKIM"
    }

    async fn run(&self, domain: &str, sink: &IssueSink) -> Result<(), StreamClosed> {
        let mut found = false;

        for selector in DKIM_SELECTORS {
            let name = query_name(&format!("{selector}._domainkey."), domain);
            let reply = match self.resolver.resolve(&name, RecordType::TXT).await {
                Ok(reply) => reply,
                Err(e) => {
                    return sink
                        .emit(Issue::error(format!(
                            "Error retrieving record for selector '{selector}': {e}"
                        )))
                        .await;
                }
            };

            // NXDOMAIN for one selector is the normal case; try the next one
            if reply.response_code() != ResponseCode::NoError {
                sink.emit(Issue::debug(format!(
                    "Error retrieving record for selector '{selector}': {}",
                    reply.response_code()
                )))
                .await?;
                continue;
            }

            for answer in answers(&reply) {
                match answer {
                    Answer::Txt(text) => {
                        found = true;
                        sink.emit(Issue::info(format!(
                            "DKIM record for selector '{selector}': {text}"
                        )))
                        .await?;
                    }
                    other => unexpected(sink, &name, &other).await?,
                }
            }
        }

        let summary = if found {
            Issue::ok("Found default DKIM Records configured")
        } else {
            Issue::warning("No default DKIM records configured.")
        };
        sink.emit(summary).await
    }
}
