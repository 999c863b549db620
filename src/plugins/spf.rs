//! SPF check: finds the domain's `v=spf1` record and grades it.

use std::sync::Arc;

use async_trait::async_trait;

use super::record::{lookup, unexpected};
use super::{query_name, Plugin};
use crate::dns::{answers, Answer, RecordType, Resolve};
use crate::error_handling::StreamClosed;
use crate::issue::{Issue, IssueSink};
use crate::spf::{evaluate, SPF_PREFIX};

pub struct SpfPlugin {
    resolver: Arc<dyn Resolve>,
}

impl SpfPlugin {
    pub fn new(resolver: Arc<dyn Resolve>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl Plugin for SpfPlugin {
    fn name(&self) -> &'static str {
        "SPF"
    }

    async fn run(&self, domain: &str, sink: &IssueSink) -> Result<(), StreamClosed> {
        let name = query_name("", domain);
        let Some(reply) = lookup(&*self.resolver, sink, &name, RecordType::TXT).await? else {
            return Ok(());
        };

        let mut found = false;
        for answer in answers(&reply) {
            let Answer::Txt(record) = answer else {
                unexpected(sink, &name, &answer).await?;
                continue;
            };
            if !record.starts_with(SPF_PREFIX) {
                continue;
            }

            // Only the first SPF record is evaluated; receivers reject mail
            // (permerror) when a domain publishes more than one
            if found {
                sink.emit(Issue::warning(format!(
                    "Multiple SPF records published, ignoring: {record}"
                )))
                .await?;
                continue;
            }
            found = true;

            for issue in evaluate(&record).issues {
                sink.emit(issue).await?;
            }
        }

        let summary = if found {
            Issue::ok("SPF Records configured")
        } else {
            Issue::error("No SPF records configured.")
        };
        sink.emit(summary).await
    }
}
