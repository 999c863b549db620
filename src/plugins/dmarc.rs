//! DMARC policy check.

use std::sync::Arc;

use async_trait::async_trait;

use super::record::{lookup, unexpected};
use super::{query_name, Plugin};
use crate::dns::{answers, Answer, RecordType, Resolve};
use crate::error_handling::StreamClosed;
use crate::issue::{Issue, IssueSink};

pub struct DmarcPlugin {
    resolver: Arc<dyn Resolve>,
}

impl DmarcPlugin {
    pub fn new(resolver: Arc<dyn Resolve>) -> Self {
        Self { resolver }
    }
}

/// Reads the `p=` tag of a DMARC record.
fn requested_policy(record: &str) -> Option<&str> {
    record
        .split(';')
        .filter_map(|tag| tag.trim().split_once('='))
        .find(|(key, _)| key.trim() == "p")
        .map(|(_, value)| value.trim())
}

#[async_trait]
impl Plugin for DmarcPlugin {
    fn name(&self) -> &'static str {
        "DMARC"
    }

    async fn run(&self, domain: &str, sink: &IssueSink) -> Result<(), StreamClosed> {
        let name = query_name("_dmarc.", domain);
        let Some(reply) = lookup(&*self.resolver, sink, &name, RecordType::TXT).await? else {
            return Ok(());
        };

        let mut found = false;
        for answer in answers(&reply) {
            let Answer::Txt(record) = answer else {
                unexpected(sink, &name, &answer).await?;
                continue;
            };
            found = true;
            sink.emit(Issue::info(format!("DMARC {record}"))).await?;

            if requested_policy(&record).is_some_and(|p| p.eq_ignore_ascii_case("none")) {
                sink.emit(Issue::warning(
                    "DMARC policy is p=none: failing mail is still delivered (monitoring only)",
                ))
                .await?;
            }
        }

        let summary = if found {
            Issue::ok("DMARC Records configured")
        } else {
            Issue::error("No DMARC records configured.")
        };
        sink.emit(summary).await
    }
}
