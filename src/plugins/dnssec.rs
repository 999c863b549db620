//! DNSSEC presence check: does the zone publish any DNSKEY?

use std::sync::Arc;

use async_trait::async_trait;

use super::record::{lookup, unexpected};
use super::{query_name, Plugin};
use crate::dns::{answers, Answer, RecordType, Resolve};
use crate::error_handling::StreamClosed;
use crate::issue::{Issue, IssueSink};

pub struct DnssecPlugin {
    resolver: Arc<dyn Resolve>,
}

impl DnssecPlugin {
    pub fn new(resolver: Arc<dyn Resolve>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl Plugin for DnssecPlugin {
    fn name(&self) -> &'static str {
        "DNSSEC"
    }

    async fn run(&self, domain: &str, sink: &IssueSink) -> Result<(), StreamClosed> {
        let name = query_name("", domain);
        let Some(reply) = lookup(&*self.resolver, sink, &name, RecordType::DNSKEY).await? else {
            return Ok(());
        };

        let mut found = false;
        for answer in answers(&reply) {
            match answer {
                Answer::Dnskey {
                    secure_entry_point,
                    algorithm,
                    public_key,
                } => {
                    found = true;
                    let role = if secure_entry_point { "KSK" } else { "ZSK" };
                    sink.emit(Issue::info(format!(
                        "public key ({role}, {algorithm}): {public_key}"
                    )))
                    .await?;
                }
                other => unexpected(sink, &name, &other).await?,
            }
        }

        let summary = if found {
            Issue::ok("DNS Sec(urity) implemented")
        } else {
            Issue::error("DNS Sec(urity) not implemented.")
        };
        sink.emit(summary).await
    }
}
