//! Banner grabbing: connects to every mail exchanger of the domain.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use async_trait::async_trait;

use super::record::{lookup, unexpected};
use super::{query_name, Plugin};
use crate::config::SMTP_PORT;
use crate::dns::{answers, Answer, RecordType, Resolve, ResponseCode};
use crate::error_handling::StreamClosed;
use crate::issue::{Issue, IssueSink};
use crate::smtp::{MailProbe, ProbeReport};

pub struct GrabPlugin {
    resolver: Arc<dyn Resolve>,
    probe: Arc<dyn MailProbe>,
}

impl GrabPlugin {
    pub fn new(resolver: Arc<dyn Resolve>, probe: Arc<dyn MailProbe>) -> Self {
        Self { resolver, probe }
    }

    /// Resolves the A and AAAA records of a mail exchanger.
    ///
    /// Failed lookups are reported as warnings; whatever did resolve is returned.
    async fn addresses(&self, host: &str, sink: &IssueSink) -> Result<Vec<IpAddr>, StreamClosed> {
        let mut addresses = Vec::new();
        for record_type in [RecordType::A, RecordType::AAAA] {
            let reply = match self.resolver.resolve(host, record_type).await {
                Ok(reply) => reply,
                Err(e) => {
                    sink.emit(Issue::warning(format!(
                        "Could not resolve {record_type} for {host}: {e}"
                    )))
                    .await?;
                    continue;
                }
            };
            if reply.response_code() != ResponseCode::NoError {
                sink.emit(Issue::debug(format!(
                    "Error retrieving {record_type} record for {host}: {}",
                    reply.response_code()
                )))
                .await?;
                continue;
            }
            for answer in answers(&reply) {
                match answer {
                    Answer::Address(ip) => addresses.push(ip),
                    other => unexpected(sink, host, &other).await?,
                }
            }
        }
        Ok(addresses)
    }
}

/// Grades what one mail server revealed.
pub fn report_issues(host: &str, addr: SocketAddr, report: &ProbeReport) -> Vec<Issue> {
    let mut issues = Vec::new();

    if let Some(banner) = &report.banner {
        issues.push(Issue::info(format!("{host} ({addr}) banner: {banner}")));
    }
    if let Some(ehlo) = &report.ehlo {
        issues.push(Issue::debug(format!("{host} ({addr}) EHLO: {ehlo}")));
    }
    if let Some(help) = &report.help {
        issues.push(Issue::debug(format!("{host} ({addr}) HELP: {help}")));
    }

    if report.starttls {
        issues.push(Issue::debug(format!("{host} ({addr}) STARTTLS supported")));
    } else {
        issues.push(
            Issue::error(format!("{host} ({addr}) STARTTLS not supported"))
                .with_description("Mail to this server travels in cleartext."),
        );
    }

    if let Some(subject) = &report.certificate_subject {
        issues.push(Issue::info(format!(
            "{host} ({addr}) certificate subject: {subject}"
        )));
    }
    if let Some(error) = &report.tls_error {
        issues.push(Issue::warning(format!(
            "{host} ({addr}) TLS handshake failed: {error}"
        )));
    }
    if report.heartbleed_vulnerable == Some(true) {
        issues.push(Issue::error(format!(
            "{host} ({addr}) is vulnerable to Heartbleed"
        )));
    }

    issues
}

#[async_trait]
impl Plugin for GrabPlugin {
    fn name(&self) -> &'static str {
        "Banner"
    }

    async fn run(&self, domain: &str, sink: &IssueSink) -> Result<(), StreamClosed> {
        let name = query_name("", domain);
        let Some(reply) = lookup(&*self.resolver, sink, &name, RecordType::MX).await? else {
            return Ok(());
        };

        for answer in answers(&reply) {
            let Answer::Mx { exchange, .. } = answer else {
                unexpected(sink, &name, &answer).await?;
                continue;
            };

            let addresses = self.addresses(&exchange, sink).await?;
            if addresses.is_empty() {
                sink.emit(Issue::warning(format!(
                    "No addresses found for mail server {exchange}"
                )))
                .await?;
                continue;
            }

            for ip in addresses {
                let addr = SocketAddr::new(ip, SMTP_PORT);
                match self.probe.probe(&exchange, addr).await {
                    Ok(report) => {
                        for issue in report_issues(&exchange, addr, &report) {
                            sink.emit(issue).await?;
                        }
                    }
                    Err(e) => {
                        sink.emit(Issue::warning(format!(
                            "Could not probe {exchange} ({addr}): {e}"
                        )))
                        .await?;
                    }
                }
            }
        }
        Ok(())
    }
}
