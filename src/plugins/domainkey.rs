//! Legacy DomainKeys policy check.
//!
//! The policy lives in a TXT record at `_domainkey.<domain>` as `;`-separated
//! `key=value` tags, for example `o=-; n=some notes`:
//! - `o=-` all mail from the domain is signed, `o=~` some mail is signed
//! - `t=y` test mode, the policy has no effect
//! - `r=` responsible e-mail address, `n=` free-form notes
//!
//! DomainKeys has been superseded by DKIM; a missing record only warrants a warning.

use std::sync::Arc;

use async_trait::async_trait;

use super::record::{lookup, unexpected};
use super::{query_name, Plugin};
use crate::dns::{answers, Answer, RecordType, Resolve};
use crate::error_handling::StreamClosed;
use crate::issue::{Issue, IssueSink};

/// Findings from one DomainKeys policy string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainKeyPolicy {
    pub issues: Vec<Issue>,
    /// Set when the policy declares that all mail is signed (`o=-`)
    pub signs_all: bool,
}

/// Grades a DomainKeys policy string.
///
/// Entries that are not exactly one `key=value` pair are skipped, as are
/// unknown keys.
pub fn parse_domainkey_policy(policy: &str) -> DomainKeyPolicy {
    let mut issues = Vec::new();
    let mut signs_all = false;

    for entry in policy.split(';') {
        let parts: Vec<&str> = entry.trim().split('=').collect();
        let [key, value] = parts.as_slice() else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());

        match key {
            "o" => match value.chars().next() {
                Some('~') => issues.push(Issue::info("Some e-mails from this domain are signed.")),
                Some('-') => {
                    signs_all = true;
                    issues.push(Issue::info("All e-mails from this domain are signed."));
                }
                _ => issues.push(Issue::warning(format!(
                    "Unknown modifier for o parameter: {value}"
                ))),
            },
            "t" => match value.chars().next() {
                Some('y') => issues.push(Issue::error(
                    "DomainKey in test mode, domain key has no effect.",
                )),
                _ => issues.push(Issue::warning(format!(
                    "Unknown modifier for test parameter: {value}"
                ))),
            },
            "r" => issues.push(Issue::info(format!(
                "DomainKey responsible e-mail address: {value}"
            ))),
            "n" => issues.push(Issue::info(format!("DomainKey notes: {value}"))),
            _ => {}
        }
    }

    DomainKeyPolicy { issues, signs_all }
}

pub struct DomainKeyPlugin {
    resolver: Arc<dyn Resolve>,
}

impl DomainKeyPlugin {
    pub fn new(resolver: Arc<dyn Resolve>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl Plugin for DomainKeyPlugin {
    fn name(&self) -> &'static str {
        "DomainKey"
    }

    async fn run(&self, domain: &str, sink: &IssueSink) -> Result<(), StreamClosed> {
        let name = query_name("_domainkey.", domain);
        let Some(reply) = lookup(&*self.resolver, sink, &name, RecordType::TXT).await? else {
            return Ok(());
        };

        let mut found = false;
        for answer in answers(&reply) {
            let Answer::Txt(policy) = answer else {
                unexpected(sink, &name, &answer).await?;
                continue;
            };
            sink.emit(Issue::info(format!("DomainKey {policy}"))).await?;

            let parsed = parse_domainkey_policy(&policy);
            found |= parsed.signs_all;
            for issue in parsed.issues {
                sink.emit(issue).await?;
            }
        }

        let summary = if found {
            Issue::ok("DomainKey Records configured")
        } else {
            Issue::warning(
                "No DomainKey records configured, defaults to o=~. DomainKeys has been superseded by DKIM.",
            )
        };
        sink.emit(summary).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::Severity;

    #[test]
    fn test_signed_test_mode_with_responsible_address() {
        let policy = parse_domainkey_policy("o=-; t=y; r=admin@example.com");
        assert!(policy.signs_all);
        assert_eq!(
            policy.issues,
            vec![
                Issue::info("All e-mails from this domain are signed."),
                Issue::error("DomainKey in test mode, domain key has no effect."),
                Issue::info("DomainKey responsible e-mail address: admin@example.com"),
            ]
        );
    }

    #[test]
    fn test_some_mail_signed_does_not_count_as_found() {
        let policy = parse_domainkey_policy("o=~");
        assert!(!policy.signs_all);
        assert_eq!(
            policy.issues,
            vec![Issue::info("Some e-mails from this domain are signed.")]
        );
    }

    #[test]
    fn test_notes() {
        let policy = parse_domainkey_policy("o=-; n=rotated 2024");
        assert_eq!(policy.issues[1], Issue::info("DomainKey notes: rotated 2024"));
    }

    #[test]
    fn test_unknown_values_warn() {
        let policy = parse_domainkey_policy("o=x; t=n");
        assert!(!policy.signs_all);
        assert_eq!(policy.issues.len(), 2);
        assert!(policy
            .issues
            .iter()
            .all(|issue| issue.severity == Severity::Warning));
    }

    #[test]
    fn test_empty_value_warns_instead_of_panicking() {
        let policy = parse_domainkey_policy("o=");
        assert_eq!(policy.issues.len(), 1);
        assert_eq!(policy.issues[0].severity, Severity::Warning);
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let policy = parse_domainkey_policy("garbage; a=b=c; ; x=1");
        assert!(policy.issues.is_empty());
        assert!(!policy.signs_all);
    }
}
