//! SPF policy evaluation.
//!
//! Walks the terms of one `v=spf1` record, tracking each term's qualifier, and
//! grades how much mail the record lets through. The terminal `all` mechanism
//! decides the grade; when `all` appears more than once the last one wins.

use crate::issue::Issue;

/// Literal prefix identifying an SPF record among a domain's TXT records.
pub const SPF_PREFIX: &str = "v=spf1";

const PTR_WARNING: &str = "PTR mechanism: matches if the client's reverse DNS name is in the given domain \
     and resolves back to the client's address. This mechanism is deprecated and should no longer be used.";
const EXISTS_WARNING: &str = "EXISTS mechanism: matches if the given domain name resolves to any address, \
     no matter which. This is rarely used and combined with SPF macros offers DNSBL-style matching.";

/// Result of a mechanism match, written as a one-character prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qualifier {
    /// `+`, the default
    Pass,
    /// `?`
    Neutral,
    /// `~`
    SoftFail,
    /// `-`
    Fail,
}

impl Qualifier {
    /// Splits a leading qualifier off a term. Terms without one default to `+`.
    pub fn split(term: &str) -> (Qualifier, &str) {
        let qualifier = match term.chars().next() {
            Some('+') => Qualifier::Pass,
            Some('?') => Qualifier::Neutral,
            Some('~') => Qualifier::SoftFail,
            Some('-') => Qualifier::Fail,
            _ => return (Qualifier::Pass, term),
        };
        (qualifier, &term[1..])
    }
}

/// What a term is, judged by its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mechanism {
    All,
    Ip4,
    Ip6,
    A,
    Mx,
    Include,
    Ptr,
    Exists,
    /// The version tag, modifiers such as `redirect=`, and anything unknown
    Other,
}

impl Mechanism {
    pub fn classify(term: &str) -> Mechanism {
        if term == "all" {
            Mechanism::All
        } else if term.starts_with("ip4:") {
            Mechanism::Ip4
        } else if term.starts_with("ip6:") {
            Mechanism::Ip6
        } else if term.starts_with("mx") {
            Mechanism::Mx
        } else if term.starts_with("ptr") {
            Mechanism::Ptr
        } else if term.starts_with("exists") {
            Mechanism::Exists
        } else if term == "a" || term.starts_with("a:") || term.starts_with("a/") {
            Mechanism::A
        } else if term.starts_with("include:") {
            Mechanism::Include
        } else {
            Mechanism::Other
        }
    }
}

/// Findings for one SPF record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpfEvaluation {
    pub issues: Vec<Issue>,
    /// Qualifier of the last `all` term, if any
    pub all_policy: Option<Qualifier>,
}

/// Evaluates one SPF record.
///
/// Emits, in order: an Info echoing the record, a Warning per `ptr`/`exists`
/// term, then the terminal finding for the `all` policy (none if the record
/// has no `all` term).
pub fn evaluate(record: &str) -> SpfEvaluation {
    let mut issues = vec![Issue::info(record)];
    let mut all_policy = None;

    for token in record.split_whitespace() {
        let (qualifier, term) = Qualifier::split(token);
        match Mechanism::classify(term) {
            Mechanism::All => all_policy = Some(qualifier),
            Mechanism::Ptr => issues.push(Issue::warning(PTR_WARNING)),
            Mechanism::Exists => issues.push(Issue::warning(EXISTS_WARNING)),
            // Reserved for deeper validation (overly broad networks, include depth)
            Mechanism::Ip4
            | Mechanism::Ip6
            | Mechanism::A
            | Mechanism::Mx
            | Mechanism::Include
            | Mechanism::Other => {}
        }
    }

    if let Some(policy) = all_policy {
        issues.push(all_policy_finding(policy));
    }

    SpfEvaluation { issues, all_policy }
}

fn all_policy_finding(policy: Qualifier) -> Issue {
    match policy {
        Qualifier::Pass => Issue::error("SPF rule configured all to PASS")
            .with_description("Allow all mail"),
        Qualifier::Neutral => Issue::error("SPF rule configured all to NEUTRAL")
            .with_description("No policy statement"),
        Qualifier::SoftFail => Issue::warning("SPF rule configured all to SOFT_FAIL")
            .with_description("Allow mail whether or not it matches the parameters in the record"),
        Qualifier::Fail => Issue::ok("SPF rule configured all to FAIL").with_description(
            "Only allow mail that matches one of the parameters (IPv4, MX, etc) in the record",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::Severity;

    #[test]
    fn test_strict_fail_is_ok() {
        let eval = evaluate("v=spf1 ip4:1.2.3.0/24 -all");
        let last = eval.issues.last().unwrap();
        assert_eq!(last.severity, Severity::Ok);
        assert!(last.message.contains("FAIL"));
        assert_eq!(eval.all_policy, Some(Qualifier::Fail));
    }

    #[test]
    fn test_pass_all_is_error() {
        let eval = evaluate("v=spf1 +all");
        let last = eval.issues.last().unwrap();
        assert_eq!(last.severity, Severity::Error);
        assert!(last.message.contains("PASS"));
        assert_eq!(last.description.as_deref(), Some("Allow all mail"));
    }

    #[test]
    fn test_bare_all_defaults_to_pass() {
        let eval = evaluate("v=spf1 mx all");
        assert_eq!(eval.all_policy, Some(Qualifier::Pass));
        assert_eq!(eval.issues.last().unwrap().severity, Severity::Error);
    }

    #[test]
    fn test_neutral_all_is_error() {
        let eval = evaluate("v=spf1 ?all");
        let last = eval.issues.last().unwrap();
        assert_eq!(last.severity, Severity::Error);
        assert!(last.message.contains("NEUTRAL"));
    }

    #[test]
    fn test_soft_fail_is_warning() {
        let eval = evaluate("v=spf1 include:_spf.example.net ~all");
        let last = eval.issues.last().unwrap();
        assert_eq!(last.severity, Severity::Warning);
        assert!(last.message.contains("SOFT_FAIL"));
    }

    #[test]
    fn test_without_all_only_echo() {
        let eval = evaluate("v=spf1 mx");
        assert_eq!(eval.all_policy, None);
        assert_eq!(eval.issues, vec![Issue::info("v=spf1 mx")]);
    }

    #[test]
    fn test_last_all_wins() {
        let eval = evaluate("v=spf1 -all +all");
        assert_eq!(eval.all_policy, Some(Qualifier::Pass));
        let terminal: Vec<_> = eval
            .issues
            .iter()
            .filter(|i| i.message.starts_with("SPF rule configured all"))
            .collect();
        assert_eq!(terminal.len(), 1, "only one terminal finding");
        assert!(terminal[0].message.contains("PASS"));
    }

    #[test]
    fn test_ptr_and_exists_warn() {
        let eval = evaluate("v=spf1 ptr:example.com exists:%{i}.bl.example.net -all");
        let warnings: Vec<_> = eval
            .issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .collect();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].message.starts_with("PTR"));
        assert!(warnings[1].message.starts_with("EXISTS"));
        assert_eq!(eval.issues.last().unwrap().severity, Severity::Ok);
    }

    #[test]
    fn test_qualified_ptr_still_warns() {
        let eval = evaluate("v=spf1 ?ptr -all");
        assert_eq!(eval.issues[1].severity, Severity::Warning);
    }

    #[test]
    fn test_echo_comes_first() {
        let record = "v=spf1 a mx ip6:2001:db8::/32 -all";
        let eval = evaluate(record);
        assert_eq!(eval.issues[0], Issue::info(record));
        assert_eq!(eval.issues.len(), 2);
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let record = "v=spf1 ptr include:spf.example.net ~all";
        assert_eq!(evaluate(record), evaluate(record));
    }

    #[test]
    fn test_qualifier_split() {
        assert_eq!(Qualifier::split("-all"), (Qualifier::Fail, "all"));
        assert_eq!(Qualifier::split("~all"), (Qualifier::SoftFail, "all"));
        assert_eq!(Qualifier::split("?mx"), (Qualifier::Neutral, "mx"));
        assert_eq!(Qualifier::split("+a"), (Qualifier::Pass, "a"));
        assert_eq!(Qualifier::split("include:x"), (Qualifier::Pass, "include:x"));
    }

    #[test]
    fn test_classify() {
        assert_eq!(Mechanism::classify("all"), Mechanism::All);
        assert_eq!(Mechanism::classify("a"), Mechanism::A);
        assert_eq!(Mechanism::classify("a:mail.example.com"), Mechanism::A);
        assert_eq!(Mechanism::classify("mx/24"), Mechanism::Mx);
        assert_eq!(Mechanism::classify("ip4:192.0.2.0/24"), Mechanism::Ip4);
        assert_eq!(Mechanism::classify("ip6:2001:db8::/32"), Mechanism::Ip6);
        assert_eq!(Mechanism::classify("include:_spf.google.com"), Mechanism::Include);
        assert_eq!(Mechanism::classify("redirect=_spf.example.com"), Mechanism::Other);
        assert_eq!(Mechanism::classify("v=spf1"), Mechanism::Other);
        assert_eq!(Mechanism::classify("allx"), Mechanism::Other);
    }
}
