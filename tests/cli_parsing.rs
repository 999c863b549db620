//! Tests for command-line parsing.

use clap::Parser;
use email_audit::config::{FailOn, LogFormat, LogLevel};
use email_audit::Config;

#[test]
fn test_defaults() {
    let config = Config::try_parse_from(["email_audit", "example.com"]).expect("Should parse");

    assert_eq!(config.domains, vec!["example.com".to_string()]);
    assert_eq!(
        log::LevelFilter::from(config.log_level.clone()),
        log::LevelFilter::from(LogLevel::Info)
    );
    assert!(matches!(config.log_format, LogFormat::Plain));
    assert!(config.nameservers.is_empty());
    assert_eq!(config.retry_backoff_ms, 0);
    assert!(config.plugins.is_empty());
    assert!(!config.banner);
    assert_eq!(config.ehlo_domain, "localhost");
    assert!(!config.show_debug);
    assert_eq!(config.fail_on, FailOn::Never);
}

#[test]
fn test_domain_is_required() {
    assert!(Config::try_parse_from(["email_audit"]).is_err());
}

#[test]
fn test_multiple_domains_keep_order() {
    let config = Config::try_parse_from(["email_audit", "b.example", "a.example"]).unwrap();
    assert_eq!(config.domains, vec!["b.example", "a.example"]);
}

#[test]
fn test_all_options() {
    let config = Config::try_parse_from([
        "email_audit",
        "example.com",
        "--log-level",
        "debug",
        "--log-format",
        "json",
        "--nameserver",
        "192.0.2.53",
        "--nameserver",
        "[2001:db8::53]:5353",
        "--retry-backoff-ms",
        "50",
        "--plugin",
        "SPF",
        "--plugin",
        "dmarc",
        "--banner",
        "--ehlo-domain",
        "probe.example.net",
        "--show-debug",
        "--fail-on",
        "warning",
    ])
    .expect("Should parse all options");

    assert_eq!(
        log::LevelFilter::from(config.log_level.clone()),
        log::LevelFilter::Debug
    );
    assert!(matches!(config.log_format, LogFormat::Json));
    assert_eq!(
        config.nameservers,
        vec![
            "192.0.2.53:53".parse().unwrap(),
            "[2001:db8::53]:5353".parse().unwrap()
        ]
    );
    assert_eq!(config.retry_backoff_ms, 50);
    assert_eq!(config.plugins, vec!["SPF", "dmarc"]);
    assert!(config.banner);
    assert_eq!(config.ehlo_domain, "probe.example.net");
    assert!(config.show_debug);
    assert_eq!(config.fail_on, FailOn::Warning);
}

#[test]
fn test_invalid_nameserver_rejected() {
    let result = Config::try_parse_from(["email_audit", "example.com", "--nameserver", "dns.google"]);
    assert!(result.is_err());
}

#[test]
fn test_invalid_fail_on_rejected() {
    let result = Config::try_parse_from(["email_audit", "example.com", "--fail-on", "sometimes"]);
    assert!(result.is_err());
}
