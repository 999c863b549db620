//! Tests for exit code policies (--fail-on flag)

use email_audit::{AuditReport, AuditSummary, FailOn};

fn report(errors: usize, warnings: usize, ok: usize) -> AuditReport {
    AuditReport {
        summary: AuditSummary {
            domains: 1,
            plugins: 8,
            errors,
            warnings,
            ok,
            ..Default::default()
        },
        nameservers: vec!["192.0.2.53:53".parse().unwrap()],
    }
}

#[test]
fn test_fail_on_never_always_returns_zero() {
    assert_eq!(report(5, 5, 0).exit_code(FailOn::Never), 0);
    assert_eq!(report(0, 0, 5).exit_code(FailOn::Never), 0);
}

#[test]
fn test_fail_on_error() {
    assert_eq!(report(1, 0, 7).exit_code(FailOn::Error), 2);
    assert_eq!(
        report(0, 3, 5).exit_code(FailOn::Error),
        0,
        "Warnings alone should not trigger --fail-on error"
    );
}

#[test]
fn test_fail_on_warning() {
    assert_eq!(report(0, 1, 7).exit_code(FailOn::Warning), 2);
    assert_eq!(
        report(1, 0, 7).exit_code(FailOn::Warning),
        2,
        "Errors are at or above warning severity"
    );
    assert_eq!(report(0, 0, 8).exit_code(FailOn::Warning), 0);
}

#[test]
fn test_debug_and_info_never_trigger() {
    let mut report = report(0, 0, 0);
    report.summary.info = 10;
    report.summary.debug = 10;
    assert_eq!(report.exit_code(FailOn::Warning), 0);
}
