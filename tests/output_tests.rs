// SPDX-FileCopyrightText: 2025 RAprogramm
// SPDX-License-Identifier: MIT

use nl_sql_bridge::{
    output::{CheckReport, OutputFormat, OutputOptions, format_check_report},
    validator::{Rejection, SqlValidator, Validation}
};

fn report(sql: &str) -> CheckReport {
    let validation = SqlValidator::new().validate(sql);
    CheckReport::new(sql.to_string(), &validation)
}

fn opts(format: OutputFormat) -> OutputOptions {
    OutputOptions {
        format,
        colored: false
    }
}

#[test]
fn test_accepted_report_fields() {
    let report = report("SELECT COUNT(*) FROM videos");
    assert!(report.accepted);
    assert!(report.rule_id.is_none());
    assert!(report.reason.is_none());
    assert!(report.rejection.is_none());
}

#[test]
fn test_rejected_report_fields() {
    let report = report("SELECT * FROM users JOIN orders ON true");
    assert!(!report.accepted);
    assert_eq!(report.rule_id, Some("GUARD004"));
    assert!(report.reason.as_deref().unwrap().contains("orders, users"));
    assert!(matches!(
        report.rejection,
        Some(Rejection::DisallowedTable { .. })
    ));
}

#[test]
fn test_text_output_rejected() {
    let output = format_check_report(&report("DELETE FROM videos"), &opts(OutputFormat::Text));
    assert!(output.starts_with("=== Candidate SQL ==="));
    assert!(output.contains("DELETE FROM videos"));
    assert!(output.contains("REJECTED [GUARD002]"));
}

#[test]
fn test_json_output_omits_empty_fields() {
    let output = format_check_report(&report("SELECT 1"), &opts(OutputFormat::Json));
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["accepted"], true);
    assert_eq!(value["sql"], "SELECT 1");
    assert!(value.get("rule_id").is_none());
    assert!(value.get("rejection").is_none());
}

#[test]
fn test_json_output_tags_rejection() {
    let output = format_check_report(
        &report("SELECT 1 WHERE 1 = 1 OR DROP"),
        &opts(OutputFormat::Json)
    );
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["accepted"], false);
    assert_eq!(value["rule_id"], "GUARD003");
    assert_eq!(value["rejection"]["kind"], "forbidden_keyword");
    assert_eq!(value["rejection"]["keyword"], "drop");
}

#[test]
fn test_yaml_output() {
    let output = format_check_report(
        &CheckReport::new(String::from("SELECT 1"), &Validation::Accepted),
        &opts(OutputFormat::Yaml)
    );
    assert!(output.contains("accepted: true"));
    assert!(output.contains("sql: SELECT 1"));
}

#[test]
fn test_colored_output_keeps_verdict() {
    let output = format_check_report(&report("SELECT 1"), &OutputOptions::default());
    assert!(output.contains("ACCEPTED"));
}
