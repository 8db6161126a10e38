use colored::Colorize;
use serde::Serialize;

use crate::validator::{Rejection, Validation};

/// Output format for results
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml
}

/// Output options
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format:  OutputFormat,
    pub colored: bool
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            format:  OutputFormat::Text,
            colored: true
        }
    }
}

/// Result of extracting and validating one input
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    /// Candidate SQL after extraction
    pub sql:       String,
    pub accepted:  bool,
    /// Identifier of the failed check
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id:   Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason:    Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<Rejection>
}

impl CheckReport {
    pub fn new(sql: String, validation: &Validation) -> Self {
        let rejection = validation.rejection().cloned();
        Self {
            sql,
            accepted: validation.is_accepted(),
            rule_id: rejection.as_ref().map(Rejection::rule_id),
            reason: rejection.as_ref().map(ToString::to_string),
            rejection
        }
    }
}

/// Format a check report based on output options
pub fn format_check_report(report: &CheckReport, opts: &OutputOptions) -> String {
    match opts.format {
        OutputFormat::Json => serde_json::to_string_pretty(report).unwrap_or_default(),
        OutputFormat::Yaml => serde_yaml::to_string(report).unwrap_or_default(),
        OutputFormat::Text => format_text_report(report, opts)
    }
}

fn format_text_report(report: &CheckReport, opts: &OutputOptions) -> String {
    let mut output = String::new();
    let header = "=== Candidate SQL ===";
    if opts.colored {
        output.push_str(&header.bold().to_string());
    } else {
        output.push_str(header);
    }
    output.push('\n');
    if report.sql.is_empty() {
        output.push_str("(empty)");
    } else {
        output.push_str(&report.sql);
    }
    output.push_str("\n\n");

    let verdict = match (&report.rule_id, &report.reason) {
        (Some(id), Some(reason)) => {
            let label = if opts.colored {
                "REJECTED".red().bold().to_string()
            } else {
                String::from("REJECTED")
            };
            format!("{} [{}] {}", label, id, reason)
        }
        _ => {
            if opts.colored {
                "ACCEPTED".green().bold().to_string()
            } else {
                String::from("ACCEPTED")
            }
        }
    };
    output.push_str(&verdict);
    output
}
