//! Display formatting for CLI output
//!
//! Batch reports are shown either as a styled summary split into succeeded
//! and failed sections, or as JSON for scripts.

use clap::ValueEnum;
use console::style;
use heoctl_kube::{BatchReport, ResourceOutcome};
use std::fmt::Write as _;

use crate::error::{CliError, Result};

/// Report output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print the report to stdout
pub fn print_report(report: &BatchReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", render_text(report)),
        OutputFormat::Json => println!("{}", render_json(report)?),
    }
    Ok(())
}

pub fn render_json(report: &BatchReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(|e| CliError::Io {
        message: format!("failed to serialize report: {}", e),
    })
}

pub fn render_text(report: &BatchReport) -> String {
    let mut out = String::new();
    let succeeded: Vec<_> = report.succeeded().collect();
    let failed: Vec<_> = report.failed().collect();

    if !succeeded.is_empty() {
        let _ = writeln!(
            out,
            "\n{} {}",
            style("✓").green().bold(),
            style(format!("Succeeded ({})", succeeded.len())).bold()
        );
        for outcome in &succeeded {
            let _ = writeln!(out, "  {}", outcome_line(outcome));
        }
    }

    if !failed.is_empty() {
        let _ = writeln!(
            out,
            "\n{} {}",
            style("✗").red().bold(),
            style(format!("Failed ({})", failed.len())).bold()
        );
        for outcome in &failed {
            let _ = writeln!(out, "  {}", outcome_line(outcome));
            let _ = writeln!(out, "      {}", style(&outcome.message).red());
        }
    }

    let mark = if report.is_success() {
        style("✓").green().bold()
    } else {
        style("✗").red().bold()
    };
    let _ = writeln!(
        out,
        "\n{} {}: {}",
        mark,
        style(report.action).cyan(),
        report.summary()
    );

    out
}

fn outcome_line(outcome: &ResourceOutcome) -> String {
    let location = match outcome.ordinal {
        Some(ordinal) => format!("{}#{}", outcome.source_path.display(), ordinal),
        None => outcome.source_path.display().to_string(),
    };

    match &outcome.namespace {
        Some(ns) => format!(
            "{} {} {}",
            style(outcome.display_name()).cyan(),
            style(format!("({})", ns)).yellow(),
            style(location).dim()
        ),
        None => format!(
            "{} {}",
            style(outcome.display_name()).cyan(),
            style(location).dim()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heoctl_kube::{Action, OutcomeCollector, ResourceError};
    use std::path::Path;

    fn report() -> BatchReport {
        let collector = OutcomeCollector::new();
        collector.record(ResourceOutcome::succeeded(
            Path::new("k8s/deployment.yaml"),
            Some(0),
            "Deployment",
            "web",
            Some("default".to_string()),
            "created",
        ));
        collector.record(ResourceOutcome::failed(
            Path::new("k8s/frob.yaml"),
            Some(0),
            "Frobnicator",
            "frob",
            None,
            &ResourceError::UnknownKind {
                api_version: "example.com/v1".to_string(),
                kind: "Frobnicator".to_string(),
            },
        ));
        collector.into_report(Action::Install)
    }

    #[test]
    fn test_text_has_both_sections() {
        console::set_colors_enabled(false);
        let text = render_text(&report());

        assert!(text.contains("Succeeded (1)"));
        assert!(text.contains("Deployment/web (default) k8s/deployment.yaml#0"));
        assert!(text.contains("Failed (1)"));
        assert!(text.contains("Frobnicator/frob k8s/frob.yaml#0"));
        assert!(text.contains("UnknownKindError"));
        assert!(text.contains("install: 1 succeeded, 1 failed"));
    }

    #[test]
    fn test_json_output() {
        let json: serde_json::Value = serde_json::from_str(&render_json(&report()).unwrap()).unwrap();

        assert_eq!(json["action"], "install");
        assert_eq!(json["outcomes"].as_array().unwrap().len(), 2);
        assert_eq!(json["outcomes"][1]["failure"], "UnknownKind");
    }
}
