pub mod console;
pub mod html;
pub mod json;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::report::AuditReport;

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
    Html,
}

impl OutputFormat {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "console" | "text" => Some(Self::Console),
            "json" => Some(Self::Json),
            "html" => Some(Self::Html),
            _ => None,
        }
    }
}

/// Render a report into the specified format. `verbose` adds per-finding
/// detail to console output.
pub fn render(report: &AuditReport, format: OutputFormat, verbose: bool) -> Result<String> {
    match format {
        OutputFormat::Console => Ok(console::render(report, verbose)),
        OutputFormat::Json => json::render(report),
        OutputFormat::Html => Ok(html::render(report)),
    }
}

/// Hours without a trailing `.0` when whole.
pub(crate) fn format_hours(hours: f64) -> String {
    if hours.fract() == 0.0 {
        format!("{hours:.0}h")
    } else {
        format!("{hours:.1}h")
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::PathBuf;

    use chrono::{TimeZone, Utc};

    use crate::report::{
        AuditReport, AuditSummary, CategorySummary, Diagnostic, ProjectInfo, RuleResult,
    };
    use crate::rules::{
        CodeSnippet, ConfigurationDetail, Finding, FindingMetadata, RuleCategory, Severity,
    };

    /// A small fixed report for renderer tests.
    pub(crate) fn sample_report() -> AuditReport {
        let finding = Finding::new(
            "rule-05-program-cs",
            "/site/Program.cs",
            6,
            "u.UseInstallerEndpoints();",
            0.5,
            Severity::Warning,
            FindingMetadata::Configuration(ConfigurationDetail::InstallerEndpoints {
                occurrence_count: 1,
            }),
        )
        .with_snippet(Some(CodeSnippet {
            before: vec!["{".into()],
            line: "    u.UseInstallerEndpoints();".into(),
            after: vec!["});".into()],
            start_line: 5,
        }));

        AuditReport {
            project: ProjectInfo {
                root_path: PathBuf::from("/site"),
                umbraco_version: Some("13.5.2".into()),
                project_files: vec![PathBuf::from("/site/Site.csproj")],
                files_scanned: 3,
                scan_duration_ms: 42,
            },
            timestamp: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
            tool_version: "0.1.0".into(),
            findings: vec![finding],
            summary: AuditSummary {
                total_hours: 0.5,
                total_days: 0.1,
                rules_triggered: 1,
                total_findings: 1,
                by_category: vec![
                    CategorySummary {
                        category: RuleCategory::Configuration,
                        findings: 1,
                        hours: 0.5,
                    },
                    CategorySummary {
                        category: RuleCategory::Frontend,
                        findings: 0,
                        hours: 0.0,
                    },
                ],
            },
            rule_results: vec![
                RuleResult {
                    rule_id: "rule-05-program-cs".into(),
                    rule_name: "Program.cs Changes".into(),
                    category: RuleCategory::Configuration,
                    findings_count: 1,
                    total_hours: 0.5,
                    enabled: true,
                },
                RuleResult {
                    rule_id: "rule-03-tiptap-import".into(),
                    rule_name: "Tiptap Import <Changes>".into(),
                    category: RuleCategory::Frontend,
                    findings_count: 0,
                    total_hours: 0.0,
                    enabled: true,
                },
            ],
            diagnostics: vec![Diagnostic::warning(
                "Upgrade to Umbraco 13.13.0 before upgrading to 17",
            )],
        }
    }
}
