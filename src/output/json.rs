use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::report::{AuditReport, CategorySummary, Diagnostic};
use crate::rules::{FindingMetadata, RuleCategory};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    meta: Meta<'a>,
    project: Project<'a>,
    summary: Summary<'a>,
    rules: Vec<RuleEntry<'a>>,
    diagnostics: &'a [Diagnostic],
}

#[derive(Serialize)]
struct Meta<'a> {
    tool: &'static str,
    version: &'a str,
    timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Project<'a> {
    path: &'a Path,
    umbraco_version: Option<&'a str>,
    project_files: &'a [std::path::PathBuf],
    files_scanned: usize,
    scan_duration_ms: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Summary<'a> {
    total_hours: f64,
    total_days: f64,
    rules_triggered: usize,
    total_findings: usize,
    by_category: &'a [CategorySummary],
}

#[derive(Serialize)]
struct RuleEntry<'a> {
    id: &'a str,
    name: &'a str,
    category: RuleCategory,
    enabled: bool,
    matches: usize,
    hours: f64,
    findings: Vec<FindingEntry<'a>>,
}

#[derive(Serialize)]
struct FindingEntry<'a> {
    file: &'a Path,
    line: usize,
    content: &'a str,
    hours: f64,
    severity: crate::rules::Severity,
    metadata: &'a FindingMetadata,
}

/// Render the report as pretty-printed JSON with findings nested under
/// their rule.
pub fn render(report: &AuditReport) -> Result<String> {
    let rules = report
        .rule_results
        .iter()
        .map(|row| RuleEntry {
            id: &row.rule_id,
            name: &row.rule_name,
            category: row.category,
            enabled: row.enabled,
            matches: row.findings_count,
            hours: row.total_hours,
            findings: report
                .findings_for(&row.rule_id)
                .map(|f| FindingEntry {
                    file: &f.file_path,
                    line: f.line_number,
                    content: &f.line_content,
                    hours: f.hours,
                    severity: f.severity,
                    metadata: &f.metadata,
                })
                .collect(),
        })
        .collect();

    let doc = JsonReport {
        meta: Meta {
            tool: "umbraco-audit",
            version: &report.tool_version,
            timestamp: report.timestamp,
        },
        project: Project {
            path: &report.project.root_path,
            umbraco_version: report.project.umbraco_version.as_deref(),
            project_files: &report.project.project_files,
            files_scanned: report.project.files_scanned,
            scan_duration_ms: report.project.scan_duration_ms,
        },
        summary: Summary {
            total_hours: report.summary.total_hours,
            total_days: report.summary.total_days,
            rules_triggered: report.summary.rules_triggered,
            total_findings: report.summary.total_findings,
            by_category: &report.summary.by_category,
        },
        rules,
        diagnostics: &report.diagnostics,
    };

    let json = serde_json::to_string_pretty(&doc)?;
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::test_support::sample_report;

    #[test]
    fn nests_findings_under_rules() {
        let json = render(&sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["meta"]["tool"], "umbraco-audit");
        assert_eq!(value["project"]["umbracoVersion"], "13.5.2");
        assert_eq!(value["summary"]["totalHours"], 0.5);
        assert_eq!(value["summary"]["byCategory"][0]["category"], "configuration");

        let rules = value["rules"].as_array().unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0]["id"], "rule-05-program-cs");
        assert_eq!(rules[0]["matches"], 1);
        assert_eq!(rules[0]["findings"][0]["line"], 6);
        assert_eq!(rules[0]["findings"][0]["metadata"]["category"], "configuration");
        assert_eq!(
            rules[0]["findings"][0]["metadata"]["detail"]["kind"],
            "installer_endpoints"
        );
        assert!(rules[1]["findings"].as_array().unwrap().is_empty());

        assert_eq!(value["diagnostics"][0]["level"], "warning");
    }
}
