use std::fmt::Write as _;

use super::format_hours;
use crate::report::{AuditReport, DiagnosticLevel};
use crate::rules::Finding;

const RULE_WIDTH: usize = 40;
const RULE_LINE: usize = 86;

/// Render the report as plain console text: rule table, category
/// breakdown, totals, diagnostics. Verbose mode adds every finding with
/// its code context.
pub fn render(report: &AuditReport, verbose: bool) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "\n  umbraco-audit v{}  (Umbraco 13 -> 17)", report.tool_version);
    let _ = writeln!(out, "  Project: {}", report.project.root_path.display());
    let _ = writeln!(
        out,
        "  Umbraco version: {}",
        report.project.umbraco_version.as_deref().unwrap_or("unknown")
    );
    let _ = writeln!(
        out,
        "  {} project file(s), {} file(s) scanned in {} ms\n",
        report.project.project_files.len(),
        report.project.files_scanned,
        report.project.scan_duration_ms
    );

    let _ = writeln!(
        out,
        "  {:<RULE_WIDTH$} {:<18} {:>8} {:>10}",
        "Rule", "Category", "Matches", "Hours"
    );
    let _ = writeln!(out, "  {}", "-".repeat(RULE_LINE - 2));
    for row in &report.rule_results {
        let name = if row.enabled {
            row.rule_name.clone()
        } else {
            format!("{} (disabled)", row.rule_name)
        };
        let _ = writeln!(
            out,
            "  {:<RULE_WIDTH$} {:<18} {:>8} {:>10}",
            truncate(&name, RULE_WIDTH),
            row.category.to_string(),
            row.findings_count,
            format_hours(row.total_hours)
        );
    }
    let _ = writeln!(out, "  {}", "-".repeat(RULE_LINE - 2));

    if !report.summary.by_category.is_empty() {
        let _ = writeln!(out, "\n  By category:");
        for cat in &report.summary.by_category {
            let _ = writeln!(
                out,
                "    {:<20} {:>4} finding(s) {:>10}",
                cat.category.to_string(),
                cat.findings,
                format_hours(cat.hours)
            );
        }
    }

    let _ = writeln!(
        out,
        "\n  Total: {} across {} finding(s) from {} rule(s)  ~ {} day(s)\n",
        format_hours(report.summary.total_hours),
        report.summary.total_findings,
        report.summary.rules_triggered,
        report.summary.total_days
    );

    if verbose && !report.findings.is_empty() {
        let _ = writeln!(out, "  Detailed findings:");
        let _ = writeln!(out, "  {}\n", "-".repeat(RULE_LINE - 2));
        for finding in &report.findings {
            render_finding(&mut out, report, finding);
        }
    }

    if !report.diagnostics.is_empty() {
        let _ = writeln!(out, "  Diagnostics:");
        for d in &report.diagnostics {
            let tag = match d.level {
                DiagnosticLevel::Error => "[ERROR]",
                DiagnosticLevel::Warning => "[WARN] ",
                DiagnosticLevel::Info => "[INFO] ",
            };
            match &d.file {
                Some(file) => {
                    let _ = writeln!(out, "    {tag} {} ({})", d.message, file.display());
                }
                None => {
                    let _ = writeln!(out, "    {tag} {}", d.message);
                }
            }
        }
        out.push('\n');
    }

    out
}

fn render_finding(out: &mut String, report: &AuditReport, finding: &Finding) {
    let path = finding
        .file_path
        .strip_prefix(&report.project.root_path)
        .unwrap_or(&finding.file_path);
    let location = if finding.line_number > 0 {
        format!("{}:{}", path.display(), finding.line_number)
    } else {
        path.display().to_string()
    };

    let _ = writeln!(
        out,
        "  [{}] {} ({}, {})",
        finding.rule_id,
        location,
        finding.severity,
        format_hours(finding.hours)
    );
    let _ = writeln!(out, "    {}", finding.line_content);

    if let Some(snippet) = &finding.snippet {
        let _ = writeln!(out, "\n    Code context:");
        for (i, line) in snippet.before.iter().enumerate() {
            let _ = writeln!(out, "      {:>5} | {}", snippet.start_line + i, line);
        }
        let _ = writeln!(out, "    > {:>5} | {}", finding.line_number, snippet.line);
        for (i, line) in snippet.after.iter().enumerate() {
            let _ = writeln!(out, "      {:>5} | {}", finding.line_number + i + 1, line);
        }
    }
    out.push('\n');
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(width - 3).collect();
        t.push_str("...");
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::test_support::sample_report;

    #[test]
    fn renders_table_and_totals() {
        let text = render(&sample_report(), false);
        assert!(text.contains("Program.cs Changes"));
        assert!(text.contains("Configuration"));
        assert!(text.contains("Total: 0.5h across 1 finding(s) from 1 rule(s)"));
        assert!(text.contains("[WARN]  Upgrade to Umbraco 13.13.0"));
        assert!(!text.contains("Detailed findings"));
    }

    #[test]
    fn verbose_adds_code_context() {
        let text = render(&sample_report(), true);
        assert!(text.contains("Detailed findings"));
        assert!(text.contains("[rule-05-program-cs] Program.cs:6 (warning, 0.5h)"));
        assert!(text.contains(">     6 |     u.UseInstallerEndpoints();"));
        assert!(text.contains("    5 | {"));
        assert!(text.contains("    7 | });"));
    }

    #[test]
    fn truncates_long_names() {
        assert_eq!(truncate("abcdef", 5), "ab...");
        assert_eq!(truncate("abc", 5), "abc");
    }
}
