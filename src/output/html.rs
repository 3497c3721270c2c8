use super::format_hours;
use crate::report::{AuditReport, DiagnosticLevel};
use crate::rules::{Finding, Severity};

/// Render the report as a self-contained HTML page.
pub fn render(report: &AuditReport) -> String {
    let rule_rows: String = report
        .rule_results
        .iter()
        .map(|row| {
            let findings: Vec<&Finding> = report.findings_for(&row.rule_id).collect();
            let details = if findings.is_empty() {
                String::new()
            } else {
                let items: String = findings.iter().map(|f| finding_row(report, f)).collect();
                format!(
                    r#"<tr class="detail-row">
  <td colspan="5">
    <details>
      <summary>{count} finding(s)</summary>
      <table class="inner">
        <thead><tr><th>Severity</th><th>Location</th><th>Content</th><th>Hours</th></tr></thead>
        <tbody>{items}</tbody>
      </table>
    </details>
  </td>
</tr>"#,
                    count = findings.len(),
                    items = items,
                )
            };
            format!(
                r#"<tr class="{row_class}">
  <td><code>{rule_id}</code></td>
  <td>{rule_name}</td>
  <td>{category}</td>
  <td class="num">{matches}</td>
  <td class="num">{hours}</td>
</tr>
{details}"#,
                row_class = if row.enabled { "rule" } else { "rule disabled" },
                rule_id = html_escape(&row.rule_id),
                rule_name = html_escape(&row.rule_name),
                category = row.category,
                matches = row.findings_count,
                hours = format_hours(row.total_hours),
                details = details,
            )
        })
        .collect();

    let category_cards: String = report
        .summary
        .by_category
        .iter()
        .map(|c| {
            format!(
                r#"<div class="stat"><div class="count">{hours}</div><div class="label">{category} ({findings})</div></div>"#,
                hours = format_hours(c.hours),
                category = c.category,
                findings = c.findings,
            )
        })
        .collect();

    let diagnostics = if report.diagnostics.is_empty() {
        String::new()
    } else {
        let items: String = report
            .diagnostics
            .iter()
            .map(|d| {
                let file = d
                    .file
                    .as_ref()
                    .map(|f| format!(" <code>{}</code>", html_escape(&f.display().to_string())))
                    .unwrap_or_default();
                format!(
                    r#"<li class="{level}"><strong>{level}</strong> {message}{file}</li>"#,
                    level = diagnostic_class(d.level),
                    message = html_escape(&d.message),
                    file = file,
                )
            })
            .collect();
        format!("<h2>Diagnostics</h2>\n<ul class=\"diagnostics\">{items}</ul>")
    };

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Umbraco Upgrade Audit: {root}</title>
<style>
  :root {{
    --bg: #f5f6fa; --fg: #1b264f; --border: #d8d9e4;
    --card: #ffffff; --accent: #3544b1; --muted: #6b6f86;
    --error: #d42054; --warning: #f5c142; --info: #2bc37c;
  }}
  * {{ margin: 0; padding: 0; box-sizing: border-box; }}
  body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
    background: var(--bg); color: var(--fg); line-height: 1.5; padding: 2rem; }}
  .container {{ max-width: 1200px; margin: 0 auto; }}
  header {{ padding: 1.5rem; background: var(--card); border: 1px solid var(--border);
    border-radius: 8px; margin-bottom: 1.5rem; }}
  header h1 {{ font-size: 1.4rem; }}
  header h1 span {{ color: var(--accent); font-weight: 400; }}
  header p {{ color: var(--muted); font-size: 0.9rem; }}
  h2 {{ font-size: 1.1rem; margin: 1.5rem 0 0.75rem; }}
  .summary {{ display: grid; grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
    gap: 1rem; margin-bottom: 1.5rem; }}
  .stat {{ background: var(--card); border: 1px solid var(--border);
    border-radius: 8px; padding: 1rem; text-align: center; }}
  .stat .count {{ font-size: 2rem; font-weight: 700; color: var(--accent); }}
  .stat .label {{ font-size: 0.85rem; color: var(--muted); }}
  table {{ width: 100%; border-collapse: collapse; background: var(--card);
    border: 1px solid var(--border); border-radius: 8px; overflow: hidden; }}
  th {{ text-align: left; padding: 0.75rem 1rem; border-bottom: 2px solid var(--border);
    font-size: 0.8rem; text-transform: uppercase; color: var(--muted); }}
  td {{ padding: 0.6rem 1rem; border-bottom: 1px solid var(--border);
    font-size: 0.9rem; vertical-align: top; }}
  td.num {{ text-align: right; }}
  tr.disabled td {{ color: var(--muted); text-decoration: line-through; }}
  table.inner {{ margin-top: 0.5rem; }}
  .badge {{ display: inline-block; padding: 0.15rem 0.5rem; border-radius: 4px;
    font-size: 0.75rem; font-weight: 700; color: #fff; }}
  .badge.error {{ background: var(--error); }}
  .badge.warning {{ background: var(--warning); color: #000; }}
  .badge.info {{ background: var(--info); }}
  .detail-row td {{ padding: 0.25rem 1rem 0.75rem; }}
  details {{ cursor: pointer; }}
  details summary {{ color: var(--accent); font-size: 0.85rem; }}
  pre {{ background: var(--bg); padding: 0.5rem; border-radius: 4px;
    margin-top: 0.3rem; overflow-x: auto; font-size: 0.8rem; }}
  ul.diagnostics {{ background: var(--card); border: 1px solid var(--border);
    border-radius: 8px; padding: 1rem 1rem 1rem 2rem; }}
  ul.diagnostics li.error strong {{ color: var(--error); }}
  ul.diagnostics li.warning strong {{ color: #b38600; }}
  footer {{ margin-top: 1.5rem; text-align: center; font-size: 0.8rem; color: var(--muted); }}
</style>
</head>
<body>
<div class="container">
  <header>
    <h1>Umbraco Upgrade Audit <span>13 &rarr; 17</span></h1>
    <p>{root} &middot; Umbraco {version} &middot; {project_files} project file(s) &middot; {files_scanned} file(s) scanned in {duration} ms</p>
  </header>

  <div class="summary">
    <div class="stat"><div class="count">{total_hours}</div><div class="label">Estimated effort</div></div>
    <div class="stat"><div class="count">{total_days}</div><div class="label">Days (8h)</div></div>
    <div class="stat"><div class="count">{total_findings}</div><div class="label">Findings</div></div>
    <div class="stat"><div class="count">{rules_triggered}</div><div class="label">Rules triggered</div></div>
  </div>

  <h2>By category</h2>
  <div class="summary">{category_cards}</div>

  <h2>Rules</h2>
  <table>
    <thead>
      <tr><th>Rule</th><th>Name</th><th>Category</th><th>Matches</th><th>Hours</th></tr>
    </thead>
    <tbody>
      {rule_rows}
    </tbody>
  </table>

  {diagnostics}

  <footer>Generated by umbraco-audit {tool_version} on {timestamp}</footer>
</div>
</body>
</html>"##,
        root = html_escape(&report.project.root_path.display().to_string()),
        version = html_escape(report.project.umbraco_version.as_deref().unwrap_or("unknown")),
        project_files = report.project.project_files.len(),
        files_scanned = report.project.files_scanned,
        duration = report.project.scan_duration_ms,
        total_hours = format_hours(report.summary.total_hours),
        total_days = report.summary.total_days,
        total_findings = report.summary.total_findings,
        rules_triggered = report.summary.rules_triggered,
        category_cards = category_cards,
        rule_rows = rule_rows,
        diagnostics = diagnostics,
        tool_version = html_escape(&report.tool_version),
        timestamp = report.timestamp.format("%Y-%m-%d %H:%M UTC"),
    )
}

fn finding_row(report: &AuditReport, f: &Finding) -> String {
    let path = f
        .file_path
        .strip_prefix(&report.project.root_path)
        .unwrap_or(&f.file_path);
    let location = if f.line_number > 0 {
        format!("{}:{}", path.display(), f.line_number)
    } else {
        path.display().to_string()
    };
    let snippet = f
        .snippet
        .as_ref()
        .map(|s| {
            let lines: Vec<&str> = s
                .before
                .iter()
                .chain(std::iter::once(&s.line))
                .chain(s.after.iter())
                .map(String::as_str)
                .collect();
            format!("<pre><code>{}</code></pre>", html_escape(&lines.join("\n")))
        })
        .unwrap_or_default();

    format!(
        r#"<tr>
  <td><span class="badge {sev}">{sev_upper}</span></td>
  <td><code>{location}</code></td>
  <td><code>{content}</code>{snippet}</td>
  <td class="num">{hours}</td>
</tr>"#,
        sev = severity_class(f.severity),
        sev_upper = f.severity.to_string().to_uppercase(),
        location = html_escape(&location),
        content = html_escape(&f.line_content),
        snippet = snippet,
        hours = format_hours(f.hours),
    )
}

fn severity_class(s: Severity) -> &'static str {
    match s {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "info",
    }
}

fn diagnostic_class(level: DiagnosticLevel) -> &'static str {
    match level {
        DiagnosticLevel::Error => "error",
        DiagnosticLevel::Warning => "warning",
        DiagnosticLevel::Info => "info",
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::test_support::sample_report;

    #[test]
    fn renders_self_contained_page() {
        let html = render(&sample_report());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<code>rule-05-program-cs</code>"));
        assert!(html.contains("<code>Program.cs:6</code>"));
        assert!(html.contains("Generated by umbraco-audit 0.1.0 on 2026-01-02 03:04 UTC"));
        assert!(html.contains("<h2>Diagnostics</h2>"));
    }

    #[test]
    fn escapes_user_content() {
        let html = render(&sample_report());
        assert!(html.contains("Tiptap Import &lt;Changes&gt;"));
        assert!(!html.contains("Tiptap Import <Changes>"));
    }
}
