//! Aggregation of findings into the final [`AuditReport`].

pub mod hours;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::rules::{Finding, RuleCategory, RuleRegistry};
use hours::hours_to_days;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub root_path: PathBuf,
    /// `Umbraco.Cms` version declared in the first project file.
    pub umbraco_version: Option<String>,
    pub project_files: Vec<PathBuf>,
    /// Distinct files handed to rules.
    pub files_scanned: usize,
    pub scan_duration_ms: u64,
}

/// One row per registered rule, zero-filled when it found nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleResult {
    pub rule_id: String,
    pub rule_name: String,
    pub category: RuleCategory,
    pub findings_count: usize,
    pub total_hours: f64,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: RuleCategory,
    pub findings: usize,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub total_hours: f64,
    /// `total_hours / 8`, one decimal.
    pub total_days: f64,
    /// Rules with at least one finding.
    pub rules_triggered: usize,
    pub total_findings: usize,
    pub by_category: Vec<CategorySummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A non-fatal problem surfaced to the user alongside the estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Info, message)
    }

    fn new(level: DiagnosticLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            file: None,
        }
    }

    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub project: ProjectInfo,
    pub timestamp: DateTime<Utc>,
    pub tool_version: String,
    pub findings: Vec<Finding>,
    pub summary: AuditSummary,
    pub rule_results: Vec<RuleResult>,
    pub diagnostics: Vec<Diagnostic>,
}

impl AuditReport {
    pub fn findings_for<'a>(&'a self, rule_id: &'a str) -> impl Iterator<Item = &'a Finding> + 'a {
        self.findings.iter().filter(move |f| f.rule_id == rule_id)
    }
}

/// Build the report from the run's findings and the registry as it stood
/// when the run ended.
pub fn build_report(
    project: ProjectInfo,
    findings: Vec<Finding>,
    registry: &RuleRegistry,
    diagnostics: Vec<Diagnostic>,
) -> AuditReport {
    let rule_results = rule_results(&findings, registry);
    let summary = summarize(&findings, &rule_results, registry);
    AuditReport {
        project,
        timestamp: Utc::now(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        findings,
        summary,
        rule_results,
        diagnostics,
    }
}

/// One row per registered rule, in registration order.
pub fn rule_results(findings: &[Finding], registry: &RuleRegistry) -> Vec<RuleResult> {
    registry
        .all()
        .iter()
        .map(|rule| {
            let (count, hours) = findings
                .iter()
                .filter(|f| f.rule_id == rule.id())
                .fold((0, 0.0), |(n, h), f| (n + 1, h + f.hours));
            RuleResult {
                rule_id: rule.id().to_string(),
                rule_name: rule.metadata().name.clone(),
                category: rule.category(),
                findings_count: count,
                total_hours: hours,
                enabled: rule.enabled(),
            }
        })
        .collect()
}

/// Totals and category rows. Categories are looked up through the
/// registry; findings of unknown rules count toward the totals only.
pub fn summarize(
    findings: &[Finding],
    rule_results: &[RuleResult],
    registry: &RuleRegistry,
) -> AuditSummary {
    let mut by_category: Vec<CategorySummary> = Vec::new();
    for rule in registry.all() {
        if !by_category.iter().any(|c| c.category == rule.category()) {
            by_category.push(CategorySummary {
                category: rule.category(),
                findings: 0,
                hours: 0.0,
            });
        }
    }

    for finding in findings {
        let Some(category) = registry.category_of(&finding.rule_id) else {
            tracing::debug!(rule_id = %finding.rule_id, "finding from unregistered rule");
            continue;
        };
        if let Some(row) = by_category.iter_mut().find(|c| c.category == category) {
            row.findings += 1;
            row.hours += finding.hours;
        }
    }

    let total_hours: f64 = findings.iter().map(|f| f.hours).sum();
    AuditSummary {
        total_hours,
        total_days: hours_to_days(total_hours),
        rules_triggered: rule_results.iter().filter(|r| r.findings_count > 0).count(),
        total_findings: findings.len(),
        by_category,
    }
}
