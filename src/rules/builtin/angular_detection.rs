use once_cell::sync::Lazy;

use super::scan_files;
use crate::error::Result;
use crate::report::hours::distribute_hours;
use crate::rules::{
    Finding, FindingMetadata, FrontendDetail, Rule, RuleCategory, RuleMetadata, ScanContext,
    Severity,
};
use crate::scanner::PatternSet;

const RULE_ID: &str = "rule-07-angular-detection";

/// TypeScript under App_Plugins is new-backoffice code, never AngularJS.
const GLOBS: &[&str] = &["**/App_Plugins/**/*.js", "**/App_Plugins/**/*.html"];

/// Extra effort per full block of this many AngularJS files.
const FILES_PER_STEP: usize = 10;
const HOURS_PER_STEP: f64 = 0.5;

static PATTERNS: Lazy<PatternSet> = Lazy::new(|| {
    PatternSet::regexes(
        &[
            r"angular\.module\(",
            r"ng-controller",
            r"ng-app",
            r"\$scope",
            r"\$http",
            r"\.controller\(",
            r"\.directive\(",
            r"\.service\(",
            r"\.factory\(",
        ],
        false,
    )
    .unwrap()
});

/// rule-07: AngularJS backoffice code that must be rewritten for the
/// Lit-based backoffice.
///
/// The estimate is a lump sum for the whole migration: base hours plus
/// half an hour per full ten files, spread across the per-file findings.
pub struct AngularDetectionRule;

impl Rule for AngularDetectionRule {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: RULE_ID.into(),
            name: "Angular Files Detected".into(),
            description: "Detects AngularJS code in App_Plugins that needs migration".into(),
            category: RuleCategory::Frontend,
            default_hours: 2.0,
            file_patterns: GLOBS.iter().map(|g| g.to_string()).collect(),
        }
    }

    fn execute(&self, ctx: &ScanContext, base_hours: f64) -> Result<Vec<Finding>> {
        let hits = scan_files(ctx, GLOBS, &PATTERNS)?;
        if hits.is_empty() {
            return Ok(Vec::new());
        }

        let total = lump_sum(base_hours, hits.len());
        tracing::debug!(rule_id = RULE_ID, files = hits.len(), hours = total, "angular lump sum");

        let shares = distribute_hours(total, hits.len());
        Ok(hits
            .iter()
            .zip(shares)
            .map(|(file, hours)| {
                file.finding(
                    ctx,
                    RULE_ID,
                    file.first(),
                    hours,
                    Severity::Warning,
                    FindingMetadata::Frontend(FrontendDetail::AngularCode {
                        pattern_count: file.matches.len(),
                    }),
                )
            })
            .collect())
    }
}

fn lump_sum(base_hours: f64, files: usize) -> f64 {
    base_hours + (files / FILES_PER_STEP) as f64 * HOURS_PER_STEP
}
