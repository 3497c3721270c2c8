use once_cell::sync::Lazy;

use super::scan_files;
use crate::error::Result;
use crate::report::hours::estimate_hours;
use crate::rules::{
    ConfigurationDetail, Finding, FindingMetadata, Rule, RuleCategory, RuleMetadata, ScanContext,
    Severity,
};
use crate::scanner::PatternSet;

const RULE_ID: &str = "rule-06-view-imports";

static PATTERNS: Lazy<PatternSet> = Lazy::new(|| {
    PatternSet::literals(&["Smidge", "@addTagHelper *, Smidge", "@inject Smidge"], false).unwrap()
});

/// rule-06: Smidge bundling is gone; its tag helpers and injections in
/// `_ViewImports.cshtml` must be removed.
pub struct ViewImportsRule;

impl Rule for ViewImportsRule {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: RULE_ID.into(),
            name: "ViewImports Smidge Removal".into(),
            description: "Detects Smidge references in _ViewImports.cshtml that need removal"
                .into(),
            category: RuleCategory::Configuration,
            default_hours: 0.5,
            file_patterns: vec!["**/_ViewImports.cshtml".into()],
        }
    }

    fn execute(&self, ctx: &ScanContext, base_hours: f64) -> Result<Vec<Finding>> {
        let hits = scan_files(ctx, &["**/_ViewImports.cshtml"], &PATTERNS)?;
        Ok(hits
            .iter()
            .map(|file| {
                file.finding(
                    ctx,
                    RULE_ID,
                    file.first(),
                    estimate_hours(base_hours, 1),
                    Severity::Warning,
                    FindingMetadata::Configuration(ConfigurationDetail::SmidgeReference {
                        match_count: file.matches.len(),
                    }),
                )
            })
            .collect())
    }
}
