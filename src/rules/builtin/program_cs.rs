use once_cell::sync::Lazy;

use super::scan_files;
use crate::error::Result;
use crate::report::hours::estimate_hours;
use crate::rules::{
    ConfigurationDetail, Finding, FindingMetadata, Rule, RuleCategory, RuleMetadata, ScanContext,
    Severity,
};
use crate::scanner::PatternSet;

const RULE_ID: &str = "rule-05-program-cs";

static PATTERNS: Lazy<PatternSet> =
    Lazy::new(|| PatternSet::literals(&["UseInstallerEndpoints()"], true).unwrap());

/// rule-05: `UseInstallerEndpoints()` is gone from the startup pipeline.
/// A fixed estimate per file however often it appears.
pub struct ProgramCsRule;

impl Rule for ProgramCsRule {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: RULE_ID.into(),
            name: "Program.cs Changes".into(),
            description: "Detects UseInstallerEndpoints() method that has been removed".into(),
            category: RuleCategory::Configuration,
            default_hours: 0.5,
            file_patterns: vec!["**/Program.cs".into()],
        }
    }

    fn execute(&self, ctx: &ScanContext, base_hours: f64) -> Result<Vec<Finding>> {
        let hits = scan_files(ctx, &["**/Program.cs"], &PATTERNS)?;
        Ok(hits
            .iter()
            .map(|file| {
                file.finding(
                    ctx,
                    RULE_ID,
                    file.first(),
                    estimate_hours(base_hours, 1),
                    Severity::Warning,
                    FindingMetadata::Configuration(ConfigurationDetail::InstallerEndpoints {
                        occurrence_count: file.matches.len(),
                    }),
                )
            })
            .collect())
    }
}
