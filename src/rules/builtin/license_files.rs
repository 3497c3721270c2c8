use crate::error::Result;
use crate::report::hours::estimate_hours;
use crate::rules::{
    ConfigurationDetail, Finding, FindingMetadata, Rule, RuleCategory, RuleMetadata, ScanContext,
    Severity,
};

const RULE_ID: &str = "rule-10-license-files";

const LICENSE_FILES: &[&str] = &["umbracoDeploy.lic", "umbracoForms.lic"];

const ACTION: &str = "Change licensing structure for Forms and Deploy";

/// rule-10: legacy Forms / Deploy license files. Moving to the new
/// licensing model is one task, so a single finding covers all of them.
pub struct LicenseFilesRule;

impl Rule for LicenseFilesRule {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: RULE_ID.into(),
            name: "License File Structure Changes".into(),
            description: "Detects Umbraco Forms and Deploy license files that need updating for new licensing structure".into(),
            category: RuleCategory::Configuration,
            default_hours: 0.5,
            file_patterns: vec!["**/*.lic".into()],
        }
    }

    fn execute(&self, ctx: &ScanContext, base_hours: f64) -> Result<Vec<Finding>> {
        let found: Vec<_> = ctx
            .discover(&["**/*.lic"])?
            .into_iter()
            .filter_map(|path| {
                let name = path.file_name()?.to_string_lossy().into_owned();
                LICENSE_FILES.contains(&name.as_str()).then_some((path, name))
            })
            .collect();

        let Some((primary, _)) = found.first() else {
            return Ok(Vec::new());
        };

        let file_names: Vec<String> = found.iter().map(|(_, name)| name.clone()).collect();
        tracing::debug!(rule_id = RULE_ID, files = ?file_names, "legacy license files");

        Ok(vec![Finding::new(
            RULE_ID,
            primary.clone(),
            0,
            &file_names.join(", "),
            estimate_hours(base_hours, 1),
            Severity::Warning,
            FindingMetadata::Configuration(ConfigurationDetail::LicenseFiles {
                file_names,
                action: ACTION.into(),
            }),
        )])
    }
}
