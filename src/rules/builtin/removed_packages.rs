use crate::error::Result;
use crate::report::hours::estimate_hours;
use crate::rules::{
    Finding, FindingMetadata, PackageDetail, Rule, RuleCategory, RuleMetadata, ScanContext,
    Severity,
};
use crate::scanner::manifest::parse_manifest;

const RULE_ID: &str = "rule-04-removed-packages";

/// Packages with no Umbraco 17 release; they must be uninstalled.
const REMOVED_PACKAGES: &[&str] = &[
    "Umbraco.Cloud.Cms.PublicAccess",
    "Umbraco.Cloud.Identity.Cms",
    "Umbraco.Cms.Web.BackOffice",
];

const REASON: &str = "Package removed or functionality merged into core";

/// rule-04: references to removed packages, one finding per reference.
pub struct RemovedPackagesRule;

impl Rule for RemovedPackagesRule {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: RULE_ID.into(),
            name: "Removed Packages".into(),
            description: "Detects packages that have been removed in Umbraco 17".into(),
            category: RuleCategory::PackageUpdate,
            default_hours: 0.5,
            file_patterns: vec!["**/*.csproj".into()],
        }
    }

    fn execute(&self, ctx: &ScanContext, base_hours: f64) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();
        for manifest in &ctx.project_files {
            for pkg in parse_manifest(manifest) {
                if !REMOVED_PACKAGES.contains(&pkg.name.as_str()) {
                    continue;
                }
                let line = format!(
                    "{} ({}) - Package removed in Umbraco 17",
                    pkg.name, pkg.version
                );
                findings.push(Finding::new(
                    RULE_ID,
                    manifest.clone(),
                    0,
                    &line,
                    estimate_hours(base_hours, 1),
                    Severity::Error,
                    FindingMetadata::PackageUpdate(PackageDetail::Removed {
                        package_name: pkg.name,
                        version: pkg.version,
                        reason: REASON.into(),
                    }),
                ));
            }
        }
        Ok(findings)
    }
}
