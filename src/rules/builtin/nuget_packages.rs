use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::Result;
use crate::packages::version::is_outdated;
use crate::packages::PackageResolver;
use crate::report::hours::estimate_hours;
use crate::rules::{
    Finding, FindingMetadata, PackageDetail, Rule, RuleCategory, RuleMetadata, ScanContext,
    Severity,
};
use crate::scanner::manifest::{is_framework_package, parse_manifest};

const RULE_ID: &str = "rule-01-nuget-packages";

/// rule-01: NuGet packages behind their latest stable release, or whose
/// latest release does not target .NET 10.
///
/// One finding per package, not per project file. Packages the registry
/// could not resolve are skipped; the resolver reports them separately.
pub struct NuGetPackagesRule {
    resolver: Arc<PackageResolver>,
}

impl NuGetPackagesRule {
    pub fn new(resolver: Arc<PackageResolver>) -> Self {
        Self { resolver }
    }
}

struct DeclaredPackage {
    name: String,
    version: String,
    files: Vec<PathBuf>,
}

impl Rule for NuGetPackagesRule {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: RULE_ID.into(),
            name: "NuGet Package Updates".into(),
            description:
                "Detects NuGet packages that need updating for Umbraco 17 and .NET 10 compatibility"
                    .into(),
            category: RuleCategory::PackageUpdate,
            default_hours: 0.5,
            file_patterns: vec!["**/*.csproj".into()],
        }
    }

    fn execute(&self, ctx: &ScanContext, base_hours: f64) -> Result<Vec<Finding>> {
        let declared = collect_packages(&ctx.project_files);
        tracing::debug!(rule_id = RULE_ID, packages = declared.len(), "unique packages");

        let names: Vec<String> = declared.iter().map(|p| p.name.clone()).collect();
        let resolved = self.resolver.resolve_batch(&names);

        let mut findings = Vec::new();
        for pkg in declared {
            let Some(meta) = resolved.get(&pkg.name) else {
                continue;
            };
            let Some(latest) = meta.latest_version.clone() else {
                continue;
            };

            let incompatible = meta.is_compatible == Some(false);
            if !incompatible && !is_outdated(&pkg.version, &latest) {
                continue;
            }

            let severity = if incompatible {
                Severity::Error
            } else {
                Severity::Warning
            };
            let line = format!("{}: {} -> {}", pkg.name, pkg.version, latest);
            let first_file = pkg.files[0].clone();
            findings.push(Finding::new(
                RULE_ID,
                first_file,
                0,
                &line,
                estimate_hours(base_hours, 1),
                severity,
                FindingMetadata::PackageUpdate(PackageDetail::Outdated {
                    is_framework_package: is_framework_package(&pkg.name),
                    package_name: pkg.name,
                    current_version: pkg.version,
                    latest_version: latest,
                    is_compatible: meta.is_compatible,
                    files_affected: pkg.files,
                }),
            ));
        }

        Ok(findings)
    }
}

/// Unique references across all manifests, in first-seen order. The
/// first declared version wins; every declaring file is kept.
fn collect_packages(manifests: &[PathBuf]) -> Vec<DeclaredPackage> {
    let mut packages: Vec<DeclaredPackage> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for manifest in manifests {
        for reference in parse_manifest(manifest) {
            match index.get(&reference.name) {
                Some(&slot) => {
                    let files = &mut packages[slot].files;
                    if !files.contains(manifest) {
                        files.push(manifest.clone());
                    }
                }
                None => {
                    index.insert(reference.name.clone(), packages.len());
                    packages.push(DeclaredPackage {
                        name: reference.name,
                        version: reference.version,
                        files: vec![manifest.clone()],
                    });
                }
            }
        }
    }
    packages
}
