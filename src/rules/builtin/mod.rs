mod angular_detection;
mod license_files;
mod nuget_packages;
mod obsolete_controllers;
mod program_cs;
mod removed_extensions;
mod removed_packages;
mod snapshot_interfaces;
mod tiptap_import;
mod uda_property_editors;
mod view_imports;

use std::path::PathBuf;
use std::sync::Arc;

use rayon::prelude::*;

use super::registry::RuleRegistry;
use super::{Finding, FindingMetadata, Rule, ScanContext, Severity};
use crate::error::Result;
use crate::packages::PackageResolver;
use crate::scanner::{read_source, LineMatch, PatternSet};

pub use angular_detection::AngularDetectionRule;
pub use license_files::LicenseFilesRule;
pub use nuget_packages::NuGetPackagesRule;
pub use obsolete_controllers::ObsoleteControllersRule;
pub use program_cs::ProgramCsRule;
pub use removed_extensions::RemovedExtensionsRule;
pub use removed_packages::RemovedPackagesRule;
pub use snapshot_interfaces::SnapshotInterfacesRule;
pub use tiptap_import::TiptapImportRule;
pub use uda_property_editors::UdaPropertyEditorsRule;
pub use view_imports::ViewImportsRule;

/// Returns all built-in rules for the 13 → 17 upgrade, in report order.
pub fn all_rules(resolver: Arc<PackageResolver>) -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(NuGetPackagesRule::new(resolver)),
        Arc::new(ObsoleteControllersRule),
        Arc::new(RemovedExtensionsRule),
        Arc::new(TiptapImportRule),
        Arc::new(RemovedPackagesRule),
        Arc::new(ProgramCsRule),
        Arc::new(ViewImportsRule),
        Arc::new(AngularDetectionRule),
        Arc::new(SnapshotInterfacesRule),
        Arc::new(UdaPropertyEditorsRule),
        Arc::new(LicenseFilesRule),
    ]
}

/// A fresh registry holding every built-in rule.
pub fn registry(resolver: Arc<PackageResolver>) -> RuleRegistry {
    let mut registry = RuleRegistry::new();
    for rule in all_rules(resolver) {
        registry.register(rule);
    }
    registry
}

/// A file with at least one matching line.
struct FileHits {
    path: PathBuf,
    content: String,
    matches: Vec<LineMatch>,
}

impl FileHits {
    fn first(&self) -> &LineMatch {
        &self.matches[0]
    }

    fn finding(
        &self,
        ctx: &ScanContext,
        rule_id: &str,
        m: &LineMatch,
        hours: f64,
        severity: Severity,
        metadata: FindingMetadata,
    ) -> Finding {
        Finding::new(
            rule_id,
            self.path.clone(),
            m.line_number,
            &m.line_content,
            hours,
            severity,
            metadata,
        )
        .with_snippet(ctx.snippet(&self.content, m.line_number))
    }
}

/// Discover files matching `globs` and search each for `patterns`.
/// Files are read in parallel; output keeps discovery order and drops
/// files without matches. A read failure fails the whole rule.
fn scan_files(ctx: &ScanContext, globs: &[&str], patterns: &PatternSet) -> Result<Vec<FileHits>> {
    let files = ctx.discover(globs)?;
    let hits = files
        .into_par_iter()
        .map(|path| {
            let content = read_source(&path)?;
            let matches = patterns.search(&path, &content);
            Ok((!matches.is_empty()).then_some(FileHits {
                path,
                content,
                matches,
            }))
        })
        .collect::<Result<Vec<Option<FileHits>>>>()?;
    Ok(hits.into_iter().flatten().collect())
}
