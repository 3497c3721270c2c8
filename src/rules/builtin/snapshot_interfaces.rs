use once_cell::sync::Lazy;

use super::{scan_files, FileHits};
use crate::error::Result;
use crate::report::hours::estimate_hours;
use crate::rules::{
    BreakingChangeDetail, Finding, FindingMetadata, Rule, RuleCategory, RuleMetadata, ScanContext,
    Severity, SourceKind,
};
use crate::scanner::PatternSet;

const RULE_ID: &str = "rule-08-published-snapshot-interfaces";

const INTERFACES: &[&str] = &["IPublishedSnapshotAccessor", "IPublishedSnapshot"];

static PATTERNS: Lazy<PatternSet> = Lazy::new(|| {
    let sources: Vec<String> = INTERFACES.iter().map(|i| format!(r"\b{i}\b")).collect();
    PatternSet::regexes(&sources, true).unwrap()
});

/// rule-08: the published snapshot interfaces were replaced by the
/// published content cache.
///
/// Models Builder output (`*.generated.cs`) is fixed by regenerating all
/// models at once, so every generated hit folds into a single finding.
/// Hand-written files each get their own.
pub struct SnapshotInterfacesRule;

impl Rule for SnapshotInterfacesRule {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: RULE_ID.into(),
            name: "Published Snapshot Interfaces".into(),
            description:
                "Detects IPublishedSnapshotAccessor and IPublishedSnapshot usage requiring updates"
                    .into(),
            category: RuleCategory::BreakingChange,
            default_hours: 0.5,
            file_patterns: vec!["**/*.cs".into()],
        }
    }

    fn execute(&self, ctx: &ScanContext, base_hours: f64) -> Result<Vec<Finding>> {
        let hits = scan_files(ctx, &["**/*.cs"], &PATTERNS)?;
        let (generated, regular): (Vec<&FileHits>, Vec<&FileHits>) =
            hits.iter().partition(|f| is_generated(f));

        tracing::debug!(
            rule_id = RULE_ID,
            generated = generated.len(),
            regular = regular.len(),
            "snapshot interface hits"
        );

        let mut findings = Vec::new();
        if let Some(first) = generated.first() {
            findings.push(finding(ctx, first, base_hours, SourceKind::Generated, generated.len()));
        }
        for file in regular {
            findings.push(finding(ctx, file, base_hours, SourceKind::Regular, file.matches.len()));
        }
        Ok(findings)
    }
}

fn is_generated(file: &FileHits) -> bool {
    file.path.to_string_lossy().ends_with(".generated.cs")
}

fn finding(
    ctx: &ScanContext,
    file: &FileHits,
    base_hours: f64,
    source_kind: SourceKind,
    occurrence_count: usize,
) -> Finding {
    let first = file.first();
    file.finding(
        ctx,
        RULE_ID,
        first,
        estimate_hours(base_hours, 1),
        Severity::Warning,
        FindingMetadata::BreakingChange(BreakingChangeDetail::SnapshotInterface {
            interface_name: INTERFACES[first.pattern_index].to_string(),
            source_kind,
            occurrence_count,
        }),
    )
}
