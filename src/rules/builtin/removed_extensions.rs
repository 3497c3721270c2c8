use once_cell::sync::Lazy;
use regex::Regex;

use super::scan_files;
use crate::error::Result;
use crate::report::hours::estimate_hours;
use crate::rules::{
    BreakingChangeDetail, Finding, FindingMetadata, Rule, RuleCategory, RuleMetadata, ScanContext,
    Severity,
};
use crate::scanner::PatternSet;

const RULE_ID: &str = "rule-02-removed-extensions";

/// Extension methods removed in Umbraco 17.
const REMOVED_METHODS: &[&str] = &[
    "GetAssemblyFile",
    "ToSingleItemCollection",
    "GenerateDataTable",
    "CreateTableData",
    "AddRowData",
    "ChildrenAsTable",
    "RetryUntilSuccessOrTimeout",
    "RetryUntilSuccessOrMaxAttempts",
    "HasFlagAny",
    "Deconstruct",
    "AsEnumerable",
    "ContainsKey",
    "GetValue",
    "DisposeIfDisposable",
    "SafeCast",
    "ToDictionary",
    "SanitizeThreadCulture",
];

/// `.Method(` with optional whitespace before the paren.
static CALL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"\.({})\s*\(", REMOVED_METHODS.join("|"))).unwrap());

static PATTERNS: Lazy<PatternSet> = Lazy::new(|| PatternSet::from_regexes(vec![CALL_RE.clone()]));

/// rule-02: calls to removed extension methods, one finding per line.
pub struct RemovedExtensionsRule;

impl Rule for RemovedExtensionsRule {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: RULE_ID.into(),
            name: "Removed Extension Methods".into(),
            description: "Detects usage of 17 extension methods removed in Umbraco 17".into(),
            category: RuleCategory::BreakingChange,
            default_hours: 1.0,
            file_patterns: vec!["**/*.cs".into()],
        }
    }

    fn execute(&self, ctx: &ScanContext, base_hours: f64) -> Result<Vec<Finding>> {
        let hits = scan_files(ctx, &["**/*.cs"], &PATTERNS)?;
        let mut findings = Vec::new();
        for file in &hits {
            for m in &file.matches {
                let method_name = CALL_RE
                    .captures(&m.line_content)
                    .and_then(|c| c.get(1))
                    .map(|g| g.as_str().to_string())
                    .unwrap_or_default();
                findings.push(file.finding(
                    ctx,
                    RULE_ID,
                    m,
                    estimate_hours(base_hours, 1),
                    Severity::Error,
                    FindingMetadata::BreakingChange(BreakingChangeDetail::RemovedExtension {
                        method_name,
                    }),
                ));
            }
        }
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::builtin::test_support::project;

    fn method(f: &Finding) -> &str {
        match &f.metadata {
            FindingMetadata::BreakingChange(BreakingChangeDetail::RemovedExtension {
                method_name,
            }) => method_name,
            other => panic!("unexpected metadata {other:?}"),
        }
    }

    #[test]
    fn one_finding_per_matching_line() {
        let (_dir, ctx) = project(&[(
            "Helpers/Legacy.cs",
            "var file = type.GetAssemblyFile();\n\
             var ok = true;\n\
             var items = node.ToSingleItemCollection ();\n\
             Retry.RetryUntilSuccessOrTimeout(() => true);\n",
        )]);

        let findings = RemovedExtensionsRule.execute(&ctx, 1.0).unwrap();
        let lines: Vec<usize> = findings.iter().map(|f| f.line_number).collect();
        assert_eq!(lines, vec![1, 3, 4]);
        assert_eq!(method(&findings[0]), "GetAssemblyFile");
        assert_eq!(method(&findings[1]), "ToSingleItemCollection");
        assert_eq!(method(&findings[2]), "RetryUntilSuccessOrTimeout");
        assert!(findings.iter().all(|f| f.hours == 1.0 && f.severity == Severity::Error));
    }

    #[test]
    fn matching_is_case_sensitive() {
        let (_dir, ctx) = project(&[("A.cs", "x.getvalue();\nx.GetValue();\n")]);
        let findings = RemovedExtensionsRule.execute(&ctx, 1.0).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line_number, 2);
    }

    #[test]
    fn base_hours_override_applies() {
        let (_dir, ctx) = project(&[("A.cs", "a.SafeCast<int>();\nb.SafeCast();\n")]);
        let findings = RemovedExtensionsRule.execute(&ctx, 0.75).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].hours, 1.0);
    }
}
