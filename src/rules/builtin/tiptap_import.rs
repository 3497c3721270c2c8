use once_cell::sync::Lazy;

use super::scan_files;
use crate::error::Result;
use crate::report::hours::estimate_hours;
use crate::rules::{
    Finding, FindingMetadata, FrontendDetail, Rule, RuleCategory, RuleMetadata, ScanContext,
    Severity,
};
use crate::scanner::PatternSet;

const RULE_ID: &str = "rule-03-tiptap-import";
const GLOBS: &[&str] = &["**/*.ts", "**/*.js"];

static PATTERNS: Lazy<PatternSet> =
    Lazy::new(|| PatternSet::literals(&["@umbraco-cms/backoffice/external/tiptap"], true).unwrap());

/// rule-03: backoffice extensions importing Tiptap from its old location.
pub struct TiptapImportRule;

impl Rule for TiptapImportRule {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: RULE_ID.into(),
            name: "Tiptap Import Changes".into(),
            description: "Detects Tiptap imports that need updating for Umbraco 17 backoffice"
                .into(),
            category: RuleCategory::Frontend,
            default_hours: 0.5,
            file_patterns: GLOBS.iter().map(|g| g.to_string()).collect(),
        }
    }

    fn execute(&self, ctx: &ScanContext, base_hours: f64) -> Result<Vec<Finding>> {
        let hits = scan_files(ctx, GLOBS, &PATTERNS)?;
        Ok(hits
            .iter()
            .map(|file| {
                file.finding(
                    ctx,
                    RULE_ID,
                    file.first(),
                    estimate_hours(base_hours, 1),
                    Severity::Warning,
                    FindingMetadata::Frontend(FrontendDetail::TiptapImport {
                        import_count: file.matches.len(),
                    }),
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::builtin::test_support::project;

    #[test]
    fn one_finding_per_file_with_import_count() {
        let (_dir, ctx) = project(&[
            (
                "App_Plugins/editor/src/toolbar.ts",
                "import { Editor } from '@umbraco-cms/backoffice/external/tiptap';\n\
                 import { Mark } from '@umbraco-cms/backoffice/external/tiptap';\n",
            ),
            ("src/other.js", "import x from 'lit';\n"),
        ]);

        let findings = TiptapImportRule.execute(&ctx, 0.5).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line_number, 1);
        assert_eq!(findings[0].hours, 0.5);
        assert_eq!(
            findings[0].metadata,
            FindingMetadata::Frontend(FrontendDetail::TiptapImport { import_count: 2 })
        );
    }

    #[test]
    fn node_modules_are_excluded() {
        let (_dir, ctx) = project(&[(
            "node_modules/pkg/index.js",
            "import '@umbraco-cms/backoffice/external/tiptap';\n",
        )]);
        assert!(TiptapImportRule.execute(&ctx, 0.5).unwrap().is_empty());
    }
}
