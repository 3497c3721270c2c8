use once_cell::sync::Lazy;

use crate::error::Result;
use crate::report::hours::estimate_hours;
use crate::rules::{
    BreakingChangeDetail, Finding, FindingMetadata, Rule, RuleCategory, RuleMetadata, ScanContext,
    Severity,
};
use crate::scanner::{read_source, PatternSet};

const RULE_ID: &str = "rule-09-uda-property-editors";

struct OutdatedEditor {
    name: &'static str,
    replacement: &'static str,
    patterns: PatternSet,
}

/// The closing quote keeps `"Umbraco.MediaPicker3"` from matching.
static EDITORS: Lazy<Vec<OutdatedEditor>> = Lazy::new(|| {
    [
        ("Umbraco.MediaPicker", r#""Umbraco\.MediaPicker""#, "MediaPicker3"),
        ("Nested Content", r#""Nested Content""#, "Block List Editor"),
        ("Stacked Content", r#""Stacked Content""#, "Block List Editor"),
    ]
    .into_iter()
    .map(|(name, pattern, replacement)| OutdatedEditor {
        name,
        replacement,
        patterns: PatternSet::regexes(&[pattern], true).unwrap(),
    })
    .collect()
});

/// rule-09: Deploy schema files (`*.uda`) still using property editors
/// that Umbraco 17 no longer ships. One finding per editor per line.
pub struct UdaPropertyEditorsRule;

impl Rule for UdaPropertyEditorsRule {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: RULE_ID.into(),
            name: "Outdated Property Editors".into(),
            description:
                "Detects obsolete property editors in *.uda files that need migration for Umbraco 17"
                    .into(),
            category: RuleCategory::BreakingChange,
            default_hours: 1.0,
            file_patterns: vec!["**/*.uda".into()],
        }
    }

    fn execute(&self, ctx: &ScanContext, base_hours: f64) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();
        for path in ctx.discover(&["**/*.uda"])? {
            let content = read_source(&path)?;

            let mut hits: Vec<(usize, usize, Finding)> = Vec::new();
            for (order, editor) in EDITORS.iter().enumerate() {
                for m in editor.patterns.search(&path, &content) {
                    let finding = Finding::new(
                        RULE_ID,
                        path.clone(),
                        m.line_number,
                        &m.line_content,
                        estimate_hours(base_hours, 1),
                        Severity::Warning,
                        FindingMetadata::BreakingChange(BreakingChangeDetail::PropertyEditor {
                            outdated_editor: editor.name.into(),
                            recommended_replacement: editor.replacement.into(),
                        }),
                    )
                    .with_snippet(ctx.snippet(&content, m.line_number));
                    hits.push((m.line_number, order, finding));
                }
            }

            hits.sort_by_key(|(line, order, _)| (*line, *order));
            findings.extend(hits.into_iter().map(|(_, _, f)| f));
        }
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::builtin::test_support::project;

    fn editor(f: &Finding) -> (&str, &str) {
        match &f.metadata {
            FindingMetadata::BreakingChange(BreakingChangeDetail::PropertyEditor {
                outdated_editor,
                recommended_replacement,
            }) => (outdated_editor, recommended_replacement),
            other => panic!("unexpected metadata {other:?}"),
        }
    }

    const UDA: &str = r#"{
  "Alias": "homePage",
  "PropertyTypes": [
    { "Alias": "hero", "PropertyEditorAlias": "Umbraco.MediaPicker" },
    { "Alias": "gallery", "PropertyEditorAlias": "Umbraco.MediaPicker3" },
    { "Alias": "blocks", "EditorName": "Nested Content", "Legacy": "Stacked Content" }
  ]
}"#;

    #[test]
    fn flags_each_editor_per_line() {
        let (_dir, ctx) = project(&[("data/revision/document-type__home.uda", UDA)]);
        let findings = UdaPropertyEditorsRule.execute(&ctx, 1.0).unwrap();

        let lines: Vec<usize> = findings.iter().map(|f| f.line_number).collect();
        assert_eq!(lines, vec![4, 6, 6]);
        assert_eq!(editor(&findings[0]), ("Umbraco.MediaPicker", "MediaPicker3"));
        assert_eq!(editor(&findings[1]), ("Nested Content", "Block List Editor"));
        assert_eq!(editor(&findings[2]), ("Stacked Content", "Block List Editor"));
        assert!(findings.iter().all(|f| f.hours == 1.0));
    }

    #[test]
    fn media_picker_3_alone_is_fine() {
        let (_dir, ctx) = project(&[(
            "a.uda",
            r#"{"PropertyEditorAlias": "Umbraco.MediaPicker3"}"#,
        )]);
        assert!(UdaPropertyEditorsRule.execute(&ctx, 1.0).unwrap().is_empty());
    }
}
