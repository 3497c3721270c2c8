use once_cell::sync::Lazy;

use super::scan_files;
use crate::error::Result;
use crate::report::hours::estimate_hours;
use crate::rules::{
    BreakingChangeDetail, Finding, FindingMetadata, Rule, RuleCategory, RuleMetadata, ScanContext,
    Severity,
};
use crate::scanner::PatternSet;

const RULE_ID: &str = "rule-02-obsolete-controllers";

/// Controller base classes removed in Umbraco 17.
const OBSOLETE_CLASSES: &[&str] = &[
    "UmbracoApiController",
    "UmbracoAuthorizedApiController",
    "UmbracoAuthorizedJsonController",
];

static PATTERNS: Lazy<PatternSet> = Lazy::new(|| {
    let sources: Vec<String> = OBSOLETE_CLASSES
        .iter()
        .map(|class| format!(r"\b{class}\b"))
        .collect();
    PatternSet::regexes(&sources, true).unwrap()
});

/// rule-02: controllers deriving from removed base classes. Each file
/// needs one refactor, so one finding per file at its first hit.
pub struct ObsoleteControllersRule;

impl Rule for ObsoleteControllersRule {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: RULE_ID.into(),
            name: "Obsolete Controller Classes".into(),
            description: "Detects usage of controller classes that no longer exist in Umbraco 17"
                .into(),
            category: RuleCategory::BreakingChange,
            default_hours: 1.0,
            file_patterns: vec!["**/*.cs".into()],
        }
    }

    fn execute(&self, ctx: &ScanContext, base_hours: f64) -> Result<Vec<Finding>> {
        let hits = scan_files(ctx, &["**/*.cs"], &PATTERNS)?;
        Ok(hits
            .iter()
            .map(|file| {
                let first = file.first();
                file.finding(
                    ctx,
                    RULE_ID,
                    first,
                    estimate_hours(base_hours, 1),
                    Severity::Error,
                    FindingMetadata::BreakingChange(BreakingChangeDetail::ObsoleteController {
                        class_name: OBSOLETE_CLASSES[first.pattern_index].to_string(),
                    }),
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::builtin::test_support::{file_name, project};

    #[test]
    fn one_finding_per_file_at_first_match() {
        let (_dir, ctx) = project(&[
            (
                "Controllers/ProductsController.cs",
                "using Umbraco.Cms.Web.Common.Controllers;\n\
                 public class ProductsController : UmbracoApiController\n\
                 {\n\
                 }\n\
                 public class Other : UmbracoAuthorizedApiController {}\n",
            ),
            (
                "Controllers/Legacy.cs",
                "public class Legacy : UmbracoAuthorizedJsonController {}\n",
            ),
            ("Services/Clean.cs", "public class Clean : Controller {}\n"),
        ]);

        let findings = ObsoleteControllersRule.execute(&ctx, 1.0).unwrap();
        assert_eq!(findings.len(), 2);

        assert_eq!(file_name(&findings[0].file_path), "Legacy.cs");
        assert_eq!(
            findings[0].metadata,
            FindingMetadata::BreakingChange(BreakingChangeDetail::ObsoleteController {
                class_name: "UmbracoAuthorizedJsonController".into()
            })
        );

        assert_eq!(file_name(&findings[1].file_path), "ProductsController.cs");
        assert_eq!(findings[1].line_number, 2);
        assert_eq!(findings[1].severity, Severity::Error);
        assert_eq!(findings[1].hours, 1.0);
    }

    #[test]
    fn does_not_match_longer_identifiers() {
        let (_dir, ctx) = project(&[(
            "A.cs",
            "public class X : MyUmbracoApiControllerBase {}\n",
        )]);
        assert!(ObsoleteControllersRule.execute(&ctx, 1.0).unwrap().is_empty());
    }

    #[test]
    fn class_names_match_case_sensitively() {
        let (_dir, ctx) = project(&[(
            "A.cs",
            "public class A : umbracoapicontroller {}\n\
             public class B : UmbracoApiController {}\n",
        )]);
        let findings = ObsoleteControllersRule.execute(&ctx, 1.0).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line_number, 2);
    }
}
