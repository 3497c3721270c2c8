use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One detected occurrence of a rule's pattern in the scanned project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Rule that produced this finding (e.g., "rule-05-program-cs").
    pub rule_id: String,
    /// File containing the occurrence.
    pub file_path: PathBuf,
    /// 1-based line number; 0 when the finding is not line-addressable.
    pub line_number: usize,
    /// The matching line, trimmed.
    pub line_content: String,
    /// Surrounding lines, only collected in verbose mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<CodeSnippet>,
    /// Estimated effort for this occurrence (multiple of 0.5).
    pub hours: f64,
    pub severity: Severity,
    pub metadata: FindingMetadata,
}

impl Finding {
    pub fn new(
        rule_id: &str,
        file_path: impl Into<PathBuf>,
        line_number: usize,
        line_content: &str,
        hours: f64,
        severity: Severity,
        metadata: FindingMetadata,
    ) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            file_path: file_path.into(),
            line_number,
            line_content: line_content.trim().to_string(),
            snippet: None,
            hours,
            severity,
            metadata,
        }
    }

    pub fn with_snippet(mut self, snippet: Option<CodeSnippet>) -> Self {
        self.snippet = snippet;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Report grouping for rules. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleCategory {
    PackageUpdate,
    BreakingChange,
    Configuration,
    Frontend,
}

impl RuleCategory {
    pub fn slug(&self) -> &'static str {
        match self {
            Self::PackageUpdate => "package-update",
            Self::BreakingChange => "breaking-change",
            Self::Configuration => "configuration",
            Self::Frontend => "frontend",
        }
    }
}

impl std::fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PackageUpdate => write!(f, "Package Updates"),
            Self::BreakingChange => write!(f, "Breaking Changes"),
            Self::Configuration => write!(f, "Configuration"),
            Self::Frontend => write!(f, "Frontend"),
        }
    }
}

/// Lines around a finding, for verbose reporting only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSnippet {
    pub before: Vec<String>,
    pub line: String,
    pub after: Vec<String>,
    /// 1-based line number of the first line in `before` (or of `line`).
    pub start_line: usize,
}

/// Rule-specific details, one variant per category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", content = "detail", rename_all = "kebab-case")]
pub enum FindingMetadata {
    PackageUpdate(PackageDetail),
    BreakingChange(BreakingChangeDetail),
    Configuration(ConfigurationDetail),
    Frontend(FrontendDetail),
}

impl FindingMetadata {
    pub fn category(&self) -> RuleCategory {
        match self {
            Self::PackageUpdate(_) => RuleCategory::PackageUpdate,
            Self::BreakingChange(_) => RuleCategory::BreakingChange,
            Self::Configuration(_) => RuleCategory::Configuration,
            Self::Frontend(_) => RuleCategory::Frontend,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PackageDetail {
    Outdated {
        package_name: String,
        current_version: String,
        latest_version: String,
        is_framework_package: bool,
        /// `None` when the registry declared no target frameworks.
        is_compatible: Option<bool>,
        files_affected: Vec<PathBuf>,
    },
    Removed {
        package_name: String,
        version: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Generated,
    Regular,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BreakingChangeDetail {
    ObsoleteController {
        class_name: String,
    },
    RemovedExtension {
        method_name: String,
    },
    SnapshotInterface {
        interface_name: String,
        source_kind: SourceKind,
        /// Files folded into this finding (generated) or matches in the file (regular).
        occurrence_count: usize,
    },
    PropertyEditor {
        outdated_editor: String,
        recommended_replacement: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigurationDetail {
    InstallerEndpoints { occurrence_count: usize },
    SmidgeReference { match_count: usize },
    LicenseFiles { file_names: Vec<String>, action: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrontendDetail {
    TiptapImport { import_count: usize },
    AngularCode { pattern_count: usize },
}

/// Static description of a rule, used for registration and `list-rules` output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleMetadata {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: RuleCategory,
    pub default_hours: f64,
    pub file_patterns: Vec<String>,
}
