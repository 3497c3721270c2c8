pub mod builtin;
pub mod engine;
pub mod finding;
pub mod registry;

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::scanner::files::FileScanner;
use crate::scanner::matcher::{extract_snippet, DEFAULT_CONTEXT_LINES};

pub use engine::{ExecutionOutcome, RuleEngine, RuleFailure};
pub use finding::{
    BreakingChangeDetail, CodeSnippet, ConfigurationDetail, Finding, FindingMetadata,
    FrontendDetail, PackageDetail, RuleCategory, RuleMetadata, Severity, SourceKind,
};
pub use registry::{RegisteredRule, RuleRegistry};

/// A detector checks a project and produces findings.
pub trait Rule: Send + Sync {
    /// Metadata about this rule (id, name, category, default hours).
    fn metadata(&self) -> RuleMetadata;

    /// Run the detector. `base_hours` is the effective per-occurrence
    /// estimate after config overrides.
    fn execute(&self, ctx: &ScanContext, base_hours: f64) -> Result<Vec<Finding>>;
}

/// Read-only state shared by every rule in one audit run.
pub struct ScanContext {
    pub root_path: PathBuf,
    /// Every `.csproj` discovered before rules run.
    pub project_files: Vec<PathBuf>,
    pub debug: bool,
    /// Attach code snippets to line-addressable findings.
    pub verbose: bool,
    scanner: FileScanner,
}

impl ScanContext {
    pub fn new(scanner: FileScanner, project_files: Vec<PathBuf>) -> Self {
        Self {
            root_path: scanner.root().to_path_buf(),
            project_files,
            debug: false,
            verbose: false,
            scanner,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Files under the project root matching any glob, excludes applied.
    pub fn discover(&self, patterns: &[&str]) -> Result<Vec<PathBuf>> {
        self.scanner.discover(patterns)
    }

    /// Context lines around `line_number`, only in verbose mode.
    pub fn snippet(&self, content: &str, line_number: usize) -> Option<CodeSnippet> {
        (self.verbose && line_number > 0)
            .then(|| extract_snippet(content, line_number, DEFAULT_CONTEXT_LINES))
    }

    /// Distinct files handed to rules so far.
    pub fn files_scanned(&self) -> usize {
        self.scanner.files_seen()
    }

    /// Path relative to the project root, for display.
    pub fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root_path).unwrap_or(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn snippet_only_when_verbose() {
        let dir = TempDir::new().unwrap();
        let scanner = FileScanner::with_default_excludes(dir.path()).unwrap();
        let ctx = ScanContext::new(scanner, vec![]);
        assert!(ctx.snippet("a\nb\nc", 2).is_none());

        let ctx = ctx.with_verbose(true);
        let snippet = ctx.snippet("a\nb\nc", 2).unwrap();
        assert_eq!(snippet.line, "b");
        assert!(ctx.snippet("a\nb\nc", 0).is_none());
    }
}
