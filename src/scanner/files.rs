use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use dashmap::DashSet;
use glob::{MatchOptions, Pattern};

use crate::error::{AuditError, Result};

/// Directories never worth scanning in a .NET / frontend tree.
pub const DEFAULT_EXCLUDES: &[&str] = &["**/node_modules/**", "**/bin/**", "**/obj/**"];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Glob-based file discovery rooted at the audited project.
///
/// Remembers every file it hands out so the report can say how many
/// distinct files the rules looked at.
#[derive(Debug)]
pub struct FileScanner {
    root: PathBuf,
    excludes: Vec<Pattern>,
    seen: DashSet<PathBuf>,
}

impl FileScanner {
    pub fn new<S: AsRef<str>>(root: &Path, excludes: &[S]) -> Result<Self> {
        let excludes = excludes
            .iter()
            .map(|p| compile_glob(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        let root = std::fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
        Ok(Self {
            root,
            excludes,
            seen: DashSet::new(),
        })
    }

    pub fn with_default_excludes(root: &Path) -> Result<Self> {
        Self::new(root, DEFAULT_EXCLUDES)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute paths of all files under the root matching any of `patterns`,
    /// sorted so detector output does not depend on directory order.
    pub fn discover<S: AsRef<str>>(&self, patterns: &[S]) -> Result<Vec<PathBuf>> {
        let patterns = patterns
            .iter()
            .map(|p| compile_glob(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        let files = discover(&patterns, &self.root, &self.excludes);
        for file in &files {
            self.seen.insert(file.clone());
        }
        tracing::debug!(
            root = %self.root.display(),
            count = files.len(),
            "discovered files"
        );
        Ok(files)
    }

    /// Number of distinct files handed out so far.
    pub fn files_seen(&self) -> usize {
        self.seen.len()
    }
}

/// Walk `root` and return the files whose root-relative path matches one of
/// `patterns` and none of `excludes`. A missing root yields no files.
pub fn discover(patterns: &[Pattern], root: &Path, excludes: &[Pattern]) -> Vec<PathBuf> {
    if !root.is_dir() {
        return Vec::new();
    }

    let walker = ignore::WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .build();

    let mut found = BTreeSet::new();
    for entry in walker.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let relative = relative.to_string_lossy().replace('\\', "/");

        if excludes
            .iter()
            .any(|p| p.matches_with(&relative, MATCH_OPTIONS))
        {
            continue;
        }
        if patterns
            .iter()
            .any(|p| p.matches_with(&relative, MATCH_OPTIONS))
        {
            let absolute = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
            found.insert(absolute);
        }
    }

    found.into_iter().collect()
}

fn compile_glob(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern).map_err(|e| AuditError::Pattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn finds_files_at_any_depth() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "Program.cs");
        touch(dir.path(), "src/Web/Controllers/Api.cs");
        touch(dir.path(), "src/Web/site.css");

        let scanner = FileScanner::with_default_excludes(dir.path()).unwrap();
        let files = scanner.discover(&["**/*.cs"]).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.is_absolute()));
    }

    #[test]
    fn applies_default_excludes() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "src/Site.cs");
        touch(dir.path(), "src/bin/Debug/Gen.cs");
        touch(dir.path(), "src/obj/Gen.cs");
        touch(dir.path(), "web/node_modules/lib/index.js");

        let scanner = FileScanner::with_default_excludes(dir.path()).unwrap();
        let files = scanner.discover(&["**/*.cs", "**/*.js"]).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("src/Site.cs"));
    }

    #[test]
    fn counts_distinct_files_seen() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.cs");
        touch(dir.path(), "b.cs");

        let scanner = FileScanner::with_default_excludes(dir.path()).unwrap();
        scanner.discover(&["**/*.cs"]).unwrap();
        scanner.discover(&["**/a.cs"]).unwrap();
        assert_eq!(scanner.files_seen(), 2);
    }

    #[test]
    fn missing_root_is_empty() {
        let scanner =
            FileScanner::with_default_excludes(Path::new("/nonexistent/umbraco/site")).unwrap();
        assert!(scanner.discover(&["**/*.uda"]).unwrap().is_empty());
    }

    #[test]
    fn invalid_glob_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let scanner = FileScanner::with_default_excludes(dir.path()).unwrap();
        assert!(scanner.discover(&["**/[.cs"]).is_err());
    }
}
