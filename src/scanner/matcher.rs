//! Line-oriented pattern search.
//!
//! Patterns are evaluated against one line at a time. A match that would
//! span lines is never reported, which keeps every finding pinned to a
//! single, reproducible line number.

use std::path::{Path, PathBuf};

use regex::{Regex, RegexBuilder};

use crate::error::{AuditError, Result};
use crate::rules::CodeSnippet;

/// Default number of context lines around a finding in verbose mode.
pub const DEFAULT_CONTEXT_LINES: usize = 3;

/// A single matching line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMatch {
    /// 1-based.
    pub line_number: usize,
    /// Trimmed line text.
    pub line_content: String,
    pub file_path: PathBuf,
    /// Index of the first pattern (in input order) that matched this line.
    pub pattern_index: usize,
}

/// An ordered set of line patterns with OR semantics.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<Regex>,
}

impl PatternSet {
    /// Compile regex sources.
    pub fn regexes<S: AsRef<str>>(sources: &[S], case_sensitive: bool) -> Result<Self> {
        let patterns = sources
            .iter()
            .map(|s| compile(s.as_ref(), case_sensitive))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Compile plain substrings; regex metacharacters are matched literally.
    pub fn literals<S: AsRef<str>>(needles: &[S], case_sensitive: bool) -> Result<Self> {
        let sources: Vec<String> = needles.iter().map(|n| regex::escape(n.as_ref())).collect();
        Self::regexes(&sources, case_sensitive)
    }

    pub fn from_regexes(patterns: Vec<Regex>) -> Self {
        Self { patterns }
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// One match per line that satisfies any pattern, ascending by line
    /// number. The first pattern in input order wins attribution.
    pub fn search(&self, file_path: &Path, content: &str) -> Vec<LineMatch> {
        content
            .lines()
            .enumerate()
            .filter_map(|(idx, line)| {
                self.patterns
                    .iter()
                    .position(|p| p.is_match(line))
                    .map(|pattern_index| LineMatch {
                        line_number: idx + 1,
                        line_content: line.trim().to_string(),
                        file_path: file_path.to_path_buf(),
                        pattern_index,
                    })
            })
            .collect()
    }

    /// Read `path` and search it. Read failures propagate to the caller.
    pub fn search_file(&self, path: &Path) -> Result<Vec<LineMatch>> {
        let content = read_source(path)?;
        let matches = self.search(path, &content);
        tracing::debug!(
            file = %path.display(),
            matches = matches.len(),
            "searched file"
        );
        Ok(matches)
    }
}

/// Read a source file as text. Invalid UTF-8 is replaced rather than
/// rejected; only I/O failures are errors.
pub fn read_source(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Search `content` for a single regex pattern.
pub fn search(
    file_path: &Path,
    content: &str,
    pattern: &str,
    case_sensitive: bool,
) -> Result<Vec<LineMatch>> {
    Ok(PatternSet::regexes(&[pattern], case_sensitive)?.search(file_path, content))
}

/// Search `content` for any of `patterns`; see [`PatternSet::search`].
pub fn search_multiple<S: AsRef<str>>(
    file_path: &Path,
    content: &str,
    patterns: &[S],
    case_sensitive: bool,
) -> Result<Vec<LineMatch>> {
    Ok(PatternSet::regexes(patterns, case_sensitive)?.search(file_path, content))
}

/// Up to `context_lines` lines either side of `line_number` (1-based),
/// clipped at the file boundaries.
pub fn extract_snippet(content: &str, line_number: usize, context_lines: usize) -> CodeSnippet {
    let lines: Vec<&str> = content.lines().collect();
    let index = line_number.saturating_sub(1);
    let start = index.saturating_sub(context_lines);
    let end = (index + context_lines + 1).min(lines.len());

    let to_owned = |slice: &[&str]| slice.iter().map(|l| l.to_string()).collect::<Vec<_>>();

    CodeSnippet {
        before: to_owned(&lines[start.min(lines.len())..index.min(lines.len())]),
        line: lines.get(index).map(|l| l.to_string()).unwrap_or_default(),
        after: if index + 1 < end {
            to_owned(&lines[index + 1..end])
        } else {
            Vec::new()
        },
        start_line: start + 1,
    }
}

fn compile(source: &str, case_sensitive: bool) -> Result<Regex> {
    RegexBuilder::new(source)
        .case_insensitive(!case_sensitive)
        .build()
        .map_err(|e| AuditError::Pattern {
            pattern: source.to_string(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p() -> &'static Path {
        Path::new("Test.cs")
    }

    #[test]
    fn evaluates_each_line_independently() {
        let matches = search(p(), "a\nB\na", "a", true).unwrap();
        let lines: Vec<usize> = matches.iter().map(|m| m.line_number).collect();
        assert_eq!(lines, vec![1, 3]);
    }

    #[test]
    fn case_insensitive_search() {
        let matches = search(p(), "a\nB\na", "b", false).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].line_number, 2);
    }

    #[test]
    fn trims_line_content() {
        let matches = search(p(), "    app.UseInstallerEndpoints();   ", "Installer", true).unwrap();
        assert_eq!(matches[0].line_content, "app.UseInstallerEndpoints();");
        assert_eq!(matches[0].file_path, PathBuf::from("Test.cs"));
    }

    #[test]
    fn never_matches_across_lines() {
        let matches = search(p(), "Umbraco\nApiController", r"Umbraco\s*ApiController", true)
            .unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn multiple_patterns_dedupe_by_line_first_pattern_wins() {
        let content = "nothing here\nfoo and bar\nonly bar\nonly foo";
        let matches = search_multiple(p(), content, &["foo", "bar"], true).unwrap();
        let summary: Vec<(usize, usize)> = matches
            .iter()
            .map(|m| (m.line_number, m.pattern_index))
            .collect();
        assert_eq!(summary, vec![(2, 0), (3, 1), (4, 0)]);
    }

    #[test]
    fn literals_escape_metacharacters() {
        let set = PatternSet::literals(&["UseInstallerEndpoints()"], true).unwrap();
        assert!(set.search(p(), "app.UseInstallerEndpoints;").is_empty());
        assert_eq!(set.search(p(), "app.UseInstallerEndpoints();").len(), 1);
    }

    #[test]
    fn invalid_regex_is_an_error() {
        assert!(search(p(), "x", "(unclosed", true).is_err());
    }

    #[test]
    fn search_file_propagates_read_errors() {
        let set = PatternSet::literals(&["x"], true).unwrap();
        assert!(set.search_file(Path::new("/nonexistent/File.cs")).is_err());
    }

    #[test]
    fn snippet_in_the_middle() {
        let content = "1\n2\n3\n4\n5\n6\n7\n8\n9";
        let snippet = extract_snippet(content, 5, 2);
        assert_eq!(snippet.before, vec!["3", "4"]);
        assert_eq!(snippet.line, "5");
        assert_eq!(snippet.after, vec!["6", "7"]);
        assert_eq!(snippet.start_line, 3);
    }

    #[test]
    fn snippet_clipped_at_boundaries() {
        let content = "1\n2\n3";
        let head = extract_snippet(content, 1, 3);
        assert!(head.before.is_empty());
        assert_eq!(head.after, vec!["2", "3"]);
        assert_eq!(head.start_line, 1);

        let tail = extract_snippet(content, 3, 3);
        assert_eq!(tail.before, vec!["1", "2"]);
        assert!(tail.after.is_empty());
    }
}
