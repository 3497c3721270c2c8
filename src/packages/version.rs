//! NuGet version strings: pre-release detection and ordering.
//!
//! NuGet allows four numeric segments (`1.2.3.4`) which `semver` rejects,
//! so ordering falls back to comparing numeric segments when either side
//! is not valid SemVer.

use std::cmp::Ordering;

/// Strip build metadata (`+sha`), which never affects ordering.
fn without_metadata(version: &str) -> &str {
    version.split('+').next().unwrap_or(version).trim()
}

/// A version carrying a pre-release label (`2.1.0-beta`, `17.0.0-rc1`).
pub fn is_prerelease(version: &str) -> bool {
    without_metadata(version).contains('-')
}

pub fn is_stable(version: &str) -> bool {
    !version.trim().is_empty() && !is_prerelease(version)
}

/// Version-aware ordering.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let (a, b) = (without_metadata(a), without_metadata(b));
    match (semver::Version::parse(a), semver::Version::parse(b)) {
        (Ok(va), Ok(vb)) => va.cmp(&vb),
        _ => compare_numeric_segments(a, b),
    }
}

/// Compare dot-separated numeric segments, padding the shorter side with
/// zeros. Non-numeric segments compare as 0; a stable version sorts above
/// a pre-release with the same numbers.
fn compare_numeric_segments(a: &str, b: &str) -> Ordering {
    let (a_core, a_pre) = split_prerelease(a);
    let (b_core, b_pre) = split_prerelease(b);
    let a_nums = numeric_segments(a_core);
    let b_nums = numeric_segments(b_core);

    let len = a_nums.len().max(b_nums.len());
    for i in 0..len {
        let x = a_nums.get(i).copied().unwrap_or(0);
        let y = b_nums.get(i).copied().unwrap_or(0);
        match x.cmp(&y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }

    match (a_pre, b_pre) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => x.to_ascii_lowercase().cmp(&y.to_ascii_lowercase()),
    }
}

fn split_prerelease(version: &str) -> (&str, Option<&str>) {
    match version.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (version, None),
    }
}

fn numeric_segments(core: &str) -> Vec<u64> {
    core.split('.')
        .map(|s| s.trim().parse::<u64>().unwrap_or(0))
        .collect()
}

/// Highest stable version among `versions`.
pub fn highest_stable<'a, I>(versions: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    versions
        .into_iter()
        .filter(|v| is_stable(v))
        .max_by(|a, b| compare_versions(a, b))
}

/// Whether `current` is behind `latest`. Floating or range versions that
/// cannot be ordered count as outdated whenever the text differs.
pub fn is_outdated(current: &str, latest: &str) -> bool {
    let current = current.trim();
    if current.contains(['*', '[', '(', ',']) {
        return current != latest;
    }
    compare_versions(current, latest) == Ordering::Less
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_prerelease() {
        assert!(is_prerelease("2.1.0-beta"));
        assert!(is_prerelease("17.0.0-rc.1+build.5"));
        assert!(!is_prerelease("13.5.2"));
        assert!(!is_prerelease("1.0.0+sha.abc-def"));
    }

    #[test]
    fn highest_stable_excludes_prerelease() {
        let versions = ["2.0.0", "2.1.0-beta", "2.0.5"];
        assert_eq!(highest_stable(versions), Some("2.0.5"));
    }

    #[test]
    fn highest_stable_none_when_only_prerelease() {
        assert_eq!(highest_stable(["1.0.0-alpha", "1.0.0-beta"]), None);
        assert_eq!(highest_stable(Vec::<&str>::new()), None);
    }

    #[test]
    fn semver_ordering_is_numeric() {
        assert_eq!(compare_versions("13.10.0", "13.9.1"), Ordering::Greater);
        assert_eq!(compare_versions("2.0.5", "2.0.5"), Ordering::Equal);
    }

    #[test]
    fn four_segment_versions_fall_back_to_numeric() {
        assert_eq!(compare_versions("4.0.1.2", "4.0.1.10"), Ordering::Less);
        assert_eq!(compare_versions("4.0.1", "4.0.1.0"), Ordering::Equal);
        assert_eq!(compare_versions("1.2", "1.10"), Ordering::Less);
        assert_eq!(highest_stable(["4.0.1.2", "4.0.1.10", "4.1.0.0-pre"]), Some("4.0.1.10"));
    }

    #[test]
    fn outdated_check() {
        assert!(is_outdated("13.5.2", "17.0.0"));
        assert!(!is_outdated("17.0.0", "17.0.0"));
        assert!(!is_outdated("17.1.0", "17.0.0"));
        assert!(is_outdated("13.*", "17.0.0"));
        assert!(is_outdated("[13.0,14.0)", "17.0.0"));
    }
}
