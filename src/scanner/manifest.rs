//! `.csproj` parsing: extracts `<PackageReference>` declarations.
//!
//! A project may hold one `<ItemGroup>` or many, and each group one
//! `<PackageReference>` or many. Streaming the events treats both shapes
//! the same way. A version may be given as an attribute or as a child
//! `<Version>` element.

use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

use super::matcher::read_source;

/// Namespace prefix shared by all Umbraco packages.
pub const FRAMEWORK_PREFIX: &str = "Umbraco.";

/// The package whose version identifies the installed Umbraco release.
pub const PRIMARY_PACKAGE: &str = "Umbraco.Cms";

/// A dependency declared in a project manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageReference {
    pub name: String,
    pub version: String,
}

/// Parse the manifest at `path`. Missing, unreadable, or malformed files
/// yield an empty list. Invalid UTF-8 is replaced, not rejected.
pub fn parse_manifest(path: &Path) -> Vec<PackageReference> {
    tracing::debug!(file = %path.display(), "parsing manifest");
    match read_source(path) {
        Ok(content) => {
            let refs = parse_manifest_str(&content);
            tracing::debug!(file = %path.display(), packages = refs.len(), "parsed manifest");
            refs
        }
        Err(e) => {
            tracing::debug!(file = %path.display(), error = %e, "manifest unreadable");
            Vec::new()
        }
    }
}

/// Parse manifest text; see [`parse_manifest`].
pub fn parse_manifest_str(content: &str) -> Vec<PackageReference> {
    match collect_references(content) {
        Ok(refs) => refs,
        Err(e) => {
            tracing::debug!(error = %e, "malformed manifest, treating as empty");
            Vec::new()
        }
    }
}

pub fn is_framework_package(name: &str) -> bool {
    name.starts_with(FRAMEWORK_PREFIX)
}

/// Version of [`PRIMARY_PACKAGE`], if referenced.
pub fn extract_primary_version(refs: &[PackageReference]) -> Option<String> {
    refs.iter()
        .find(|r| r.name == PRIMARY_PACKAGE)
        .map(|r| r.version.clone())
}

#[derive(Debug, Default)]
struct PendingReference {
    name: Option<String>,
    version: Option<String>,
}

impl PendingReference {
    fn from_element(element: &BytesStart<'_>) -> Result<Self, quick_xml::Error> {
        let mut pending = Self::default();
        for attr in element.attributes() {
            let attr = attr?;
            let key = attr.key.local_name();
            let value = attr.unescape_value()?.trim().to_string();
            if key.as_ref().eq_ignore_ascii_case(b"Include") {
                pending.name = Some(value);
            } else if key.as_ref().eq_ignore_ascii_case(b"Version") {
                pending.version = Some(value);
            }
        }
        Ok(pending)
    }

    fn finish(self) -> Option<PackageReference> {
        match (self.name, self.version) {
            (Some(name), Some(version)) if !name.is_empty() && !version.is_empty() => {
                Some(PackageReference { name, version })
            }
            _ => None,
        }
    }
}

fn in_item_group(path: &[Vec<u8>]) -> bool {
    path.first().is_some_and(|n| n == b"Project")
        && path.last().is_some_and(|n| n == b"ItemGroup")
}

fn collect_references(content: &str) -> Result<Vec<PackageReference>, quick_xml::Error> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut pending: Option<PendingReference> = None;
    let mut refs = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                if name == b"PackageReference" && in_item_group(&path) {
                    pending = Some(PendingReference::from_element(&e)?);
                }
                path.push(name);
            }
            Event::Empty(e) => {
                if e.local_name().as_ref() == b"PackageReference" && in_item_group(&path) {
                    refs.extend(PendingReference::from_element(&e)?.finish());
                }
            }
            Event::Text(t) => {
                let in_version = path.last().is_some_and(|n| n == b"Version");
                if let (Some(p), true) = (pending.as_mut(), in_version) {
                    p.version = Some(t.unescape()?.trim().to_string());
                }
            }
            Event::End(e) => {
                path.pop();
                if e.local_name().as_ref() == b"PackageReference" {
                    if let Some(p) = pending.take() {
                        refs.extend(p.finish());
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(refs)
}
