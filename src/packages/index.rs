//! Wire shapes of the NuGet registration (version index) resource.
//!
//! The index is a list of pages ordered oldest to newest. A page either
//! inlines its leaves or only carries an `@id` to fetch them from. Some
//! registries skip the page level entirely and list leaves at the top.
//! A leaf's `catalogEntry` may be inlined or be a bare URL.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationIndex {
    #[serde(default)]
    pub items: Vec<RegistrationNode>,
}

/// Either a page or a leaf; the index does not tag which.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationNode {
    #[serde(rename = "@id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<RegistrationNode>>,
    #[serde(rename = "catalogEntry", default)]
    pub catalog_entry: Option<CatalogRef>,
    /// Flat listings put the version on the leaf itself.
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CatalogRef {
    Inline(CatalogEntry),
    Link(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogEntry {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(rename = "dependencyGroups", default)]
    pub dependency_groups: Option<Vec<DependencyGroup>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DependencyGroup {
    #[serde(rename = "targetFramework", default)]
    pub target_framework: Option<String>,
}

/// A fetched registration page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationPage {
    #[serde(default)]
    pub items: Vec<RegistrationNode>,
}

/// One published version as seen in the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    pub version: String,
    /// `None` when the index carries no dependency groups for this version.
    pub target_frameworks: Option<Vec<String>>,
}

impl RegistrationNode {
    pub fn is_leaf(&self) -> bool {
        self.catalog_entry.is_some() || (self.version.is_some() && self.items.is_none())
    }

    /// The version record described by this leaf, if it names a version.
    pub fn version_record(&self) -> Option<VersionRecord> {
        let inline = match &self.catalog_entry {
            Some(CatalogRef::Inline(entry)) => Some(entry),
            _ => None,
        };
        let version = inline
            .and_then(|e| e.version.clone())
            .or_else(|| self.version.clone())?;

        let target_frameworks = inline
            .and_then(|e| e.dependency_groups.as_ref())
            .map(|groups| {
                groups
                    .iter()
                    .filter_map(|g| g.target_framework.clone())
                    .filter(|t| !t.trim().is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|tags| !tags.is_empty());

        Some(VersionRecord {
            version,
            target_frameworks,
        })
    }
}

/// Leaf records of a page, in listing order.
pub fn records_of(leaves: &[RegistrationNode]) -> Vec<VersionRecord> {
    leaves.iter().filter_map(|n| n.version_record()).collect()
}
