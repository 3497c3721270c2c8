//! Package version resolution against the NuGet v3 API.
//!
//! One [`PackageResolver`] lives for exactly one audit run. Every lookup,
//! successful or not, is cached by exact package name so repeated
//! lookups within the run never touch the network again. Failures are
//! recorded on the metadata and never returned as errors.

pub mod index;
pub mod nuspec;
pub mod transport;
pub mod version;

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::RegistrySettings;
use crate::error::{AuditError, Result};
use index::{records_of, RegistrationIndex, RegistrationNode, RegistrationPage, VersionRecord};
use transport::{Fetched, RegistryTransport};

/// What the registry told us about one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub package_name: String,
    /// Latest stable version; `None` when it could not be resolved.
    pub latest_version: Option<String>,
    /// `Some(false)` means explicitly incompatible, `None` means unknown.
    pub is_compatible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PackageMetadata {
    fn failed(package_name: &str, reason: impl Into<String>) -> Self {
        Self {
            package_name: package_name.to_string(),
            latest_version: None,
            is_compatible: None,
            error: Some(reason.into()),
        }
    }
}

pub struct PackageResolver {
    transport: Arc<dyn RegistryTransport>,
    settings: RegistrySettings,
    cache: DashMap<String, PackageMetadata>,
}

impl PackageResolver {
    pub fn new(transport: Arc<dyn RegistryTransport>, settings: RegistrySettings) -> Self {
        Self {
            transport,
            settings,
            cache: DashMap::new(),
        }
    }

    /// Resolve one package. Never fails; see [`PackageMetadata::error`].
    pub fn resolve(&self, name: &str) -> PackageMetadata {
        if let Some(hit) = self.cache.get(name) {
            tracing::debug!(package = %name, "cache hit");
            return hit.clone();
        }

        tracing::debug!(package = %name, "querying registry");
        let metadata = match self.query(name) {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::debug!(package = %name, error = %e, "registry lookup failed");
                PackageMetadata::failed(name, e.to_string())
            }
        };

        self.cache.insert(name.to_string(), metadata.clone());
        metadata
    }

    /// Resolve many packages at once, one thread per name. A failing
    /// lookup only affects its own entry.
    pub fn resolve_batch(&self, names: &[String]) -> HashMap<String, PackageMetadata> {
        tracing::debug!(count = names.len(), "batch querying packages");
        thread::scope(|scope| {
            let pending: Vec<_> = names
                .iter()
                .map(|name| (name, scope.spawn(move || self.resolve(name))))
                .collect();
            pending
                .into_iter()
                .map(|(name, handle)| {
                    let metadata = handle
                        .join()
                        .unwrap_or_else(|_| PackageMetadata::failed(name, "lookup panicked"));
                    (name.clone(), metadata)
                })
                .collect()
        })
    }

    /// Cached lookups that carry an error, sorted by package name.
    pub fn failures(&self) -> Vec<PackageMetadata> {
        let mut failed: Vec<PackageMetadata> = self
            .cache
            .iter()
            .filter(|entry| entry.value().error.is_some())
            .map(|entry| entry.value().clone())
            .collect();
        failed.sort_by(|a, b| a.package_name.cmp(&b.package_name));
        failed
    }

    /// Whether a declared target framework runs on the upgrade target.
    pub fn is_compatible_target(&self, target_framework: &str) -> bool {
        let tag = target_framework.trim().to_ascii_lowercase();
        self.settings
            .compatible_targets
            .iter()
            .any(|allowed| tag.contains(&allowed.to_ascii_lowercase()))
    }

    fn query(&self, name: &str) -> Result<PackageMetadata> {
        let id = name.to_lowercase();
        let url = resource_url(&self.settings.index_url, &[&id, "index.json"])?;

        let body = match self.transport.fetch(&url)? {
            Fetched::Body(body) => body,
            Fetched::NotFound => {
                tracing::debug!(package = %name, "package not found on NuGet");
                return Ok(PackageMetadata::failed(name, "Package not found"));
            }
        };

        let index: RegistrationIndex = serde_json::from_str(&body)?;
        if index.items.is_empty() {
            return Ok(PackageMetadata::failed(name, "No versions found"));
        }

        let Some(record) = self.latest_stable(&index)? else {
            return Ok(PackageMetadata::failed(name, "No stable version found"));
        };

        let is_compatible = self.compatibility(&id, &record);
        let metadata = PackageMetadata {
            package_name: name.to_string(),
            latest_version: Some(record.version),
            is_compatible,
            error: None,
        };
        tracing::debug!(
            package = %name,
            latest = ?metadata.latest_version,
            compatible = ?metadata.is_compatible,
            "resolved package"
        );
        Ok(metadata)
    }

    /// Walk pages newest to oldest and return the highest stable version
    /// of the first page that has one.
    fn latest_stable(&self, index: &RegistrationIndex) -> Result<Option<VersionRecord>> {
        if index.items.iter().all(RegistrationNode::is_leaf) {
            return Ok(highest_stable_record(records_of(&index.items)));
        }

        for node in index.items.iter().rev() {
            let records = if node.is_leaf() {
                records_of(std::slice::from_ref(node))
            } else {
                match &node.items {
                    Some(items) => records_of(items),
                    None => self.fetch_page(node)?,
                }
            };
            if let Some(best) = highest_stable_record(records) {
                return Ok(Some(best));
            }
        }
        Ok(None)
    }

    fn fetch_page(&self, page: &RegistrationNode) -> Result<Vec<VersionRecord>> {
        let url = page.id.as_deref().ok_or_else(|| AuditError::Registry {
            url: self.settings.index_url.clone(),
            message: "registration page has neither items nor @id".into(),
        })?;

        match self.transport.fetch(url)? {
            Fetched::Body(body) => {
                let page: RegistrationPage = serde_json::from_str(&body)?;
                Ok(records_of(&page.items))
            }
            Fetched::NotFound => Err(AuditError::Registry {
                url: url.to_string(),
                message: "registration page not found".into(),
            }),
        }
    }

    /// Inline dependency groups first, then the version's `.nuspec`.
    /// `None` when neither declares any target framework.
    fn compatibility(&self, id: &str, record: &VersionRecord) -> Option<bool> {
        let tags = match &record.target_frameworks {
            Some(tags) => tags.clone(),
            None => self.nuspec_frameworks(id, &record.version)?,
        };
        if tags.is_empty() {
            return None;
        }
        Some(tags.iter().any(|t| self.is_compatible_target(t)))
    }

    fn nuspec_frameworks(&self, id: &str, version: &str) -> Option<Vec<String>> {
        let version = version.to_lowercase();
        let file = format!("{id}.nuspec");
        let url = resource_url(&self.settings.flat_container_url, &[id, &version, &file]).ok()?;

        match self.transport.fetch(&url) {
            Ok(Fetched::Body(xml)) => Some(nuspec::target_frameworks(&xml)),
            Ok(Fetched::NotFound) => None,
            Err(e) => {
                tracing::debug!(package = %id, error = %e, "nuspec lookup failed");
                None
            }
        }
    }
}

fn highest_stable_record(records: Vec<VersionRecord>) -> Option<VersionRecord> {
    records
        .into_iter()
        .filter(|r| version::is_stable(&r.version))
        .max_by(|a, b| version::compare_versions(&a.version, &b.version))
}

/// Append path segments to a base URL.
fn resource_url(base: &str, segments: &[&str]) -> Result<String> {
    let mut url = Url::parse(base)
        .map_err(|e| AuditError::Config(format!("invalid registry URL '{base}': {e}")))?;
    url.path_segments_mut()
        .map_err(|_| AuditError::Config(format!("registry URL cannot have a path: {base}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url.to_string())
}
