use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AuditError, Result};
use crate::scanner::files::DEFAULT_EXCLUDES;

/// Config file looked up in the audited directory when none is given.
pub const CONFIG_FILE_NAME: &str = ".umbraco-audit.toml";

pub const DEFAULT_INDEX_URL: &str = "https://api.nuget.org/v3/registration5-semver1";
pub const DEFAULT_FLAT_CONTAINER_URL: &str = "https://api.nuget.org/v3-flatcontainer";

/// Target frameworks that run on Umbraco 17 (.NET 10).
pub const DEFAULT_COMPATIBLE_TARGETS: &[&str] = &["net10.0", "net9.0", "netstandard2.0"];

/// Top-level configuration from `.umbraco-audit.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Glob patterns (relative to the project root) never scanned.
    #[serde(default = "default_excludes")]
    pub exclude_paths: Vec<String>,
    /// Per-rule overrides keyed by rule id.
    #[serde(default)]
    pub rules: BTreeMap<String, RuleOverride>,
    #[serde(default)]
    pub registry: RegistrySettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleOverride {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub base_hours: Option<f64>,
}

/// Where and how packages are looked up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrySettings {
    /// Registration (version index) base URL.
    #[serde(default = "default_index_url")]
    pub index_url: String,
    /// Flat container base URL, used to fetch `.nuspec` manifests.
    #[serde(default = "default_flat_container_url")]
    pub flat_container_url: String,
    /// Target framework monikers considered compatible.
    #[serde(default = "default_compatible_targets")]
    pub compatible_targets: Vec<String>,
}

fn default_excludes() -> Vec<String> {
    DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect()
}

fn default_index_url() -> String {
    DEFAULT_INDEX_URL.into()
}

fn default_flat_container_url() -> String {
    DEFAULT_FLAT_CONTAINER_URL.into()
}

fn default_compatible_targets() -> Vec<String> {
    DEFAULT_COMPATIBLE_TARGETS.iter().map(|s| s.to_string()).collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exclude_paths: default_excludes(),
            rules: BTreeMap::new(),
            registry: RegistrySettings::default(),
        }
    }
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            index_url: default_index_url(),
            flat_container_url: default_flat_container_url(),
            compatible_targets: default_compatible_targets(),
        }
    }
}

impl Config {
    /// Load config from a TOML file. Returns default if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (rule_id, over) in &self.rules {
            if let Some(hours) = over.base_hours {
                if !hours.is_finite() || hours < 0.0 {
                    return Err(AuditError::Config(format!(
                        "rules.{rule_id}.base_hours must be a non-negative number, got {hours}"
                    )));
                }
            }
        }
        for url in [&self.registry.index_url, &self.registry.flat_container_url] {
            url::Url::parse(url)
                .map_err(|e| AuditError::Config(format!("invalid registry URL '{url}': {e}")))?;
        }
        Ok(())
    }

    /// Generate a starter config file.
    pub fn starter_toml() -> &'static str {
        r#"# umbraco-audit configuration

# Paths never scanned (globs relative to the project root).
exclude_paths = ["**/node_modules/**", "**/bin/**", "**/obj/**"]

# Per-rule overrides. Run `umbraco-audit list-rules` for ids.
# [rules."rule-05-program-cs"]
# enabled = false
# base_hours = 1.0

[registry]
index_url = "https://api.nuget.org/v3/registration5-semver1"
flat_container_url = "https://api.nuget.org/v3-flatcontainer"
compatible_targets = ["net10.0", "net9.0", "netstandard2.0"]
"#
    }
}
