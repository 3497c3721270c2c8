use crate::error::{AuditError, Result};

/// Result of a registry GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    Body(String),
    /// 404: the resource does not exist. A valid answer, not a failure.
    NotFound,
}

/// How the resolver talks to the package registry.
pub trait RegistryTransport: Send + Sync {
    /// GET `url`. Network failures and non-2xx statuses other than 404 are errors.
    fn fetch(&self, url: &str) -> Result<Fetched>;
}

/// Blocking HTTP transport. No retries; timeouts are the client defaults.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .gzip(true)
            .user_agent(concat!("umbraco-audit/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AuditError::Registry {
                url: String::new(),
                message: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

impl RegistryTransport for HttpTransport {
    fn fetch(&self, url: &str) -> Result<Fetched> {
        let registry_err = |message: String| AuditError::Registry {
            url: url.to_string(),
            message,
        };

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| registry_err(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(Fetched::NotFound);
        }
        if !status.is_success() {
            return Err(registry_err(format!(
                "NuGet API error: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            )));
        }

        let body = response.text().map_err(|e| registry_err(e.to_string()))?;
        Ok(Fetched::Body(body))
    }
}

/// Transport for `--offline` runs: every lookup fails, so every package
/// resolves to an explicit failure record and no finding depends on the network.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineTransport;

impl RegistryTransport for OfflineTransport {
    fn fetch(&self, url: &str) -> Result<Fetched> {
        Err(AuditError::Registry {
            url: url.to_string(),
            message: "offline mode, registry lookups disabled".into(),
        })
    }
}
