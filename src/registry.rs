//! Package registry metadata client.
//!
//! Fetches per-package metadata (publish timestamps, per-version dependency
//! lists, maintainer contact records) from an npm-compatible registry over
//! HTTP. Responses are memoized in an explicit per-run cache owned by the
//! client; the cache is never invalidated because the process is short-lived.
//!
//! Every failure here is non-fatal: a package whose metadata cannot be
//! fetched or parsed simply contributes no dependencies and no emails.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::cli::Verbosity;
use crate::config::NetworkConfig;
use crate::errors::{DepdomainsError, Result};

/// Read access to package metadata, abstracted for deterministic testing.
#[async_trait]
pub trait PackageRegistry: Send + Sync {
    /// Direct dependencies of the latest published version of `package`.
    /// Unknown packages and lookup failures yield the empty set.
    async fn dependencies(&self, package: &str) -> HashSet<String>;

    /// Every maintainer contact address that has an email field.
    /// Malformed or missing registry data yields an empty list, never fails.
    async fn maintainer_emails(&self, package: &str) -> Vec<String>;
}

/// A value in the registry's `time` map. npm emits plain timestamp strings
/// for ordinary versions but objects for some historical entries.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TimeEntry {
    Plain(String),
    Detailed { time: String },
    Other(serde_json::Value),
}

impl TimeEntry {
    fn timestamp(&self) -> Option<DateTime<Utc>> {
        let raw = match self {
            TimeEntry::Plain(s) => s.as_str(),
            TimeEntry::Detailed { time } => time.as_str(),
            TimeEntry::Other(_) => return None,
        };
        parse_registry_timestamp(raw)
    }
}

/// Per-version payload; only the dependency map is consumed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VersionInfo {
    #[serde(default)]
    pub dependencies: HashMap<String, String>,
}

/// A registry-listed maintainer, optionally with a contact email.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Maintainer {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// The subset of a registry package document this tool consumes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageDetails {
    #[serde(default)]
    pub time: HashMap<String, TimeEntry>,
    #[serde(default)]
    pub versions: HashMap<String, VersionInfo>,
    #[serde(default)]
    pub maintainers: Vec<Maintainer>,
}

impl PackageDetails {
    /// Name of the most recently published version, determined from the
    /// `time` map (the bookkeeping keys are skipped). Returns None when no
    /// version has a parsable publish timestamp.
    pub fn latest_version_name(&self) -> Option<&str> {
        self.time
            .iter()
            .filter(|(name, _)| !matches!(name.as_str(), "created" | "modified" | "unpublished"))
            .filter_map(|(name, entry)| entry.timestamp().map(|ts| (name, ts)))
            .max_by_key(|(_, ts)| *ts)
            .map(|(name, _)| name.as_str())
    }

    /// Dependency names of the latest published version.
    pub fn latest_dependencies(&self) -> HashSet<String> {
        let Some(version) = self.latest_version_name() else {
            return HashSet::new();
        };
        self.versions
            .get(version)
            .map(|v| v.dependencies.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Maintainer emails, in the registry's listing order.
    pub fn emails(&self) -> Vec<String> {
        self.maintainers
            .iter()
            .filter_map(|m| m.email.clone())
            .collect()
    }
}

/// Parse the registry's timestamp flavors (RFC 3339, or a naive
/// `YYYY-MM-DDTHH:MM:SS` prefix on older documents).
fn parse_registry_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    let prefix = raw.get(..19).unwrap_or(raw);
    NaiveDateTime::parse_from_str(prefix, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// HTTP client for an npm-compatible registry with a per-run memo cache.
///
/// Failed lookups are memoized too, so a package that 404s is fetched once
/// per run regardless of how many dependents reference it.
pub struct NpmRegistry {
    client: Client,
    base_url: String,
    cache: Mutex<HashMap<String, Option<Arc<PackageDetails>>>>,
    verbosity: Verbosity,
}

impl NpmRegistry {
    /// Build a registry client from network configuration.
    pub fn new(network: &NetworkConfig, verbosity: Verbosity) -> Result<Self> {
        let client = Client::builder()
            .timeout(network.registry_timeout)
            .user_agent(network.user_agent.clone())
            .build()
            .map_err(|e| {
                DepdomainsError::Internal {
                    message: "failed to build HTTP client".into(),
                    source: Some(Box::new(e)),
                }
            })?;
        Ok(Self {
            client,
            base_url: network.registry_url.trim_end_matches('/').to_string(),
            cache: Mutex::new(HashMap::new()),
            verbosity,
        })
    }

    /// Fetch (or recall) the package document. Returns None for any lookup
    /// or decode failure; the failure is narrated when warnings are enabled.
    pub async fn details(&self, package: &str) -> Option<Arc<PackageDetails>> {
        if let Some(cached) = self.cache.lock().unwrap().get(package).cloned() {
            return cached;
        }

        let fetched = self.fetch(package).await;
        let entry = match fetched {
            Ok(details) => Some(Arc::new(details)),
            Err(e) => {
                if self.verbosity.warn {
                    eprintln!("Can't get data of {package} ({e})");
                }
                None
            }
        };

        self.cache
            .lock()
            .unwrap()
            .insert(package.to_string(), entry.clone());
        entry
    }

    async fn fetch(&self, package: &str) -> Result<PackageDetails> {
        let url = format!("{}/{}", self.base_url, package);
        if self.verbosity.show_commands {
            eprintln!("(cmd) curl {url}");
        }
        if self.verbosity.trace {
            eprintln!("Fetching registry metadata for {package}");
        }
        let lookup = |e: reqwest::Error| DepdomainsError::registry_lookup(package, e.to_string());
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(lookup)?
            .error_for_status()
            .map_err(lookup)?;
        response.json::<PackageDetails>().await.map_err(lookup)
    }
}

#[async_trait]
impl PackageRegistry for NpmRegistry {
    async fn dependencies(&self, package: &str) -> HashSet<String> {
        match self.details(package).await {
            Some(details) => details.latest_dependencies(),
            None => HashSet::new(),
        }
    }

    async fn maintainer_emails(&self, package: &str) -> Vec<String> {
        match self.details(package).await {
            Some(details) => details.emails(),
            None => Vec::new(),
        }
    }
}
