//! Configuration management for depdomains.
//!
//! Centralizes network timeouts, registry endpoint settings and scan
//! preferences. Values can be overridden from environment variables and are
//! merged with command-line arguments (CLI takes precedence).

use std::time::Duration;

use crate::cli::Cli;
use crate::errors::{DepdomainsError, Result};

/// Main configuration structure for depdomains.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Network operation settings
    pub network: NetworkConfig,

    /// Scan behavior and whitelist preferences
    pub scan: ScanConfig,
}

/// Network-related configuration options
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Timeout for a single DNS query
    pub dns_timeout: Duration,

    /// Timeout for a single WHOIS exchange
    pub whois_timeout: Duration,

    /// Timeout for registry metadata HTTP requests
    pub registry_timeout: Duration,

    /// Maximum number of WHOIS referral hops
    pub max_whois_depth: usize,

    /// Base URL of the package registry
    pub registry_url: String,

    /// User agent sent with registry requests
    pub user_agent: String,
}

/// Scan behavior configuration
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Follow transitive dependencies beyond the direct set
    pub follow_indirect: bool,

    /// Try DNS resolution before WHOIS (fast path)
    pub resolve_first: bool,

    /// Domains that are never flagged (large shared mail providers)
    pub whitelist: Vec<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            dns_timeout: Duration::from_secs(5),
            whois_timeout: Duration::from_secs(10),
            registry_timeout: Duration::from_secs(30),
            max_whois_depth: 4,
            registry_url: "https://registry.npmjs.org".to_string(),
            user_agent: format!("depdomains/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            follow_indirect: true,
            resolve_first: true,
            whitelist: crate::domains::DOMAIN_WHITELIST
                .iter()
                .map(|d| d.to_string())
                .collect(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(timeout) = std::env::var("DEPDOMAINS_DNS_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse::<u64>() {
                config.network.dns_timeout = Duration::from_secs(secs);
            }
        }

        if let Ok(timeout) = std::env::var("DEPDOMAINS_WHOIS_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse::<u64>() {
                config.network.whois_timeout = Duration::from_secs(secs);
            }
        }

        if let Ok(depth) = std::env::var("DEPDOMAINS_MAX_WHOIS_DEPTH") {
            if let Ok(d) = depth.parse::<usize>() {
                config.network.max_whois_depth = d;
            }
        }

        if let Ok(url) = std::env::var("DEPDOMAINS_REGISTRY_URL") {
            config.network.registry_url = url;
        }

        if let Ok(extra) = std::env::var("DEPDOMAINS_WHITELIST") {
            config
                .scan
                .whitelist
                .extend(extra.split(',').map(|d| d.trim().to_string()));
        }

        config
    }

    /// Merge with CLI arguments, giving CLI precedence
    pub fn merge_with_cli(&mut self, cli: &Cli) {
        self.scan.follow_indirect = cli.follow_indirect();
        self.scan.resolve_first = cli.resolve_first();
        self.scan.whitelist.extend(cli.whitelist.iter().cloned());
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.network.dns_timeout.as_secs() == 0 {
            return Err(DepdomainsError::configuration(
                "network.dns_timeout must be greater than 0",
            ));
        }
        if self.network.whois_timeout.as_secs() == 0 {
            return Err(DepdomainsError::configuration(
                "network.whois_timeout must be greater than 0",
            ));
        }
        if self.network.max_whois_depth == 0 {
            return Err(DepdomainsError::configuration(
                "network.max_whois_depth must be at least 1",
            ));
        }
        if self.network.registry_url.is_empty() {
            return Err(DepdomainsError::configuration(
                "network.registry_url must not be empty",
            ));
        }
        Ok(())
    }
}
