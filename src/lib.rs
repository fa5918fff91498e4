//! depdomains library
//!
//! Audits the supply chain of an npm-style application by harvesting the
//! contact domains of every dependency's maintainers (direct and, by
//! default, transitive) and flagging any domain that is unregistered or
//! expired. An expired maintainer domain lets an attacker re-register it
//! and take over the package's publishing credentials through email-based
//! account recovery.
//!
//! # Example
//!
//! ```rust,no_run
//! use depdomains::cli::Verbosity;
//! use depdomains::config::Config;
//! use depdomains::domains::{DomainValidator, DOMAIN_WHITELIST};
//! use depdomains::dns::ResolverProbe;
//! use depdomains::manifest::Manifest;
//! use depdomains::registry::NpmRegistry;
//! use depdomains::whois::WhoisClient;
//!
//! # async fn run() -> depdomains::Result<()> {
//! let config = Config::default();
//! let manifest = Manifest::load("package.json")?;
//! let registry = NpmRegistry::new(&config.network, Verbosity::silent())?;
//! let validator = DomainValidator::new(
//!     DOMAIN_WHITELIST.iter().map(|d| d.to_string()).collect(),
//!     Box::new(ResolverProbe::new(config.network.dns_timeout, Verbosity::silent())),
//!     Box::new(WhoisClient::new(&config.network, Verbosity::silent())),
//! );
//! let outcome = depdomains::facade::audit(&manifest, &registry, validator, true, true).await;
//! if outcome.vulnerable() {
//!     eprintln!("{} domain(s) flagged", outcome.report.findings.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod dns;
pub mod domains;
pub mod errors;
pub mod facade;
pub mod graph;
pub mod manifest;
pub mod registry;
pub mod report;
pub mod whois;

// Re-export commonly used types and functions for convenience
pub use domains::{classify_status_token, DomainRecord, DomainStatus, DomainValidator};
pub use errors::{DepdomainsError, Result};
pub use facade::{audit, collect_domains, AuditOutcome};
pub use manifest::Manifest;
pub use registry::{NpmRegistry, PackageRegistry};
pub use report::{Finding, Reporter, ScanReport};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
