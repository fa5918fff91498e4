//! Integration tests for depdomains.
//!
//! These tests verify end-to-end audits without relying on external network
//! services: the registry, DNS probe and WHOIS source are all in-memory
//! fakes wired through the public trait seams.

use std::collections::{HashMap, HashSet};
use std::io::Write;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use tempfile::NamedTempFile;

use depdomains::dns::DnsProbe;
use depdomains::domains::DomainValidator;
use depdomains::registry::PackageRegistry;
use depdomains::whois::{WhoisLookup, WhoisResponse};
use depdomains::{DomainStatus, Manifest};

/// In-memory registry: package → (dependencies, maintainer emails).
struct FakeRegistry {
    packages: HashMap<String, (Vec<String>, Vec<String>)>,
}

impl FakeRegistry {
    fn new(entries: &[(&str, &[&str], &[&str])]) -> Self {
        let packages = entries
            .iter()
            .map(|(name, deps, emails)| {
                (
                    name.to_string(),
                    (
                        deps.iter().map(|d| d.to_string()).collect(),
                        emails.iter().map(|e| e.to_string()).collect(),
                    ),
                )
            })
            .collect();
        Self { packages }
    }
}

#[async_trait]
impl PackageRegistry for FakeRegistry {
    async fn dependencies(&self, package: &str) -> HashSet<String> {
        self.packages
            .get(package)
            .map(|(deps, _)| deps.iter().cloned().collect())
            .unwrap_or_default()
    }

    async fn maintainer_emails(&self, package: &str) -> Vec<String> {
        self.packages
            .get(package)
            .map(|(_, emails)| emails.clone())
            .unwrap_or_default()
    }
}

/// DNS probe that resolves only the listed domains.
struct FakeDns {
    resolving: HashSet<String>,
}

impl FakeDns {
    fn none() -> Self {
        Self {
            resolving: HashSet::new(),
        }
    }

    fn resolving(domains: &[&str]) -> Self {
        Self {
            resolving: domains.iter().map(|d| d.to_string()).collect(),
        }
    }
}

#[async_trait]
impl DnsProbe for FakeDns {
    async fn resolves(&self, domain: &str) -> bool {
        self.resolving.contains(domain)
    }
}

/// WHOIS source with canned responses; unlisted domains have no record.
struct FakeWhois {
    table: HashMap<String, WhoisResponse>,
}

impl FakeWhois {
    fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    fn with(mut self, domain: &str, response: WhoisResponse) -> Self {
        self.table.insert(domain.to_string(), response);
        self
    }
}

#[async_trait]
impl WhoisLookup for FakeWhois {
    async fn query(&self, domain: &str) -> Option<WhoisResponse> {
        self.table.get(domain).cloned()
    }
}

fn validator(dns: FakeDns, whois: FakeWhois) -> DomainValidator {
    DomainValidator::new(
        vec!["gmail.com".to_string()],
        Box::new(dns),
        Box::new(whois),
    )
}

fn manifest_with_leftpad() -> Manifest {
    Manifest::from_json(
        r#"{"name": "my-app", "dependencies": {"leftpad-lite": "^1.0.0"}}"#,
        "package.json",
    )
    .unwrap()
}

#[tokio::test]
async fn unregistered_maintainer_domain_is_reported() {
    let manifest = manifest_with_leftpad();
    let registry = FakeRegistry::new(&[("leftpad-lite", &[], &["dev@expired-example.test"])]);
    let outcome = depdomains::audit(
        &manifest,
        &registry,
        validator(FakeDns::none(), FakeWhois::empty()),
        false,
        true,
    )
    .await;

    assert!(outcome.vulnerable());
    assert_eq!(outcome.report.findings.len(), 1);
    let finding = &outcome.report.findings[0];
    assert_eq!(finding.domain, "expired-example.test");
    assert_eq!(finding.status, DomainStatus::NotFound);
    assert_eq!(finding.label, "not registered");
    assert_eq!(
        finding.packages.iter().cloned().collect::<Vec<_>>(),
        vec!["leftpad-lite".to_string()]
    );
}

#[tokio::test]
async fn whitelisted_maintainer_domain_is_safe() {
    let manifest = manifest_with_leftpad();
    let registry = FakeRegistry::new(&[("leftpad-lite", &[], &["user@gmail.com"])]);
    let outcome = depdomains::audit(
        &manifest,
        &registry,
        validator(FakeDns::none(), FakeWhois::empty()),
        false,
        true,
    )
    .await;

    assert!(!outcome.vulnerable());
    assert_eq!(outcome.report.domains_checked, 1);
}

#[tokio::test]
async fn transitive_maintainers_are_audited() {
    let manifest = manifest_with_leftpad();
    let registry = FakeRegistry::new(&[
        ("leftpad-lite", &["deep-dep"], &["lead@healthy.test"]),
        ("deep-dep", &["leftpad-lite"], &["ghost@vanished.test"]),
    ]);
    let outcome = depdomains::audit(
        &manifest,
        &registry,
        validator(FakeDns::resolving(&["healthy.test"]), FakeWhois::empty()),
        true,
        true,
    )
    .await;

    assert!(outcome.vulnerable());
    assert_eq!(outcome.report.findings.len(), 1);
    assert_eq!(outcome.report.findings[0].domain, "vanished.test");
    assert_eq!(outcome.domains.len(), 2);
}

#[tokio::test]
async fn expired_whois_record_is_flagged_expired() {
    let manifest = manifest_with_leftpad();
    let registry = FakeRegistry::new(&[("leftpad-lite", &[], &["dev@lapsed.test"])]);
    let whois = FakeWhois::empty().with(
        "lapsed.test",
        WhoisResponse {
            text: "Domain Name: LAPSED.TEST".to_string(),
            expiration_dates: vec![Utc::now() - ChronoDuration::days(3)],
            registrar: Some("Example Registrar".to_string()),
            statuses: vec!["clientHold".to_string()],
        },
    );
    let outcome = depdomains::audit(
        &manifest,
        &registry,
        validator(FakeDns::none(), whois),
        false,
        false,
    )
    .await;

    assert!(outcome.vulnerable());
    assert_eq!(outcome.report.findings[0].label, "expired");
}

#[tokio::test]
async fn healthy_and_ambiguous_domains_produce_no_findings() {
    let manifest = Manifest::from_json(
        r#"{"name": "my-app", "dependencies": {"pkg-a": "*", "pkg-b": "*"}}"#,
        "package.json",
    )
    .unwrap();
    let registry = FakeRegistry::new(&[
        ("pkg-a", &[], &["a@solid.test"]),
        ("pkg-b", &[], &["b@ambiguous.test"]),
    ]);
    let whois = FakeWhois::empty()
        .with(
            "solid.test",
            WhoisResponse {
                text: "Domain Name: SOLID.TEST".to_string(),
                expiration_dates: vec![Utc::now() + ChronoDuration::days(300)],
                registrar: None,
                statuses: vec!["ok".to_string()],
            },
        )
        .with(
            "ambiguous.test",
            WhoisResponse {
                text: "Domain Name: AMBIGUOUS.TEST".to_string(),
                expiration_dates: vec![Utc::now() + ChronoDuration::days(30)],
                registrar: None,
                statuses: vec!["pendingTransfer".to_string()],
            },
        );
    let outcome = depdomains::audit(
        &manifest,
        &registry,
        validator(FakeDns::none(), whois),
        false,
        false,
    )
    .await;

    assert!(!outcome.vulnerable());
    assert_eq!(outcome.report.domains_checked, 2);
}

#[test]
fn manifest_parse_failure_is_fatal() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"{definitely not json").unwrap();
    file.flush().unwrap();
    let err = Manifest::load(file.path()).unwrap_err();
    assert!(err.is_fatal());
}

#[test]
fn manifest_without_name_is_fatal() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(br#"{"dependencies": {"leftpad-lite": "^1.0.0"}}"#)
        .unwrap();
    file.flush().unwrap();
    let err = Manifest::load(file.path()).unwrap_err();
    assert!(err.is_fatal());
    assert!(err.to_string().contains("package name"));
}
