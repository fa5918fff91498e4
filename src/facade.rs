//! High-level audit entry points.
//!
//! Abstracts the orchestration otherwise confined to the binary's `main.rs`
//! and offers a stable API for embedding inside other Rust applications.
//! Console side effects are excluded here; callers that want narration pass
//! a per-package callback.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use async_trait::async_trait;

use crate::domains::{email_domain, DomainValidator};
use crate::graph::{walk, NoSuccessors, Successors};
use crate::manifest::Manifest;
use crate::registry::PackageRegistry;
use crate::report::{Reporter, ScanReport};

/// Successor source that follows a package's registry dependency list.
pub struct FollowDependencies<'a, R: ?Sized>(pub &'a R);

#[async_trait]
impl<'a, R: PackageRegistry + ?Sized> Successors for FollowDependencies<'a, R> {
    async fn successors(&self, package: &str) -> HashSet<String> {
        self.0.dependencies(package).await
    }
}

/// Walk the dependency graph from `seeds` and invert maintainer emails into
/// a domain → affected-package-set mapping.
///
/// `on_package` is invoked once per visited package, before its maintainer
/// records are fetched, for progress narration.
pub async fn collect_domains<R, F>(
    seeds: Vec<String>,
    registry: &R,
    follow_indirect: bool,
    mut on_package: F,
) -> BTreeMap<String, BTreeSet<String>>
where
    R: PackageRegistry + ?Sized,
    F: FnMut(&str),
{
    let visited = if follow_indirect {
        walk(seeds, &FollowDependencies(registry)).await
    } else {
        walk(seeds, &NoSuccessors).await
    };

    let mut domains: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for package in visited {
        on_package(&package);
        for email in registry.maintainer_emails(&package).await {
            if let Some(domain) = email_domain(&email) {
                domains
                    .entry(domain.to_string())
                    .or_default()
                    .insert(package.clone());
            }
        }
    }
    domains
}

/// Result of a full manifest audit.
#[derive(Debug, Clone)]
pub struct AuditOutcome {
    /// The audited package's own name.
    pub package: String,
    /// Number of declared direct dependencies.
    pub direct_count: usize,
    /// Discovered domain → affected-package-set mapping.
    pub domains: BTreeMap<String, BTreeSet<String>>,
    /// Scan result over the discovered domains.
    pub report: ScanReport,
}

impl AuditOutcome {
    /// True iff at least one domain was flagged.
    pub fn vulnerable(&self) -> bool {
        self.report.vulnerable()
    }
}

/// Audit a parsed manifest end to end, without console output.
pub async fn audit<R: PackageRegistry + ?Sized>(
    manifest: &Manifest,
    registry: &R,
    validator: DomainValidator,
    follow_indirect: bool,
    resolve_first: bool,
) -> AuditOutcome {
    let seeds = manifest.direct_dependencies();
    let direct_count = seeds.len();
    let domains = collect_domains(seeds, registry, follow_indirect, |_| {}).await;
    let report = Reporter::new(validator)
        .without_colors()
        .quiet()
        .scan(&domains, resolve_first)
        .await;

    AuditOutcome {
        package: manifest.name().to_string(),
        direct_count,
        domains,
        report,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// In-memory registry: package → (dependencies, maintainer emails).
    pub(crate) struct FakeRegistry {
        pub packages: HashMap<String, (Vec<String>, Vec<String>)>,
    }

    impl FakeRegistry {
        pub fn new(entries: &[(&str, &[&str], &[&str])]) -> Self {
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

    #[tokio::test]
    async fn domains_invert_to_package_sets() {
        let registry = FakeRegistry::new(&[
            ("a", &["b"], &["dev@shared.test"]),
            ("b", &[], &["dev@shared.test", "other@solo.test"]),
        ]);
        let domains =
            collect_domains(vec!["a".to_string()], &registry, true, |_| {}).await;
        assert_eq!(domains.len(), 2);
        assert_eq!(domains["shared.test"].len(), 2);
        assert_eq!(domains["solo.test"].len(), 1);
    }

    #[tokio::test]
    async fn direct_only_skips_transitive_maintainers() {
        let registry = FakeRegistry::new(&[
            ("a", &["b"], &["dev@direct.test"]),
            ("b", &[], &["dev@transitive.test"]),
        ]);
        let domains =
            collect_domains(vec!["a".to_string()], &registry, false, |_| {}).await;
        assert!(domains.contains_key("direct.test"));
        assert!(!domains.contains_key("transitive.test"));
    }

    #[tokio::test]
    async fn addresses_without_at_contribute_nothing() {
        let registry = FakeRegistry::new(&[("a", &[], &["not-an-email"])]);
        let domains =
            collect_domains(vec!["a".to_string()], &registry, false, |_| {}).await;
        assert!(domains.is_empty());
    }

    #[tokio::test]
    async fn unknown_packages_are_tolerated() {
        let registry = FakeRegistry::new(&[("a", &["ghost"], &["dev@known.test"])]);
        let mut narrated = Vec::new();
        let domains = collect_domains(vec!["a".to_string()], &registry, true, |p| {
            narrated.push(p.to_string())
        })
        .await;
        assert_eq!(narrated.len(), 2);
        assert_eq!(domains.len(), 1);
    }
}
