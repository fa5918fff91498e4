//! Dependency graph traversal.
//!
//! The graph is never materialized: it is defined lazily by a successor
//! source that maps a package to its direct dependencies. The walker keeps a
//! work list and a visited set, so cyclic graphs (self-referential or
//! mutually-referential packages) terminate and every reachable package is
//! visited exactly once. Sibling visitation order is unspecified.

use std::collections::HashSet;

use async_trait::async_trait;

/// Source of direct successors for a package in the dependency graph.
///
/// Implementations must absorb their own failures: a package whose
/// dependencies cannot be determined simply has none.
#[async_trait]
pub trait Successors: Send + Sync {
    async fn successors(&self, package: &str) -> HashSet<String>;
}

/// Successor source that returns no successors for any package.
///
/// Used when indirect-dependency following is disabled, so the walk yields
/// exactly the seed set.
pub struct NoSuccessors;

#[async_trait]
impl Successors for NoSuccessors {
    async fn successors(&self, _package: &str) -> HashSet<String> {
        HashSet::new()
    }
}

/// Walk the dependency graph from `seeds`, returning every reachable
/// package exactly once, in visit order.
///
/// The work list is popped from the back; successors are pushed only if not
/// yet seen. Only the set of returned packages is contractual.
pub async fn walk<S>(seeds: Vec<String>, next: &S) -> Vec<String>
where
    S: Successors + ?Sized,
{
    let mut queue = seeds;
    let mut visited: HashSet<String> = HashSet::new();
    let mut order = Vec::new();

    while let Some(package) = queue.pop() {
        if !visited.insert(package.clone()) {
            continue;
        }
        for succ in next.successors(&package).await {
            if !visited.contains(&succ) {
                queue.push(succ);
            }
        }
        order.push(package);
    }

    order
}
