//! DNS presence probing.
//!
//! Implements the resolver fast path: a domain that currently resolves is
//! assumed to be under someone's control and therefore not available for
//! hostile re-registration. The probe tries an ordered list of record types
//! (A, then MX, then NS) and short-circuits on the first success. This is a
//! speed heuristic, not a security guarantee.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use trust_dns_resolver::{
    config::{ResolverConfig, ResolverOpts},
    proto::rr::{Name, RecordType},
    TokioAsyncResolver,
};

use crate::cli::Verbosity;

/// Record types probed, in fallback order. First successful resolution wins.
const PROBE_RECORD_TYPES: [RecordType; 3] = [RecordType::A, RecordType::MX, RecordType::NS];

/// Yes/no DNS presence check, abstracted for deterministic testing.
#[async_trait]
pub trait DnsProbe: Send + Sync {
    /// True if the domain resolves for any of the probed record types.
    /// Resolution failures and timeouts count as "does not resolve".
    async fn resolves(&self, domain: &str) -> bool;
}

/// `DnsProbe` backed by the system resolver configuration.
pub struct ResolverProbe {
    resolver: TokioAsyncResolver,
    query_timeout: Duration,
    verbosity: Verbosity,
}

impl ResolverProbe {
    pub fn new(query_timeout: Duration, verbosity: Verbosity) -> Self {
        let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());
        Self {
            resolver,
            query_timeout,
            verbosity,
        }
    }

    /// Probe a single record type; any error or timeout is a miss.
    async fn probe(&self, domain: &str, record_type: RecordType) -> bool {
        if self.verbosity.show_commands {
            eprintln!("(cmd) dig {domain} {record_type}");
        }

        let name = match Name::from_ascii(domain) {
            Ok(name) => name,
            Err(e) => {
                if self.verbosity.trace {
                    eprintln!("  invalid domain name {domain}: {e}");
                }
                return false;
            }
        };

        match timeout(self.query_timeout, self.resolver.lookup(name, record_type)).await {
            Ok(Ok(answer)) => answer.iter().next().is_some(),
            Ok(Err(e)) => {
                if self.verbosity.trace {
                    eprintln!("  {record_type} lookup failed for {domain}: {e}");
                }
                false
            }
            Err(_) => {
                if self.verbosity.trace {
                    eprintln!("  {record_type} lookup timeout for {domain}");
                }
                false
            }
        }
    }
}

#[async_trait]
impl DnsProbe for ResolverProbe {
    async fn resolves(&self, domain: &str) -> bool {
        for record_type in PROBE_RECORD_TYPES {
            if self.probe(domain, record_type).await {
                if self.verbosity.trace {
                    eprintln!("  {domain} resolves ({record_type})");
                }
                return true;
            }
        }
        false
    }
}
