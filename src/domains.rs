//! Domain risk classification.
//!
//! The decision core of the tool: given a maintainer contact domain,
//! determine whether it is actively registered, expired, unregistered, or
//! indeterminate. DNS presence serves as an optional fast path; WHOIS
//! registration metadata is the authoritative source.
//!
//! The classifier never raises: every transport or parse failure along the
//! way degrades to a conservative status.

use chrono::{DateTime, Utc};

use crate::dns::DnsProbe;
use crate::whois::{WhoisLookup, WhoisResponse};

/// Domains that are never at risk of hostile re-registration in this threat
/// model (large shared mail providers). Suppresses false positives.
pub const DOMAIN_WHITELIST: &[&str] = &[
    "gmail.com",
    "googlemail.com",
    "outlook.com",
    "hotmail.com",
    "yahoo.com",
    "icloud.com",
    "protonmail.com",
];

/// Raw-text signatures indicating the registry has no record of the domain.
const NOT_FOUND_SIGNATURES: &[&str] = &["not found", "no data found", "available for registration"];

/// Status token prefixes that mean the registration is healthy.
const OK_STATUS_PREFIXES: &[&str] = &[
    "ok",
    "active",
    "clientTransferProhibited",
    "clientUpdateProhibited",
];

/// Status token prefixes marking post-expiry lifecycle states.
const EXPIRED_STATUS_PREFIXES: &[&str] = &["redemptionPeriod", "pendingDelete"];

/// Classification of a contact domain's registration state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainStatus {
    /// Registered and healthy, resolvable via DNS, or whitelisted.
    Ok,
    /// No WHOIS record, or the response matches an "unregistered" signature.
    NotFound,
    /// Expiration at or before the evaluation instant, or a redemption /
    /// pending-delete lifecycle status.
    Expired,
    /// A record exists but the status is ambiguous and not expired.
    Unknown,
}

impl DomainStatus {
    /// Human-readable label for flagged statuses; healthy and inconclusive
    /// states produce no finding.
    pub fn finding_label(&self) -> Option<&'static str> {
        match self {
            DomainStatus::NotFound => Some("not registered"),
            DomainStatus::Expired => Some("expired"),
            DomainStatus::Ok | DomainStatus::Unknown => None,
        }
    }
}

/// Classify a single raw WHOIS status token by prefix.
///
/// First-match-wins over the prefix lists, in order; prefixes are
/// case-sensitive as status tokens are EPP-standardized.
pub fn classify_status_token(token: &str) -> DomainStatus {
    if OK_STATUS_PREFIXES.iter().any(|p| token.starts_with(p)) {
        return DomainStatus::Ok;
    }
    if EXPIRED_STATUS_PREFIXES.iter().any(|p| token.starts_with(p)) {
        return DomainStatus::Expired;
    }
    DomainStatus::Unknown
}

/// Extract the domain part of a maintainer email address (after the first
/// `@`). Addresses without an `@`, or with nothing after it, contribute no
/// domain.
pub fn email_domain(email: &str) -> Option<&str> {
    match email.split_once('@') {
        Some((_, domain)) if !domain.is_empty() => Some(domain),
        _ => None,
    }
}

/// Ephemeral interpretation of a WHOIS response for one domain.
/// Computed fresh per domain per run; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRecord {
    /// Whole days until expiration, floored; negative means past expiry.
    pub days_to_expire: i64,
    /// Expiration date formatted day/month/year.
    pub expiration_date: String,
    /// Sponsoring registrar, if reported.
    pub registrar: Option<String>,
    /// Raw status tokens from the response.
    pub statuses: Vec<String>,
}

impl DomainRecord {
    /// Interpret a WHOIS response at the given instant.
    ///
    /// Returns None (meaning "no usable record") when the raw text carries
    /// an unregistered signature or no expiration date was reported. When
    /// several expiration dates are present the first one wins.
    pub fn from_response(response: &WhoisResponse, now: DateTime<Utc>) -> Option<Self> {
        let lowered = response.text.to_lowercase();
        if NOT_FOUND_SIGNATURES.iter().any(|sig| lowered.contains(sig)) {
            return None;
        }

        let expiration = *response.expiration_dates.first()?;

        // Floor of the time delta in days; chrono's num_days truncates
        // toward zero, which would round -1.5 days up to -1.
        let days_to_expire = (expiration - now).num_seconds().div_euclid(86_400);

        Some(Self {
            days_to_expire,
            expiration_date: expiration.format("%-d/%-m/%Y").to_string(),
            registrar: response.registrar.clone(),
            statuses: response.statuses.clone(),
        })
    }

    /// Classify the record.
    ///
    /// An explicit "ok"-prefixed status token takes precedence over every
    /// other signal, including expiry arithmetic. Redemption-period and
    /// pending-delete tokens mark the domain expired even when the reported
    /// expiration date is still ahead.
    pub fn classify(&self) -> DomainStatus {
        if self.statuses.iter().any(|s| s.starts_with("ok")) {
            return DomainStatus::Ok;
        }
        if self
            .statuses
            .iter()
            .any(|s| classify_status_token(s) == DomainStatus::Expired)
        {
            return DomainStatus::Expired;
        }
        if self.days_to_expire <= 0 {
            return DomainStatus::Expired;
        }
        DomainStatus::Unknown
    }
}

/// Resolver combining whitelist, DNS fast path and WHOIS interpretation.
pub struct DomainValidator {
    whitelist: Vec<String>,
    dns: Box<dyn DnsProbe>,
    whois: Box<dyn WhoisLookup>,
}

impl DomainValidator {
    pub fn new(
        whitelist: Vec<String>,
        dns: Box<dyn DnsProbe>,
        whois: Box<dyn WhoisLookup>,
    ) -> Self {
        Self {
            whitelist,
            dns,
            whois,
        }
    }

    /// Classify a domain at the current instant.
    pub async fn classify(&self, domain: &str, resolve_first: bool) -> DomainStatus {
        self.classify_at(domain, resolve_first, Utc::now()).await
    }

    /// Classify a domain at an explicit evaluation instant.
    ///
    /// Steps, in order: whitelist, optional DNS presence short-circuit,
    /// WHOIS interpretation. Always returns one of the four statuses.
    pub async fn classify_at(
        &self,
        domain: &str,
        resolve_first: bool,
        now: DateTime<Utc>,
    ) -> DomainStatus {
        if self.whitelist.iter().any(|d| d == domain) {
            return DomainStatus::Ok;
        }

        // A resolving domain is assumed to be under someone's control and
        // therefore not available for re-registration. Heuristic only: a
        // domain in its expiry grace period may still resolve.
        if resolve_first && self.dns.resolves(domain).await {
            return DomainStatus::Ok;
        }

        let Some(response) = self.whois.query(domain).await else {
            return DomainStatus::NotFound;
        };
        match DomainRecord::from_response(&response, now) {
            Some(record) => record.classify(),
            None => DomainStatus::NotFound,
        }
    }
}
