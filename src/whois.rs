//! WHOIS registration lookups.
//!
//! Raw WHOIS over TCP port 43. Server discovery starts at the IANA root
//! (`refer:` line) and follows at most one registrar-level referral
//! (`Registrar WHOIS Server:` line), bounded by a configurable depth so a
//! misbehaving registry cannot loop the chain.
//!
//! The client never raises to its caller: any transport or protocol failure
//! is treated as "no data" and narrated when warnings are enabled. The
//! authoritative interpretation of a response (expiry arithmetic, status
//! classification) lives in `domains.rs`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::cli::Verbosity;
use crate::config::NetworkConfig;
use crate::errors::{DepdomainsError, Result};

/// WHOIS TCP port.
const WHOIS_PORT: u16 = 43;

/// Root server used to discover the TLD registry's WHOIS server.
const IANA_WHOIS: &str = "whois.iana.org";

static RE_REFER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^\s*refer:\s*([A-Z0-9._\-]+)\s*$").unwrap());
static RE_REGISTRAR_SERVER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^\s*registrar whois server:\s*(?:whois://)?([A-Z0-9._\-]+)\s*$").unwrap()
});
static RE_REGISTRAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^\s*registrar:\s*(.+?)\s*$").unwrap());
static RE_STATUS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^\s*(?:domain )?status:\s*(\S+)").unwrap());
static RE_EXPIRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?im)^\s*(?:registry expiry date|registrar registration expiration date|expiry date|expiration date|expiration time|expires?(?: date| on)?|paid-till|renewal date)\s*:\s*(.+?)\s*$",
    )
    .unwrap()
});

/// Raw WHOIS text plus the structured fields extracted from it.
#[derive(Debug, Clone, Default)]
pub struct WhoisResponse {
    /// Concatenated response text from every server in the chain.
    pub text: String,
    /// Every expiration date found, in document order.
    pub expiration_dates: Vec<DateTime<Utc>>,
    /// Sponsoring registrar name, if reported.
    pub registrar: Option<String>,
    /// Raw status tokens (first whitespace-delimited token per status line).
    pub statuses: Vec<String>,
}

impl WhoisResponse {
    /// Extract structured fields from raw response text.
    pub fn parse(text: String) -> Self {
        let expiration_dates = RE_EXPIRY
            .captures_iter(&text)
            .filter_map(|cap| parse_whois_date(cap[1].trim()))
            .collect();
        let registrar = RE_REGISTRAR
            .captures(&text)
            .map(|cap| cap[1].trim().to_string());
        let statuses = RE_STATUS
            .captures_iter(&text)
            .map(|cap| cap[1].to_string())
            .collect();
        Self {
            text,
            expiration_dates,
            registrar,
            statuses,
        }
    }
}

/// Parse the date formats commonly seen in WHOIS responses.
/// Date-only formats resolve to midnight UTC.
fn parse_whois_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d-%b-%Y", "%Y.%m.%d", "%d/%m/%Y"];
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
        }
    }
    None
}

/// WHOIS query source, abstracted for deterministic testing.
#[async_trait]
pub trait WhoisLookup: Send + Sync {
    /// Query registration data for `domain`. `None` means the lookup failed
    /// or produced no data; the caller classifies that conservatively.
    async fn query(&self, domain: &str) -> Option<WhoisResponse>;
}

/// Network WHOIS client following the IANA → registry → registrar chain.
pub struct WhoisClient {
    query_timeout: Duration,
    max_depth: usize,
    verbosity: Verbosity,
}

impl WhoisClient {
    pub fn new(network: &NetworkConfig, verbosity: Verbosity) -> Self {
        Self {
            query_timeout: network.whois_timeout,
            max_depth: network.max_whois_depth,
            verbosity,
        }
    }

    /// Perform a basic WHOIS exchange (over TCP 43) with a timeout.
    /// Returns the raw textual response.
    async fn exchange(&self, server: &str, query: &str) -> Result<String> {
        if self.verbosity.show_commands {
            eprintln!("(cmd) whois -h {server} {query}");
        }

        let fail = |reason: String| DepdomainsError::whois_query(server, query, reason);

        let to = self.query_timeout;
        let mut stream = match timeout(to, TcpStream::connect((server, WHOIS_PORT))).await {
            Ok(Ok(s)) => s,
            Ok(Err(e)) => return Err(fail(format!("connect error: {e}"))),
            Err(_) => return Err(fail("connect timeout".into())),
        };

        // Canonical WHOIS: "<query>\r\n"
        let line = format!("{query}\r\n");
        timeout(to, stream.write_all(line.as_bytes()))
            .await
            .map_err(|_| fail("write timeout".into()))?
            .map_err(|e| fail(format!("write error: {e}")))?;

        let mut buf = Vec::new();
        timeout(to, stream.read_to_end(&mut buf))
            .await
            .map_err(|_| fail("read timeout".into()))?
            .map_err(|e| fail(format!("read error: {e}")))?;

        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Walk the referral chain starting at IANA, concatenating every
    /// response so the caller sees both registry- and registrar-level data.
    async fn chain(&self, domain: &str) -> Result<String> {
        let mut server = IANA_WHOIS.to_string();
        let mut combined = String::new();

        for depth in 0..self.max_depth {
            if self.verbosity.trace {
                eprintln!("WHOIS(depth={depth}) server={server} query={domain}");
            }

            let resp = self.exchange(&server, domain).await?;

            let next = RE_REFER
                .captures(&resp)
                .or_else(|| RE_REGISTRAR_SERVER.captures(&resp))
                .and_then(|c| c.get(1).map(|m| m.as_str().to_ascii_lowercase()));

            // IANA's referral block is bookkeeping, not registration data.
            if server != IANA_WHOIS {
                combined.push_str(&resp);
                combined.push('\n');
            }

            match next {
                Some(n) if n != server => {
                    if self.verbosity.trace {
                        eprintln!("  referral to {n}");
                    }
                    server = n;
                }
                _ => break,
            }
        }

        if combined.is_empty() {
            return Err(DepdomainsError::whois_parse(
                domain,
                "no registration data beyond the IANA root",
            ));
        }
        Ok(combined)
    }
}

#[async_trait]
impl WhoisLookup for WhoisClient {
    async fn query(&self, domain: &str) -> Option<WhoisResponse> {
        match self.chain(domain).await {
            Ok(text) => Some(WhoisResponse::parse(text)),
            Err(e) => {
                if self.verbosity.warn {
                    eprintln!("Can't parse {domain}: {e}");
                }
                None
            }
        }
    }
}
