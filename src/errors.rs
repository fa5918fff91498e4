//! Unified error handling.
//!
//! A `thiserror`-based model with:
//!   * Typed variants for common failure domains
//!   * A categorization layer (`ErrorCategory`) for reporting
//!   * Helper constructors
//!   * `From` conversions for common lower-level errors
//!
//! Only the manifest-phase variants are fatal to a scan; every network
//! variant is absorbed at its call site and degrades to a conservative
//! classification (missing dependencies, empty email list, `NotFound`).

use std::io;

use thiserror::Error;

/// High-level classification for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Network,
    Parse,
    Internal,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorCategory::Input => "input",
            ErrorCategory::Network => "network",
            ErrorCategory::Parse => "parse",
            ErrorCategory::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// Primary application error type.
#[derive(Error, Debug)]
pub enum DepdomainsError {
    // ------------------------ Input / Validation ----------------------------
    #[error("Cannot parse package JSON from \"{path}\": {reason}")]
    ManifestParse { path: String, reason: String },

    #[error("package.json at \"{path}\" doesn't contain a package name")]
    MissingPackageName { path: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    // ----------------------------- Network ----------------------------------
    #[error("Registry lookup failed for package '{package}': {reason}")]
    RegistryLookup { package: String, reason: String },

    #[error("DNS {record_type} lookup failed for {domain}: {reason}")]
    DnsResolution {
        domain: String,
        record_type: String,
        reason: String,
    },

    #[error("DNS query timed out after {seconds}s: {query}")]
    DnsTimeout { query: String, seconds: u64 },

    #[error("WHOIS query '{query}' to server '{server}' failed: {reason}")]
    WhoisQuery {
        server: String,
        query: String,
        reason: String,
    },

    // ---------------------------- Parsing -----------------------------------
    #[error("WHOIS response parse failed for '{query}': {reason}")]
    WhoisParse { query: String, reason: String },

    // ----------------------------- I/O / FS ---------------------------------
    #[error("I/O error during {operation} on {path}: {source}")]
    Io {
        path: String,
        operation: String,
        #[source]
        source: io::Error,
    },

    // ---------------------------- Internal ----------------------------------
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl DepdomainsError {
    /// Categorize the error for reporting.
    pub fn category(&self) -> ErrorCategory {
        use DepdomainsError::*;
        match self {
            ManifestParse { .. } | MissingPackageName { .. } | Configuration { .. } => {
                ErrorCategory::Input
            }

            RegistryLookup { .. }
            | DnsResolution { .. }
            | DnsTimeout { .. }
            | WhoisQuery { .. } => ErrorCategory::Network,

            WhoisParse { .. } => ErrorCategory::Parse,

            Io { .. } | Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Fatal errors abort the whole run before any network activity.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DepdomainsError::ManifestParse { .. } | DepdomainsError::MissingPackageName { .. }
        )
    }

    // ---------------------------- Constructors -----------------------------

    pub fn manifest_parse(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ManifestParse {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn missing_package_name(path: impl Into<String>) -> Self {
        Self::MissingPackageName { path: path.into() }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn registry_lookup(package: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::RegistryLookup {
            package: package.into(),
            reason: reason.into(),
        }
    }

    pub fn dns_resolution(
        domain: impl Into<String>,
        record_type: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::DnsResolution {
            domain: domain.into(),
            record_type: record_type.into(),
            reason: reason.into(),
        }
    }

    pub fn dns_timeout(query: impl Into<String>, seconds: u64) -> Self {
        Self::DnsTimeout {
            query: query.into(),
            seconds,
        }
    }

    pub fn whois_query(
        server: impl Into<String>,
        query: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::WhoisQuery {
            server: server.into(),
            query: query.into(),
            reason: reason.into(),
        }
    }

    pub fn whois_parse(query: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::WhoisParse {
            query: query.into(),
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<String>, operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }
}

/// Public result alias.
pub type Result<T> = std::result::Result<T, DepdomainsError>;

impl From<io::Error> for DepdomainsError {
    fn from(e: io::Error) -> Self {
        DepdomainsError::Io {
            path: "<unknown>".into(),
            operation: "unspecified".into(),
            source: e,
        }
    }
}

impl From<tokio::time::error::Elapsed> for DepdomainsError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        // Query string not available at this conversion point; caller should
        // wrap via `dns_timeout` where context is known.
        DepdomainsError::DnsTimeout {
            query: "<unknown>".into(),
            seconds: 0,
        }
    }
}

/// Extension trait for enriching IO results with path + operation context.
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<String>, operation: impl Into<String>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::result::Result<T, io::Error> {
    fn with_path(self, path: impl Into<String>, operation: impl Into<String>) -> Result<T> {
        self.map_err(|e| DepdomainsError::io(path.into(), operation.into(), e))
    }
}
