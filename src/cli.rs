use clap::Parser;

/// Command-line interface definition.
///
/// Verbosity levels:
/// 0 - silent (only findings and the final summary)
/// 1 - errors (default)
/// 2 - warnings + errors
/// 5 - trace/debug
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Audit npm dependency maintainer domains for expired or unregistered registrations"
)]
pub struct Cli {
    /// Path to the package.json manifest whose dependencies should be audited.
    pub manifest: String,

    /// Only audit direct dependencies, skipping the transitive closure.
    #[arg(long = "no-indirect", default_value_t = false)]
    pub no_indirect: bool,

    /// Skip the DNS fast-path and always consult WHOIS (slower, more thorough).
    #[arg(long = "no-resolve-first", default_value_t = false)]
    pub no_resolve_first: bool,

    /// Additional whitelisted domains that are never flagged (repeatable).
    #[arg(long = "whitelist", value_name = "DOMAIN")]
    pub whitelist: Vec<String>,

    /// Verbosity level (0,1,2,5)
    #[arg(long, default_value_t = 1)]
    pub verbose: u8,

    /// Show approximate shell-equivalent commands for network queries
    #[arg(long)]
    pub show_commands: bool,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,
}

impl Cli {
    /// Parse CLI arguments from process args.
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Follow transitive dependencies?
    pub fn follow_indirect(&self) -> bool {
        !self.no_indirect
    }

    /// Try DNS resolution before issuing WHOIS queries?
    pub fn resolve_first(&self) -> bool {
        !self.no_resolve_first
    }

    /// Convenience: are we in very verbose/debug mode?
    pub fn is_trace(&self) -> bool {
        self.verbose >= 5
    }

    /// Are warning-level messages enabled?
    pub fn warn_enabled(&self) -> bool {
        self.verbose >= 2
    }

    /// Are error-level messages enabled?
    pub fn error_enabled(&self) -> bool {
        self.verbose >= 1
    }

    /// Narration settings handed to the network clients.
    pub fn verbosity(&self) -> Verbosity {
        Verbosity {
            show_commands: self.show_commands,
            trace: self.is_trace(),
            warn: self.warn_enabled(),
        }
    }
}

/// Narration toggles decoupled from the concrete CLI type, so the network
/// clients (registry, DNS, WHOIS) stay reusable from library code and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct Verbosity {
    /// Show approximate shell-equivalent commands for network queries.
    pub show_commands: bool,
    /// Trace-level narration of every query and intermediate result.
    pub trace: bool,
    /// Warning-level narration of absorbed failures.
    pub warn: bool,
}

impl Verbosity {
    /// No narration at all; the default for library use.
    pub fn silent() -> Self {
        Self::default()
    }
}
