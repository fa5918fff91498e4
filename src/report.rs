//! Risk reporting.
//!
//! Runs the domain validator over every discovered contact domain and
//! reports the ones found expired or unregistered, together with the full
//! set of packages whose maintainer addresses use that domain. `Unknown` is
//! deliberately not flagged: ambiguous WHOIS data must not raise alarms.

use std::collections::{BTreeMap, BTreeSet};

use anstyle::{AnsiColor, Color, Style};

use crate::domains::{DomainStatus, DomainValidator};

/// One flagged domain with its affected packages.
#[derive(Debug, Clone)]
pub struct Finding {
    pub domain: String,
    pub status: DomainStatus,
    pub label: &'static str,
    pub packages: BTreeSet<String>,
}

/// Outcome of a full domain scan.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub findings: Vec<Finding>,
    pub domains_checked: usize,
}

impl ScanReport {
    /// True iff at least one domain was flagged.
    pub fn vulnerable(&self) -> bool {
        !self.findings.is_empty()
    }
}

/// Terminal style palette.
struct Styles {
    danger: Style,
    success: Style,
    muted: Style,
}

impl Default for Styles {
    fn default() -> Self {
        Self {
            danger: Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
            success: Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
            muted: Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack))),
        }
    }
}

/// Scans domains and prints findings as it goes.
pub struct Reporter {
    validator: DomainValidator,
    styles: Styles,
    use_colors: bool,
    narrate: bool,
}

impl Reporter {
    pub fn new(validator: DomainValidator) -> Self {
        Self {
            validator,
            styles: Styles::default(),
            use_colors: Self::should_use_colors(),
            narrate: true,
        }
    }

    /// Disable colored output (also controlled by NO_COLOR / non-tty).
    pub fn without_colors(mut self) -> Self {
        self.use_colors = false;
        self
    }

    /// Disable console output entirely (library use; findings are returned,
    /// not printed).
    pub fn quiet(mut self) -> Self {
        self.narrate = false;
        self
    }

    fn should_use_colors() -> bool {
        atty::is(atty::Stream::Stdout) && std::env::var("NO_COLOR").is_err()
    }

    fn styled(&self, text: &str, style: &Style) -> String {
        if self.use_colors {
            format!("{}{}{}", style.render(), text, style.render_reset())
        } else {
            text.to_string()
        }
    }

    /// Validate every domain in the mapping and report the vulnerable ones.
    ///
    /// Domains are processed in mapping order, one at a time. Each flagged
    /// domain is printed the moment it is classified, so a long scan shows
    /// findings early.
    pub async fn scan(
        &self,
        domains: &BTreeMap<String, BTreeSet<String>>,
        resolve_first: bool,
    ) -> ScanReport {
        let mut report = ScanReport {
            domains_checked: domains.len(),
            ..Default::default()
        };

        for (domain, packages) in domains {
            if self.narrate {
                println!(
                    "{}",
                    self.styled(&format!("Validating domain {domain}..."), &self.styles.muted)
                );
            }

            let status = self.validator.classify(domain, resolve_first).await;
            let Some(label) = status.finding_label() else {
                continue;
            };

            if self.narrate {
                println!(
                    "{}",
                    self.styled(&format!("The domain {domain} is {label}"), &self.styles.danger)
                );
                let affected = packages.iter().cloned().collect::<Vec<_>>().join(", ");
                println!("Affected packages: {affected}\n");
            }

            report.findings.push(Finding {
                domain: domain.clone(),
                status,
                label,
                packages: packages.clone(),
            });
        }

        report
    }

    /// Print the all-clear summary for a scan with no findings.
    pub fn print_all_clear(&self, package_name: &str) {
        println!(
            "{}",
            self.styled(
                &format!("All domains for package \"{package_name}\" are safe"),
                &self.styles.success
            )
        );
    }
}
