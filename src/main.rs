mod cli;
mod config;
mod dns;
mod domains;
mod errors;
mod facade;
mod graph;
mod manifest;
mod registry;
mod report;
mod whois;

use cli::Cli;
use config::Config;
use dns::ResolverProbe;
use domains::DomainValidator;
use errors::Result;
use manifest::Manifest;
use registry::NpmRegistry;
use report::Reporter;
use whois::WhoisClient;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    let mut config = Config::from_env();
    config.merge_with_cli(&cli);
    if let Err(e) = config.validate() {
        if cli.error_enabled() {
            eprintln!("{e}");
        }
        return Ok(());
    }

    // Manifest problems are the only fatal failures: nothing has been
    // fetched yet and there is nothing meaningful to scan.
    let manifest = match Manifest::load(&cli.manifest) {
        Ok(m) => m,
        Err(e) => {
            if cli.error_enabled() {
                eprintln!("{e}");
            }
            return Ok(());
        }
    };

    let direct = manifest.direct_dependencies();
    println!(
        "Package \"{}\" depends on {} direct packages",
        manifest.name(),
        direct.len()
    );

    let verbosity = cli.verbosity();
    let registry = match NpmRegistry::new(&config.network, verbosity) {
        Ok(r) => r,
        Err(e) => {
            if cli.error_enabled() {
                eprintln!("Cannot build registry client: {e}");
            }
            return Ok(());
        }
    };

    // Phase 1: walk the dependency graph and invert maintainer emails into
    // domain -> affected packages.
    let domains = facade::collect_domains(direct, &registry, config.scan.follow_indirect, |pkg| {
        println!("Fetching domains for package \"{pkg}\"...");
    })
    .await;
    println!("Found {} domains", domains.len());

    // Phase 2: classify every domain and report findings as they appear.
    let validator = DomainValidator::new(
        config.scan.whitelist.clone(),
        Box::new(ResolverProbe::new(config.network.dns_timeout, verbosity)),
        Box::new(WhoisClient::new(&config.network, verbosity)),
    );
    let mut reporter = Reporter::new(validator);
    if cli.no_color {
        reporter = reporter.without_colors();
    }

    let report = reporter.scan(&domains, config.scan.resolve_first).await;
    if !report.vulnerable() {
        reporter.print_all_clear(manifest.name());
    }

    Ok(())
}
