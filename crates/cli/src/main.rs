use clap::Parser;
use dns_by_eye_application::use_cases::TraceOptions;
use dns_by_eye_domain::{CliOverrides, DomainError, HealthScore};
use output::{OutputFormat, Rendered};
use std::process::ExitCode;
use tracing::{error, info};

mod bootstrap;
mod di;
mod output;

const EXIT_PARTIAL: u8 = 1;
const EXIT_INVALID_DOMAIN: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "dns-by-eye")]
#[command(version)]
#[command(about = "Trace the DNS delegation chain of a domain from the root down")]
struct Cli {
    /// Domain to trace
    domain: String,

    /// Report each level as it is resolved
    #[arg(short, long)]
    verbose: bool,

    /// Log every query and attach per-level timings
    #[arg(long)]
    debug: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Ask the last level's nameservers about each other
    #[arg(long)]
    cross_ref: bool,

    /// Compute a delegation health score
    #[arg(long)]
    score: bool,

    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Recursive resolver for nameserver address lookups (repeatable)
    #[arg(short, long = "resolver", value_name = "ADDR")]
    resolvers: Vec<String>,

    /// Per-query timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Total trace budget in milliseconds
    #[arg(long)]
    lifetime_ms: Option<u64>,

    /// Also query IPv6 nameserver addresses
    #[arg(long)]
    ipv6: bool,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            log_level: self.log_level.clone(),
            query_timeout_ms: self.timeout_ms,
            lifetime_ms: self.lifetime_ms,
            glue_resolvers: self.resolvers.clone(),
            ipv6: self.ipv6,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = bootstrap::load_config(cli.config.as_deref(), cli.overrides())?;
    bootstrap::init_logging(&config, cli.verbose, cli.debug);

    info!("Starting dns-by-eye v{}", env!("CARGO_PKG_VERSION"));

    let services = di::TracerServices::new(&config.tracer)?;
    let options = TraceOptions {
        verbose: cli.verbose,
        debug: cli.debug,
    };

    let report = match services.trace.execute(&cli.domain, options).await {
        Ok(report) => report,
        Err(DomainError::InvalidDomainName(reason)) => {
            error!(domain = %cli.domain, "Invalid domain");
            eprintln!("Invalid domain: {}", reason);
            return Ok(ExitCode::from(EXIT_INVALID_DOMAIN));
        }
        Err(e) => return Err(e.into()),
    };

    let cross_references = if cli.cross_ref && !report.last_nameservers().is_empty() {
        Some(
            services
                .cross_reference
                .execute(report.domain(), report.last_nameservers())
                .await,
        )
    } else {
        None
    };

    let health_score = cli
        .score
        .then(|| HealthScore::calculate(report.trace(), cross_references.as_deref()));

    let rendered = Rendered::new(&report, cross_references.as_deref(), health_score.as_ref());
    match cli.format {
        OutputFormat::Json => println!("{}", rendered.to_json()?),
        OutputFormat::Text => print!("{}", rendered.to_text(cli.verbose || cli.debug)),
    }

    if report.is_complete() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_PARTIAL))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "dns-by-eye",
            "--verbose",
            "--format",
            "json",
            "--resolver",
            "9.9.9.9",
            "--resolver",
            "149.112.112.112:53",
            "--timeout-ms",
            "500",
            "apathy.ca",
        ])
        .unwrap();

        assert_eq!(cli.domain, "apathy.ca");
        assert!(cli.verbose);
        assert!(!cli.debug);
        assert_eq!(cli.format, OutputFormat::Json);

        let overrides = cli.overrides();
        assert_eq!(overrides.glue_resolvers, vec!["9.9.9.9", "149.112.112.112:53"]);
        assert_eq!(overrides.query_timeout_ms, Some(500));
        assert_eq!(overrides.lifetime_ms, None);
    }

    #[test]
    fn test_cli_requires_domain() {
        assert!(Cli::try_parse_from(["dns-by-eye", "--score"]).is_err());
    }

    #[test]
    fn test_cli_defaults_to_text() {
        let cli = Cli::try_parse_from(["dns-by-eye", "example.com"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(!cli.cross_ref && !cli.score);
    }
}
