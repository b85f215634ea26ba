//! Threat-intel lookup CLI.
//!
//! Stands in for the HTTP boundary: validates the input address, rejects
//! private/reserved ranges, runs one aggregated lookup and prints the report
//! as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::process::ExitCode;
use threat_intel::{classify, Config, IpClass, ThreatIntelAggregator};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "threat-intel")]
#[command(about = "Look up IP reputation across AbuseIPDB, IPQualityScore, ip-api.com and VirusTotal")]
#[command(version)]
struct Args {
    /// Public IPv4 address to look up
    #[arg(value_name = "IP", required_unless_present_any = ["print_config", "validate"])]
    ip: Option<String>,

    /// Path to configuration file
    #[arg(short, long, default_value = "threat-intel.yaml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'L', long, default_value = "warn")]
    log_level: String,

    /// Print example configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Validate configuration and exit
    #[arg(long)]
    validate: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Handle --print-config
    if args.print_config {
        println!("{}", Config::example());
        return Ok(ExitCode::SUCCESS);
    }

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Load configuration
    info!(config = %args.config.display(), "Loading configuration");
    let config = Config::load(&args.config)?;

    // Handle --validate
    if args.validate {
        info!("Configuration is valid");
        return Ok(ExitCode::SUCCESS);
    }

    let ip = args.ip.context("an IP address is required")?;

    // Boundary validation: well-formed IPv4, then the routability gate.
    // The classifier itself fails open on malformed input, so the format
    // check has to happen here.
    if ip.parse::<Ipv4Addr>().is_err() {
        anyhow::bail!("'{ip}' is not a valid IPv4 address");
    }

    if let IpClass::Private { reason } = classify(&ip) {
        anyhow::bail!("{reason}");
    }

    let aggregator = ThreatIntelAggregator::new(&config);

    match aggregator.lookup(&ip).await {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            warn!(ip = %ip, error = %e, "lookup failed");
            eprintln!("{e}; try again in 60 seconds");
            Ok(ExitCode::FAILURE)
        }
    }
}
