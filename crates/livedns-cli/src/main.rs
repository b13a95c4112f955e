// # gandi-live-dns
//
// One-shot dynamic-DNS updater for Gandi LiveDNS.
//
// This binary is a THIN integration layer: it reads configuration, sets up
// logging and the runtime, wires one shared HTTP client into the provider
// and the IP source, runs a single reconciliation and maps the outcome to an
// exit code. All update logic lives in livedns-core.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// - `LIVEDNS_API_SECRET`: LiveDNS API key (required)
// - `LIVEDNS_DOMAIN`: Domain holding the records (required)
// - `LIVEDNS_SUBDOMAINS`: Comma-separated subdomains; the first is the reference (required)
// - `LIVEDNS_API_ENDPOINT`: API base URL (default: https://dns.api.gandi.net/api/v5)
// - `LIVEDNS_TTL`: Record TTL in seconds (default: 300)
// - `LIVEDNS_IP_DISCOVERY_URL`: IP echo service (default: https://api.ipify.org)
// - `LIVEDNS_MAX_ATTEMPTS`, `LIVEDNS_BACKOFF_FACTOR_SECS`, `LIVEDNS_HTTP_TIMEOUT_SECS`: transport retry
// - `LIVEDNS_ON_FAILURE`: `continue` (default) or `abort` when a subdomain fails
// - `LIVEDNS_MODE`: set to `dry-run` to skip record updates
// - `LIVEDNS_LOG_LEVEL`: trace, debug, info (default), warn, error
//
// ## Example
//
// ```bash
// export LIVEDNS_API_SECRET=your_key
// export LIVEDNS_DOMAIN=example.com
// export LIVEDNS_SUBDOMAINS=home,office
//
// gandi-live-dns            # update when the IP changed
// gandi-live-dns --force    # update unconditionally
// ```

mod config;

use anyhow::Result;
use clap::Parser;
use config::Config;
use livedns_core::{ReconcileReport, Reconciler, RetryingClient};
use livedns_ip_http::HttpIpSource;
use livedns_provider_gandi::GandiProvider;
use std::process::ExitCode;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Run completed (records current or updated)
/// - 1: Configuration or startup error
/// - 2: Run failed (provider, transport or subdomain failure)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LiveDnsExitCode {
    /// Run completed successfully
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Reconciliation failed
    RunFailed = 2,
}

impl From<LiveDnsExitCode> for ExitCode {
    fn from(code: LiveDnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Gandi LiveDNS dynamic-DNS updater
#[derive(Debug, Parser)]
#[command(name = "gandi-live-dns", version, about)]
struct Cli {
    /// Force an update/create of every subdomain, skipping the IP comparison
    #[arg(short, long)]
    force: bool,

    /// Increase output verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Perform lookups but do not change any record
    #[arg(long)]
    dry_run: bool,
}

/// Resolve the log level from the configured level and `-v` count
fn log_level(configured: &str, verbose: u8) -> Level {
    match verbose {
        0 => match configured.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        },
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration from environment
    let mut config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return LiveDnsExitCode::ConfigError.into();
        }
    };
    config.dry_run |= cli.dry_run;

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return LiveDnsExitCode::ConfigError.into();
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(&config.log_level, cli.verbose))
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return LiveDnsExitCode::ConfigError.into();
    }

    info!(
        "Checking {} subdomain(s) of {}",
        config.subdomains.len(),
        config.domain
    );

    // Single logical actor: a current-thread runtime is enough
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return LiveDnsExitCode::ConfigError.into();
        }
    };

    let result = rt.block_on(run(config, cli.force));

    match &result {
        Ok(report) => log_summary(report),
        Err(e) => error!("Error: {}", e),
    }

    exit_code(&result).into()
}

/// Map the outcome of a run to its exit code
///
/// A completed run with any failed subdomain still counts as a failure.
fn exit_code(result: &Result<ReconcileReport>) -> LiveDnsExitCode {
    match result {
        Ok(report) if report.is_success() => LiveDnsExitCode::Success,
        Ok(_) | Err(_) => LiveDnsExitCode::RunFailed,
    }
}

/// Wire the components and run one reconciliation
async fn run(config: Config, force: bool) -> Result<ReconcileReport> {
    let live_config = config.to_live_config();

    let client = RetryingClient::from_config(&live_config.retry)?;

    let provider = GandiProvider::from_config(client.clone(), &live_config)?
        .with_dry_run(config.dry_run);
    if provider.is_dry_run() {
        warn!("Running in DRY-RUN mode - no records will be changed");
    }

    let ip_source = HttpIpSource::new(client, &live_config.ip_discovery_url);

    let reconciler = Reconciler::new(Box::new(provider), Box::new(ip_source), live_config)?;

    Ok(reconciler.reconcile(force).await?)
}

// Failures were logged as they happened; only the totals remain
fn log_summary(report: &ReconcileReport) {
    info!(
        "Done: {} updated, {} skipped, {} failed (IP {})",
        report.updated_count(),
        report.skipped_count(),
        report.failed_count(),
        report.discovered_ip
    );
}
