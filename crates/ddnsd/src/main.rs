// # ddnsd - DDNS Daemon
//
// Thin integration layer. All reconcile logic lives in ddns-core; this
// binary only:
// 1. Parses the command line
// 2. Loads and validates the JSON configuration
// 3. Initializes logging and the runtime
// 4. Wires the HTTP IP resolver and the Cloudflare record service into a
//    `Reconciler` and runs it until a fatal error or a shutdown signal
//
// ## Configuration
//
// ```bash
// ddnsd --config /etc/ddns/config.json --log-level debug
// ```
//
// - `DDNS_CONFIG`: alternative to `--config`
// - `DDNS_LOG_LEVEL`: alternative to `--log-level`
// - `DDNS_API_TOKEN`: overrides `ApiToken` from the file

use anyhow::{Context, Result};
use clap::Parser;
use ddns_core::{DdnsConfig, IpVersion, ReconcileEvent, Reconciler};
use ddns_ip_http::HttpIpResolver;
use ddns_provider_cloudflare::CloudflareProvider;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio::sync::mpsc;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Environment variable that overrides the configured API token
const API_TOKEN_ENV: &str = "DDNS_API_TOKEN";

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (fatal provider or network failure)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

#[derive(Parser, Debug)]
#[command(name = "ddnsd")]
#[command(about = "Keep a Cloudflare DNS record pointed at this host's public IP")]
struct Args {
    /// Path to the JSON configuration file
    #[arg(short, long, env = "DDNS_CONFIG", default_value = "./config.json")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "DDNS_LOG_LEVEL", default_value = "info", value_parser = parse_log_level)]
    log_level: Level,
}

fn parse_log_level(value: &str) -> std::result::Result<Level, String> {
    match value.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(format!(
            "'{}' is not valid. Valid levels: trace, debug, info, warn, error",
            value
        )),
    }
}

/// Load the configuration file and apply environment overrides
fn load_config(path: &Path, token_override: Option<String>) -> Result<DdnsConfig> {
    let mut config = DdnsConfig::from_file(path)?;

    if let Some(token) = token_override.filter(|t| !t.is_empty()) {
        config.api_token = token;
    }

    config.validate()?;
    Ok(config)
}

/// Wire the resolver and record service into a reconciler
fn build_reconciler(config: DdnsConfig) -> Result<(Reconciler, mpsc::Receiver<ReconcileEvent>)> {
    let resolver = HttpIpResolver::new(config.ip_api_url.clone())?
        .with_version(IpVersion::for_record_type(&config.record_type));
    info!("Resolving public IP via {}", resolver.url());

    let service = CloudflareProvider::new(config.api_token.clone())?
        .with_base_url(config.api_base_url.clone());

    let pair = Reconciler::new(Box::new(resolver), Box::new(service), config)
        .context("Failed to create reconciler")?;
    Ok(pair)
}

fn main() -> ExitCode {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    let config = match load_config(&args.config, std::env::var(API_TOKEN_ENV).ok()) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    info!("Starting ddnsd daemon");
    info!("Configuration loaded from {}", args.config.display());
    debug!("{:?}", config);

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run_daemon(config)).into()
}

/// Run the daemon until a fatal error or a shutdown signal
async fn run_daemon(config: DdnsConfig) -> DdnsExitCode {
    let (reconciler, events) = match build_reconciler(config) {
        Ok(pair) => pair,
        Err(e) => {
            error!("Startup error: {:#}", e);
            return DdnsExitCode::ConfigError;
        }
    };

    info!(
        "Managing {} record {} in zone {}",
        reconciler.config().record_type,
        reconciler.config().record_name,
        reconciler.config().zone_id
    );

    tokio::spawn(drain_events(events));

    tokio::select! {
        result = reconciler.run() => {
            // `run` only returns on a fatal error
            let Err(e) = result;
            error!("Reconciler stopped: {}", e);
            DdnsExitCode::RuntimeError
        }
        signal = wait_for_shutdown() => match signal {
            Ok(name) => {
                info!("Received shutdown signal: {}", name);
                info!("Shutting down daemon");
                DdnsExitCode::CleanShutdown
            }
            Err(e) => {
                error!("Shutdown error: {:#}", e);
                DdnsExitCode::RuntimeError
            }
        },
    }
}

/// Log reconcile events until the reconciler goes away
async fn drain_events(mut events: mpsc::Receiver<ReconcileEvent>) {
    while let Some(event) = events.recv().await {
        debug!("Reconcile event: {:?}", event);
    }
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm =
        signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?;

    let name = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    Ok(name)
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .context("Failed to wait for CTRL-C")?;
    Ok("SIGINT")
}
