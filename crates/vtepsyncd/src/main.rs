//! VTEP Flood-List Synchronization Daemon Entry Point

use clap::Parser;
use sonic_vtepsyncd::config_file::{read_password_file, DEFAULT_CONFIG_PATH};
use sonic_vtepsyncd::{
    CycleReport, EapiClient, RuntimeConfig, VtepSync, VtepsyncConfig, VtepsyncError,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Exit code when a cycle completed but some flood-list changes were rejected
const EXIT_PARTIAL: u8 = 2;

/// Synchronize a VXLAN flood list with VTEPs advertised under a BGP community
#[derive(Parser, Debug)]
#[command(name = "vtepsyncd")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// BGP community attribute to parse, in format 16bit:16bit
    #[arg(short = 'c', long)]
    community: Option<String>,

    /// Username for the command API
    #[arg(short = 'u', long = "user")]
    username: Option<String>,

    /// File holding the command API password
    #[arg(long)]
    password_file: Option<PathBuf>,

    /// Command API endpoint
    #[arg(long)]
    url: Option<String>,

    /// VXLAN interface holding the flood list
    #[arg(short = 'i', long)]
    interface: Option<String>,

    /// Seconds between reconciliation cycles
    #[arg(long)]
    interval: Option<u64>,

    /// Run a single reconciliation cycle and exit
    #[arg(long)]
    once: bool,

    /// Verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let runtime = match load_config(&args) {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "vtepsyncd: Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    info!(
        community = %runtime.sync.community,
        interface = %runtime.sync.interface,
        endpoint = %runtime.eapi.url,
        "vtepsyncd: Starting flood list synchronization"
    );

    let client = match EapiClient::new(runtime.eapi.clone()) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "vtepsyncd: Failed to create command API client");
            return ExitCode::FAILURE;
        }
    };
    let sync = VtepSync::new(client, runtime.sync.clone());

    if args.once {
        return match sync.run_cycle().await {
            Ok(report) => report_exit_code(&report),
            Err(e) => {
                log_cycle_error(&e);
                ExitCode::FAILURE
            }
        };
    }

    run_daemon(&sync, &runtime).await;
    info!("vtepsyncd: Daemon exiting");
    ExitCode::SUCCESS
}

/// Initialize structured logging; RUST_LOG takes precedence over --verbose
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .compact()
        .init();
}

/// Merge the config file with command line overrides and validate
fn load_config(args: &Args) -> Result<RuntimeConfig, VtepsyncError> {
    let mut config = VtepsyncConfig::load_or_default(&args.config)?;

    if let Some(community) = &args.community {
        config.sync.community = community.clone();
    }
    if let Some(username) = &args.username {
        config.device.username = Some(username.clone());
    }
    if let Some(path) = &args.password_file {
        config.device.password = Some(read_password_file(path)?);
    }
    if let Some(url) = &args.url {
        config.device.url = url.clone();
    }
    if let Some(interface) = &args.interface {
        config.sync.interface = interface.clone();
    }
    if let Some(interval) = args.interval {
        config.sync.poll_interval_secs = interval;
    }

    config.validate()
}

/// Poll until shutdown; cycles never overlap
async fn run_daemon(sync: &VtepSync<EapiClient>, runtime: &RuntimeConfig) {
    let mut ticker = tokio::time::interval(runtime.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("vtepsyncd: Received shutdown signal");
                break;
            }
            _ = ticker.tick() => {
                match sync.run_cycle().await {
                    Ok(report) => {
                        info!(
                            desired = report.desired.len(),
                            configured = report.actual.len(),
                            applied = report.applied.len(),
                            failed = report.failed.len(),
                            "vtepsyncd: Reconciliation cycle complete"
                        );
                    }
                    Err(e) => {
                        log_cycle_error(&e);
                    }
                }
            }
        }
    }
}

/// Log an aborted cycle; failures that polling cannot fix are raised to error
fn log_cycle_error(e: &VtepsyncError) -> CycleErrorKind {
    if e.is_retryable() {
        warn!(
            error = %e,
            retryable = true,
            "vtepsyncd: Reconciliation cycle aborted, retrying next interval"
        );
        CycleErrorKind::Transient
    } else {
        error!(
            error = %e,
            retryable = false,
            "vtepsyncd: Reconciliation cycle aborted, operator action required"
        );
        CycleErrorKind::Permanent
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CycleErrorKind {
    Transient,
    Permanent,
}

fn report_exit_code(report: &CycleReport) -> ExitCode {
    if report.is_converged() {
        ExitCode::SUCCESS
    } else {
        for failed in &report.failed {
            error!(
                action = %failed.change.action,
                address = %failed.change.address,
                error = %failed.error,
                "vtepsyncd: Change not applied"
            );
        }
        ExitCode::from(EXIT_PARTIAL)
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "vtepsyncd: Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "vtepsyncd: Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
