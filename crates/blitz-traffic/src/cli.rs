//! CLI module for blitz-traffic.
//!
//! Usable as the standalone `blitz-traffic` binary or as the `traffic`
//! subcommand of the unified `blitz` CLI.
//!
//! # Usage
//!
//! ```bash
//! # Reconcile and print the traffic table
//! blitz-traffic status
//!
//! # Reconcile silently (cron / timers)
//! blitz-traffic status --no-gui
//!
//! # Block and kick users over quota or past expiration
//! blitz-traffic kick-expired
//!
//! # Reconcile and enforce every minute until interrupted
//! blitz-traffic schedule
//! ```

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use blitz_config::{
    CliOverrides, LoggingConfig, PanelConfig, apply_overrides, load_config_or_default,
    validate_config,
};
use blitz_stats::{HttpStatsClient, StatsApi};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    EnforcementCoordinator, RunOutcome, TrafficReconciler, UserRegistry, kick_single_account,
    reset_account, run_scheduler, traffic_table,
};

/// Traffic engine CLI arguments.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "blitz-traffic",
    version,
    about = "Hysteria2 traffic accounting and quota enforcement"
)]
pub struct TrafficArgs {
    /// Panel config file path (toml/json/jsonc/yaml); missing means defaults
    #[arg(short, long, env = "BLITZ_CONFIG", default_value = "/etc/hysteria/blitz.toml")]
    pub config: PathBuf,

    #[command(flatten)]
    pub overrides: CliOverrides,

    #[command(subcommand)]
    pub command: TrafficCommands,
}

/// Traffic CLI subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum TrafficCommands {
    /// Reconcile counters from the stats API and print the traffic table.
    Status {
        /// Reconcile only, print nothing.
        #[arg(long)]
        no_gui: bool,
    },

    /// Print the traffic table from the registry without contacting the API.
    Show,

    /// Block and kick every user over quota or past expiration.
    KickExpired,

    /// Disconnect one user. The registry is not modified.
    KickUser {
        /// Username to kick.
        username: String,
    },

    /// Zero a user's usage, unblock it and restart its expiration clock.
    Reset {
        /// Username to reset.
        username: String,
    },

    /// Reconcile (and enforce) periodically until SIGINT/SIGTERM.
    Schedule,
}

/// Run the traffic CLI with the given arguments.
///
/// Used by both the standalone binary and the unified blitz CLI.
pub async fn run(args: TrafficArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config_or_default(&args.config)?;
    apply_overrides(&mut config, &args.overrides);
    validate_config(&config)?;

    init_tracing(&config.logging);

    match args.command {
        TrafficCommands::Status { no_gui } => status(&config, no_gui).await,
        TrafficCommands::Show => {
            let accounts = UserRegistry::new(&config).load_or_empty().await?;
            println!("{}", traffic_table(&accounts));
            Ok(())
        }
        TrafficCommands::KickExpired => kick_expired(&config).await,
        TrafficCommands::KickUser { username } => {
            kick_single_account(&config, &username).await?;
            println!("User {username} kicked.");
            Ok(())
        }
        TrafficCommands::Reset { username } => match reset_account(&config, &username).await? {
            RunOutcome::Completed(()) => {
                println!("Traffic reset for {username}.");
                Ok(())
            }
            RunOutcome::Busy => {
                report_busy();
                Ok(())
            }
        },
        TrafficCommands::Schedule => schedule(config).await,
    }
}

async fn status(config: &PanelConfig, no_gui: bool) -> Result<(), Box<dyn std::error::Error>> {
    let stats = HttpStatsClient::from_config(config)?;
    match TrafficReconciler::new(config).reconcile(&stats).await? {
        RunOutcome::Completed(accounts) => {
            if !no_gui {
                println!("{}", traffic_table(&accounts));
            }
        }
        RunOutcome::Busy => report_busy(),
    }
    Ok(())
}

async fn kick_expired(config: &PanelConfig) -> Result<(), Box<dyn std::error::Error>> {
    let stats = HttpStatsClient::from_config(config)?;
    match EnforcementCoordinator::new(config).enforce(&stats).await? {
        RunOutcome::Completed(report) => {
            if report.blocked.is_empty() {
                println!("No users to block ({} checked).", report.evaluated);
            } else {
                println!(
                    "Blocked {} user(s): {}",
                    report.blocked.len(),
                    report.blocked.join(", ")
                );
                if report.failed_batches > 0 {
                    eprintln!(
                        "Warning: {} of {} kick call(s) failed; blocked users may stay connected until they reconnect.",
                        report.failed_batches, report.kick_batches
                    );
                }
            }
        }
        RunOutcome::Busy => report_busy(),
    }
    Ok(())
}

async fn schedule(config: PanelConfig) -> Result<(), Box<dyn std::error::Error>> {
    let shutdown = CancellationToken::new();
    let shutdown_signal = shutdown.clone();

    tokio::spawn(async move {
        shutdown_signal_handler().await;
        info!("shutdown signal received");
        shutdown_signal.cancel();
    });

    run_scheduler(config, connect_http, shutdown).await;
    Ok(())
}

fn connect_http(config: &PanelConfig) -> Result<Arc<dyn StatsApi>, blitz_stats::StatsError> {
    Ok(Arc::new(HttpStatsClient::from_config(config)?))
}

fn report_busy() {
    eprintln!("Another traffic run is in progress, skipped.");
}

/// Wait for shutdown signals (SIGTERM, SIGINT).
async fn shutdown_signal_handler() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
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

/// Initialize the tracing subscriber from the logging section.
///
/// `format` is `json`, `compact` or `pretty` (default); `output` is
/// `stdout` or `stderr` (default). `filters` adds per-target levels.
fn init_tracing(config: &LoggingConfig) {
    let base_level = config
        .level
        .as_deref()
        .unwrap_or(blitz_core::DEFAULT_LOG_LEVEL);
    let mut filter_str = base_level.to_string();
    for (target, level) in &config.filters {
        filter_str.push(',');
        filter_str.push_str(target);
        filter_str.push('=');
        filter_str.push_str(level);
    }
    let filter = EnvFilter::try_new(&filter_str)
        .unwrap_or_else(|_| EnvFilter::new(blitz_core::DEFAULT_LOG_LEVEL));

    let format = config.format.as_deref().unwrap_or("pretty");
    let output = config.output.as_deref().unwrap_or("stderr");

    // Tables go to stdout; logs default to stderr so they don't interleave.
    match (format, output) {
        ("json", "stdout") => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(io::stdout))
            .init(),
        ("json", _) => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(io::stderr))
            .init(),
        ("compact", "stdout") => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_writer(io::stdout))
            .init(),
        ("compact", _) => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_writer(io::stderr))
            .init(),
        (_, "stdout") => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(io::stdout))
            .init(),
        _ => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(io::stderr))
            .init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subcommands_and_overrides() {
        let args = TrafficArgs::try_parse_from([
            "blitz-traffic",
            "-c",
            "/tmp/panel.toml",
            "--registry",
            "/tmp/users.json",
            "status",
            "--no-gui",
        ])
        .unwrap();
        assert_eq!(args.config, PathBuf::from("/tmp/panel.toml"));
        assert_eq!(args.overrides.registry, Some(PathBuf::from("/tmp/users.json")));
        assert!(matches!(args.command, TrafficCommands::Status { no_gui: true }));
    }

    #[test]
    fn kick_user_requires_a_name() {
        assert!(TrafficArgs::try_parse_from(["blitz-traffic", "kick-user"]).is_err());
        let args = TrafficArgs::try_parse_from(["blitz-traffic", "kick-user", "alice"]).unwrap();
        assert!(matches!(args.command, TrafficCommands::KickUser { username } if username == "alice"));
    }
}
