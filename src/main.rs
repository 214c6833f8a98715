//! Unified blitz CLI.
//!
//! - `blitz traffic` - Traffic accounting and quota enforcement
//!
//! The subcommand is also available as the standalone `blitz-traffic` binary.

use std::process::ExitCode;

use clap::{Parser, Subcommand};

/// Blitz panel CLI.
#[derive(Parser)]
#[command(
    name = "blitz",
    version,
    about = "Hysteria2 panel tooling",
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile traffic counters and enforce quotas.
    #[command(name = "traffic")]
    Traffic(blitz_traffic::TrafficArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Traffic(args) => blitz_traffic::cli::run(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
