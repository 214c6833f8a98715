//! Blitz traffic standalone binary.

use std::process::ExitCode;

use blitz_traffic::{TrafficArgs, cli};
use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    let args = TrafficArgs::parse();

    match cli::run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
