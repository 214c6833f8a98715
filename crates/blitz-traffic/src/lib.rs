//! Traffic accounting and quota enforcement for the Blitz panel.
//!
//! Reconciliation folds the Hysteria2 stats API counters into the account
//! registry; enforcement blocks and kicks accounts over quota or past their
//! expiration. Both run under one host-wide lock.
//!
//! # Example
//!
//! ```no_run
//! use blitz_config::PanelConfig;
//! use blitz_stats::HttpStatsClient;
//! use blitz_traffic::{EnforcementCoordinator, TrafficReconciler};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PanelConfig::default();
//! let stats = HttpStatsClient::from_config(&config)?;
//!
//! if TrafficReconciler::new(&config).reconcile(&stats).await?.is_busy() {
//!     return Ok(());
//! }
//! if let Some(report) = EnforcementCoordinator::new(&config).enforce(&stats).await?.completed() {
//!     println!("blocked: {:?}", report.blocked);
//! }
//! # Ok(())
//! # }
//! ```

mod account;
pub mod cli;
mod display;
mod enforce;
mod error;
mod kick;
mod lock;
pub mod policy;
mod reconcile;
mod registry;
mod reset;
mod scheduler;

pub use account::{Account, AccountStatus, Accounts};
pub use cli::TrafficArgs;
pub use display::{format_bytes, traffic_table};
pub use enforce::{EnforcementCoordinator, EnforcementReport};
pub use error::{RunOutcome, TrafficError};
pub use kick::{kick_single_account, kick_user};
pub use lock::{LockGuard, ProcessLock};
pub use policy::{Verdict, evaluate};
pub use reconcile::{TrafficReconciler, merge};
pub use registry::UserRegistry;
pub use reset::{reset_account, reset_account_on};
pub use scheduler::{TickReport, run_scheduler, run_tick};
