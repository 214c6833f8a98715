//! # blitz
//!
//! Traffic accounting and quota enforcement for Hysteria2 panels.
//!
//! ## Crates
//!
//! - [`blitz_core`] - Version and default constants
//! - [`blitz_config`] - Panel configuration loading and validation
//! - [`blitz_stats`] - Hysteria2 traffic stats API client
//! - [`blitz_traffic`] - Reconciliation, policy and enforcement

pub use blitz_config as config;
pub use blitz_core as core;
pub use blitz_stats as stats;
pub use blitz_traffic as traffic;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use blitz_config::{PanelConfig, load_config, load_config_or_default, validate_config};
    pub use blitz_stats::{HttpStatsClient, MemoryStats, StatsApi};
    pub use blitz_traffic::{
        EnforcementCoordinator, RunOutcome, TrafficError, TrafficReconciler,
        kick_single_account, reset_account,
    };
}
