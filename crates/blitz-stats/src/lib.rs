//! Client for the Hysteria2 traffic stats API.
//!
//! The proxy server exposes per-user traffic counters, online status and a
//! kick endpoint. This crate wraps them behind the [`StatsApi`] trait so the
//! traffic engine can be driven by the real HTTP client or by a fake.
//!
//! # Example
//!
//! ```
//! use blitz_stats::{MemoryStats, StatsApi};
//!
//! # async fn example() -> Result<(), blitz_stats::StatsError> {
//! let stats = MemoryStats::new();
//! stats.add_traffic("alice", 100, 200);
//!
//! let deltas = stats.fetch_and_clear_traffic().await?;
//! assert_eq!(deltas["alice"].download, 200);
//! # Ok(())
//! # }
//! ```

mod error;
pub mod http;
mod memory;
mod traits;
mod types;

pub use error::StatsError;
pub use http::HttpStatsClient;
pub use memory::MemoryStats;
pub use traits::StatsApi;
pub use types::{OnlineMap, OnlineStatus, TrafficDelta, TrafficMap};
