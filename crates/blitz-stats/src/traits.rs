//! Stats API trait.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StatsError;
use crate::types::{OnlineMap, TrafficMap};

/// Control-plane operations the traffic engine needs from the proxy server.
///
/// Implementations must be thread-safe (`Send + Sync`); one client is
/// constructed per run and shared by every step of it.
#[async_trait]
pub trait StatsApi: Send + Sync {
    /// Fetch per-user traffic deltas and reset the server-side counters.
    ///
    /// The server clears on read, so a missed call only enlarges the next batch.
    async fn fetch_and_clear_traffic(&self) -> Result<TrafficMap, StatsError>;

    /// Fetch the authoritative online snapshot.
    async fn fetch_online_status(&self) -> Result<OnlineMap, StatsError>;

    /// Forcibly disconnect the given users.
    async fn kick(&self, usernames: &[String]) -> Result<(), StatsError>;
}

/// Blanket implementation for `Arc<A>` where `A: StatsApi`.
#[async_trait]
impl<A: StatsApi + ?Sized> StatsApi for Arc<A> {
    #[inline]
    async fn fetch_and_clear_traffic(&self) -> Result<TrafficMap, StatsError> {
        (**self).fetch_and_clear_traffic().await
    }

    #[inline]
    async fn fetch_online_status(&self) -> Result<OnlineMap, StatsError> {
        (**self).fetch_online_status().await
    }

    #[inline]
    async fn kick(&self, usernames: &[String]) -> Result<(), StatsError> {
        (**self).kick(usernames).await
    }
}

/// Blanket implementation for `Box<A>` where `A: StatsApi`.
#[async_trait]
impl<A: StatsApi + ?Sized> StatsApi for Box<A> {
    #[inline]
    async fn fetch_and_clear_traffic(&self) -> Result<TrafficMap, StatsError> {
        (**self).fetch_and_clear_traffic().await
    }

    #[inline]
    async fn fetch_online_status(&self) -> Result<OnlineMap, StatsError> {
        (**self).fetch_online_status().await
    }

    #[inline]
    async fn kick(&self, usernames: &[String]) -> Result<(), StatsError> {
        (**self).kick(usernames).await
    }
}
