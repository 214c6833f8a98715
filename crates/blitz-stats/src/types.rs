//! Stats API result types.

use std::collections::HashMap;

/// Bytes transferred by one user since the previous clear-on-read fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrafficDelta {
    pub upload: u64,
    pub download: u64,
}

impl TrafficDelta {
    #[inline]
    pub fn new(upload: u64, download: u64) -> Self {
        Self { upload, download }
    }
}

/// Online snapshot entry for one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OnlineStatus {
    /// Number of live connections reported by the server.
    pub connections: u64,
}

impl OnlineStatus {
    #[inline]
    pub fn is_online(&self) -> bool {
        self.connections > 0
    }
}

/// Per-user traffic deltas keyed by username.
pub type TrafficMap = HashMap<String, TrafficDelta>;

/// Per-user online status keyed by username.
pub type OnlineMap = HashMap<String, OnlineStatus>;
