//! In-memory stats backend.

use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{OnlineMap, OnlineStatus, StatsApi, StatsError, TrafficMap};

#[derive(Debug, Default)]
struct State {
    pending: TrafficMap,
    online: OnlineMap,
    kick_calls: Vec<Vec<String>>,
    failing_kick_calls: HashSet<usize>,
    fetch_calls: usize,
    fail_fetches: bool,
}

/// Stats backend that keeps everything in process memory.
///
/// Traffic accumulates through [`add_traffic`](Self::add_traffic) and is
/// drained by [`StatsApi::fetch_and_clear_traffic`], mirroring the
/// server's clear-on-read counters. Kick calls are recorded, and individual
/// calls can be told to fail.
#[derive(Debug, Default)]
pub struct MemoryStats {
    state: Mutex<State>,
}

impl MemoryStats {
    /// Create a new empty backend.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate traffic for a user until the next fetch.
    pub fn add_traffic(&self, user: &str, upload: u64, download: u64) {
        let mut state = self.state.lock();
        let entry = state.pending.entry(user.to_string()).or_default();
        entry.upload += upload;
        entry.download += download;
    }

    /// Set a user's live connection count (0 = offline).
    pub fn set_connections(&self, user: &str, connections: u64) {
        self.state
            .lock()
            .online
            .insert(user.to_string(), OnlineStatus { connections });
    }

    /// Make the `n`th kick call (1-based) fail.
    pub fn fail_kick_call(&self, n: usize) {
        self.state.lock().failing_kick_calls.insert(n);
    }

    /// Make every traffic/online fetch fail.
    pub fn fail_fetches(&self) {
        self.state.lock().fail_fetches = true;
    }

    /// Every kick call made so far, in order, including failed ones.
    pub fn kick_calls(&self) -> Vec<Vec<String>> {
        self.state.lock().kick_calls.clone()
    }

    /// Number of traffic and online fetches made so far.
    pub fn fetch_calls(&self) -> usize {
        self.state.lock().fetch_calls
    }
}

#[async_trait]
impl StatsApi for MemoryStats {
    async fn fetch_and_clear_traffic(&self) -> Result<TrafficMap, StatsError> {
        let mut state = self.state.lock();
        state.fetch_calls += 1;
        if state.fail_fetches {
            return Err(StatsError::backend("traffic fetch refused"));
        }
        Ok(std::mem::take(&mut state.pending))
    }

    async fn fetch_online_status(&self) -> Result<OnlineMap, StatsError> {
        let mut state = self.state.lock();
        state.fetch_calls += 1;
        if state.fail_fetches {
            return Err(StatsError::backend("online fetch refused"));
        }
        Ok(state.online.clone())
    }

    async fn kick(&self, usernames: &[String]) -> Result<(), StatsError> {
        let mut state = self.state.lock();
        state.kick_calls.push(usernames.to_vec());
        let call = state.kick_calls.len();
        if state.failing_kick_calls.contains(&call) {
            return Err(StatsError::backend(format!("kick call {call} refused")));
        }
        Ok(())
    }
}
