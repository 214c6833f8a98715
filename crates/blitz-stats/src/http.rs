//! HTTP client for the Hysteria2 traffic stats API.
//!
//! Endpoints (all authenticated with `Authorization: <secret>`):
//!
//! - `GET /traffic?clear=1` → `{"user": {"tx": 1, "rx": 2}}`
//! - `GET /online` → `{"user": 2}` (live connection count)
//! - `POST /kick` with body `["user", ...]`
//!
//! # Example
//!
//! ```no_run
//! use blitz_stats::HttpStatsClient;
//!
//! let stats = HttpStatsClient::new("http://127.0.0.1:25413", "secret");
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use blitz_config::{PanelConfig, read_stats_secret};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{OnlineMap, OnlineStatus, StatsApi, StatsError, TrafficDelta, TrafficMap};

const TRAFFIC_ENDPOINT: &str = "traffic";
const ONLINE_ENDPOINT: &str = "online";
const KICK_ENDPOINT: &str = "kick";

/// Stats API client backed by reqwest.
pub struct HttpStatsClient {
    client: Client,
    traffic_url: String,
    online_url: String,
    kick_url: String,
    secret: String,
}

impl HttpStatsClient {
    /// Create a client with reqwest defaults (no timeouts).
    ///
    /// Prefer [`from_config`](Self::from_config) for unattended runs.
    pub fn new(base_url: impl Into<String>, secret: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, secret)
    }

    /// Create with a custom reqwest [`Client`] (for timeouts, proxies, etc.).
    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        let base = base_url.into();
        let base = base.trim_end_matches('/');
        Self {
            client,
            traffic_url: format!("{base}/traffic?clear=1"),
            online_url: format!("{base}/online"),
            kick_url: format!("{base}/kick"),
            secret: secret.into(),
        }
    }

    /// Build a client from the panel config.
    ///
    /// Reads `trafficStats.secret` from the proxy config on every call, so a
    /// rotated secret is picked up by the next run. Fails with
    /// [`SecretError::NotFound`](blitz_config::SecretError::NotFound)
    /// before any network traffic when the secret is absent.
    pub fn from_config(config: &PanelConfig) -> Result<Self, StatsError> {
        let secret = read_stats_secret(&config.paths.proxy_config)?;
        let client = Client::builder()
            .timeout(config.stats.request_timeout())
            .connect_timeout(config.stats.connect_timeout())
            .build()?;
        Ok(Self::with_client(client, &config.stats.base_url, secret))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        url: &str,
    ) -> Result<T, StatsError> {
        let resp = self
            .client
            .get(url)
            .header("Authorization", &self.secret)
            .send()
            .await?;
        let resp = check_status(endpoint, resp)?;
        let body = resp.bytes().await?;
        // Hysteria answers an empty body when nothing is tracked yet.
        if body.iter().all(u8::is_ascii_whitespace) {
            return serde_json::from_slice(b"{}")
                .map_err(|source| StatsError::Decode { endpoint, source });
        }
        serde_json::from_slice(&body).map_err(|source| StatsError::Decode { endpoint, source })
    }
}

fn check_status(endpoint: &'static str, resp: Response) -> Result<Response, StatsError> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(StatsError::Status {
            endpoint,
            status: status.as_u16(),
        })
    }
}

// Cannot derive Debug without leaking the secret
impl std::fmt::Debug for HttpStatsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpStatsClient")
            .field("online_url", &self.online_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl StatsApi for HttpStatsClient {
    async fn fetch_and_clear_traffic(&self) -> Result<TrafficMap, StatsError> {
        let raw: HashMap<String, wire::Traffic> =
            self.get_json(TRAFFIC_ENDPOINT, &self.traffic_url).await?;
        debug!(users = raw.len(), "fetched traffic deltas");
        Ok(raw
            .into_iter()
            .map(|(user, t)| (user, TrafficDelta::new(t.tx, t.rx)))
            .collect())
    }

    async fn fetch_online_status(&self) -> Result<OnlineMap, StatsError> {
        let raw: HashMap<String, u64> = self.get_json(ONLINE_ENDPOINT, &self.online_url).await?;
        debug!(users = raw.len(), "fetched online status");
        Ok(raw
            .into_iter()
            .map(|(user, connections)| (user, OnlineStatus { connections }))
            .collect())
    }

    async fn kick(&self, usernames: &[String]) -> Result<(), StatsError> {
        let resp = self
            .client
            .post(&self.kick_url)
            .header("Authorization", &self.secret)
            .json(usernames)
            .send()
            .await?;
        check_status(KICK_ENDPOINT, resp)?;
        debug!(count = usernames.len(), "kick request accepted");
        Ok(())
    }
}

// ── Wire types (must match the Hysteria2 traffic stats API) ───────

mod wire {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct Traffic {
        #[serde(default)]
        pub tx: u64,
        #[serde(default)]
        pub rx: u64,
    }
}
