//! Single-account disconnect.
//!
//! Used by flows that edit or remove an account: the user is kicked before
//! the record changes. No lock is taken and the registry is not touched.

use blitz_config::PanelConfig;
use blitz_stats::{HttpStatsClient, StatsApi};
use tracing::info;

use crate::error::TrafficError;

/// Kick `username` through a freshly built HTTP client.
///
/// The API secret is read from the proxy configuration on every call.
pub async fn kick_single_account(config: &PanelConfig, username: &str) -> Result<(), TrafficError> {
    let client = HttpStatsClient::from_config(config)?;
    kick_user(&client, username).await
}

/// Kick one user through `stats`.
pub async fn kick_user<S>(stats: &S, username: &str) -> Result<(), TrafficError>
where
    S: StatsApi + ?Sized,
{
    stats.kick(&[username.to_string()]).await?;
    info!(user = %username, "user kicked");
    Ok(())
}
