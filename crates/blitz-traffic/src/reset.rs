//! Operator reset of a single account.

use blitz_config::PanelConfig;
use chrono::{Local, NaiveDate};
use tracing::info;

use crate::account::AccountStatus;
use crate::error::{RunOutcome, TrafficError};
use crate::lock::ProcessLock;
use crate::registry::UserRegistry;

/// Zero an account's counters, unblock it and restart its expiration clock.
pub async fn reset_account(
    config: &PanelConfig,
    username: &str,
) -> Result<RunOutcome<()>, TrafficError> {
    reset_account_on(config, username, Local::now().date_naive()).await
}

/// Like [`reset_account`], with the new creation date given explicitly.
pub async fn reset_account_on(
    config: &PanelConfig,
    username: &str,
    today: NaiveDate,
) -> Result<RunOutcome<()>, TrafficError> {
    let lock = ProcessLock::new(config.paths.lock.clone());
    let Some(guard) = lock.try_acquire()? else {
        return Ok(RunOutcome::Busy);
    };

    let registry = UserRegistry::new(config);
    let mut accounts = registry.load().await?;
    let Some(account) = accounts.get_mut(username) else {
        return Err(TrafficError::NotFound(username.to_string()));
    };

    account.upload_bytes = 0;
    account.download_bytes = 0;
    account.status = Some(AccountStatus::Offline);
    account.account_creation_date = Some(today.format("%Y-%m-%d").to_string());
    account.blocked = false;

    registry.backup().await?;
    if let Err(e) = registry.save(&accounts).await {
        registry.rollback().await;
        return Err(e);
    }

    info!(user = %username, "account reset");
    guard.release();
    Ok(RunOutcome::Completed(()))
}
