//! Traffic reconciliation.
//!
//! Pulls clear-on-read deltas and the online snapshot from the stats API and
//! folds them into the registry under the host-wide lock.

use blitz_config::PanelConfig;
use blitz_stats::{OnlineMap, StatsApi, TrafficMap};
use tracing::{debug, info, warn};

use crate::account::{Account, AccountStatus, Accounts};
use crate::error::{RunOutcome, TrafficError};
use crate::lock::ProcessLock;
use crate::registry::UserRegistry;

/// Folds stats API counters into the registry.
#[derive(Debug, Clone)]
pub struct TrafficReconciler {
    registry: UserRegistry,
    lock: ProcessLock,
}

impl TrafficReconciler {
    pub fn new(config: &PanelConfig) -> Self {
        Self {
            registry: UserRegistry::new(config),
            lock: ProcessLock::new(config.paths.lock.clone()),
        }
    }

    pub fn registry(&self) -> &UserRegistry {
        &self.registry
    }

    /// Run one reconciliation pass and return the merged registry.
    ///
    /// Loading, backup and the online snapshot all happen before the
    /// clear-on-read traffic call, so none of their failures discards
    /// server-side counters. Once deltas are fetched the only failure left
    /// is the save, which rolls back to the backup.
    pub async fn reconcile<S>(&self, stats: &S) -> Result<RunOutcome<Accounts>, TrafficError>
    where
        S: StatsApi + ?Sized,
    {
        let Some(guard) = self.lock.try_acquire()? else {
            warn!(lock = %self.lock.path().display(), "another traffic run holds the lock, skipping reconcile");
            return Ok(RunOutcome::Busy);
        };

        let existed = self.registry.exists().await;
        let mut accounts = self.registry.load_or_empty().await?;
        if existed {
            self.registry.backup().await?;
        }
        let online = stats.fetch_online_status().await?;
        let traffic = stats.fetch_and_clear_traffic().await?;

        merge(&mut accounts, &online, &traffic);

        if let Err(e) = self.registry.save(&accounts).await {
            if existed {
                self.registry.rollback().await;
            }
            return Err(e);
        }

        info!(
            users = accounts.len(),
            online = accounts.values().filter(|a| a.is_online()).count(),
            deltas = traffic.len(),
            "traffic reconciled"
        );
        guard.release();
        Ok(RunOutcome::Completed(accounts))
    }
}

/// Apply one online snapshot and one batch of deltas to `accounts`.
///
/// Every account starts `Offline`; snapshot entries decide who is `Online`.
/// Usernames the registry doesn't know are created with zero counters.
pub fn merge(accounts: &mut Accounts, online: &OnlineMap, traffic: &TrafficMap) {
    for account in accounts.values_mut() {
        account.status = Some(AccountStatus::Offline);
    }

    for (user, state) in online {
        let account = accounts.entry(user.clone()).or_insert_with(|| {
            debug!(user = %user, "new user from online snapshot");
            Account::discovered()
        });
        if state.is_online() {
            account.status = Some(AccountStatus::Online);
        }
    }

    for (user, delta) in traffic {
        let account = accounts.entry(user.clone()).or_insert_with(|| {
            debug!(user = %user, "new user from traffic stats");
            Account::discovered()
        });
        account.upload_bytes = account.upload_bytes.saturating_add(delta.upload);
        account.download_bytes = account.download_bytes.saturating_add(delta.download);
    }
}

#[cfg(test)]
mod tests {
    use blitz_stats::{OnlineStatus, TrafficDelta};

    use super::*;

    fn online(entries: &[(&str, u64)]) -> OnlineMap {
        entries
            .iter()
            .map(|(u, c)| (u.to_string(), OnlineStatus { connections: *c }))
            .collect()
    }

    fn traffic(entries: &[(&str, u64, u64)]) -> TrafficMap {
        entries
            .iter()
            .map(|(u, up, down)| (u.to_string(), TrafficDelta::new(*up, *down)))
            .collect()
    }

    #[test]
    fn deltas_accumulate() {
        let mut accounts = Accounts::new();
        merge(&mut accounts, &OnlineMap::new(), &traffic(&[("u", 10, 5)]));
        merge(&mut accounts, &OnlineMap::new(), &traffic(&[("u", 3, 0)]));
        assert_eq!(accounts["u"].upload_bytes, 13);
        assert_eq!(accounts["u"].download_bytes, 5);
    }

    #[test]
    fn snapshot_overrides_status() {
        let mut accounts = Accounts::new();
        accounts.insert(
            "was_online".into(),
            Account {
                status: Some(AccountStatus::Online),
                ..Default::default()
            },
        );
        accounts.insert("idle".into(), Account::default());

        merge(
            &mut accounts,
            &online(&[("idle", 2), ("gone", 0)]),
            &TrafficMap::new(),
        );

        assert_eq!(accounts["was_online"].status, Some(AccountStatus::Offline));
        assert_eq!(accounts["idle"].status, Some(AccountStatus::Online));
        assert_eq!(accounts["gone"].status, Some(AccountStatus::Offline));
    }

    #[test]
    fn unknown_users_get_zero_counters() {
        let mut accounts = Accounts::new();
        merge(
            &mut accounts,
            &online(&[("new", 1)]),
            &traffic(&[("other", 7, 9)]),
        );

        let new = &accounts["new"];
        assert!(new.is_online());
        assert_eq!((new.upload_bytes, new.download_bytes), (0, 0));
        assert!(!new.blocked);

        let other = &accounts["other"];
        assert_eq!(other.status, Some(AccountStatus::Offline));
        assert_eq!((other.upload_bytes, other.download_bytes), (7, 9));
    }

    #[test]
    fn counters_saturate() {
        let mut accounts = Accounts::new();
        accounts.insert(
            "u".into(),
            Account {
                upload_bytes: u64::MAX - 1,
                ..Default::default()
            },
        );
        merge(&mut accounts, &OnlineMap::new(), &traffic(&[("u", 10, 0)]));
        assert_eq!(accounts["u"].upload_bytes, u64::MAX);
    }

    #[test]
    fn untouched_fields_survive() {
        let mut accounts = Accounts::new();
        let mut acc = Account {
            password: Some("pw".into()),
            max_download_bytes: 1000,
            blocked: true,
            ..Default::default()
        };
        acc.extra.insert("note".into(), "vip".into());
        accounts.insert("u".into(), acc);

        merge(&mut accounts, &online(&[("u", 1)]), &traffic(&[("u", 1, 1)]));

        let u = &accounts["u"];
        assert_eq!(u.password.as_deref(), Some("pw"));
        assert_eq!(u.max_download_bytes, 1000);
        assert!(u.blocked);
        assert_eq!(u.extra["note"], "vip");
    }
}
