//! Quota and expiration enforcement.
//!
//! One run evaluates every account, persists newly blocked accounts, then
//! disconnects them. Blocking is durable before any kick is sent, so a crash
//! in between leaves an account blocked but still connected, never the
//! reverse.

use blitz_config::PanelConfig;
use blitz_stats::StatsApi;
use chrono::{Local, NaiveDateTime};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::account::{Account, Accounts};
use crate::error::{RunOutcome, TrafficError};
use crate::lock::ProcessLock;
use crate::policy;
use crate::registry::UserRegistry;

/// What an enforcement run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnforcementReport {
    /// Accounts evaluated.
    pub evaluated: usize,
    /// Usernames blocked by this run, sorted.
    pub blocked: Vec<String>,
    /// Kick calls attempted.
    pub kick_batches: usize,
    /// Kick calls that failed.
    pub failed_batches: usize,
}

/// Blocks and kicks accounts that ran out of quota or time.
#[derive(Debug, Clone)]
pub struct EnforcementCoordinator {
    registry: UserRegistry,
    lock: ProcessLock,
    workers: usize,
    batch_size: usize,
}

impl EnforcementCoordinator {
    pub fn new(config: &PanelConfig) -> Self {
        Self {
            registry: UserRegistry::new(config),
            lock: ProcessLock::new(config.paths.lock.clone()),
            workers: config.enforcement.workers.max(1),
            batch_size: config.enforcement.kick_batch_size.max(1),
        }
    }

    /// Enforce against the local wall clock.
    pub async fn enforce<S>(&self, stats: &S) -> Result<RunOutcome<EnforcementReport>, TrafficError>
    where
        S: StatsApi + ?Sized,
    {
        self.enforce_at(stats, Local::now().naive_local()).await
    }

    /// Enforce as if the current time were `now`.
    pub async fn enforce_at<S>(
        &self,
        stats: &S,
        now: NaiveDateTime,
    ) -> Result<RunOutcome<EnforcementReport>, TrafficError>
    where
        S: StatsApi + ?Sized,
    {
        let Some(guard) = self.lock.try_acquire()? else {
            warn!(lock = %self.lock.path().display(), "another traffic run holds the lock, skipping enforcement");
            return Ok(RunOutcome::Busy);
        };

        self.registry.backup().await?;
        let accounts = match self.registry.load().await {
            Ok(accounts) => accounts,
            Err(e) => {
                self.registry.rollback().await;
                return Err(e);
            }
        };

        let evaluated = accounts.len();
        let (accounts, blocked) = match evaluate_sharded(accounts, now, self.workers).await {
            Ok(result) => result,
            Err(e) => {
                self.registry.rollback().await;
                return Err(e);
            }
        };

        let mut report = EnforcementReport {
            evaluated,
            blocked,
            ..Default::default()
        };

        if report.blocked.is_empty() {
            debug!(evaluated, "no accounts to block");
            guard.release();
            return Ok(RunOutcome::Completed(report));
        }

        if let Err(e) = self.registry.save(&accounts).await {
            self.registry.rollback().await;
            return Err(e);
        }
        info!(count = report.blocked.len(), "accounts blocked");

        let (attempted, failed) = kick_in_batches(stats, &report.blocked, self.batch_size).await;
        report.kick_batches = attempted;
        report.failed_batches = failed;

        guard.release();
        Ok(RunOutcome::Completed(report))
    }
}

/// Evaluate `accounts` on up to `workers` blocking tasks.
///
/// The map is split into owned shards before any task starts, so each task
/// has exclusive access to its entries. Returns the reassembled map with
/// `blocked` set on violators, and the sorted names of those violators.
async fn evaluate_sharded(
    accounts: Accounts,
    now: NaiveDateTime,
    workers: usize,
) -> Result<(Accounts, Vec<String>), TrafficError> {
    let mut shards: Vec<Vec<(String, Account)>> = (0..workers).map(|_| Vec::new()).collect();
    for (i, entry) in accounts.into_iter().enumerate() {
        shards[i % workers].push(entry);
    }

    let mut tasks = JoinSet::new();
    for shard in shards.into_iter().filter(|s| !s.is_empty()) {
        tasks.spawn_blocking(move || evaluate_shard(shard, now));
    }

    let mut merged = Accounts::new();
    let mut blocked = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let (shard, newly_blocked) = joined.map_err(|e| TrafficError::Worker(e.to_string()))?;
        merged.extend(shard);
        blocked.extend(newly_blocked);
    }
    blocked.sort_unstable();
    Ok((merged, blocked))
}

fn evaluate_shard(
    mut shard: Vec<(String, Account)>,
    now: NaiveDateTime,
) -> (Vec<(String, Account)>, Vec<String>) {
    let mut blocked = Vec::new();
    for (user, account) in shard.iter_mut() {
        let verdict = policy::verdict(account, now);
        if verdict.should_block() {
            info!(user = %user, ?verdict, "blocking account");
            account.blocked = true;
            blocked.push(user.clone());
        }
    }
    (shard, blocked)
}

/// Kick `users` in sequential batches of `batch_size`.
///
/// A failed batch is logged and the rest are still attempted. Returns
/// `(attempted, failed)`.
pub(crate) async fn kick_in_batches<S>(
    stats: &S,
    users: &[String],
    batch_size: usize,
) -> (usize, usize)
where
    S: StatsApi + ?Sized,
{
    let mut attempted = 0;
    let mut failed = 0;
    for (index, batch) in users.chunks(batch_size.max(1)).enumerate() {
        attempted += 1;
        match stats.kick(batch).await {
            Ok(()) => debug!(batch = index + 1, count = batch.len(), "kicked users"),
            Err(e) => {
                failed += 1;
                error!(batch = index + 1, count = batch.len(), error = %e, "failed to kick users");
            }
        }
    }
    (attempted, failed)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .unwrap()
    }

    fn accounts(n: usize, over_quota: impl Fn(usize) -> bool) -> Accounts {
        (0..n)
            .map(|i| {
                let acc = Account {
                    max_download_bytes: 100,
                    expiration_days: 365,
                    account_creation_date: Some("2024-01-01".into()),
                    download_bytes: if over_quota(i) { 100 } else { 0 },
                    ..Default::default()
                };
                (format!("user{i:03}"), acc)
            })
            .collect()
    }

    #[tokio::test]
    async fn sharded_evaluation_blocks_only_violators() {
        let input = accounts(37, |i| i % 3 == 0);
        let (out, blocked) = evaluate_sharded(input.clone(), now(), 8).await.unwrap();

        assert_eq!(out.len(), 37);
        assert_eq!(blocked.len(), 13);
        assert!(blocked.windows(2).all(|w| w[0] < w[1]));
        for (user, acc) in &out {
            assert_eq!(acc.blocked, blocked.contains(user), "{user}");
            assert_eq!(acc.download_bytes, input[user].download_bytes);
        }
    }

    #[tokio::test]
    async fn more_workers_than_accounts() {
        let (out, blocked) = evaluate_sharded(accounts(2, |_| true), now(), 8)
            .await
            .unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(blocked, vec!["user000", "user001"]);
    }

    #[tokio::test]
    async fn empty_registry_evaluates_nothing() {
        let (out, blocked) = evaluate_sharded(Accounts::new(), now(), 8).await.unwrap();
        assert!(out.is_empty());
        assert!(blocked.is_empty());
    }
}
