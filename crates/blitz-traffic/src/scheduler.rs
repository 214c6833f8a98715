//! Periodic reconcile-then-enforce loop.

use std::sync::Arc;

use blitz_config::PanelConfig;
use blitz_stats::{StatsApi, StatsError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::enforce::{EnforcementCoordinator, EnforcementReport};
use crate::error::{RunOutcome, TrafficError};
use crate::reconcile::TrafficReconciler;

/// Outcome of one scheduler tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Users in the registry after reconciliation, `None` if it was skipped
    /// or failed.
    pub reconciled: Option<usize>,
    /// Why reconciliation failed, if it did.
    pub reconcile_error: Option<String>,
    /// Enforcement result, `None` if skipped or disabled.
    pub enforcement: Option<EnforcementReport>,
}

/// Reconcile once, then enforce if configured to.
///
/// A busy lock skips the step without failing the tick. A failed
/// reconciliation is recorded and enforcement still runs against the
/// counters already on disk; only an enforcement failure fails the tick.
pub async fn run_tick<S>(config: &PanelConfig, stats: &S) -> Result<TickReport, TrafficError>
where
    S: StatsApi + ?Sized,
{
    let (reconciled, reconcile_error) = match TrafficReconciler::new(config).reconcile(stats).await
    {
        Ok(RunOutcome::Completed(accounts)) => (Some(accounts.len()), None),
        Ok(RunOutcome::Busy) => (None, None),
        Err(e) => {
            error!(error = %e, "reconcile failed, enforcing on stored counters");
            (None, Some(e.to_string()))
        }
    };

    let enforcement = if config.schedule.enforce_after_reconcile {
        EnforcementCoordinator::new(config)
            .enforce(stats)
            .await?
            .completed()
    } else {
        None
    };

    Ok(TickReport {
        reconciled,
        reconcile_error,
        enforcement,
    })
}

/// Run ticks every `schedule.reconcile_interval_secs` until `shutdown` fires.
///
/// `connect` builds the stats client for each tick, so a rotated API secret
/// is picked up without a restart. Failures are logged and the loop goes on.
pub async fn run_scheduler<F>(config: PanelConfig, connect: F, shutdown: CancellationToken)
where
    F: Fn(&PanelConfig) -> Result<Arc<dyn StatsApi>, StatsError>,
{
    let interval = config.schedule.reconcile_interval();
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    info!(
        version = blitz_core::VERSION,
        interval_secs = interval.as_secs(),
        enforce = config.schedule.enforce_after_reconcile,
        "traffic scheduler started"
    );

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                info!("traffic scheduler shutting down");
                return;
            }

            _ = ticker.tick() => {
                let stats = match connect(&config) {
                    Ok(stats) => stats,
                    Err(e) => {
                        error!(error = %e, "failed to build stats client");
                        continue;
                    }
                };

                match run_tick(&config, stats.as_ref()).await {
                    Ok(report) => {
                        if report.reconciled.is_none() && report.reconcile_error.is_none() {
                            warn!("reconcile skipped, lock busy");
                        }
                        match &report.enforcement {
                            Some(e) if !e.blocked.is_empty() => info!(
                                blocked = e.blocked.len(),
                                failed_batches = e.failed_batches,
                                "enforcement finished"
                            ),
                            Some(_) => debug!("enforcement finished, nothing to block"),
                            None if config.schedule.enforce_after_reconcile => {
                                warn!("enforcement skipped, lock busy");
                            }
                            None => {}
                        }
                    }
                    Err(e) => error!(error = %e, "traffic tick failed"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use blitz_config::PathsConfig;
    use blitz_stats::MemoryStats;

    use super::*;
    use crate::account::{Account, Accounts};
    use crate::registry::UserRegistry;

    fn config_in(dir: &std::path::Path) -> PanelConfig {
        let mut config = PanelConfig {
            paths: PathsConfig::in_dir(dir),
            ..Default::default()
        };
        config.enforcement.save_retry_delay_ms = 1;
        config.schedule.reconcile_interval_secs = 1;
        config
    }

    #[tokio::test]
    async fn tick_reconciles_then_enforces() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let stats = MemoryStats::new();
        stats.add_traffic("alice", 10, 20);
        stats.set_connections("alice", 1);

        let report = run_tick(&config, &stats).await.unwrap();
        assert_eq!(report.reconciled, Some(1));
        let enforcement = report.enforcement.unwrap();
        assert_eq!(enforcement.evaluated, 1);
        assert!(enforcement.blocked.is_empty());

        let alice = &UserRegistry::new(&config).load().await.unwrap()["alice"];
        assert_eq!((alice.upload_bytes, alice.download_bytes), (10, 20));
        assert!(alice.is_online());
    }

    #[tokio::test]
    async fn failed_reconcile_still_blocks_expired_accounts() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let mut accounts = Accounts::new();
        accounts.insert(
            "expired".into(),
            Account {
                max_download_bytes: 1 << 30,
                expiration_days: 10,
                account_creation_date: Some("2000-01-01".into()),
                ..Default::default()
            },
        );
        UserRegistry::new(&config).save(&accounts).await.unwrap();

        let stats = MemoryStats::new();
        stats.fail_fetches();
        let report = run_tick(&config, &stats).await.unwrap();

        assert_eq!(report.reconciled, None);
        assert!(report.reconcile_error.unwrap().contains("online fetch refused"));
        assert_eq!(report.enforcement.unwrap().blocked, vec!["expired"]);
        assert_eq!(stats.kick_calls(), vec![vec!["expired".to_string()]]);

        let stored = UserRegistry::new(&config).load().await.unwrap();
        assert!(stored["expired"].blocked);
    }

    #[tokio::test]
    async fn enforcement_can_be_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.schedule.enforce_after_reconcile = false;

        let report = run_tick(&config, &MemoryStats::new()).await.unwrap();
        assert_eq!(report.reconciled, Some(0));
        assert!(report.reconcile_error.is_none());
        assert!(report.enforcement.is_none());
    }

    #[tokio::test]
    async fn scheduler_keeps_going_after_errors_and_stops_on_cancel() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let stats = Arc::new(MemoryStats::new());
        stats.fail_fetches();

        let shutdown = CancellationToken::new();
        let handle = {
            let stats = stats.clone();
            let shutdown = shutdown.clone();
            tokio::spawn(async move {
                run_scheduler(
                    config,
                    move |_| Ok(stats.clone() as Arc<dyn StatsApi>),
                    shutdown,
                )
                .await
            })
        };

        tokio::time::sleep(Duration::from_millis(1500)).await;
        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();

        assert!(stats.fetch_calls() >= 2, "failed ticks must not stop the loop");
    }
}
