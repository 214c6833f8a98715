//! CLI override definitions and application logic.

use std::path::PathBuf;

use clap::Parser;

use crate::PanelConfig;

#[derive(Debug, Clone, Parser, Default)]
pub struct CliOverrides {
    /// Override account registry path
    #[arg(long)]
    pub registry: Option<PathBuf>,
    /// Override Hysteria2 server config path (secret lookup)
    #[arg(long)]
    pub proxy_config: Option<PathBuf>,
    /// Override lock file path
    #[arg(long)]
    pub lock_file: Option<PathBuf>,
    /// Override stats API base URL, e.g. http://127.0.0.1:25413
    #[arg(long)]
    pub stats_url: Option<String>,
    /// Override stats API request timeout (seconds)
    #[arg(long)]
    pub stats_timeout_secs: Option<u64>,
    /// Override policy evaluation pool width
    #[arg(long)]
    pub workers: Option<usize>,
    /// Override usernames per kick call
    #[arg(long)]
    pub kick_batch_size: Option<usize>,
    /// Override reconciliation interval for `schedule` (seconds)
    #[arg(long)]
    pub interval_secs: Option<u64>,
    /// Override log level (trace/debug/info/warn/error)
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn apply_overrides(config: &mut PanelConfig, overrides: &CliOverrides) {
    if let Some(v) = &overrides.registry {
        config.paths.registry = v.clone();
    }
    if let Some(v) = &overrides.proxy_config {
        config.paths.proxy_config = v.clone();
    }
    if let Some(v) = &overrides.lock_file {
        config.paths.lock = v.clone();
    }
    if let Some(v) = &overrides.stats_url {
        config.stats.base_url = v.clone();
    }
    if let Some(v) = overrides.stats_timeout_secs {
        config.stats.request_timeout_secs = v;
    }
    if let Some(v) = overrides.workers {
        config.enforcement.workers = v;
    }
    if let Some(v) = overrides.kick_batch_size {
        config.enforcement.kick_batch_size = v;
    }
    if let Some(v) = overrides.interval_secs {
        config.schedule.reconcile_interval_secs = v;
    }
    if let Some(v) = &overrides.log_level {
        config.logging.level = Some(v.clone());
    }
}
