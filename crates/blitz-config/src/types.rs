//! Configuration type definitions for paths, stats API, enforcement, schedule and logging.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::defaults::*;

/// Top-level traffic engine configuration.
///
/// Every section is optional in the file; missing sections take their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PanelConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub stats: StatsConfig,
    #[serde(default)]
    pub enforcement: EnforcementConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Filesystem locations used by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Account registry (JSON object keyed by username).
    #[serde(default = "default_registry_path")]
    pub registry: PathBuf,
    /// Hysteria2 server config holding `trafficStats.secret`.
    #[serde(default = "default_proxy_config_path")]
    pub proxy_config: PathBuf,
    /// Lock file guarding registry-mutating runs.
    #[serde(default = "default_lock_path")]
    pub lock: PathBuf,
    /// Backup snapshot location. Defaults to `<registry>.bak`.
    #[serde(default)]
    pub backup: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            registry: default_registry_path(),
            proxy_config: default_proxy_config_path(),
            lock: default_lock_path(),
            backup: None,
        }
    }
}

impl PathsConfig {
    /// Paths rooted in `dir`, handy for tests and sandboxed deployments.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            registry: dir.join("users.json"),
            proxy_config: dir.join("config.json"),
            lock: dir.join("traffic.lock"),
            backup: None,
        }
    }

    /// Resolved backup path.
    pub fn backup_path(&self) -> PathBuf {
        self.backup
            .clone()
            .unwrap_or_else(|| with_suffix(&self.registry, blitz_core::BACKUP_SUFFIX))
    }

    /// Scratch file the registry is written to before being renamed into place.
    pub fn tmp_path(&self) -> PathBuf {
        with_suffix(&self.registry, blitz_core::TMP_SUFFIX)
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Traffic stats API client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    #[serde(default = "default_stats_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            base_url: default_stats_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl StatsConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Quota enforcement tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnforcementConfig {
    /// Policy evaluation pool width.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Usernames per kick call.
    #[serde(default = "default_kick_batch_size")]
    pub kick_batch_size: usize,
    /// Registry save attempts before giving up.
    #[serde(default = "default_save_attempts")]
    pub save_attempts: u32,
    /// Pause between save attempts in milliseconds.
    #[serde(default = "default_save_retry_delay_ms")]
    pub save_retry_delay_ms: u64,
}

impl Default for EnforcementConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            kick_batch_size: default_kick_batch_size(),
            save_attempts: default_save_attempts(),
            save_retry_delay_ms: default_save_retry_delay_ms(),
        }
    }
}

impl EnforcementConfig {
    pub fn save_retry_delay(&self) -> Duration {
        Duration::from_millis(self.save_retry_delay_ms)
    }
}

/// Background scheduler settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_reconcile_interval_secs")]
    pub reconcile_interval_secs: u64,
    /// Run enforcement right after each reconciliation tick.
    #[serde(default = "default_enforce_after_reconcile")]
    pub enforce_after_reconcile: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            reconcile_interval_secs: default_reconcile_interval_secs(),
            enforce_after_reconcile: default_enforce_after_reconcile(),
        }
    }
}

impl ScheduleConfig {
    pub fn reconcile_interval(&self) -> Duration {
        Duration::from_secs(self.reconcile_interval_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: Option<String>,
    /// Log format: json, pretty, or compact. Default: pretty.
    pub format: Option<String>,
    /// Output target: stdout or stderr. Default: stderr.
    pub output: Option<String>,
    /// Per-module log level filters (e.g., {"blitz_traffic": "debug", "reqwest": "warn"}).
    #[serde(default)]
    pub filters: HashMap<String, String>,
}
