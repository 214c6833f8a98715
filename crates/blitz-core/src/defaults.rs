//! Default configuration values.
//!
//! Centralized default constants for use across all crates.

// ============================================================================
// Path Defaults
// ============================================================================

/// Default account registry (JSON object keyed by username).
pub const DEFAULT_REGISTRY_PATH: &str = "/etc/hysteria/users.json";
/// Default Hysteria2 server config, holds `trafficStats.secret`.
pub const DEFAULT_PROXY_CONFIG_PATH: &str = "/etc/hysteria/config.json";
/// Default lock file shared by every registry-mutating run.
pub const DEFAULT_LOCK_PATH: &str = "/tmp/hysteria_traffic.lock";
/// Suffix appended to the registry path for the backup snapshot.
pub const BACKUP_SUFFIX: &str = ".bak";
/// Suffix appended to the registry path for the in-progress write.
pub const TMP_SUFFIX: &str = ".tmp";

// ============================================================================
// Stats API Defaults
// ============================================================================

/// Default traffic stats API base URL.
pub const DEFAULT_STATS_BASE_URL: &str = "http://127.0.0.1:25413";
/// Default per-request timeout in seconds.
pub const DEFAULT_STATS_REQUEST_TIMEOUT_SECS: u64 = 10;
/// Default connect timeout in seconds.
pub const DEFAULT_STATS_CONNECT_TIMEOUT_SECS: u64 = 5;

// ============================================================================
// Enforcement Defaults
// ============================================================================

/// Default policy evaluation pool width.
pub const DEFAULT_ENFORCE_WORKERS: usize = 8;
/// Default number of usernames per kick call.
pub const DEFAULT_KICK_BATCH_SIZE: usize = 50;
/// Default number of registry save attempts.
pub const DEFAULT_SAVE_ATTEMPTS: u32 = 3;
/// Default pause between registry save attempts in milliseconds.
pub const DEFAULT_SAVE_RETRY_DELAY_MS: u64 = 1000;

// ============================================================================
// Schedule Defaults
// ============================================================================

/// Default reconciliation interval in seconds.
pub const DEFAULT_RECONCILE_INTERVAL_SECS: u64 = 60;
/// Run enforcement right after each scheduled reconciliation.
pub const DEFAULT_ENFORCE_AFTER_RECONCILE: bool = true;

// ============================================================================
// Logging Defaults
// ============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";
