//! Default value functions for serde deserialization.
//!
//! These functions forward to constants defined in `blitz_core::defaults`.

use std::path::PathBuf;

use blitz_core::defaults;

/// Generate default value functions that forward to blitz_core::defaults constants.
macro_rules! default_fns {
    // For Copy types (integers, bool, etc.)
    ($($fn_name:ident => $const_name:ident : $ty:ty),* $(,)?) => {
        $(
            pub(crate) fn $fn_name() -> $ty {
                defaults::$const_name
            }
        )*
    };
}

/// Generate default value functions that return String from &str constants.
macro_rules! default_string_fns {
    ($($fn_name:ident => $const_name:ident),* $(,)?) => {
        $(
            pub(crate) fn $fn_name() -> String {
                defaults::$const_name.to_string()
            }
        )*
    };
}

/// Generate default value functions that return PathBuf from &str constants.
macro_rules! default_path_fns {
    ($($fn_name:ident => $const_name:ident),* $(,)?) => {
        $(
            pub(crate) fn $fn_name() -> PathBuf {
                PathBuf::from(defaults::$const_name)
            }
        )*
    };
}

default_fns! {
    default_request_timeout_secs  => DEFAULT_STATS_REQUEST_TIMEOUT_SECS: u64,
    default_connect_timeout_secs  => DEFAULT_STATS_CONNECT_TIMEOUT_SECS: u64,
    default_workers               => DEFAULT_ENFORCE_WORKERS: usize,
    default_kick_batch_size       => DEFAULT_KICK_BATCH_SIZE: usize,
    default_save_attempts         => DEFAULT_SAVE_ATTEMPTS: u32,
    default_save_retry_delay_ms   => DEFAULT_SAVE_RETRY_DELAY_MS: u64,
    default_reconcile_interval_secs => DEFAULT_RECONCILE_INTERVAL_SECS: u64,
    default_enforce_after_reconcile => DEFAULT_ENFORCE_AFTER_RECONCILE: bool,
}

default_string_fns! {
    default_stats_base_url => DEFAULT_STATS_BASE_URL,
}

default_path_fns! {
    default_registry_path     => DEFAULT_REGISTRY_PATH,
    default_proxy_config_path => DEFAULT_PROXY_CONFIG_PATH,
    default_lock_path         => DEFAULT_LOCK_PATH,
}
