//! Configuration validation logic.

use crate::PanelConfig;
use crate::loader::ConfigError;

pub fn validate_config(config: &PanelConfig) -> Result<(), ConfigError> {
    if config.paths.registry.as_os_str().is_empty() {
        return Err(ConfigError::Validation("paths.registry is empty".into()));
    }
    if config.paths.lock.as_os_str().is_empty() {
        return Err(ConfigError::Validation("paths.lock is empty".into()));
    }
    if config.paths.backup_path() == config.paths.registry {
        return Err(ConfigError::Validation(
            "paths.backup must differ from paths.registry".into(),
        ));
    }
    if config.stats.base_url.trim().is_empty() {
        return Err(ConfigError::Validation("stats.base_url is empty".into()));
    }
    if !config.stats.base_url.starts_with("http://") && !config.stats.base_url.starts_with("https://")
    {
        return Err(ConfigError::Validation(
            "stats.base_url must start with http:// or https://".into(),
        ));
    }
    if config.stats.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "stats.request_timeout_secs must be > 0".into(),
        ));
    }
    if config.enforcement.workers == 0 {
        return Err(ConfigError::Validation(
            "enforcement.workers must be > 0".into(),
        ));
    }
    if config.enforcement.kick_batch_size == 0 {
        return Err(ConfigError::Validation(
            "enforcement.kick_batch_size must be > 0".into(),
        ));
    }
    if config.enforcement.save_attempts == 0 {
        return Err(ConfigError::Validation(
            "enforcement.save_attempts must be > 0".into(),
        ));
    }
    if config.schedule.reconcile_interval_secs == 0 {
        return Err(ConfigError::Validation(
            "schedule.reconcile_interval_secs must be > 0".into(),
        ));
    }
    Ok(())
}
