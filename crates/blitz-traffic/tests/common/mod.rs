#![allow(dead_code)]

use std::path::Path;

use blitz_config::{PanelConfig, PathsConfig};
use blitz_traffic::{Account, Accounts, UserRegistry};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_test_writer()
        .try_init();
}

/// Config with every path inside `dir` and a 1 ms save retry delay.
pub fn config_in(dir: &Path) -> PanelConfig {
    let mut config = PanelConfig {
        paths: PathsConfig::in_dir(dir),
        ..Default::default()
    };
    config.enforcement.save_retry_delay_ms = 1;
    config
}

/// Managed account: quota and expiration both enabled.
pub fn managed(limit: i64, days: i64, created: &str) -> Account {
    Account {
        password: Some("pw".into()),
        max_download_bytes: limit,
        expiration_days: days,
        account_creation_date: Some(created.into()),
        ..Default::default()
    }
}

pub async fn write_registry(config: &PanelConfig, accounts: &Accounts) {
    UserRegistry::new(config).save(accounts).await.unwrap();
}

pub async fn read_registry(config: &PanelConfig) -> Accounts {
    UserRegistry::new(config).load().await.unwrap()
}

/// Make the scratch file path a directory so every atomic write fails.
pub fn break_saves(config: &PanelConfig) {
    std::fs::create_dir(config.paths.tmp_path()).unwrap();
}
