//! Account records as persisted in the registry.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Every account in the registry, keyed by username.
pub type Accounts = BTreeMap<String, Account>;

/// Connectivity as last seen by reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountStatus {
    Online,
    Offline,
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Online => f.write_str("Online"),
            Self::Offline => f.write_str("Offline"),
        }
    }
}

/// One managed proxy credential.
///
/// Members this crate does not know about are kept in `extra` and written
/// back unchanged, so other panel components can store their own fields in
/// the same record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Quota in bytes; `<= 0` disables the quota.
    #[serde(default)]
    pub max_download_bytes: i64,

    /// Lifetime in days from `account_creation_date`; `<= 0` disables expiry.
    #[serde(default)]
    pub expiration_days: i64,

    /// `YYYY-MM-DD`, anchor for expiration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_creation_date: Option<String>,

    #[serde(default)]
    pub upload_bytes: u64,

    #[serde(default)]
    pub download_bytes: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AccountStatus>,

    #[serde(default)]
    pub blocked: bool,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Account {
    /// Zero-counter record for a username the server knows but the registry doesn't.
    pub fn discovered() -> Self {
        Self {
            status: Some(AccountStatus::Offline),
            ..Self::default()
        }
    }

    /// Combined upload and download.
    #[inline]
    pub fn used_bytes(&self) -> u64 {
        self.upload_bytes.saturating_add(self.download_bytes)
    }

    #[inline]
    pub fn is_online(&self) -> bool {
        self.status == Some(AccountStatus::Online)
    }
}
