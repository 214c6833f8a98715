//! Traffic engine error types.

use blitz_config::ConfigError;
use blitz_stats::StatsError;

/// Traffic engine error.
///
/// A lock held by another run is not an error; see [`RunOutcome::Busy`].
#[derive(Debug, thiserror::Error)]
pub enum TrafficError {
    #[error("lock {path}: {source}")]
    Lock {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("registry {path} unreadable: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("registry {path} is not valid JSON: {source}")]
    CorruptRegistry {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("registry serialize: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("registry write failed after {attempts} attempts: {source}")]
    Write {
        attempts: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("registry backup to {path} failed: {source}")]
    Backup {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("registry restore from {path} failed: {source}")]
    Restore {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("stats api: {0}")]
    Stats(#[from] StatsError),

    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("evaluation worker failed: {0}")]
    Worker(String),

    #[error("user not found: {0}")]
    NotFound(String),
}

/// Result of a lock-guarded run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum RunOutcome<T> {
    /// The run held the lock and finished.
    Completed(T),
    /// Another run holds the lock; nothing was read or written.
    Busy,
}

impl<T> RunOutcome<T> {
    #[inline]
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy)
    }

    /// The completed value, `None` if the run was skipped.
    #[inline]
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(v) => Some(v),
            Self::Busy => None,
        }
    }
}
