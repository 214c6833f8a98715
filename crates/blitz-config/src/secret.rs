//! Stats API secret lookup from the proxy server's own config.

use std::io;
use std::path::Path;

use serde::Deserialize;

/// Failure to obtain `trafficStats.secret`.
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    /// File absent, section absent, key absent or empty value.
    #[error("trafficStats.secret not found in {path}")]
    NotFound { path: String },
    #[error("read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("{path} is not valid JSON: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// The slice of the Hysteria2 server config we care about.
#[derive(Deserialize)]
struct ProxyConfig {
    #[serde(default, rename = "trafficStats")]
    traffic_stats: Option<TrafficStats>,
}

#[derive(Deserialize)]
struct TrafficStats {
    #[serde(default)]
    secret: Option<String>,
}

/// Read `trafficStats.secret` from the proxy server config.
///
/// The value is returned verbatim; only an empty string counts as missing.
pub fn read_stats_secret(path: impl AsRef<Path>) -> Result<String, SecretError> {
    let path = path.as_ref();
    let shown = || path.display().to_string();

    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(SecretError::NotFound { path: shown() });
        }
        Err(source) => return Err(SecretError::Read { path: shown(), source }),
    };

    let config: ProxyConfig = serde_json::from_str(&data).map_err(|source| SecretError::Parse {
        path: shown(),
        source,
    })?;
    config
        .traffic_stats
        .and_then(|ts| ts.secret)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| SecretError::NotFound { path: shown() })
}
