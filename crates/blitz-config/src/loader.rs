//! Panel config file loading.
//!
//! The format follows the file extension. Errors name the offending file,
//! since the engine usually runs from a timer where only the log survives.

use std::{fs, io, path::Path};

use serde::de::DeserializeOwned;

use crate::PanelConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("{path}: invalid json: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path}: invalid yaml: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("{path}: invalid toml: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("{path}: unsupported config format (expected .toml, .json, .jsonc, .yaml or .yml)")]
    UnsupportedFormat { path: String },
    #[error("validation: {0}")]
    Validation(String),
}

impl ConfigError {
    /// Whether the config file itself does not exist.
    pub fn is_missing_file(&self) -> bool {
        matches!(self, Self::Read { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

pub fn load_config(path: impl AsRef<Path>) -> Result<PanelConfig, ConfigError> {
    let path = path.as_ref();
    let shown = || path.display().to_string();
    let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: shown(),
        source,
    })?;

    match path.extension().and_then(|s| s.to_str()).unwrap_or("") {
        "json" | "jsonc" => parse_json(&data).map_err(|source| ConfigError::Json {
            path: shown(),
            source,
        }),
        "yaml" | "yml" => serde_yaml::from_str(&data).map_err(|source| ConfigError::Yaml {
            path: shown(),
            source,
        }),
        "toml" => toml::from_str(&data).map_err(|source| ConfigError::Toml {
            path: shown(),
            source,
        }),
        _ => Err(ConfigError::UnsupportedFormat { path: shown() }),
    }
}

/// Like [`load_config`], but a missing file yields the built-in defaults.
///
/// Stock panel installs never ship a config file.
pub fn load_config_or_default(path: impl AsRef<Path>) -> Result<PanelConfig, ConfigError> {
    match load_config(path) {
        Err(e) if e.is_missing_file() => Ok(PanelConfig::default()),
        other => other,
    }
}

fn parse_json<T: DeserializeOwned>(data: &str) -> Result<T, serde_json::Error> {
    serde_json::from_reader(json_comments::StripComments::new(data.as_bytes()))
}
