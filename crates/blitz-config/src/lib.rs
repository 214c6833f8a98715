//! Configuration loading, validation and CLI overrides for blitz.
//!
//! [`PanelConfig`] gathers every path and tunable the traffic engine needs,
//! so components receive one struct at construction instead of reaching for
//! ambient constants.

mod cli;
mod defaults;
mod loader;
mod secret;
mod types;
mod validate;

pub use cli::{CliOverrides, apply_overrides};
pub use loader::{ConfigError, load_config, load_config_or_default};
pub use secret::{SecretError, read_stats_secret};
pub use types::*;
pub use validate::validate_config;
