//! Core constants shared across blitz crates.
//!
//! This crate provides:
//! - Default configuration values
//! - The workspace version

pub mod defaults;

// Re-export commonly used items at crate root
pub use defaults::*;

/// Project version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
