//! Configuration system for sidebar-sync.
//!
//! This crate provides configuration loading, saving, and default values
//! for the window mirroring and session persistence core. It includes:
//!
//! - The `Config` struct and its defaults
//! - YAML persistence with atomic writes
//! - Typed configuration errors
//! - Opaque key/value option lookups (`Preferences`) consumed by the core

pub mod config;
pub mod defaults;
pub mod error;
pub mod preferences;

// Re-export main types for convenience
pub use config::Config;
pub use error::ConfigError;
pub use preferences::{Preferences, keys};
