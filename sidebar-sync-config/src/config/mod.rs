//! Sidebar sync configuration management.
//!
//! # Sub-modules
//!
//! - [`config_struct`]: Core `Config` struct, its `Default` impl and validation
//! - [`persistence`]: `impl Config` methods for load/save and path resolution

pub mod config_struct;
pub mod persistence;

pub use config_struct::Config;
