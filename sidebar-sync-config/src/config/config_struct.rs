//! Core `Config` struct definition.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Upper bound for `backup_hour_span`; a bucket never spans more than a day.
pub const MAX_BACKUP_HOUR_SPAN: u32 = 24;

/// Configuration for window mirroring and session persistence.
///
/// Every field has a serde default so partial YAML files load cleanly and
/// files written by older versions stay compatible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    // ========================================================================
    // Window mirroring
    // ========================================================================
    /// Gates whether mutation mirroring and content handoff run at all
    #[serde(default = "crate::defaults::bool_true")]
    pub window_sync_enabled: bool,

    /// Restrict mirrored and restored items to pinned/essential ones
    #[serde(default = "crate::defaults::bool_false")]
    pub sync_only_pinned_tabs: bool,

    /// Whether windows marked unsynced receive items on restore
    #[serde(default = "crate::defaults::bool_true")]
    pub restore_unsynced_windows: bool,

    /// Bounded wait for a companion signal during a coordinated close (ms)
    #[serde(default = "crate::defaults::companion_timeout_ms")]
    pub companion_timeout_ms: u64,

    // ========================================================================
    // Session persistence
    // ========================================================================
    /// Gates dated backup rotation
    #[serde(default = "crate::defaults::bool_true")]
    pub session_backup_enabled: bool,

    /// Maximum number of dated backups kept on disk
    #[serde(default = "crate::defaults::max_session_backups")]
    pub max_session_backups: usize,

    /// Bucket width in hours for dated backup filenames
    #[serde(default = "crate::defaults::backup_hour_span")]
    pub backup_hour_span: u32,

    /// Debounce applied to non-immediate saves (ms)
    #[serde(default = "crate::defaults::save_debounce_ms")]
    pub save_debounce_ms: u64,

    /// Long debounce between backup rotations (seconds)
    #[serde(default = "crate::defaults::backup_rotation_interval_secs")]
    pub backup_rotation_interval_secs: u64,

    /// Override for the directory holding the session document and backups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window_sync_enabled: crate::defaults::bool_true(),
            sync_only_pinned_tabs: crate::defaults::bool_false(),
            restore_unsynced_windows: crate::defaults::bool_true(),
            companion_timeout_ms: crate::defaults::companion_timeout_ms(),
            session_backup_enabled: crate::defaults::bool_true(),
            max_session_backups: crate::defaults::max_session_backups(),
            backup_hour_span: crate::defaults::backup_hour_span(),
            save_debounce_ms: crate::defaults::save_debounce_ms(),
            backup_rotation_interval_secs: crate::defaults::backup_rotation_interval_secs(),
            session_dir: None,
        }
    }
}

impl Config {
    /// Check every range-constrained field, returning the first violation.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.backup_hour_span == 0 || self.backup_hour_span > MAX_BACKUP_HOUR_SPAN {
            return Err(ConfigError::Validation(format!(
                "backup_hour_span must be within 1..={MAX_BACKUP_HOUR_SPAN}, got {}",
                self.backup_hour_span
            )));
        }
        if self.max_session_backups == 0 {
            return Err(ConfigError::Validation(
                "max_session_backups must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Clamp out-of-range fields into their accepted range, logging each fix.
    pub fn validate(&mut self) {
        if self.backup_hour_span == 0 || self.backup_hour_span > MAX_BACKUP_HOUR_SPAN {
            let clamped = self.backup_hour_span.clamp(1, MAX_BACKUP_HOUR_SPAN);
            log::warn!(
                "backup_hour_span {} out of range, clamping to {}",
                self.backup_hour_span,
                clamped
            );
            self.backup_hour_span = clamped;
        }
        if self.max_session_backups == 0 {
            log::warn!("max_session_backups is 0, clamping to 1");
            self.max_session_backups = 1;
        }
    }

    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }

    pub fn backup_rotation_interval(&self) -> Duration {
        Duration::from_secs(self.backup_rotation_interval_secs)
    }

    pub fn companion_timeout(&self) -> Duration {
        Duration::from_millis(self.companion_timeout_ms)
    }
}
