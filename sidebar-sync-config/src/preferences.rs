//! Opaque option lookups.
//!
//! The core never reaches into `Config` fields directly. It asks for an
//! option by key through [`Preferences`], so hosts that keep their settings
//! elsewhere can plug in their own store.

use crate::config::Config;

/// Option keys recognized by the core.
pub mod keys {
    pub const WINDOW_SYNC_ENABLED: &str = "sidebar.window-sync.enabled";
    pub const SYNC_ONLY_PINNED_TABS: &str = "sidebar.window-sync.sync-only-pinned-tabs";
    pub const RESTORE_UNSYNCED_WINDOWS: &str = "sidebar.window-sync.restore-unsynced-windows";
    pub const COMPANION_TIMEOUT_MS: &str = "sidebar.window-sync.companion-timeout-ms";
    pub const SESSION_BACKUP_ENABLED: &str = "sidebar.session.backup.enabled";
    pub const MAX_SESSION_BACKUPS: &str = "sidebar.session.backup.max";
    pub const BACKUP_HOUR_SPAN: &str = "sidebar.session.backup.hour-span";
    pub const SAVE_DEBOUNCE_MS: &str = "sidebar.session.save-debounce-ms";
    pub const BACKUP_ROTATION_INTERVAL_SECS: &str = "sidebar.session.backup.interval-secs";
}

/// Key/value option store consumed by the core.
///
/// Unknown keys return `None`; callers decide the fallback.
pub trait Preferences {
    fn bool_pref(&self, key: &str) -> Option<bool>;

    fn int_pref(&self, key: &str) -> Option<u64>;

    fn bool_or(&self, key: &str, fallback: bool) -> bool {
        self.bool_pref(key).unwrap_or(fallback)
    }

    fn int_or(&self, key: &str, fallback: u64) -> u64 {
        self.int_pref(key).unwrap_or(fallback)
    }
}

impl Preferences for Config {
    fn bool_pref(&self, key: &str) -> Option<bool> {
        match key {
            keys::WINDOW_SYNC_ENABLED => Some(self.window_sync_enabled),
            keys::SYNC_ONLY_PINNED_TABS => Some(self.sync_only_pinned_tabs),
            keys::RESTORE_UNSYNCED_WINDOWS => Some(self.restore_unsynced_windows),
            keys::SESSION_BACKUP_ENABLED => Some(self.session_backup_enabled),
            _ => None,
        }
    }

    fn int_pref(&self, key: &str) -> Option<u64> {
        match key {
            keys::MAX_SESSION_BACKUPS => Some(self.max_session_backups as u64),
            keys::BACKUP_HOUR_SPAN => Some(u64::from(self.backup_hour_span)),
            keys::SAVE_DEBOUNCE_MS => Some(self.save_debounce_ms),
            keys::BACKUP_ROTATION_INTERVAL_SECS => Some(self.backup_rotation_interval_secs),
            keys::COMPANION_TIMEOUT_MS => Some(self.companion_timeout_ms),
            _ => None,
        }
    }
}
