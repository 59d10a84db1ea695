//! Default value functions for configuration.
//!
//! Each sub-module groups related `default_*` free functions used as
//! `#[serde(default = "crate::defaults::...")]` attributes on `Config` fields.

mod session;
mod window_sync;

// ── Primitive helpers ──────────────────────────────────────────────────────

pub fn bool_false() -> bool {
    false
}

pub fn bool_true() -> bool {
    true
}

// ── Session persistence & backups ──────────────────────────────────────────
pub use session::{
    backup_hour_span, backup_rotation_interval_secs, max_session_backups, save_debounce_ms,
};

// ── Window mirroring ───────────────────────────────────────────────────────
pub use window_sync::companion_timeout_ms;
