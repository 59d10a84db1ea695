//! Defaults for the session document, its save schedule, and dated backups.

pub fn max_session_backups() -> usize {
    20
}

/// Width of a dated backup bucket, in hours.
pub fn backup_hour_span() -> u32 {
    3
}

pub fn save_debounce_ms() -> u64 {
    1000
}

/// Ten minutes between backup rotations.
pub fn backup_rotation_interval_secs() -> u64 {
    600
}
