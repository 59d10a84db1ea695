//! Defaults for cross-window mirroring and content handoff.

/// Upper bound on waiting for a companion signal while a window closes.
pub fn companion_timeout_ms() -> u64 {
    3000
}
