// Library exports for hosts embedding the sidebar sync core
//
// # Concurrency Policy
//
// The core runs on one cooperative task. Mutation handlers never run in
// parallel; they suspend only at disk I/O, content exchange and companion
// waits. New code should follow these rules:
//
//   - `parking_lot::Mutex`: the only lock, used for state shared with the
//     debounced save task (the pending document).
//
//   - `tokio::sync::watch`: change notifications to the external sync
//     client; never hold a borrow across an await.
//
//   - `tokio::sync::oneshot`: companion signals during a coordinated close,
//     always awaited under a bounded timeout.

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[macro_use]
pub mod debug;

pub mod cli;
pub mod error;
pub mod mirror;
pub mod model;
pub mod session;
pub mod sync;
pub mod tab;
pub mod transfer;
pub mod window;
pub mod window_manager;

pub use error::SyncError;
pub use window_manager::WindowSyncManager;
