//! Shared integration test helpers for sidebar-sync.
//!
//! Rust integration tests use `mod common;` to bring these in. The
//! `dead_code` allowance keeps files that use only a subset quiet.
//!
//! ```ignore
//! mod common;
//! use common::{TestContext, open_tab};
//! ```

#![allow(dead_code)]

use sidebar_sync::WindowSyncManager;
use sidebar_sync::mirror::{MutationEvent, MutationKind};
use sidebar_sync::model::{ItemAttrs, ItemId, ItemKind};
use sidebar_sync::tab::TabId;
use sidebar_sync::window::{WindowId, WindowPrivacy};
use sidebar_sync_config::Config;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temp session directory plus a `Config` pointing at it.
///
/// Keep the context alive for the whole test: dropping it removes the
/// directory.
pub struct TestContext {
    pub dir: TempDir,
    pub config: Config,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Use `config` but force its session directory into the temp dir.
    pub fn with_config(mut config: Config) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        config.session_dir = Some(dir.path().to_path_buf());
        Self { dir, config }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn primary(&self) -> PathBuf {
        self.path().join("sidebar-session.json.gz")
    }

    pub fn clean_copy(&self) -> PathBuf {
        self.path().join("backups").join("clean-sidebar-session.json.gz")
    }

    pub fn manager(&self) -> WindowSyncManager {
        WindowSyncManager::new(&self.config).expect("Failed to create manager")
    }

    /// Manager with `count` empty synced windows, in opening order.
    pub fn manager_with_windows(&self, count: usize) -> (WindowSyncManager, Vec<WindowId>) {
        let mut manager = self.manager();
        let windows = (0..count)
            .map(|_| manager.open_window(WindowPrivacy::Synced))
            .collect();
        (manager, windows)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a tab in `window` and report it as opened.
pub fn open_tab(manager: &mut WindowSyncManager, window: WindowId, attrs: ItemAttrs) -> TabId {
    let tab = manager
        .window_mut(window)
        .expect("window exists")
        .tabs
        .new_tab(ItemKind::Tab, attrs);
    manager.on_mutation(MutationEvent::item(window, MutationKind::Opened, tab));
    tab
}

/// Cross-window id of a handle, once mirrored.
pub fn item_of(manager: &WindowSyncManager, window: WindowId, tab: TabId) -> ItemId {
    manager
        .window(window)
        .and_then(|w| w.tabs.get_tab(tab))
        .and_then(|t| t.item_id.clone())
        .expect("handle is mirrored")
}

/// Item ids of a window's handles in sidebar order; unmirrored handles are skipped.
pub fn item_order(manager: &WindowSyncManager, window: WindowId) -> Vec<ItemId> {
    manager
        .window(window)
        .expect("window exists")
        .tabs
        .tabs()
        .iter()
        .filter_map(|t| t.item_id.clone())
        .collect()
}

/// The handle `window` holds for `item`.
pub fn counterpart(manager: &WindowSyncManager, window: WindowId, item: &ItemId) -> TabId {
    manager
        .items()
        .resolve(window, item)
        .expect("window holds a counterpart")
}

pub fn attrs_of(manager: &WindowSyncManager, window: WindowId, tab: TabId) -> ItemAttrs {
    manager
        .window(window)
        .and_then(|w| w.tabs.get_tab(tab))
        .map(|t| t.attrs.clone())
        .expect("handle exists")
}

pub fn is_live(manager: &WindowSyncManager, window: WindowId, tab: TabId) -> bool {
    manager
        .window(window)
        .and_then(|w| w.tabs.get_tab(tab))
        .is_some_and(|t| t.content_visible())
}
