//! Windows taking part in mirroring.
//!
//! - `WindowState`: one window's item tree plus its view of workspaces and split views
//! - `WindowRegistry`: eligibility and focus order of all windows
//! - `ItemRegistry`: `(window, item)` to window-local handle lookup

mod item_registry;
mod registry;

pub use item_registry::ItemRegistry;
pub use registry::{WindowHandle, WindowPhase, WindowPrivacy, WindowRegistry};

use crate::model::{ItemId, SplitView, Workspace};
use crate::tab::TabManager;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Process-wide window identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}", self.0)
    }
}

/// Per-window state the core reads and writes
#[derive(Debug)]
pub struct WindowState {
    pub id: WindowId,
    pub tabs: TabManager,
    /// Workspaces materialized in this window
    pub workspaces: Vec<Workspace>,
    pub active_workspace: Option<String>,
    pub split_views: Vec<SplitView>,
}

impl WindowState {
    pub fn new(id: WindowId) -> Self {
        Self {
            id,
            tabs: TabManager::new(),
            workspaces: Vec::new(),
            active_workspace: None,
            split_views: Vec::new(),
        }
    }

    pub fn has_workspace(&self, uuid: &str) -> bool {
        self.workspaces.iter().any(|w| w.uuid == uuid)
    }

    /// Replace or add a split view, keyed by its group id
    pub fn upsert_split_view(&mut self, split: SplitView) {
        match self
            .split_views
            .iter_mut()
            .find(|s| s.group_id == split.group_id)
        {
            Some(existing) => *existing = split,
            None => self.split_views.push(split),
        }
    }

    pub fn remove_split_view(&mut self, group_id: &ItemId) -> bool {
        let before = self.split_views.len();
        self.split_views.retain(|s| &s.group_id != group_id);
        before != self.split_views.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SplitLayout;

    #[test]
    fn test_split_view_upsert_and_remove() {
        let mut window = WindowState::new(WindowId(1));
        let split = SplitView {
            group_id: ItemId::from("g1"),
            item_ids: vec![ItemId::from("a"), ItemId::from("b")],
            layout: SplitLayout::Vertical,
        };
        window.upsert_split_view(split.clone());
        window.upsert_split_view(SplitView {
            layout: SplitLayout::Grid,
            ..split
        });
        assert_eq!(window.split_views.len(), 1);
        assert_eq!(window.split_views[0].layout, SplitLayout::Grid);

        assert!(window.remove_split_view(&ItemId::from("g1")));
        assert!(!window.remove_split_view(&ItemId::from("g1")));
    }
}
