//! Window-local item handles.
//!
//! This module provides:
//! - `Tab`: one window's live handle for a mirrored item (tab, group or folder)
//! - `TabManager`: the ordered item tree of a single window
//! - `ContainerKey`: which structural container an item sits in

mod container;
mod manager;

pub use container::{ContainerKey, Section};
pub use manager::TabManager;

use crate::model::{ItemAttrs, ItemId, ItemKind, ItemSnapshot, NavigationHistory, PinnedInitialState};
use crate::transfer::content::{ContentSlot, FramePreview};

/// Window-local handle identifier
pub type TabId = u64;

/// A window's handle for one sidebar item.
#[derive(Debug, Clone)]
pub struct Tab {
    /// Window-local id (never shared across windows)
    pub id: TabId,
    /// Cross-window id; `None` until the item is first mirrored
    pub item_id: Option<ItemId>,
    pub kind: ItemKind,
    pub attrs: ItemAttrs,
    pub history: NavigationHistory,
    pub pinned_initial: Option<PinnedInitialState>,
    /// Rendering resource bound to this handle
    pub content: ContentSlot,
    /// Still frame shown while live content is being handed over
    pub preview: Option<FramePreview>,
}

impl Tab {
    pub fn new(id: TabId, kind: ItemKind, attrs: ItemAttrs) -> Self {
        Self {
            id,
            item_id: None,
            kind,
            attrs,
            history: NavigationHistory::default(),
            pinned_initial: None,
            content: ContentSlot::default(),
            preview: None,
        }
    }

    /// Build the counterpart of a mirrored item: same id, lazy content.
    pub fn from_snapshot(id: TabId, snapshot: &ItemSnapshot) -> Self {
        Self {
            id,
            item_id: Some(snapshot.item_id.clone()),
            kind: snapshot.kind,
            attrs: snapshot.attrs.clone(),
            history: snapshot.history.clone(),
            pinned_initial: snapshot.pinned_initial.clone(),
            content: ContentSlot::default(),
            preview: None,
        }
    }

    /// Whether this handle currently renders the item's live content
    pub fn content_visible(&self) -> bool {
        self.content.is_live()
    }

    pub fn container_key(&self) -> ContainerKey {
        ContainerKey::of(&self.attrs)
    }

    /// Overwrite every sync-relevant field from a snapshot.
    pub fn apply_snapshot(&mut self, snapshot: &ItemSnapshot) {
        self.attrs = snapshot.attrs.clone();
        if !snapshot.history.is_empty() && !self.content_visible() {
            self.history = snapshot.history.clone();
        }
        self.pinned_initial = snapshot.pinned_initial.clone();
    }

    /// Title shown for the item: explicit label, else current page title.
    pub fn display_label(&self) -> Option<&str> {
        self.attrs.label.as_deref().or_else(|| {
            self.history
                .current()
                .map(|entry| entry.title.as_str())
                .filter(|title| !title.is_empty())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counterpart_starts_unloaded() {
        let snapshot = ItemSnapshot {
            item_id: ItemId::from("t1"),
            kind: ItemKind::Tab,
            attrs: ItemAttrs::pinned_in("ws"),
            history: NavigationHistory::single("https://a.test", "A"),
            pinned_initial: None,
            predecessor: None,
        };
        let tab = Tab::from_snapshot(7, &snapshot);
        assert_eq!(tab.id, 7);
        assert_eq!(tab.item_id, Some(ItemId::from("t1")));
        assert!(!tab.content_visible());
        assert_eq!(tab.display_label(), Some("A"));
    }

    #[test]
    fn test_apply_snapshot_keeps_history_of_live_owner() {
        use crate::transfer::content::{ExecutionMode, LiveContent};

        let mut tab = Tab::new(1, ItemKind::Tab, ItemAttrs::default());
        tab.history = NavigationHistory::single("https://live.test", "Live");
        tab.content = ContentSlot::Live(LiveContent::new(1, ExecutionMode::InProcess));

        let snapshot = ItemSnapshot {
            item_id: ItemId::from("t1"),
            kind: ItemKind::Tab,
            attrs: ItemAttrs {
                label: Some("Renamed".to_string()),
                ..ItemAttrs::default()
            },
            history: NavigationHistory::single("https://stale.test", "Stale"),
            pinned_initial: None,
            predecessor: None,
        };
        tab.apply_snapshot(&snapshot);
        assert_eq!(tab.display_label(), Some("Renamed"));
        assert_eq!(tab.history.current().unwrap().url, "https://live.test");
    }
}
