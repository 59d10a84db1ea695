//! Cross-window item lookup.
//!
//! Mirrored items never hold references into other windows. Every
//! cross-window hop goes through this table instead, so a window can close
//! without leaving dangling links behind.

use super::WindowId;
use crate::model::ItemId;
use crate::tab::TabId;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Default)]
pub struct ItemRegistry {
    handles: HashMap<(WindowId, ItemId), TabId>,
    /// Reverse index: which windows hold a handle for an item
    holders: HashMap<ItemId, BTreeSet<WindowId>>,
}

impl ItemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, window: WindowId, item: ItemId, tab: TabId) {
        self.holders.entry(item.clone()).or_default().insert(window);
        self.handles.insert((window, item), tab);
    }

    pub fn unbind(&mut self, window: WindowId, item: &ItemId) -> Option<TabId> {
        let tab = self.handles.remove(&(window, item.clone()))?;
        if let Some(windows) = self.holders.get_mut(item) {
            windows.remove(&window);
            if windows.is_empty() {
                self.holders.remove(item);
            }
        }
        Some(tab)
    }

    pub fn resolve(&self, window: WindowId, item: &ItemId) -> Option<TabId> {
        self.handles.get(&(window, item.clone())).copied()
    }

    /// Reverse lookup, for handles the window already dropped
    pub fn item_for(&self, window: WindowId, tab: TabId) -> Option<ItemId> {
        self.handles
            .iter()
            .find(|((w, _), t)| *w == window && **t == tab)
            .map(|((_, item), _)| item.clone())
    }

    /// Windows holding a handle for `item`, in id order
    pub fn windows_holding(&self, item: &ItemId) -> Vec<WindowId> {
        self.holders
            .get(item)
            .map(|windows| windows.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Drop every binding of a closed window
    pub fn forget_window(&mut self, window: WindowId) -> usize {
        let items: Vec<ItemId> = self
            .handles
            .keys()
            .filter(|(w, _)| *w == window)
            .map(|(_, item)| item.clone())
            .collect();
        for item in &items {
            self.unbind(window, item);
        }
        items.len()
    }

    pub fn contains_item(&self, item: &ItemId) -> bool {
        self.holders.contains_key(item)
    }
}
