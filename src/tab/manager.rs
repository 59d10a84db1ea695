//! Ordered item tree of a single window

use super::{ContainerKey, Tab, TabId};
use crate::model::{ItemAttrs, ItemKind};

/// Manages the items of one window, in sidebar order
#[derive(Debug)]
pub struct TabManager {
    /// All items in this window, in order
    tabs: Vec<Tab>,
    /// Currently selected item
    active_tab_id: Option<TabId>,
    /// Counter for generating window-local ids
    next_tab_id: TabId,
}

impl TabManager {
    /// Create a new empty tab manager
    pub fn new() -> Self {
        Self {
            tabs: Vec::new(),
            active_tab_id: None,
            next_tab_id: 1,
        }
    }

    /// Reserve the next window-local id
    pub fn allocate_id(&mut self) -> TabId {
        let id = self.next_tab_id;
        self.next_tab_id += 1;
        id
    }

    /// Create a new local item at the end of the window and select it.
    ///
    /// The item has no cross-window id yet; it gets one when its
    /// creation is mirrored.
    pub fn new_tab(&mut self, kind: ItemKind, attrs: ItemAttrs) -> TabId {
        let id = self.allocate_id();
        self.tabs.push(Tab::new(id, kind, attrs));
        self.active_tab_id = Some(id);
        log::info!("Created new {:?} {} (total: {})", kind, id, self.tabs.len());
        id
    }

    /// Remove an item by ID without dropping it, returning the handle.
    ///
    /// Returns `Some((tab, is_empty))` if the item was found, `None` otherwise.
    pub fn remove_tab(&mut self, id: TabId) -> Option<(Tab, bool)> {
        let idx = self.tabs.iter().position(|t| t.id == id)?;

        log::debug!("Removing item {} (index {})", id, idx);

        let tab = self.tabs.remove(idx);

        // If we removed the active item, prefer the one now at the same index
        if self.active_tab_id == Some(id) {
            self.active_tab_id = if self.tabs.is_empty() {
                None
            } else {
                let new_idx = idx.min(self.tabs.len().saturating_sub(1));
                Some(self.tabs[new_idx].id)
            };
        }

        let is_empty = self.tabs.is_empty();
        Some((tab, is_empty))
    }

    /// Insert a handle at a specific index without changing the selection.
    ///
    /// The index is clamped to `0..=self.tabs.len()`.
    pub fn insert_tab_at(&mut self, tab: Tab, index: usize) {
        let clamped = index.min(self.tabs.len());
        let id = tab.id;
        self.next_tab_id = self.next_tab_id.max(id + 1);
        self.tabs.insert(clamped, tab);
        log::debug!(
            "Inserted item {} at index {} (total: {})",
            id,
            clamped,
            self.tabs.len()
        );
    }

    /// Get a reference to the active item
    pub fn active_tab(&self) -> Option<&Tab> {
        self.active_tab_id
            .and_then(|id| self.tabs.iter().find(|t| t.id == id))
    }

    /// Switch to an item by ID
    pub fn switch_to(&mut self, id: TabId) -> bool {
        if self.tabs.iter().any(|t| t.id == id) {
            self.active_tab_id = Some(id);
            log::debug!("Switched to item {}", id);
            true
        } else {
            false
        }
    }

    /// Take an item out and put it back where `place` says.
    ///
    /// `place` sees the window without the item. The selection is kept.
    /// Returns the new index, or `None` if the item is unknown.
    pub fn reposition(&mut self, id: TabId, place: impl FnOnce(&TabManager) -> usize) -> Option<usize> {
        let from = self.position_of(id)?;
        let tab = self.tabs.remove(from);
        let to = place(self).min(self.tabs.len());
        self.tabs.insert(to, tab);
        if from != to {
            log::debug!("Repositioned item {} from index {} to {}", id, from, to);
        }
        Some(to)
    }

    /// Get the number of items
    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    /// Get the active item ID
    pub fn active_tab_id(&self) -> Option<TabId> {
        self.active_tab_id
    }

    /// Get all items as a slice
    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn get_tab(&self, id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == id)
    }

    pub fn get_tab_mut(&mut self, id: TabId) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| t.id == id)
    }

    pub fn position_of(&self, id: TabId) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == id)
    }

    /// The nearest mirrored item before `id` in the same container.
    pub fn predecessor_in_container(&self, id: TabId) -> Option<&Tab> {
        let idx = self.position_of(id)?;
        let key = self.tabs[idx].container_key();
        self.tabs[..idx]
            .iter()
            .rev()
            .find(|t| t.item_id.is_some() && t.container_key() == key)
    }

    /// Index of the first item in `key`'s container
    pub fn container_head(&self, key: &ContainerKey) -> Option<usize> {
        self.tabs.iter().position(|t| &t.container_key() == key)
    }
}

impl Default for TabManager {
    fn default() -> Self {
        Self::new()
    }
}
