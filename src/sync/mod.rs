//! Sync merge: folding whole-document payloads from the external sync
//! source into the canonical document.
//!
//! Merging is additive. Records the payload does not mention are kept, so a
//! deletion can only arrive through a mirrored close. Every applied payload
//! is also folded into the [`SyncOverlay`], which fills items back into each
//! freshly collected document until some window has materialized them.

pub mod merge;

pub use merge::{CONTAINER_KEY, SPACE_KEY, TAB_KEY, merge_by_key, merge_pinned_tabs};

use crate::error::SyncError;
use crate::model::{ItemId, Workspace};
use crate::session::{FolderRecord, GroupRecord, SidebarDocument, TabRecord};
use serde::{Deserialize, Serialize};

/// The portable subset of a document, as exchanged with other devices.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPayload {
    #[serde(default)]
    pub spaces: Vec<Workspace>,
    #[serde(default)]
    pub pinned_tabs: Vec<TabRecord>,
    #[serde(default)]
    pub folders: Vec<FolderRecord>,
    #[serde(default)]
    pub groups: Vec<GroupRecord>,
}

impl SyncPayload {
    /// Outgoing payload for `document`.
    pub fn outgoing(document: &SidebarDocument) -> Self {
        Self {
            spaces: document.spaces.clone(),
            pinned_tabs: document.pinned_tabs().cloned().collect(),
            folders: document.folders.clone(),
            groups: document.groups.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.spaces.is_empty()
            && self.pinned_tabs.is_empty()
            && self.folders.is_empty()
            && self.groups.is_empty()
    }

    /// Whether any keyed record of the payload is `item_id`.
    pub fn mentions(&self, item_id: &ItemId) -> bool {
        self.pinned_tabs
            .iter()
            .any(|t| t.item_id.as_ref() == Some(item_id))
            || self.folders.iter().any(|f| &f.id == item_id)
            || self.groups.iter().any(|g| &g.id == item_id)
    }
}

/// Every externally merged record not yet dropped by a local close.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncOverlay {
    payload: SyncPayload,
}

impl SyncOverlay {
    pub fn payload(&self) -> &SyncPayload {
        &self.payload
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Accumulate `incoming` by key; nothing already recorded is removed.
    fn record(&mut self, incoming: &SyncPayload) -> Result<(), SyncError> {
        let overlay = &mut self.payload;
        overlay.spaces = merge_by_key(&overlay.spaces, &incoming.spaces, SPACE_KEY)?;
        overlay.pinned_tabs = merge_by_key(&overlay.pinned_tabs, &incoming.pinned_tabs, TAB_KEY)?;
        overlay.folders = merge_by_key(&overlay.folders, &incoming.folders, CONTAINER_KEY)?;
        overlay.groups = merge_by_key(&overlay.groups, &incoming.groups, CONTAINER_KEY)?;
        Ok(())
    }

    /// Drop an item closed locally so it is not filled back in.
    pub fn forget(&mut self, item_id: &ItemId) -> bool {
        if !self.payload.mentions(item_id) {
            return false;
        }
        let overlay = &mut self.payload;
        overlay.pinned_tabs.retain(|t| t.item_id.as_ref() != Some(item_id));
        overlay.folders.retain(|f| &f.id != item_id);
        overlay.groups.retain(|g| &g.id != item_id);
        true
    }

    /// Fill overlay records missing from a freshly collected document.
    ///
    /// Records the document already holds are left as collected, so local
    /// edits made after the merge are not rolled back. Returns how many
    /// records were filled in.
    pub fn reapply(&self, document: &mut SidebarDocument) -> usize {
        let mut filled = 0;
        for space in &self.payload.spaces {
            if !document.spaces.iter().any(|s| s.uuid == space.uuid) {
                document.spaces.push(space.clone());
                filled += 1;
            }
        }
        for tab in &self.payload.pinned_tabs {
            if tab.item_id.as_ref().is_some_and(|id| !document.contains_item(id)) {
                document.tabs.push(tab.clone());
                filled += 1;
            }
        }
        for folder in &self.payload.folders {
            if !document.contains_item(&folder.id) {
                document.folders.push(folder.clone());
                filled += 1;
            }
        }
        for group in &self.payload.groups {
            if !document.contains_item(&group.id) {
                document.groups.push(group.clone());
                filled += 1;
            }
        }
        if filled > 0 {
            crate::debug_log!("SYNC", "Overlay filled {} records into collected state", filled);
        }
        filled
    }
}

/// Applies sync payloads and keeps the overlay they build up.
#[derive(Debug, Default)]
pub struct SyncMerge {
    overlay: SyncOverlay,
}

impl SyncMerge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn overlay(&self) -> &SyncOverlay {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut SyncOverlay {
        &mut self.overlay
    }

    /// Merge `payload` into a copy of `document` and record it in the overlay.
    ///
    /// On error neither the document nor the overlay changes.
    pub fn apply(
        &mut self,
        document: &SidebarDocument,
        payload: &SyncPayload,
    ) -> Result<SidebarDocument, SyncError> {
        let mut merged = document.clone();
        merged.spaces = merge_by_key(&document.spaces, &payload.spaces, SPACE_KEY)?;
        merged.tabs = merge_pinned_tabs(&document.tabs, &payload.pinned_tabs);
        merged.folders = merge_by_key(&document.folders, &payload.folders, CONTAINER_KEY)?;
        merged.groups = merge_by_key(&document.groups, &payload.groups, CONTAINER_KEY)?;

        let mut overlay = self.overlay.clone();
        overlay.record(payload)?;
        self.overlay = overlay;

        log::info!(
            "Applied sync payload: {} spaces, {} pinned tabs, {} folders, {} groups",
            payload.spaces.len(),
            payload.pinned_tabs.len(),
            payload.folders.len(),
            payload.groups.len()
        );
        Ok(merged)
    }
}
