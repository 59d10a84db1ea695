//! External sync payloads, workspace propagation and pinned resets.

use super::WindowSyncManager;
use crate::error::SyncError;
use crate::model::{PinnedInitialState, Workspace};
use crate::session::SidebarDocument;
use crate::session::restore::{MaterializeScope, materialize, refresh_existing};
use crate::sync::SyncPayload;
use crate::tab::TabId;
use crate::window::WindowId;

impl WindowSyncManager {
    /// Deep copy of the canonical document, for building outgoing payloads.
    pub fn get_sidebar_data(&self) -> SidebarDocument {
        self.document.clone()
    }

    /// Outgoing payload built from the canonical document
    pub fn outgoing_payload(&self) -> SyncPayload {
        SyncPayload::outgoing(&self.document)
    }

    /// Merge an external payload into the canonical document, refresh the
    /// handles it mentions and create the new spaces, pinned tabs and
    /// folders in every eligible window.
    ///
    /// Returns how many handles were created across windows.
    pub fn apply_sync_data(&mut self, payload: &SyncPayload) -> Result<usize, SyncError> {
        let merged = self.sync.apply(&self.document, payload)?;
        self.deleted.retain(|id| !payload.mentions(id));
        self.document = merged;

        let only_pinned = self.settings.only_pinned;
        let mut created = 0;
        let mut refreshed = 0;
        for id in self.registry.eligible() {
            let Some(window) = self.windows.get_mut(&id) else {
                continue;
            };
            refreshed += refresh_existing(window, &self.items, &self.document, |item| {
                payload.mentions(item)
            });
            let report = materialize(
                window,
                &mut self.items,
                &self.document,
                MaterializeScope::SyncedSubset,
                only_pinned,
            );
            created += report.created;
        }
        crate::debug_info!(
            "SYNC",
            "Sync payload materialized {} handles, refreshed {}",
            created,
            refreshed
        );

        if let Err(e) = self.save_state(false) {
            log::warn!("Failed to save after applying sync data: {:#}", e);
        }
        Ok(created)
    }

    /// Replace the workspace list everywhere.
    ///
    /// Windows whose active workspace disappeared switch to the first one.
    pub fn propagate_workspaces_to_all_windows(&mut self, spaces: Vec<Workspace>) {
        for id in self.registry.eligible() {
            let Some(window) = self.windows.get_mut(&id) else {
                continue;
            };
            window.workspaces = spaces.clone();
            let active_gone = window
                .active_workspace
                .as_deref()
                .is_none_or(|uuid| !spaces.iter().any(|s| s.uuid == uuid));
            if active_gone {
                window.active_workspace = spaces.first().map(|s| s.uuid.clone());
            }
        }
        crate::debug_info!("SYNC", "Propagated {} workspaces", spaces.len());
        self.document.spaces = spaces;
        if let Err(e) = self.save_state(false) {
            log::warn!("Failed to save after propagating workspaces: {:#}", e);
        }
    }

    /// Remember a pinned tab's current url and label as its reset target,
    /// on every counterpart.
    ///
    /// Returns `Ok(false)` for tabs that are not pinned.
    pub fn set_pinned_initial_state(
        &mut self,
        window: WindowId,
        tab_id: TabId,
    ) -> Result<bool, SyncError> {
        let Some(tab) = self
            .windows
            .get(&window)
            .and_then(|w| w.tabs.get_tab(tab_id))
        else {
            return Err(SyncError::NotFound {
                window,
                item: self.items.item_for(window, tab_id).unwrap_or_default(),
            });
        };
        if !tab.attrs.pinned {
            return Ok(false);
        }
        let state = PinnedInitialState {
            url: tab
                .history
                .current()
                .map(|entry| entry.url.clone())
                .unwrap_or_default(),
            label: tab.attrs.label.clone(),
        };
        let item_id = tab.item_id.clone();

        let mut holders = vec![(window, tab_id)];
        if let Some(item_id) = &item_id {
            holders.extend(
                self.items
                    .windows_holding(item_id)
                    .into_iter()
                    .filter(|w| *w != window)
                    .filter_map(|w| Some((w, self.items.resolve(w, item_id)?))),
            );
        }
        for (holder, handle) in holders {
            if let Some(tab) = self
                .windows
                .get_mut(&holder)
                .and_then(|w| w.tabs.get_tab_mut(handle))
            {
                tab.pinned_initial = Some(state.clone());
            }
        }

        if let Err(e) = self.save_state(false) {
            log::warn!("Failed to save pinned state: {:#}", e);
        }
        Ok(true)
    }
}
