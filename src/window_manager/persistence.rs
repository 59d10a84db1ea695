//! Snapshot collection and saves.

use super::WindowSyncManager;
use crate::session::SidebarDocument;
use crate::session::capture::{capture_document, carry_forward};
use anyhow::Result;

impl WindowSyncManager {
    /// Collect the canonical document from every eligible window.
    ///
    /// Items known to the previous document but held by no eligible window
    /// are carried forward unless they were closed, and the sync overlay
    /// fills in anything still missing.
    pub fn collect_snapshot(&self) -> SidebarDocument {
        let order = self.registry.eligible();
        let mut document = capture_document(&order, &self.windows, &self.document.spaces);
        carry_forward(&mut document, &self.document, &self.deleted);
        self.sync.overlay().reapply(&mut document);
        document
    }

    /// Collect, then write now or on the debounce.
    ///
    /// Also schedules a backup rotation. The change notification is raised
    /// by the write itself, so a debounced save notifies once it lands.
    pub fn save_state(&mut self, immediate: bool) -> Result<()> {
        let document = self.collect_snapshot();
        self.document = document.clone();
        self.scheduler.save(document, immediate)?;
        self.rotation.request();
        crate::debug_log!(
            "SESSION",
            "Saved state ({}), {} tabs",
            if immediate { "immediate" } else { "debounced" },
            self.document.tabs.len()
        );
        Ok(())
    }

    pub fn has_pending_save(&self) -> bool {
        self.scheduler.has_pending()
    }
}
