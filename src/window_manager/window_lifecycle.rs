//! Window open, restore and coordinated close.

use super::WindowSyncManager;
use crate::mirror::{MirrorReport, MutationEvent};
use crate::session::restore::{MaterializeReport, MaterializeScope, materialize};
use crate::window::{WindowId, WindowPrivacy, WindowState};
use anyhow::Result;

impl WindowSyncManager {
    /// Register a new, empty window.
    pub fn open_window(&mut self, privacy: WindowPrivacy) -> WindowId {
        let id = self.allocate_window_id();
        self.windows.insert(id, WindowState::new(id));
        self.registry.register(id, privacy);
        crate::debug_info!("WINDOW", "Opened {} ({:?})", id, privacy);
        id
    }

    /// Open a window and materialize the canonical document into it.
    ///
    /// Private windows start empty. Unsynced windows are filled only when
    /// `restore_unsynced_windows` is set.
    pub fn restore_window(&mut self, privacy: WindowPrivacy) -> (WindowId, MaterializeReport) {
        let id = self.open_window(privacy);
        let restore = match privacy {
            WindowPrivacy::Synced => true,
            WindowPrivacy::Unsynced => self.restore_unsynced,
            WindowPrivacy::Private => false,
        };
        if !restore {
            return (id, MaterializeReport::default());
        }

        let only_pinned = self.settings.only_pinned;
        let Some(window) = self.windows.get_mut(&id) else {
            return (id, MaterializeReport::default());
        };
        let report = materialize(
            window,
            &mut self.items,
            &self.document,
            MaterializeScope::Full,
            only_pinned,
        );
        if window.active_workspace.is_none() {
            window.active_workspace = window.workspaces.first().map(|w| w.uuid.clone());
        }
        log::info!("Restored {} with {} items", id, report.created);
        (id, report)
    }

    /// Close a window: hand its live content to the next most recently
    /// focused eligible window, forget it, then save immediately.
    pub async fn close_window(&mut self, id: WindowId) -> Result<MirrorReport> {
        if !self.windows.contains_key(&id) {
            anyhow::bail!("Unknown window {}", id);
        }
        self.on_mutation(MutationEvent::closing(id));
        let mut report = self.drain().await;

        self.windows.remove(&id);
        self.registry.remove(id);
        let forgotten = self.items.forget_window(id);
        self.mirror.forget_window(id);
        self.companions.retain(|(window, _), _| *window != id);
        report.windows_closed += 1;
        crate::debug_info!("WINDOW", "Closed {} ({} handles forgotten)", id, forgotten);

        self.save_state(true)?;
        Ok(report)
    }

    /// Flush pending saves and run a pending backup rotation.
    pub fn shutdown(&mut self) -> Result<()> {
        self.scheduler.flush_now()?;
        self.rotation.finalize();
        log::info!("Sidebar sync shut down");
        Ok(())
    }
}
