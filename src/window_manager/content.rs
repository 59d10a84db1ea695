//! Live content handoff between windows.

use super::WindowSyncManager;
use crate::error::SyncError;
use crate::mirror::MirrorReport;
use crate::model::ItemId;
use crate::transfer::{self, ContentId, TransferReport};
use crate::window::WindowId;

/// What making a window the content owner of an item did.
#[derive(Debug)]
pub enum ContentOutcome {
    /// The window already rendered the item
    AlreadyVisible,
    Transferred(TransferReport),
    /// No window rendered the item, so fresh content was loaded
    Loaded(ContentId),
    /// The owner keeps its content
    Failed(SyncError),
    /// The window holds no handle for the item
    Missing,
}

impl WindowSyncManager {
    /// Make `window`'s handle of `item_id` the one rendering live content.
    ///
    /// A successful transfer writes the session immediately.
    pub fn ensure_content_owner(&mut self, window: WindowId, item_id: &ItemId) -> ContentOutcome {
        let outcome = self.take_content_ownership(window, item_id);
        if matches!(outcome, ContentOutcome::Transferred(_))
            && let Err(e) = self.save_state(true)
        {
            log::warn!("Failed to save sidebar state after transfer of {}: {:#}", item_id, e);
        }
        outcome
    }

    /// Ownership change without the flush; `drain` flushes once per batch.
    pub(crate) fn take_content_ownership(
        &mut self,
        window: WindowId,
        item_id: &ItemId,
    ) -> ContentOutcome {
        let Some(tab_id) = self.items.resolve(window, item_id) else {
            return ContentOutcome::Missing;
        };
        let visible = self
            .windows
            .get(&window)
            .and_then(|w| w.tabs.get_tab(tab_id))
            .map(|tab| tab.content_visible());
        match visible {
            None => return ContentOutcome::Missing,
            Some(true) => return ContentOutcome::AlreadyVisible,
            Some(false) => {}
        }

        if let Some(owner) = self.content_owner(item_id, window) {
            return match self.transfer_between(owner, window, item_id) {
                Ok(report) => ContentOutcome::Transferred(report),
                Err(e) => ContentOutcome::Failed(e),
            };
        }

        let content_id = self.next_content_id;
        let Some(tab) = self
            .windows
            .get_mut(&window)
            .and_then(|w| w.tabs.get_tab_mut(tab_id))
        else {
            return ContentOutcome::Missing;
        };
        self.next_content_id += 1;
        transfer::load_fresh(tab, content_id);
        crate::debug_log!("TRANSFER", "Loaded content {} for {} in {}", content_id, item_id, window);
        ContentOutcome::Loaded(content_id)
    }

    /// Window, other than `except`, whose handle of `item_id` is live
    pub fn content_owner(&self, item_id: &ItemId, except: WindowId) -> Option<WindowId> {
        self.items
            .windows_holding(item_id)
            .into_iter()
            .filter(|w| *w != except)
            .find(|w| {
                self.items
                    .resolve(*w, item_id)
                    .and_then(|tab| self.windows.get(w)?.tabs.get_tab(tab))
                    .is_some_and(|tab| tab.content_visible())
            })
    }

    /// Transfer the live content of `item_id` from one window's handle to
    /// another's.
    pub(crate) fn transfer_between(
        &mut self,
        from: WindowId,
        to: WindowId,
        item_id: &ItemId,
    ) -> Result<TransferReport, SyncError> {
        let not_found = |window: WindowId| SyncError::NotFound {
            window,
            item: item_id.clone(),
        };
        if from == to {
            return Err(SyncError::incompatible(format!(
                "{} cannot hand content to itself",
                from
            )));
        }
        let donor_id = self.items.resolve(from, item_id).ok_or_else(|| not_found(from))?;
        let receiver_id = self.items.resolve(to, item_id).ok_or_else(|| not_found(to))?;

        let [donor_window, receiver_window] = self.windows.get_disjoint_mut([&from, &to]);
        let donor = donor_window
            .and_then(|w| w.tabs.get_tab_mut(donor_id))
            .ok_or_else(|| not_found(from))?;
        let receiver = receiver_window
            .and_then(|w| w.tabs.get_tab_mut(receiver_id))
            .ok_or_else(|| not_found(to))?;

        let report = transfer::transfer(donor, receiver)?;
        crate::debug_info!("TRANSFER", "{} handed {} to {}", from, item_id, to);
        Ok(report)
    }

    /// Hand every live item of a closing window to the next most recently
    /// focused eligible window, waiting on registered companions first.
    pub(crate) async fn hand_off_closing(&mut self, origin: WindowId, report: &mut MirrorReport) {
        if !self.settings.enabled {
            return;
        }
        let Some(target) = self.registry.next_eligible_except(origin) else {
            crate::debug_info!("TRANSFER", "No window left to take over from {}", origin);
            return;
        };
        let live: Vec<ItemId> = self
            .windows
            .get(&origin)
            .map(|w| {
                w.tabs
                    .tabs()
                    .iter()
                    .filter(|t| t.content_visible())
                    .filter_map(|t| t.item_id.clone())
                    .collect()
            })
            .unwrap_or_default();

        for item_id in live {
            if let Some(signal) = self.companions.remove(&(origin, item_id.clone())) {
                let outcome = self.companion_wait.wait(signal).await;
                crate::debug_log!("TRANSFER", "Companion of {} in {}: {:?}", item_id, origin, outcome);
            }
            match self.transfer_between(origin, target, &item_id) {
                Ok(_) => report.transfers += 1,
                Err(SyncError::NotFound { .. }) => {
                    crate::debug_trace!("TRANSFER", "{} has no counterpart in {}", item_id, target);
                }
                Err(e) => {
                    report.transfer_failures += 1;
                    log::warn!("Closing handoff of {} to {} failed: {}", item_id, target, e);
                }
            }
            tokio::task::yield_now().await;
        }
    }
}
