//! Replaying an admitted mutation into one target window.

use super::event::{MutationKind, Payload, PendingMutation};
use super::placement::placement_index;
use crate::error::SyncError;
use crate::model::{ItemId, ItemSnapshot};
use crate::tab::{Tab, TabId};
use crate::window::{ItemRegistry, WindowId, WindowState};

/// Effect of one mutation on one target window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Created(TabId),
    Updated(TabId),
    Removed(TabId),
    SplitChanged,
    /// Nothing to replay in other windows
    Unchanged,
}

/// Tally of one `drain`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorReport {
    /// Target windows a mutation was replayed into
    pub applied: usize,
    /// Targets where the counterpart was missing
    pub not_found: usize,
    pub transfers: usize,
    pub transfer_failures: usize,
    /// Content that had no owner anywhere and was loaded fresh
    pub loaded: usize,
    pub windows_closed: usize,
}

impl MirrorReport {
    pub fn changed_anything(&self) -> bool {
        self.applied > 0 || self.transfers > 0 || self.loaded > 0 || self.windows_closed > 0
    }
}

/// Replay `pending` into `target`.
///
/// A missing counterpart is reported as `SyncError::NotFound`; callers
/// treat it as a no-op for that window.
pub fn apply_to_window(
    target: &mut WindowState,
    items: &mut ItemRegistry,
    pending: &PendingMutation,
    only_pinned: bool,
) -> Result<ApplyOutcome, SyncError> {
    let snapshot = match &pending.payload {
        Payload::Window => return Ok(ApplyOutcome::Unchanged),
        Payload::Split(split) => {
            target.upsert_split_view(split.clone());
            return Ok(ApplyOutcome::SplitChanged);
        }
        Payload::SplitGroup(group_id) => {
            target.remove_split_view(group_id);
            return Ok(ApplyOutcome::SplitChanged);
        }
        Payload::Removed(item_id) => {
            return remove_counterpart(target, items, item_id).map(ApplyOutcome::Removed);
        }
        Payload::Item { snapshot, .. } => snapshot,
    };

    let kind = pending.kind;
    if removes_everywhere(pending, only_pinned) {
        return remove_counterpart(target, items, &snapshot.item_id).map(ApplyOutcome::Removed);
    }
    if kind.creates() {
        return Ok(match items.resolve(target.id, &snapshot.item_id) {
            Some(_) => ApplyOutcome::Updated(update_counterpart(target, items, snapshot, false)?),
            None => ApplyOutcome::Created(create_counterpart(target, items, snapshot)),
        });
    }
    if kind.moves_content() {
        return Ok(ApplyOutcome::Unchanged);
    }
    update_counterpart(target, items, snapshot, kind.repositions()).map(ApplyOutcome::Updated)
}

/// Whether `pending` takes its item out of every other window.
///
/// Besides closes, in pinned-only mode an item unpinned or demoted out of
/// the pinned subset stops being mirrored.
pub fn removes_everywhere(pending: &PendingMutation, only_pinned: bool) -> bool {
    match &pending.payload {
        Payload::Removed(_) => true,
        Payload::Item { snapshot, .. } => {
            pending.kind.removes()
                || (only_pinned
                    && matches!(pending.kind, MutationKind::Unpinned | MutationKind::Demoted)
                    && !snapshot.attrs.in_pinned_subset())
        }
        _ => false,
    }
}

fn not_found(window: WindowId, item_id: &ItemId) -> SyncError {
    SyncError::NotFound {
        window,
        item: item_id.clone(),
    }
}

/// Insert a counterpart of `snapshot` carrying the same item id.
///
/// The id is set before the handle exists anywhere, so the target window's
/// own creation notification is recognized as a loopback.
pub fn create_counterpart(
    target: &mut WindowState,
    items: &mut ItemRegistry,
    snapshot: &ItemSnapshot,
) -> TabId {
    let tab_id = target.tabs.allocate_id();
    let index = placement_index(&target.tabs, items, target.id, snapshot);
    target
        .tabs
        .insert_tab_at(Tab::from_snapshot(tab_id, snapshot), index);
    items.bind(target.id, snapshot.item_id.clone(), tab_id);
    crate::debug_trace!(
        "MIRROR",
        "Created counterpart of {} in {} at {}",
        snapshot.item_id,
        target.id,
        index
    );
    tab_id
}

fn update_counterpart(
    target: &mut WindowState,
    items: &ItemRegistry,
    snapshot: &ItemSnapshot,
    reposition: bool,
) -> Result<TabId, SyncError> {
    let tab_id = items
        .resolve(target.id, &snapshot.item_id)
        .ok_or_else(|| not_found(target.id, &snapshot.item_id))?;
    let Some(tab) = target.tabs.get_tab_mut(tab_id) else {
        return Err(not_found(target.id, &snapshot.item_id));
    };
    tab.apply_snapshot(snapshot);

    if reposition {
        let window = target.id;
        target
            .tabs
            .reposition(tab_id, |tabs| placement_index(tabs, items, window, snapshot));
    }
    Ok(tab_id)
}

pub fn remove_counterpart(
    target: &mut WindowState,
    items: &mut ItemRegistry,
    item_id: &ItemId,
) -> Result<TabId, SyncError> {
    let tab_id = items
        .unbind(target.id, item_id)
        .ok_or_else(|| not_found(target.id, item_id))?;
    target.tabs.remove_tab(tab_id);
    Ok(tab_id)
}
