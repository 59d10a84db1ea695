//! Event mirror.
//!
//! Mutations raised in one eligible window are admitted here, captured as
//! snapshots, and later replayed into every other eligible window by the
//! window manager's `drain`. Admission enforces the ordering rules:
//!
//! - one window's mutations are mirrored strictly in arrival order
//! - while one window's batch is in flight, other windows' events are dropped;
//!   dropped removals are replayed once the queue goes idle
//! - instant kinds (window closing) bypass the queue entirely
//! - items that already carry an id are never re-created (loopback)

pub mod apply;
pub mod event;
pub mod placement;
mod queue;

pub use apply::{
    ApplyOutcome, MirrorReport, apply_to_window, create_counterpart, remove_counterpart,
    removes_everywhere,
};
pub use event::{Dispatch, MutationEvent, MutationKind, Payload, PendingMutation, Subject};
pub use placement::placement_index;
pub use queue::MirrorQueue;

use crate::model::{ItemId, ItemSnapshot};
use crate::tab::{TabId, TabManager};
use crate::window::{ItemRegistry, WindowId, WindowRegistry, WindowState};
use std::collections::{HashMap, VecDeque};

/// Option values the mirror consults on every admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MirrorSettings {
    pub enabled: bool,
    pub only_pinned: bool,
}

impl Default for MirrorSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            only_pinned: false,
        }
    }
}

/// Borrowed view of the state admission reads and writes.
pub struct MirrorContext<'a> {
    pub windows: &'a mut HashMap<WindowId, WindowState>,
    pub registry: &'a mut WindowRegistry,
    pub items: &'a mut ItemRegistry,
    pub settings: MirrorSettings,
}

/// Outcome of inspecting an item event, before any side effect.
#[derive(Debug)]
enum ItemAdmission {
    Skip(&'static str),
    /// Already mirrored item
    Existing {
        kind: MutationKind,
        tab: TabId,
        item_id: ItemId,
        /// Drop the source's id: it left the synced subset
        release: bool,
    },
    /// Never mirrored; gets an id and is created everywhere
    Adopt { kind: MutationKind, tab: TabId },
    /// Source handle already removed
    Removed { kind: MutationKind, item_id: ItemId },
}

#[derive(Debug, Default)]
pub struct EventMirror {
    queue: MirrorQueue,
    instant: VecDeque<PendingMutation>,
    /// Removals refused while another window was busy
    deferred: Vec<PendingMutation>,
}

impl EventMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit one mutation notification.
    pub fn on_mutation(&mut self, ctx: MirrorContext<'_>, event: MutationEvent) -> Dispatch {
        let origin = event.window;
        let kind = event.kind;

        if kind.is_instant() {
            ctx.registry.begin_closing(origin);
            self.instant.push_back(PendingMutation {
                origin,
                kind,
                payload: Payload::Window,
            });
            crate::debug_info!("MIRROR", "{:?} from {} bypasses the queue", kind, origin);
            return Dispatch::Immediate;
        }
        if !ctx.settings.enabled || !ctx.registry.is_eligible(origin) {
            return Dispatch::Skipped;
        }
        if kind == MutationKind::FocusChanged {
            ctx.registry.focus(origin);
        }

        let subject = match event.subject {
            Subject::Window if kind == MutationKind::FocusChanged => ctx
                .windows
                .get(&origin)
                .and_then(|w| w.tabs.active_tab_id())
                .map_or(Subject::Window, Subject::Item),
            other => other,
        };

        let payload = match subject {
            Subject::Window => return Dispatch::Skipped,
            Subject::Split(split) => Payload::Split(split),
            Subject::SplitGroup(group_id) => Payload::SplitGroup(group_id),
            Subject::Item(tab) => {
                let admission = classify(&ctx, origin, kind, tab);
                if let ItemAdmission::Skip(reason) = admission {
                    crate::debug_trace!("MIRROR", "Skipped {:?} of {} in {}: {}", kind, tab, origin, reason);
                    return Dispatch::Skipped;
                }
                if !self.queue.accepts(origin) {
                    if kind.removes() {
                        self.defer(ctx, origin, admission);
                    }
                    return self.dropped(origin, kind);
                }
                match commit(ctx, origin, admission) {
                    Some(pending) => return self.queue.admit(pending),
                    None => return Dispatch::Skipped,
                }
            }
        };

        if !self.queue.accepts(origin) {
            return self.dropped(origin, kind);
        }
        self.queue.admit(PendingMutation {
            origin,
            kind,
            payload,
        })
    }

    fn dropped(&self, origin: WindowId, kind: MutationKind) -> Dispatch {
        crate::debug_log!(
            "MIRROR",
            "Dropped {:?} from {}: {:?} is being mirrored",
            kind,
            origin,
            self.queue.busy_with()
        );
        Dispatch::Dropped
    }

    /// Keep a refused removal; the source handle is gone, so no later event
    /// from its window could remove the counterparts.
    fn defer(&mut self, ctx: MirrorContext<'_>, origin: WindowId, admission: ItemAdmission) {
        if let Some(pending) = commit(ctx, origin, admission) {
            crate::debug_log!("MIRROR", "Deferred {:?} from {}", pending.kind, origin);
            self.deferred.push(pending);
        }
    }

    /// Queue the deferred removals of one window as a fresh batch.
    fn readmit_deferred(&mut self) {
        let Some(origin) = self.deferred.first().map(|p| p.origin) else {
            return;
        };
        let (batch, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.deferred)
            .into_iter()
            .partition(|p| p.origin == origin);
        self.deferred = rest;
        for pending in batch {
            self.queue.admit(pending);
        }
    }

    pub fn next_instant(&mut self) -> Option<PendingMutation> {
        self.instant.pop_front()
    }

    /// Take the in-flight batch; its window stays busy until `complete_batch`.
    ///
    /// Once nothing else is queued, deferred removals run.
    pub fn begin_batch(&mut self) -> Option<Vec<PendingMutation>> {
        if self.queue.is_idle() {
            self.readmit_deferred();
        }
        self.queue.begin()
    }

    pub fn complete_batch(&mut self) {
        self.queue.complete();
    }

    pub fn busy_with(&self) -> Option<WindowId> {
        self.queue.busy_with()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_idle() && self.instant.is_empty() && self.deferred.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.queue.pending_len() + self.instant.len() + self.deferred.len()
    }

    pub fn forget_window(&mut self, window: WindowId) {
        self.queue.forget(window);
    }
}

fn classify(
    ctx: &MirrorContext<'_>,
    origin: WindowId,
    kind: MutationKind,
    tab_id: TabId,
) -> ItemAdmission {
    let Some(window) = ctx.windows.get(&origin) else {
        return ItemAdmission::Skip("unknown window");
    };
    let Some(tab) = window.tabs.get_tab(tab_id) else {
        return match ctx.items.item_for(origin, tab_id) {
            Some(item_id) if kind.removes() => ItemAdmission::Removed { kind, item_id },
            _ => ItemAdmission::Skip("unknown item"),
        };
    };

    let synced = !ctx.settings.only_pinned || tab.attrs.in_pinned_subset();
    let leaving = matches!(kind, MutationKind::Unpinned | MutationKind::Demoted);
    match &tab.item_id {
        Some(_) if kind.creates() => ItemAdmission::Skip("already mirrored"),
        Some(item_id) if synced || kind.removes() || leaving => ItemAdmission::Existing {
            kind,
            tab: tab_id,
            item_id: item_id.clone(),
            release: !synced && leaving,
        },
        Some(_) => ItemAdmission::Skip("outside the pinned subset"),
        None if kind.removes() => ItemAdmission::Skip("never mirrored"),
        None if synced => {
            let kind = if kind.creates() {
                kind
            } else if tab.kind.is_container() {
                MutationKind::GroupCreated
            } else {
                MutationKind::Opened
            };
            ItemAdmission::Adopt { kind, tab: tab_id }
        }
        None => ItemAdmission::Skip("outside the pinned subset"),
    }
}

/// Apply admission side effects and capture the snapshot.
fn commit(
    ctx: MirrorContext<'_>,
    origin: WindowId,
    admission: ItemAdmission,
) -> Option<PendingMutation> {
    let (kind, tab_id, item_id, release) = match admission {
        ItemAdmission::Skip(_) => return None,
        ItemAdmission::Removed { kind, item_id } => {
            ctx.items.unbind(origin, &item_id);
            return Some(PendingMutation {
                origin,
                kind,
                payload: Payload::Removed(item_id),
            });
        }
        ItemAdmission::Adopt { kind, tab } => {
            let item_id = ItemId::generate();
            crate::debug_trace!("MIRROR", "Assigned {} to handle {} in {}", item_id, tab, origin);
            (kind, tab, item_id, false)
        }
        ItemAdmission::Existing {
            kind,
            tab,
            item_id,
            release,
        } => (kind, tab, item_id, release),
    };

    let window = ctx.windows.get_mut(&origin)?;
    let snapshot = snapshot_of(&window.tabs, tab_id, item_id.clone())?;

    if kind.removes() || release {
        ctx.items.unbind(origin, &item_id);
        if release && let Some(tab) = window.tabs.get_tab_mut(tab_id) {
            tab.item_id = None;
        }
    } else if kind.creates() {
        if let Some(tab) = window.tabs.get_tab_mut(tab_id) {
            tab.item_id = Some(item_id.clone());
        }
        ctx.items.bind(origin, item_id, tab_id);
    }

    Some(PendingMutation {
        origin,
        kind,
        payload: Payload::Item {
            tab: tab_id,
            snapshot,
        },
    })
}

/// Point-in-time copy of a handle's sync-relevant state.
pub fn snapshot_of(tabs: &TabManager, tab_id: TabId, item_id: ItemId) -> Option<ItemSnapshot> {
    let tab = tabs.get_tab(tab_id)?;
    let predecessor = tabs
        .predecessor_in_container(tab_id)
        .and_then(|t| t.item_id.clone());
    Some(ItemSnapshot {
        item_id,
        kind: tab.kind,
        attrs: tab.attrs.clone(),
        history: tab.history.clone(),
        pinned_initial: tab.pinned_initial.clone(),
        predecessor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemAttrs, ItemKind};
    use crate::window::WindowPrivacy;

    struct Fixture {
        windows: HashMap<WindowId, WindowState>,
        registry: WindowRegistry,
        items: ItemRegistry,
        settings: MirrorSettings,
        mirror: EventMirror,
    }

    impl Fixture {
        fn new(count: u64) -> Self {
            let mut windows = HashMap::new();
            let mut registry = WindowRegistry::new();
            for id in 1..=count {
                windows.insert(WindowId(id), WindowState::new(WindowId(id)));
                registry.register(WindowId(id), WindowPrivacy::Synced);
            }
            Self {
                windows,
                registry,
                items: ItemRegistry::new(),
                settings: MirrorSettings::default(),
                mirror: EventMirror::new(),
            }
        }

        fn open(&mut self, window: u64, attrs: ItemAttrs) -> TabId {
            self.windows
                .get_mut(&WindowId(window))
                .unwrap()
                .tabs
                .new_tab(ItemKind::Tab, attrs)
        }

        fn raise(&mut self, event: MutationEvent) -> Dispatch {
            let ctx = MirrorContext {
                windows: &mut self.windows,
                registry: &mut self.registry,
                items: &mut self.items,
                settings: self.settings,
            };
            self.mirror.on_mutation(ctx, event)
        }
    }

    #[test]
    fn test_open_assigns_id_and_loopback_is_skipped() {
        let mut fx = Fixture::new(2);
        let tab = fx.open(1, ItemAttrs::pinned_in("ws"));
        let dispatch = fx.raise(MutationEvent::item(WindowId(1), MutationKind::Opened, tab));
        assert_eq!(dispatch, Dispatch::Started);

        let item_id = fx.windows[&WindowId(1)].tabs.get_tab(tab).unwrap().item_id.clone();
        let item_id = item_id.unwrap();
        assert_eq!(fx.items.resolve(WindowId(1), &item_id), Some(tab));

        // A second creation notice for the same handle is a loopback
        let again = fx.raise(MutationEvent::item(WindowId(1), MutationKind::Opened, tab));
        assert_eq!(again, Dispatch::Skipped);
    }

    #[test]
    fn test_other_window_dropped_and_instant_bypasses() {
        let mut fx = Fixture::new(2);
        let a = fx.open(1, ItemAttrs::pinned_in("ws"));
        let b = fx.open(2, ItemAttrs::pinned_in("ws"));

        assert_eq!(fx.raise(MutationEvent::item(WindowId(1), MutationKind::Opened, a)), Dispatch::Started);
        assert_eq!(fx.raise(MutationEvent::item(WindowId(2), MutationKind::Opened, b)), Dispatch::Dropped);
        // Dropped creation leaves the handle unmirrored so it can be adopted later
        assert!(fx.windows[&WindowId(2)].tabs.get_tab(b).unwrap().item_id.is_none());

        assert_eq!(fx.raise(MutationEvent::item(WindowId(1), MutationKind::LabelChanged, a)), Dispatch::Queued);
        assert_eq!(fx.raise(MutationEvent::closing(WindowId(2))), Dispatch::Immediate);
        assert!(!fx.registry.is_eligible(WindowId(2)));
        assert_eq!(fx.mirror.pending_len(), 3);
    }

    #[test]
    fn test_lazy_adoption_of_unmirrored_item() {
        let mut fx = Fixture::new(2);
        let tab = fx.open(1, ItemAttrs::pinned_in("ws"));
        let dispatch = fx.raise(MutationEvent::item(WindowId(1), MutationKind::LabelChanged, tab));
        assert_eq!(dispatch, Dispatch::Started);

        let batch = fx.mirror.begin_batch().unwrap();
        assert_eq!(batch[0].kind, MutationKind::Opened);
    }

    #[test]
    fn test_only_pinned_filters_and_releases() {
        let mut fx = Fixture::new(2);
        fx.settings.only_pinned = true;
        let normal = fx.open(1, ItemAttrs::normal_in("ws"));
        assert_eq!(
            fx.raise(MutationEvent::item(WindowId(1), MutationKind::Opened, normal)),
            Dispatch::Skipped
        );

        let pinned = fx.open(1, ItemAttrs::pinned_in("ws"));
        fx.raise(MutationEvent::item(WindowId(1), MutationKind::Opened, pinned));
        fx.mirror.begin_batch();
        fx.mirror.complete_batch();

        fx.windows.get_mut(&WindowId(1)).unwrap().tabs.get_tab_mut(pinned).unwrap().attrs.pinned = false;
        let dispatch = fx.raise(MutationEvent::item(WindowId(1), MutationKind::Unpinned, pinned));
        assert_eq!(dispatch, Dispatch::Started);
        assert!(fx.windows[&WindowId(1)].tabs.get_tab(pinned).unwrap().item_id.is_none());
    }

    #[test]
    fn test_close_after_handle_removed_uses_registry() {
        let mut fx = Fixture::new(2);
        let tab = fx.open(1, ItemAttrs::pinned_in("ws"));
        fx.raise(MutationEvent::item(WindowId(1), MutationKind::Opened, tab));
        fx.mirror.begin_batch();
        fx.mirror.complete_batch();

        fx.windows.get_mut(&WindowId(1)).unwrap().tabs.remove_tab(tab);
        let dispatch = fx.raise(MutationEvent::item(WindowId(1), MutationKind::Closed, tab));
        assert_eq!(dispatch, Dispatch::Started);
        let batch = fx.mirror.begin_batch().unwrap();
        assert!(matches!(batch[0].payload, Payload::Removed(_)));
    }

    #[test]
    fn test_refused_removal_runs_after_busy_window() {
        let mut fx = Fixture::new(2);
        let tab = fx.open(1, ItemAttrs::pinned_in("ws"));
        fx.raise(MutationEvent::item(WindowId(1), MutationKind::Opened, tab));
        fx.mirror.begin_batch();
        fx.mirror.complete_batch();
        let item_id = fx.windows[&WindowId(1)].tabs.get_tab(tab).unwrap().item_id.clone().unwrap();

        let other = fx.open(2, ItemAttrs::pinned_in("ws"));
        assert_eq!(
            fx.raise(MutationEvent::item(WindowId(2), MutationKind::LabelChanged, other)),
            Dispatch::Started
        );
        fx.windows.get_mut(&WindowId(1)).unwrap().tabs.remove_tab(tab);
        let dispatch = fx.raise(MutationEvent::item(WindowId(1), MutationKind::Closed, tab));
        assert_eq!(dispatch, Dispatch::Dropped);
        assert_eq!(fx.items.resolve(WindowId(1), &item_id), None);
        assert!(!fx.mirror.is_idle());

        let busy = fx.mirror.begin_batch().unwrap();
        assert_eq!(busy[0].origin, WindowId(2));
        fx.mirror.complete_batch();

        let deferred = fx.mirror.begin_batch().unwrap();
        assert_eq!(deferred.len(), 1);
        assert_eq!(deferred[0].origin, WindowId(1));
        assert!(matches!(&deferred[0].payload, Payload::Removed(id) if *id == item_id));
        fx.mirror.complete_batch();
        assert!(fx.mirror.is_idle());
    }

    #[test]
    fn test_disabled_sync_skips_everything_but_closing() {
        let mut fx = Fixture::new(2);
        fx.settings.enabled = false;
        let tab = fx.open(1, ItemAttrs::pinned_in("ws"));
        assert_eq!(
            fx.raise(MutationEvent::item(WindowId(1), MutationKind::Opened, tab)),
            Dispatch::Skipped
        );
        assert_eq!(fx.raise(MutationEvent::closing(WindowId(1))), Dispatch::Immediate);
    }
}
