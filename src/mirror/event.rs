use crate::model::{ItemId, ItemSnapshot, SplitView};
use crate::tab::TabId;
use crate::window::WindowId;

/// Semantic mutation kinds raised by a window's collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Opened,
    Closed,
    Moved,
    Pinned,
    Unpinned,
    /// Added to the essential set
    Promoted,
    /// Removed from the essential set
    Demoted,
    LabelChanged,
    IconChanged,
    GroupCreated,
    GroupRemoved,
    GroupMoved,
    SplitFormed,
    SplitBroken,
    SelectionChanged,
    FocusChanged,
    WindowClosing,
}

impl MutationKind {
    /// Instant kinds bypass the per-window queue and are never dropped.
    pub fn is_instant(self) -> bool {
        matches!(self, MutationKind::WindowClosing)
    }

    pub fn creates(self) -> bool {
        matches!(self, MutationKind::Opened | MutationKind::GroupCreated)
    }

    pub fn removes(self) -> bool {
        matches!(self, MutationKind::Closed | MutationKind::GroupRemoved)
    }

    /// Kinds that can change which container an item sits in
    pub fn repositions(self) -> bool {
        matches!(
            self,
            MutationKind::Moved
                | MutationKind::Pinned
                | MutationKind::Unpinned
                | MutationKind::Promoted
                | MutationKind::Demoted
                | MutationKind::GroupMoved
        )
    }

    pub fn moves_content(self) -> bool {
        matches!(
            self,
            MutationKind::SelectionChanged | MutationKind::FocusChanged
        )
    }
}

/// What a mutation is about
#[derive(Debug, Clone, PartialEq)]
pub enum Subject {
    /// The originating window itself (focus, closing)
    Window,
    Item(TabId),
    Split(SplitView),
    /// Group id of a split view that was broken up
    SplitGroup(ItemId),
}

/// A mutation notification as raised by a window.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationEvent {
    pub window: WindowId,
    pub kind: MutationKind,
    pub subject: Subject,
}

impl MutationEvent {
    pub fn item(window: WindowId, kind: MutationKind, tab: TabId) -> Self {
        Self {
            window,
            kind,
            subject: Subject::Item(tab),
        }
    }

    pub fn focus(window: WindowId) -> Self {
        Self {
            window,
            kind: MutationKind::FocusChanged,
            subject: Subject::Window,
        }
    }

    pub fn closing(window: WindowId) -> Self {
        Self {
            window,
            kind: MutationKind::WindowClosing,
            subject: Subject::Window,
        }
    }

    pub fn split_formed(window: WindowId, split: SplitView) -> Self {
        Self {
            window,
            kind: MutationKind::SplitFormed,
            subject: Subject::Split(split),
        }
    }

    pub fn split_broken(window: WindowId, group_id: ItemId) -> Self {
        Self {
            window,
            kind: MutationKind::SplitBroken,
            subject: Subject::SplitGroup(group_id),
        }
    }
}

/// Data captured when a mutation is admitted.
///
/// Later mutations in the source window cannot change what gets mirrored.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Window,
    Item { tab: TabId, snapshot: ItemSnapshot },
    /// Source handle already gone; only the id survives
    Removed(ItemId),
    Split(SplitView),
    SplitGroup(ItemId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingMutation {
    pub origin: WindowId,
    pub kind: MutationKind,
    pub payload: Payload,
}

impl PendingMutation {
    pub fn item_id(&self) -> Option<&ItemId> {
        match &self.payload {
            Payload::Item { snapshot, .. } => Some(&snapshot.item_id),
            Payload::Removed(id) | Payload::SplitGroup(id) => Some(id),
            Payload::Split(split) => Some(&split.group_id),
            Payload::Window => None,
        }
    }

    pub fn snapshot(&self) -> Option<&ItemSnapshot> {
        match &self.payload {
            Payload::Item { snapshot, .. } => Some(snapshot),
            _ => None,
        }
    }
}

/// How `on_mutation` handled an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Became the in-flight batch
    Started,
    /// Appended to the originating window's continuation
    Queued,
    /// Another window's batch was in flight
    Dropped,
    /// Instant kind; bypassed the queue
    Immediate,
    /// Not mirrored at all (loopback, filtered, disabled or unknown item)
    Skipped,
}

impl Dispatch {
    pub fn admitted(self) -> bool {
        matches!(
            self,
            Dispatch::Started | Dispatch::Queued | Dispatch::Immediate
        )
    }
}
