//! Core data model shared by every window and by the session document.
//!
//! Items (tabs, groups, folders) carry a stable [`ItemId`] assigned exactly
//! once at creation. Workspaces and split views are owned collectively and
//! live in the canonical document rather than in any one window.

mod ids;
mod item;
mod workspace;

pub use ids::ItemId;
pub use item::{
    HistoryEntry, ItemAttrs, ItemKind, ItemSnapshot, NavigationHistory, PinnedInitialState,
};
pub use workspace::{SplitLayout, SplitView, Workspace};
