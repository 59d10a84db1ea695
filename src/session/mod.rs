//! Persistence engine: the canonical sidebar document.
//!
//! The document is the merged state of every eligible window. It is
//! collected from live windows (`capture`), written through the
//! `SaveScheduler` with a clean copy of the previous file kept alongside
//! (`storage`), rotated into dated backups (`backup`) and materialized back
//! into windows on startup (`restore`).

pub mod backup;
pub mod capture;
pub mod change;
pub mod restore;
pub mod scheduler;
pub mod storage;

pub use backup::{BackupPolicy, BackupRotator, RotationReport, RotationTimer};
pub use change::{ChangeNotifier, NotifyingSaver, content_hash};
pub use scheduler::{DocumentSaver, SaveScheduler};
pub use storage::{DocumentSource, LoadedDocument, SessionPaths, SessionStore};

use crate::model::{
    ItemAttrs, ItemId, ItemKind, ItemSnapshot, NavigationHistory, PinnedInitialState, SplitView,
    Workspace,
};
use crate::tab::Tab;
use serde::{Deserialize, Serialize};

/// Unknown fields carried through load/save and sync merges untouched.
pub type ExtraFields = serde_json::Map<String, serde_json::Value>;

/// The whole cross-window session.
///
/// `spaces` and `tabs` are required: a file without them is corrupt.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SidebarDocument {
    pub spaces: Vec<Workspace>,
    pub tabs: Vec<TabRecord>,
    #[serde(default)]
    pub folders: Vec<FolderRecord>,
    #[serde(default)]
    pub groups: Vec<GroupRecord>,
    #[serde(default)]
    pub split_view_data: Vec<SplitView>,
    /// Milliseconds since the epoch of the last collection
    #[serde(default)]
    pub last_collected: i64,
}

impl SidebarDocument {
    pub fn is_empty(&self) -> bool {
        self.spaces.is_empty()
            && self.tabs.is_empty()
            && self.folders.is_empty()
            && self.groups.is_empty()
    }

    pub fn pinned_tabs(&self) -> impl Iterator<Item = &TabRecord> {
        self.tabs.iter().filter(|t| t.pinned)
    }

    pub fn tab(&self, item_id: &ItemId) -> Option<&TabRecord> {
        self.tabs
            .iter()
            .find(|t| t.item_id.as_ref() == Some(item_id))
    }

    pub fn contains_item(&self, item_id: &ItemId) -> bool {
        self.tab(item_id).is_some()
            || self.folders.iter().any(|f| &f.id == item_id)
            || self.groups.iter().any(|g| &g.id == item_id)
    }

    /// Drop every record of `item_id`, including split views it was part of.
    pub fn remove_item(&mut self, item_id: &ItemId) -> bool {
        let before = self.tabs.len() + self.folders.len() + self.groups.len();
        self.tabs.retain(|t| t.item_id.as_ref() != Some(item_id));
        self.folders.retain(|f| &f.id != item_id);
        self.groups.retain(|g| &g.id != item_id);
        self.split_view_data
            .retain(|s| &s.group_id != item_id && !s.item_ids.contains(item_id));
        before != self.tabs.len() + self.folders.len() + self.groups.len()
    }
}

/// Persisted form of a tab.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<ItemId>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub essential: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_group_id: Option<ItemId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "NavigationHistory::is_empty")]
    pub history: NavigationHistory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned_initial: Option<PinnedInitialState>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl TabRecord {
    pub fn from_tab(tab: &Tab, position: u32) -> Self {
        let attrs = &tab.attrs;
        Self {
            item_id: tab.item_id.clone(),
            pinned: attrs.pinned,
            essential: attrs.essential,
            workspace_id: attrs.workspace_id.clone(),
            parent_group_id: attrs.parent_group_id.clone(),
            container_id: Some(attrs.container_id).filter(|c| *c != 0),
            position: Some(position),
            label: attrs.label.clone(),
            icon: attrs.icon.clone(),
            history: tab.history.clone(),
            pinned_initial: tab.pinned_initial.clone(),
            extra: ExtraFields::new(),
        }
    }

    pub fn attrs(&self) -> ItemAttrs {
        ItemAttrs {
            pinned: self.pinned,
            essential: self.essential,
            workspace_id: self.workspace_id.clone(),
            parent_group_id: self.parent_group_id.clone(),
            container_id: self.container_id.unwrap_or(0),
            label: self.label.clone(),
            icon: self.icon.clone(),
        }
    }

    /// Snapshot for materializing this record; `None` without an item id.
    pub fn snapshot(&self, predecessor: Option<ItemId>) -> Option<ItemSnapshot> {
        Some(ItemSnapshot {
            item_id: self.item_id.clone()?,
            kind: ItemKind::Tab,
            attrs: self.attrs(),
            history: self.history.clone(),
            pinned_initial: self.pinned_initial.clone(),
            predecessor,
        })
    }
}

/// Persisted form of a pinned folder.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderRecord {
    pub id: ItemId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ItemId>,
    #[serde(default)]
    pub collapsed: bool,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub essential: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Persisted form of a tab group.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRecord {
    pub id: ItemId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
    #[serde(default)]
    pub collapsed: bool,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Folders and groups share one conversion to and from live handles.
pub trait ContainerRecord {
    const KIND: ItemKind;

    fn from_tab(tab: &Tab, item_id: ItemId, position: u32) -> Self;

    fn item_id(&self) -> &ItemId;

    fn attrs(&self) -> ItemAttrs;

    fn snapshot(&self, predecessor: Option<ItemId>) -> ItemSnapshot {
        ItemSnapshot {
            item_id: self.item_id().clone(),
            kind: Self::KIND,
            attrs: self.attrs(),
            history: NavigationHistory::default(),
            pinned_initial: None,
            predecessor,
        }
    }
}

impl ContainerRecord for FolderRecord {
    const KIND: ItemKind = ItemKind::Folder;

    fn from_tab(tab: &Tab, item_id: ItemId, position: u32) -> Self {
        Self {
            id: item_id,
            name: tab.attrs.label.clone().unwrap_or_default(),
            workspace_id: tab.attrs.workspace_id.clone(),
            parent_id: tab.attrs.parent_group_id.clone(),
            collapsed: false,
            pinned: tab.attrs.pinned,
            essential: tab.attrs.essential,
            user_icon: tab.attrs.icon.clone(),
            position: Some(position),
            extra: ExtraFields::new(),
        }
    }

    fn item_id(&self) -> &ItemId {
        &self.id
    }

    fn attrs(&self) -> ItemAttrs {
        ItemAttrs {
            pinned: self.pinned,
            essential: self.essential,
            workspace_id: self.workspace_id.clone(),
            parent_group_id: self.parent_id.clone(),
            container_id: 0,
            label: Some(self.name.clone()).filter(|n| !n.is_empty()),
            icon: self.user_icon.clone(),
        }
    }
}

impl ContainerRecord for GroupRecord {
    const KIND: ItemKind = ItemKind::Group;

    fn from_tab(tab: &Tab, item_id: ItemId, position: u32) -> Self {
        Self {
            id: item_id,
            name: tab.attrs.label.clone().unwrap_or_default(),
            color: tab.attrs.icon.clone(),
            workspace_id: tab.attrs.workspace_id.clone(),
            collapsed: false,
            pinned: tab.attrs.pinned,
            position: Some(position),
            extra: ExtraFields::new(),
        }
    }

    fn item_id(&self) -> &ItemId {
        &self.id
    }

    fn attrs(&self) -> ItemAttrs {
        ItemAttrs {
            pinned: self.pinned,
            essential: false,
            workspace_id: self.workspace_id.clone(),
            parent_group_id: None,
            container_id: 0,
            label: Some(self.name.clone()).filter(|n| !n.is_empty()),
            icon: self.color.clone(),
        }
    }
}
