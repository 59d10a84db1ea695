use super::ItemId;
use serde::{Deserialize, Serialize};

/// What kind of sidebar entry an item is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    #[default]
    Tab,
    /// A tab group
    Group,
    /// A pinned folder
    Folder,
}

impl ItemKind {
    /// Groups and folders are containers other items can be parented to.
    pub fn is_container(self) -> bool {
        matches!(self, ItemKind::Group | ItemKind::Folder)
    }
}

/// Sync-relevant attributes of an item.
///
/// Two counterparts of the same item converge when these compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemAttrs {
    #[serde(default)]
    pub pinned: bool,
    /// Member of the promoted, cross-workspace set
    #[serde(default)]
    pub essential: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_group_id: Option<ItemId>,
    /// Container (identity) the item belongs to; 0 is the default container
    #[serde(default)]
    pub container_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl ItemAttrs {
    pub fn pinned_in(workspace_id: impl Into<String>) -> Self {
        Self {
            pinned: true,
            workspace_id: Some(workspace_id.into()),
            ..Self::default()
        }
    }

    pub fn normal_in(workspace_id: impl Into<String>) -> Self {
        Self {
            workspace_id: Some(workspace_id.into()),
            ..Self::default()
        }
    }

    /// Pinned and essential items form the synced subset when
    /// only pinned tabs are mirrored.
    pub fn in_pinned_subset(&self) -> bool {
        self.pinned || self.essential
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub url: String,
    #[serde(default)]
    pub title: String,
}

impl HistoryEntry {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }
}

/// Navigation history needed to rebuild a tab's browsing state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NavigationHistory {
    #[serde(default)]
    pub entries: Vec<HistoryEntry>,
    #[serde(default)]
    pub index: usize,
}

impl NavigationHistory {
    pub fn single(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            entries: vec![HistoryEntry::new(url, title)],
            index: 0,
        }
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.index)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.truncate(self.index.saturating_add(1).min(self.entries.len()));
        self.entries.push(entry);
        self.index = self.entries.len() - 1;
    }
}

/// The url/label a pinned tab was pinned with, used to reset it later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinnedInitialState {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Point-in-time copy of a source item, taken when its mutation is admitted.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSnapshot {
    pub item_id: ItemId,
    pub kind: ItemKind,
    pub attrs: ItemAttrs,
    pub history: NavigationHistory,
    pub pinned_initial: Option<PinnedInitialState>,
    /// Id of the item immediately before this one in the same container
    pub predecessor: Option<ItemId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_push_truncates_forward_entries() {
        let mut history = NavigationHistory::single("https://a.test", "A");
        history.push(HistoryEntry::new("https://b.test", "B"));
        history.push(HistoryEntry::new("https://c.test", "C"));
        history.index = 0;
        history.push(HistoryEntry::new("https://d.test", "D"));
        let urls: Vec<&str> = history.entries.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.test", "https://d.test"]);
        assert_eq!(history.current().unwrap().title, "D");
    }

    #[test]
    fn test_pinned_subset() {
        assert!(ItemAttrs::pinned_in("ws").in_pinned_subset());
        assert!(!ItemAttrs::normal_in("ws").in_pinned_subset());
        let essential = ItemAttrs {
            essential: true,
            ..ItemAttrs::default()
        };
        assert!(essential.in_pinned_subset());
    }
}
