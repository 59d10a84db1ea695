//! Change detection for the external sync client.
//!
//! Only the portable subset of the document is hashed: spaces, pinned tabs
//! and folders. Anything else changing (history, unpinned tabs, timestamps)
//! never triggers an upload.

use super::scheduler::DocumentSaver;
use super::{FolderRecord, SidebarDocument, TabRecord};
use crate::model::Workspace;
use anyhow::Result;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HashedSubset<'a> {
    spaces: &'a [Workspace],
    pinned_tabs: Vec<PortableTab<'a>>,
    folders: &'a [FolderRecord],
}

/// The fields of a pinned tab that travel to other devices
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PortableTab<'a> {
    item_id: Option<&'a str>,
    essential: bool,
    workspace_id: Option<&'a str>,
    parent_group_id: Option<&'a str>,
    container_id: Option<u32>,
    label: Option<&'a str>,
    icon: Option<&'a str>,
    url: Option<&'a str>,
}

impl<'a> PortableTab<'a> {
    fn of(tab: &'a TabRecord) -> Self {
        Self {
            item_id: tab.item_id.as_ref().map(|id| id.as_str()),
            essential: tab.essential,
            workspace_id: tab.workspace_id.as_deref(),
            parent_group_id: tab.parent_group_id.as_ref().map(|id| id.as_str()),
            container_id: tab.container_id,
            label: tab.label.as_deref(),
            icon: tab.icon.as_deref(),
            url: tab.pinned_initial.as_ref().map(|p| p.url.as_str()),
        }
    }
}

/// Lower-case hex SHA-256 over the sync-relevant subset of `document`.
pub fn content_hash(document: &SidebarDocument) -> String {
    let subset = HashedSubset {
        spaces: &document.spaces,
        pinned_tabs: document.pinned_tabs().map(PortableTab::of).collect(),
        folders: &document.folders,
    };
    // Serializing borrowed plain data cannot fail
    let bytes = serde_json::to_vec(&subset).unwrap_or_default();
    let digest = Sha256::digest(&bytes);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Raises a notification whenever the hashed subset changes.
#[derive(Debug)]
pub struct ChangeNotifier {
    tx: watch::Sender<Option<String>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    /// Hash `document`; notify subscribers if it differs from the last one.
    pub fn observe(&self, document: &SidebarDocument) -> bool {
        let hash = content_hash(document);
        let changed = self.tx.send_if_modified(|current| {
            if current.as_deref() == Some(hash.as_str()) {
                return false;
            }
            *current = Some(hash.clone());
            true
        });
        if changed {
            crate::debug_info!("SESSION", "Sidebar state changed, hash {}", hash);
        }
        changed
    }

    /// Receiver that wakes on every change; the value is the new hash.
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> Option<String> {
        self.tx.borrow().clone()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Saver that hashes each document once it is on disk.
///
/// A failed write raises no notification.
pub struct NotifyingSaver {
    inner: Arc<dyn DocumentSaver>,
    notifier: Arc<ChangeNotifier>,
}

impl NotifyingSaver {
    pub fn new(inner: Arc<dyn DocumentSaver>, notifier: Arc<ChangeNotifier>) -> Self {
        Self { inner, notifier }
    }
}

impl DocumentSaver for NotifyingSaver {
    fn save_document(&self, document: &SidebarDocument) -> Result<()> {
        self.inner.save_document(document)?;
        self.notifier.observe(document);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemId, NavigationHistory};

    fn document() -> SidebarDocument {
        SidebarDocument {
            spaces: vec![Workspace::new("ws", "Home")],
            tabs: vec![
                TabRecord {
                    item_id: Some(ItemId::from("p")),
                    pinned: true,
                    ..TabRecord::default()
                },
                TabRecord {
                    item_id: Some(ItemId::from("n")),
                    ..TabRecord::default()
                },
            ],
            ..SidebarDocument::default()
        }
    }

    #[test]
    fn test_hash_is_lowercase_hex() {
        let hash = content_hash(&document());
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_hash_ignores_unsynced_fields() {
        let base = document();
        let mut other = base.clone();
        other.last_collected = 42;
        other.tabs[1].label = Some("unpinned edit".to_string());
        other.tabs[0].history = NavigationHistory::single("https://a.test", "A");
        assert_eq!(content_hash(&base), content_hash(&other));

        other.tabs[0].label = Some("pinned edit".to_string());
        assert_ne!(content_hash(&base), content_hash(&other));
    }

    #[tokio::test]
    async fn test_notifies_only_on_change() {
        let notifier = ChangeNotifier::new();
        let mut rx = notifier.subscribe();

        assert!(notifier.observe(&document()));
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        assert!(!notifier.observe(&document()));
        assert!(!rx.has_changed().unwrap());

        let mut changed = document();
        changed.spaces[0].name = "Work".to_string();
        assert!(notifier.observe(&changed));
        assert_eq!(notifier.current(), Some(content_hash(&changed)));
    }

    struct RejectingSaver;

    impl DocumentSaver for RejectingSaver {
        fn save_document(&self, _document: &SidebarDocument) -> Result<()> {
            anyhow::bail!("read-only session directory")
        }
    }

    #[test]
    fn test_failed_write_raises_no_notification() {
        let notifier = Arc::new(ChangeNotifier::new());
        let saver = NotifyingSaver::new(Arc::new(RejectingSaver), notifier.clone());
        assert!(saver.save_document(&document()).is_err());
        assert_eq!(notifier.current(), None);
    }
}
