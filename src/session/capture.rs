//! Collect the canonical document from live windows

use super::{ContainerRecord, FolderRecord, GroupRecord, SidebarDocument, TabRecord};
use crate::model::{ItemId, ItemKind, Workspace};
use crate::window::{WindowId, WindowState};
use std::collections::{HashMap, HashSet};

/// Collect one document from `windows`, visited in the given order.
///
/// Each item appears once. When several windows hold it, the record comes
/// from the window that renders its live content, else from the first
/// window visited. Items without an id were never mirrored and are skipped.
pub fn capture_document(
    order: &[WindowId],
    windows: &HashMap<WindowId, WindowState>,
    spaces: &[Workspace],
) -> SidebarDocument {
    let mut document = SidebarDocument {
        spaces: spaces.to_vec(),
        last_collected: chrono::Utc::now().timestamp_millis(),
        ..SidebarDocument::default()
    };
    let mut tab_slots: HashMap<ItemId, usize> = HashMap::new();
    let mut containers: HashSet<ItemId> = HashSet::new();
    let mut splits: HashSet<ItemId> = HashSet::new();

    for window in order.iter().filter_map(|id| windows.get(id)) {
        for (position, tab) in window.tabs.tabs().iter().enumerate() {
            let Some(item_id) = &tab.item_id else {
                continue;
            };
            let position = position as u32;
            match tab.kind {
                ItemKind::Tab => match tab_slots.get(item_id) {
                    Some(&slot) if tab.content_visible() => {
                        document.tabs[slot] = TabRecord::from_tab(tab, position);
                    }
                    Some(_) => {}
                    None => {
                        tab_slots.insert(item_id.clone(), document.tabs.len());
                        document.tabs.push(TabRecord::from_tab(tab, position));
                    }
                },
                ItemKind::Folder if containers.insert(item_id.clone()) => {
                    document
                        .folders
                        .push(FolderRecord::from_tab(tab, item_id.clone(), position));
                }
                ItemKind::Group if containers.insert(item_id.clone()) => {
                    document
                        .groups
                        .push(GroupRecord::from_tab(tab, item_id.clone(), position));
                }
                _ => {}
            }
        }
        for split in &window.split_views {
            if splits.insert(split.group_id.clone()) {
                document.split_view_data.push(split.clone());
            }
        }
    }
    document
}

/// Keep canonical items the collection lost, unless they were closed.
///
/// Items only live in windows that are closed or not yet materialized are
/// still part of the session; only an observed close removes them.
pub fn carry_forward(
    collected: &mut SidebarDocument,
    previous: &SidebarDocument,
    deleted: &HashSet<ItemId>,
) {
    let keep = |id: &ItemId| !deleted.contains(id) && !collected.contains_item(id);
    let tabs: Vec<TabRecord> = previous
        .tabs
        .iter()
        .filter(|t| t.item_id.as_ref().is_some_and(keep))
        .cloned()
        .collect();
    let folders: Vec<FolderRecord> = previous
        .folders
        .iter()
        .filter(|f| keep(&f.id))
        .cloned()
        .collect();
    let groups: Vec<GroupRecord> = previous
        .groups
        .iter()
        .filter(|g| keep(&g.id))
        .cloned()
        .collect();

    collected.tabs.extend(tabs);
    collected.folders.extend(folders);
    collected.groups.extend(groups);

    for space in &previous.spaces {
        if !collected.spaces.iter().any(|s| s.uuid == space.uuid) {
            collected.spaces.push(space.clone());
        }
    }
    for split in &previous.split_view_data {
        let members_alive = split
            .item_ids
            .iter()
            .all(|id| !deleted.contains(id));
        if members_alive
            && !collected
                .split_view_data
                .iter()
                .any(|s| s.group_id == split.group_id)
        {
            collected.split_view_data.push(split.clone());
        }
    }
}
