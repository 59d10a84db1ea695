//! Helpers for materializing the document into windows

use super::{ContainerRecord, SidebarDocument};
use crate::mirror::create_counterpart;
use crate::model::{ItemId, ItemKind, ItemSnapshot};
use crate::tab::ContainerKey;
use crate::window::{ItemRegistry, WindowState};
use std::collections::HashMap;

/// Which part of the document a window receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterializeScope {
    /// Everything: a window being restored at startup
    Full,
    /// What a sync payload can introduce: spaces, pinned and essential
    /// tabs, folders and pinned groups
    SyncedSubset,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterializeReport {
    pub created: usize,
    pub workspaces_added: usize,
    pub splits_added: usize,
}

/// Create every in-scope item of `document` that `window` is missing.
///
/// Items already present (by id) are left alone.
pub fn materialize(
    window: &mut WindowState,
    items: &mut ItemRegistry,
    document: &SidebarDocument,
    scope: MaterializeScope,
    only_pinned: bool,
) -> MaterializeReport {
    let mut report = MaterializeReport::default();

    for space in &document.spaces {
        if !window.has_workspace(&space.uuid) {
            window.workspaces.push(space.clone());
            report.workspaces_added += 1;
        }
    }

    let subset_only = scope == MaterializeScope::SyncedSubset || only_pinned;
    let containers = document
        .folders
        .iter()
        .map(|f| f.snapshot(None))
        .chain(document.groups.iter().map(|g| g.snapshot(None)));
    let tabs = document
        .tabs
        .iter()
        .filter_map(|t| t.snapshot(None));

    let snapshots: Vec<ItemSnapshot> = containers
        .chain(tabs)
        .filter(|s| !subset_only || s.kind == ItemKind::Folder || s.attrs.in_pinned_subset())
        .collect();

    for snapshot in chain_predecessors(snapshots) {
        if items.resolve(window.id, &snapshot.item_id).is_some() {
            continue;
        }
        create_counterpart(window, items, &snapshot);
        report.created += 1;
    }

    if scope == MaterializeScope::Full {
        for split in &document.split_view_data {
            if !window.split_views.iter().any(|s| s.group_id == split.group_id) {
                window.split_views.push(split.clone());
                report.splits_added += 1;
            }
        }
    }

    if report.created > 0 || report.workspaces_added > 0 {
        crate::debug_log!(
            "SESSION",
            "Materialized {} items, {} spaces into {}",
            report.created,
            report.workspaces_added,
            window.id
        );
    }
    report
}

/// Overwrite the attributes of handles `window` already holds for the
/// records `include` selects. Returns how many handles changed.
///
/// Positions are left as they are; only what the record says about the
/// item itself is refreshed.
pub fn refresh_existing(
    window: &mut WindowState,
    items: &ItemRegistry,
    document: &SidebarDocument,
    include: impl Fn(&ItemId) -> bool,
) -> usize {
    let snapshots = document
        .folders
        .iter()
        .map(|f| f.snapshot(None))
        .chain(document.groups.iter().map(|g| g.snapshot(None)))
        .chain(document.tabs.iter().filter_map(|t| t.snapshot(None)));

    let mut refreshed = 0;
    for snapshot in snapshots.filter(|s| include(&s.item_id)) {
        let Some(tab) = items
            .resolve(window.id, &snapshot.item_id)
            .and_then(|tab_id| window.tabs.get_tab_mut(tab_id))
        else {
            continue;
        };
        if tab.attrs != snapshot.attrs {
            tab.attrs = snapshot.attrs;
            refreshed += 1;
        }
    }
    refreshed
}

/// Link each snapshot to the previous one in the same container.
fn chain_predecessors(snapshots: Vec<ItemSnapshot>) -> Vec<ItemSnapshot> {
    let mut last: HashMap<ContainerKey, ItemId> = HashMap::new();
    snapshots
        .into_iter()
        .map(|mut snapshot| {
            let key = ContainerKey::of(&snapshot.attrs);
            snapshot.predecessor = last.insert(key, snapshot.item_id.clone());
            snapshot
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Workspace;
    use crate::session::{FolderRecord, GroupRecord, TabRecord};
    use crate::window::WindowId;

    fn record(id: &str, pinned: bool) -> TabRecord {
        TabRecord {
            item_id: Some(ItemId::from(id)),
            pinned,
            workspace_id: Some("ws".to_string()),
            ..TabRecord::default()
        }
    }

    fn document() -> SidebarDocument {
        SidebarDocument {
            spaces: vec![Workspace::new("ws", "Home")],
            tabs: vec![record("p1", true), record("n1", false), record("p2", true)],
            folders: vec![FolderRecord {
                id: ItemId::from("f1"),
                name: "Folder".to_string(),
                pinned: true,
                workspace_id: Some("ws".to_string()),
                ..FolderRecord::default()
            }],
            ..SidebarDocument::default()
        }
    }

    fn order(window: &WindowState) -> Vec<String> {
        window
            .tabs
            .tabs()
            .iter()
            .filter_map(|t| t.item_id.as_ref().map(ToString::to_string))
            .collect()
    }

    #[test]
    fn test_full_restore_preserves_container_order() {
        let mut window = WindowState::new(WindowId(1));
        let mut items = ItemRegistry::new();
        let report = materialize(&mut window, &mut items, &document(), MaterializeScope::Full, false);

        assert_eq!(report.created, 4);
        assert_eq!(report.workspaces_added, 1);
        assert_eq!(order(&window), vec!["f1", "p1", "p2", "n1"]);
        assert!(window.tabs.tabs().iter().all(|t| !t.content_visible()));
    }

    #[test]
    fn test_synced_subset_skips_normal_tabs_and_is_idempotent() {
        let mut window = WindowState::new(WindowId(1));
        let mut items = ItemRegistry::new();
        let doc = document();
        materialize(&mut window, &mut items, &doc, MaterializeScope::SyncedSubset, false);
        assert_eq!(order(&window), vec!["f1", "p1", "p2"]);

        let again = materialize(&mut window, &mut items, &doc, MaterializeScope::SyncedSubset, false);
        assert_eq!(again, MaterializeReport::default());
    }

    #[test]
    fn test_synced_subset_skips_unpinned_groups() {
        let mut window = WindowState::new(WindowId(1));
        let mut items = ItemRegistry::new();
        let group = |id: &str, pinned: bool| GroupRecord {
            id: ItemId::from(id),
            name: id.to_string(),
            workspace_id: Some("ws".to_string()),
            pinned,
            ..GroupRecord::default()
        };
        let mut doc = document();
        doc.groups = vec![group("g-pinned", true), group("g-normal", false)];

        materialize(&mut window, &mut items, &doc, MaterializeScope::SyncedSubset, false);
        let created = order(&window);
        assert!(created.contains(&"g-pinned".to_string()));
        assert!(!created.contains(&"g-normal".to_string()));
        assert!(created.contains(&"f1".to_string()));
    }

    #[test]
    fn test_only_pinned_limits_full_restore() {
        let mut window = WindowState::new(WindowId(1));
        let mut items = ItemRegistry::new();
        materialize(&mut window, &mut items, &document(), MaterializeScope::Full, true);
        assert!(!order(&window).contains(&"n1".to_string()));
        assert_eq!(window.tabs.tabs()[1].attrs, record("p1", true).attrs());
    }

    #[test]
    fn test_refresh_updates_only_selected_handles() {
        let mut window = WindowState::new(WindowId(1));
        let mut items = ItemRegistry::new();
        let mut doc = document();
        materialize(&mut window, &mut items, &doc, MaterializeScope::Full, false);

        doc.tabs[0].label = Some("Renamed".to_string());
        doc.tabs[1].label = Some("Ignored".to_string());
        let refreshed = refresh_existing(&mut window, &items, &doc, |id| id.as_str() == "p1");
        assert_eq!(refreshed, 1);

        let label = |id: &str| {
            let tab = items.resolve(WindowId(1), &ItemId::from(id)).unwrap();
            window.tabs.get_tab(tab).unwrap().attrs.label.clone()
        };
        assert_eq!(label("p1").as_deref(), Some("Renamed"));
        assert_eq!(label("n1"), None);
    }
}
