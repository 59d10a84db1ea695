//! Structural placement of mirrored items.
//!
//! A counterpart is anchored to the counterpart of its source predecessor.
//! Without one it goes to the head of its container, then right after its
//! parent group, then at the end of its section.

use crate::model::{ItemId, ItemSnapshot};
use crate::tab::{ContainerKey, TabManager};
use crate::window::{ItemRegistry, WindowId};

/// Index at which `snapshot`'s counterpart belongs in `tabs`.
///
/// `tabs` must not contain the item being placed.
pub fn placement_index(
    tabs: &TabManager,
    items: &ItemRegistry,
    window: WindowId,
    snapshot: &ItemSnapshot,
) -> usize {
    let position_of_item = |id: &ItemId| {
        items
            .resolve(window, id)
            .and_then(|tab| tabs.position_of(tab))
    };

    if let Some(idx) = snapshot.predecessor.as_ref().and_then(position_of_item) {
        return idx + 1;
    }

    let key = ContainerKey::of(&snapshot.attrs);
    if let Some(head) = tabs.container_head(&key) {
        return head;
    }

    if let Some(idx) = snapshot.attrs.parent_group_id.as_ref().and_then(position_of_item) {
        return idx + 1;
    }

    let rank = key.section.rank();
    tabs.tabs()
        .iter()
        .rposition(|t| t.container_key().section.rank() <= rank)
        .map_or(0, |idx| idx + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemAttrs, ItemKind};
    use crate::tab::Tab;

    const W: WindowId = WindowId(2);

    fn window_with(items: &mut ItemRegistry, layout: &[(&str, ItemAttrs)]) -> TabManager {
        let mut tabs = TabManager::new();
        for (i, (id, attrs)) in layout.iter().enumerate() {
            let tab_id = i as u64 + 1;
            let mut tab = Tab::new(tab_id, ItemKind::Tab, attrs.clone());
            tab.item_id = Some(ItemId::from(*id));
            items.bind(W, ItemId::from(*id), tab_id);
            tabs.insert_tab_at(tab, i);
        }
        tabs
    }

    fn snapshot(attrs: ItemAttrs, predecessor: Option<&str>) -> ItemSnapshot {
        ItemSnapshot {
            item_id: ItemId::from("new"),
            kind: ItemKind::Tab,
            attrs,
            history: Default::default(),
            pinned_initial: None,
            predecessor: predecessor.map(ItemId::from),
        }
    }

    #[test]
    fn test_after_predecessor_counterpart() {
        let mut items = ItemRegistry::new();
        let tabs = window_with(
            &mut items,
            &[
                ("p1", ItemAttrs::pinned_in("ws")),
                ("p2", ItemAttrs::pinned_in("ws")),
                ("n1", ItemAttrs::normal_in("ws")),
            ],
        );
        let snap = snapshot(ItemAttrs::pinned_in("ws"), Some("p1"));
        assert_eq!(placement_index(&tabs, &items, W, &snap), 1);
    }

    #[test]
    fn test_head_of_container_without_predecessor() {
        let mut items = ItemRegistry::new();
        let tabs = window_with(
            &mut items,
            &[
                ("p1", ItemAttrs::pinned_in("ws")),
                ("n1", ItemAttrs::normal_in("ws")),
                ("n2", ItemAttrs::normal_in("ws")),
            ],
        );
        let snap = snapshot(ItemAttrs::normal_in("ws"), None);
        assert_eq!(placement_index(&tabs, &items, W, &snap), 1);

        // Predecessor unknown in this window falls back the same way
        let snap = snapshot(ItemAttrs::normal_in("ws"), Some("gone"));
        assert_eq!(placement_index(&tabs, &items, W, &snap), 1);
    }

    #[test]
    fn test_after_parent_group() {
        let mut items = ItemRegistry::new();
        let group_attrs = ItemAttrs::pinned_in("ws");
        let tabs = window_with(
            &mut items,
            &[
                ("p1", ItemAttrs::pinned_in("ws")),
                ("g1", group_attrs),
                ("n1", ItemAttrs::normal_in("ws")),
            ],
        );
        let attrs = ItemAttrs {
            parent_group_id: Some(ItemId::from("g1")),
            ..ItemAttrs::pinned_in("ws")
        };
        assert_eq!(placement_index(&tabs, &items, W, &snapshot(attrs, None)), 2);
    }

    #[test]
    fn test_section_boundary_for_empty_container() {
        let mut items = ItemRegistry::new();
        let essential = ItemAttrs {
            essential: true,
            ..ItemAttrs::default()
        };
        let tabs = window_with(
            &mut items,
            &[
                ("e1", essential),
                ("n1", ItemAttrs::normal_in("ws")),
            ],
        );
        // First pinned item goes between essentials and normal tabs
        let snap = snapshot(ItemAttrs::pinned_in("ws"), None);
        assert_eq!(placement_index(&tabs, &items, W, &snap), 1);

        let empty = TabManager::new();
        assert_eq!(placement_index(&empty, &items, W, &snap), 0);
    }
}
