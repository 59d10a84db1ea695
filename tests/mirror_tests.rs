//! Integration tests for cross-window mirroring.
//!
//! Every scenario drives `WindowSyncManager` the way a host does: mutate a
//! window's item tree, report the mutation, then drain.

mod common;

use common::{TestContext, attrs_of, counterpart, item_of, item_order, open_tab};
use sidebar_sync::mirror::{Dispatch, MutationEvent, MutationKind};
use sidebar_sync::model::{ItemAttrs, ItemKind, SplitLayout, SplitView};
use sidebar_sync::window::WindowPrivacy;
use sidebar_sync_config::Config;

// ============================================================================
// Convergence
// ============================================================================

#[tokio::test]
async fn test_opened_tab_appears_in_every_eligible_window() {
    let ctx = TestContext::new();
    let (mut manager, windows) = ctx.manager_with_windows(3);
    let (a, b, c) = (windows[0], windows[1], windows[2]);

    let tab = open_tab(&mut manager, a, ItemAttrs::pinned_in("ws"));
    let report = manager.drain().await;
    assert_eq!(report.applied, 2);

    let item = item_of(&manager, a, tab);
    for window in [b, c] {
        let handle = counterpart(&manager, window, &item);
        assert_eq!(attrs_of(&manager, window, handle), attrs_of(&manager, a, tab));
    }
    assert_eq!(manager.items().windows_holding(&item), vec![a, b, c]);
}

#[tokio::test]
async fn test_label_and_icon_changes_converge() {
    let ctx = TestContext::new();
    let (mut manager, windows) = ctx.manager_with_windows(2);
    let (a, b) = (windows[0], windows[1]);

    let tab = open_tab(&mut manager, a, ItemAttrs::pinned_in("ws"));
    manager.drain().await;

    {
        let handle = manager.window_mut(a).unwrap().tabs.get_tab_mut(tab).unwrap();
        handle.attrs.label = Some("Inbox".to_string());
        handle.attrs.icon = Some("mail".to_string());
    }
    assert_eq!(
        manager.on_mutation(MutationEvent::item(a, MutationKind::LabelChanged, tab)),
        Dispatch::Started
    );
    assert_eq!(
        manager.on_mutation(MutationEvent::item(a, MutationKind::IconChanged, tab)),
        Dispatch::Queued
    );
    manager.drain().await;

    let item = item_of(&manager, a, tab);
    let mirrored = attrs_of(&manager, b, counterpart(&manager, b, &item));
    assert_eq!(mirrored.label.as_deref(), Some("Inbox"));
    assert_eq!(mirrored.icon.as_deref(), Some("mail"));
}

#[tokio::test]
async fn test_move_reorders_counterparts() {
    let ctx = TestContext::new();
    let (mut manager, windows) = ctx.manager_with_windows(2);
    let (a, b) = (windows[0], windows[1]);

    let first = open_tab(&mut manager, a, ItemAttrs::pinned_in("ws"));
    manager.drain().await;
    open_tab(&mut manager, a, ItemAttrs::pinned_in("ws"));
    manager.drain().await;
    let third = open_tab(&mut manager, a, ItemAttrs::pinned_in("ws"));
    manager.drain().await;
    assert_eq!(item_order(&manager, a), item_order(&manager, b));

    manager.window_mut(a).unwrap().tabs.reposition(third, |_| 0);
    manager.on_mutation(MutationEvent::item(a, MutationKind::Moved, third));
    manager.drain().await;

    let order = item_order(&manager, b);
    assert_eq!(order, item_order(&manager, a));
    assert_eq!(order[0], item_of(&manager, a, third));
    assert_eq!(order[1], item_of(&manager, a, first));
}

#[tokio::test]
async fn test_pin_and_promote_update_counterparts() {
    let ctx = TestContext::new();
    let (mut manager, windows) = ctx.manager_with_windows(2);
    let (a, b) = (windows[0], windows[1]);

    let tab = open_tab(&mut manager, a, ItemAttrs::normal_in("ws"));
    manager.drain().await;

    manager.window_mut(a).unwrap().tabs.get_tab_mut(tab).unwrap().attrs.pinned = true;
    manager.on_mutation(MutationEvent::item(a, MutationKind::Pinned, tab));
    manager.window_mut(a).unwrap().tabs.get_tab_mut(tab).unwrap().attrs.essential = true;
    manager.on_mutation(MutationEvent::item(a, MutationKind::Promoted, tab));
    manager.drain().await;

    let item = item_of(&manager, a, tab);
    let mirrored = attrs_of(&manager, b, counterpart(&manager, b, &item));
    assert!(mirrored.pinned);
    assert!(mirrored.essential);
    assert_eq!(mirrored, attrs_of(&manager, a, tab));
}

#[tokio::test]
async fn test_close_removes_counterparts() {
    let ctx = TestContext::new();
    let (mut manager, windows) = ctx.manager_with_windows(2);
    let (a, b) = (windows[0], windows[1]);

    let tab = open_tab(&mut manager, a, ItemAttrs::pinned_in("ws"));
    manager.drain().await;
    let item = item_of(&manager, a, tab);

    manager.window_mut(a).unwrap().tabs.remove_tab(tab);
    assert_eq!(
        manager.on_mutation(MutationEvent::item(a, MutationKind::Closed, tab)),
        Dispatch::Started
    );
    manager.drain().await;

    assert_eq!(manager.window(b).unwrap().tabs.tab_count(), 0);
    assert!(!manager.items().contains_item(&item));
    assert!(!manager.document().contains_item(&item));
}

#[tokio::test]
async fn test_group_created_is_mirrored_as_container() {
    let ctx = TestContext::new();
    let (mut manager, windows) = ctx.manager_with_windows(2);
    let (a, b) = (windows[0], windows[1]);

    let group = manager
        .window_mut(a)
        .unwrap()
        .tabs
        .new_tab(ItemKind::Group, ItemAttrs::pinned_in("ws"));
    manager.on_mutation(MutationEvent::item(a, MutationKind::GroupCreated, group));
    manager.drain().await;

    let item = item_of(&manager, a, group);
    let handle = counterpart(&manager, b, &item);
    let mirrored = manager.window(b).unwrap().tabs.get_tab(handle).unwrap();
    assert_eq!(mirrored.kind, ItemKind::Group);
}

// ============================================================================
// Loopback and admission
// ============================================================================

#[tokio::test]
async fn test_counterpart_creation_notice_is_a_loopback() {
    let ctx = TestContext::new();
    let (mut manager, windows) = ctx.manager_with_windows(2);
    let (a, b) = (windows[0], windows[1]);

    let tab = open_tab(&mut manager, a, ItemAttrs::pinned_in("ws"));
    manager.drain().await;

    let item = item_of(&manager, a, tab);
    let handle = counterpart(&manager, b, &item);
    assert_eq!(
        manager.on_mutation(MutationEvent::item(b, MutationKind::Opened, handle)),
        Dispatch::Skipped
    );
    manager.drain().await;
    assert_eq!(manager.window(a).unwrap().tabs.tab_count(), 1);
}

#[tokio::test]
async fn test_events_from_other_windows_dropped_while_busy() {
    let ctx = TestContext::new();
    let (mut manager, windows) = ctx.manager_with_windows(2);
    let (a, b) = (windows[0], windows[1]);

    let tab = open_tab(&mut manager, a, ItemAttrs::pinned_in("ws"));
    manager.drain().await;
    let item = item_of(&manager, a, tab);
    let handle = counterpart(&manager, b, &item);

    manager.window_mut(a).unwrap().tabs.get_tab_mut(tab).unwrap().attrs.label = Some("From A".to_string());
    manager.on_mutation(MutationEvent::item(a, MutationKind::LabelChanged, tab));

    manager.window_mut(b).unwrap().tabs.get_tab_mut(handle).unwrap().attrs.label = Some("From B".to_string());
    assert_eq!(
        manager.on_mutation(MutationEvent::item(b, MutationKind::LabelChanged, handle)),
        Dispatch::Dropped
    );
    manager.drain().await;

    // A's edit wins; B's dropped edit is overwritten by the replay
    assert_eq!(attrs_of(&manager, b, handle).label.as_deref(), Some("From A"));
    assert!(manager.is_idle());
}

#[tokio::test]
async fn test_close_refused_while_busy_still_removes_counterparts() {
    let ctx = TestContext::new();
    let (mut manager, windows) = ctx.manager_with_windows(2);
    let (a, b) = (windows[0], windows[1]);

    let tab = open_tab(&mut manager, a, ItemAttrs::pinned_in("ws"));
    manager.drain().await;
    let item = item_of(&manager, a, tab);
    let handle = counterpart(&manager, b, &item);

    manager.window_mut(a).unwrap().tabs.get_tab_mut(tab).unwrap().attrs.label = Some("Busy".to_string());
    manager.on_mutation(MutationEvent::item(a, MutationKind::LabelChanged, tab));

    manager.window_mut(b).unwrap().tabs.remove_tab(handle);
    assert_eq!(
        manager.on_mutation(MutationEvent::item(b, MutationKind::Closed, handle)),
        Dispatch::Dropped
    );
    manager.drain().await;

    assert!(manager.items().resolve(a, &item).is_none());
    assert!(manager.window(a).unwrap().tabs.get_tab(tab).is_none());
    assert!(!manager.document().contains_item(&item));
    assert!(manager.is_idle());

    manager.save_state(true).unwrap();
    assert!(!manager.document().contains_item(&item));
}

#[tokio::test]
async fn test_window_closing_bypasses_busy_queue() {
    let ctx = TestContext::new();
    let (mut manager, windows) = ctx.manager_with_windows(2);
    let (a, b) = (windows[0], windows[1]);

    open_tab(&mut manager, a, ItemAttrs::pinned_in("ws"));
    assert_eq!(manager.on_mutation(MutationEvent::closing(b)), Dispatch::Immediate);
    assert!(!manager.handle(b).unwrap().is_eligible());

    let report = manager.drain().await;
    // B is closing, so the open is replayed nowhere
    assert_eq!(report.applied, 0);
}

#[tokio::test]
async fn test_private_windows_neither_send_nor_receive() {
    let ctx = TestContext::new();
    let (mut manager, windows) = ctx.manager_with_windows(1);
    let a = windows[0];
    let private = manager.open_window(WindowPrivacy::Private);

    open_tab(&mut manager, a, ItemAttrs::pinned_in("ws"));
    manager.drain().await;
    assert_eq!(manager.window(private).unwrap().tabs.tab_count(), 0);

    let tab = manager
        .window_mut(private)
        .unwrap()
        .tabs
        .new_tab(ItemKind::Tab, ItemAttrs::pinned_in("ws"));
    assert_eq!(
        manager.on_mutation(MutationEvent::item(private, MutationKind::Opened, tab)),
        Dispatch::Skipped
    );
    assert_eq!(manager.window(a).unwrap().tabs.tab_count(), 1);
}

#[tokio::test]
async fn test_disabled_sync_skips_item_events() {
    let ctx = TestContext::with_config(Config {
        window_sync_enabled: false,
        ..Config::default()
    });
    let (mut manager, windows) = ctx.manager_with_windows(2);
    let (a, b) = (windows[0], windows[1]);

    let tab = manager
        .window_mut(a)
        .unwrap()
        .tabs
        .new_tab(ItemKind::Tab, ItemAttrs::pinned_in("ws"));
    assert_eq!(
        manager.on_mutation(MutationEvent::item(a, MutationKind::Opened, tab)),
        Dispatch::Skipped
    );
    manager.drain().await;
    assert_eq!(manager.window(b).unwrap().tabs.tab_count(), 0);
}

// ============================================================================
// Pinned-only mode
// ============================================================================

#[tokio::test]
async fn test_only_pinned_mode_mirrors_the_pinned_subset() {
    let ctx = TestContext::with_config(Config {
        sync_only_pinned_tabs: true,
        ..Config::default()
    });
    let (mut manager, windows) = ctx.manager_with_windows(2);
    let (a, b) = (windows[0], windows[1]);

    let normal = manager
        .window_mut(a)
        .unwrap()
        .tabs
        .new_tab(ItemKind::Tab, ItemAttrs::normal_in("ws"));
    assert_eq!(
        manager.on_mutation(MutationEvent::item(a, MutationKind::Opened, normal)),
        Dispatch::Skipped
    );

    let pinned = open_tab(&mut manager, a, ItemAttrs::pinned_in("ws"));
    manager.drain().await;
    assert_eq!(manager.window(b).unwrap().tabs.tab_count(), 1);
    let item = item_of(&manager, a, pinned);

    // Unpinning takes the item out of the mirrored set everywhere
    manager.window_mut(a).unwrap().tabs.get_tab_mut(pinned).unwrap().attrs.pinned = false;
    manager.on_mutation(MutationEvent::item(a, MutationKind::Unpinned, pinned));
    manager.drain().await;

    assert_eq!(manager.window(b).unwrap().tabs.tab_count(), 0);
    assert!(manager.window(a).unwrap().tabs.get_tab(pinned).unwrap().item_id.is_none());
    assert!(!manager.document().contains_item(&item));
}

// ============================================================================
// Split views
// ============================================================================

#[tokio::test]
async fn test_split_views_follow_the_origin() {
    let ctx = TestContext::new();
    let (mut manager, windows) = ctx.manager_with_windows(2);
    let (a, b) = (windows[0], windows[1]);

    let left = open_tab(&mut manager, a, ItemAttrs::normal_in("ws"));
    manager.drain().await;
    let right = open_tab(&mut manager, a, ItemAttrs::normal_in("ws"));
    manager.drain().await;

    let split = SplitView {
        group_id: "split-1".into(),
        item_ids: vec![item_of(&manager, a, left), item_of(&manager, a, right)],
        layout: SplitLayout::Horizontal,
    };
    manager.window_mut(a).unwrap().upsert_split_view(split.clone());
    manager.on_mutation(MutationEvent::split_formed(a, split.clone()));
    manager.drain().await;
    assert_eq!(manager.window(b).unwrap().split_views, vec![split.clone()]);
    assert_eq!(manager.document().split_view_data, vec![split.clone()]);

    manager.window_mut(a).unwrap().remove_split_view(&split.group_id);
    manager.on_mutation(MutationEvent::split_broken(a, split.group_id.clone()));
    manager.drain().await;
    assert!(manager.window(b).unwrap().split_views.is_empty());
}
