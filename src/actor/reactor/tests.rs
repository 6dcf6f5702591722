use pretty_assertions::assert_eq;
use test_log::test;

use super::testing::*;
use super::*;
use crate::actor::channel;
use crate::sys::ax::{AxAttribute, AxElementRef, AxValue};

fn wid(pid: pid_t, idx: u32) -> WindowId {
    WindowId::new(pid, idx)
}

#[test]
fn it_places_new_windows_next_to_the_mru_window() {
    let (source, mut reactor) = make_reactor();
    reactor.handle_event(Event::WorkspaceCreated { name: "main".into() }).unwrap();
    open_window(&mut reactor, &source, wid(1, 1), "main", "one");
    open_window(&mut reactor, &source, wid(1, 2), "main", "two");

    // Both live in the lazily created root container.
    let n1 = reactor.tree().window_node(wid(1, 1)).unwrap();
    let n2 = reactor.tree().window_node(wid(1, 2)).unwrap();
    assert_eq!(
        n1.parent(reactor.tree().map()),
        n2.parent(reactor.tree().map())
    );

    // Group W2 into a nested container and focus it; the next window must
    // land inside that container, not at the workspace root.
    reactor
        .handle_event(Event::GroupWindows {
            wids: vec![wid(1, 2)],
            layout: LayoutKind::Vertical,
        })
        .unwrap();
    focus(&mut reactor, "main", wid(1, 2));
    open_window(&mut reactor, &source, wid(1, 3), "main", "three");

    let n2 = reactor.tree().window_node(wid(1, 2)).unwrap();
    let n3 = reactor.tree().window_node(wid(1, 3)).unwrap();
    assert_eq!(
        n2.parent(reactor.tree().map()),
        n3.parent(reactor.tree().map())
    );
}

#[test]
fn it_restores_the_next_most_recent_window_after_a_close() {
    let (source, mut reactor) = make_reactor();
    reactor.handle_event(Event::WorkspaceCreated { name: "main".into() }).unwrap();
    open_window(&mut reactor, &source, wid(1, 1), "main", "a");
    open_window(&mut reactor, &source, wid(1, 2), "main", "b");

    focus(&mut reactor, "main", wid(1, 2));
    focus(&mut reactor, "main", wid(1, 1));
    let ws = reactor.tree().workspace("main").unwrap();
    assert_eq!(Some(wid(1, 1)), reactor.tree().most_recent_window_recursive(ws));

    reactor.handle_event(Event::WindowDestroyed(wid(1, 1))).unwrap();
    assert_eq!(Some(wid(1, 2)), reactor.tree().most_recent_window_recursive(ws));
}

#[test]
fn it_updates_focus_history_in_order() {
    let (source, mut reactor) = make_reactor();
    reactor.handle_event(Event::WorkspaceCreated { name: "main".into() }).unwrap();
    open_window(&mut reactor, &source, wid(1, 1), "main", "a");
    open_window(&mut reactor, &source, wid(1, 2), "main", "b");

    focus(&mut reactor, "main", wid(1, 1));
    focus(&mut reactor, "main", wid(1, 2));
    assert_eq!(Some(wid(1, 2)), reactor.focus().current().unwrap().window);
    assert_eq!(Some(wid(1, 1)), reactor.focus().previous().unwrap().window);

    // Refocusing the current window leaves previous untouched.
    focus(&mut reactor, "main", wid(1, 2));
    assert_eq!(Some(wid(1, 1)), reactor.focus().previous().unwrap().window);
}

#[test]
fn it_clears_focus_pointers_when_the_window_closes() {
    let (source, mut reactor) = make_reactor();
    reactor.handle_event(Event::WorkspaceCreated { name: "main".into() }).unwrap();
    open_window(&mut reactor, &source, wid(1, 1), "main", "a");
    focus(&mut reactor, "main", wid(1, 1));

    reactor.handle_event(Event::WindowDestroyed(wid(1, 1))).unwrap();
    let current = reactor.focus().current().unwrap();
    assert_eq!(None, current.window);
    assert!(reactor.cache(wid(1, 1)).is_none());
}

#[test]
fn it_destroys_node_and_cache_together() {
    let (source, mut reactor) = make_reactor();
    reactor.handle_event(Event::WorkspaceCreated { name: "main".into() }).unwrap();
    open_window(&mut reactor, &source, wid(1, 1), "main", "a");
    assert!(reactor.cache(wid(1, 1)).is_some());

    reactor.handle_event(Event::WindowDestroyed(wid(1, 1))).unwrap();
    assert!(reactor.cache(wid(1, 1)).is_none());
    assert_eq!(None, reactor.tree().window_node(wid(1, 1)));

    assert_eq!(
        Err(ReactorError::UnknownWindow(wid(1, 1))),
        reactor.handle_event(Event::WindowDestroyed(wid(1, 1)))
    );
}

#[test]
fn structure_change_invalidates_only_that_window_buttons() {
    let (source, mut reactor) = make_reactor();
    reactor.handle_event(Event::WorkspaceCreated { name: "main".into() }).unwrap();
    open_window(&mut reactor, &source, wid(1, 1), "main", "a");
    source.set_attribute(
        wid(1, 1),
        AxAttribute::CloseButton,
        AxValue::Element(AxElementRef(1)),
    );
    source.set_attribute(
        wid(1, 1),
        AxAttribute::Role,
        AxValue::String("AXWindow".into()),
    );

    let cache = reactor.cache(wid(1, 1)).unwrap();
    cache.get(AxAttribute::CloseButton);
    cache.get(AxAttribute::Role);

    reactor.handle_event(Event::WindowStructureChanged(wid(1, 1))).unwrap();

    let cache = reactor.cache(wid(1, 1)).unwrap();
    cache.get(AxAttribute::CloseButton);
    cache.get(AxAttribute::Role);
    assert_eq!(2, source.fetch_count(wid(1, 1), AxAttribute::CloseButton));
    assert_eq!(1, source.fetch_count(wid(1, 1), AxAttribute::Role));
}

#[test]
fn terminating_an_app_removes_all_of_its_windows() {
    let (source, mut reactor) = make_reactor();
    reactor.handle_event(Event::WorkspaceCreated { name: "main".into() }).unwrap();
    launch_app(&mut reactor, 1, "TextEdit");
    launch_app(&mut reactor, 2, "Safari");
    open_window(&mut reactor, &source, wid(1, 1), "main", "doc");
    open_window(&mut reactor, &source, wid(2, 1), "main", "tab");

    reactor.handle_event(Event::ApplicationTerminated(1)).unwrap();
    assert_eq!(None, reactor.tree().window_node(wid(1, 1)));
    assert!(reactor.tree().window_node(wid(2, 1)).is_some());
    assert!(reactor.app_info(1).is_none());
    assert!(reactor.app_info(2).is_some());
}

#[test]
fn moving_a_window_between_workspaces_keeps_mru_membership() {
    let (source, mut reactor) = make_reactor();
    reactor.handle_event(Event::WorkspaceCreated { name: "main".into() }).unwrap();
    reactor.handle_event(Event::WorkspaceCreated { name: "mail".into() }).unwrap();
    open_window(&mut reactor, &source, wid(1, 1), "main", "a");
    open_window(&mut reactor, &source, wid(1, 2), "mail", "b");
    focus(&mut reactor, "mail", wid(1, 2));

    reactor
        .handle_event(Event::WindowMoved { wid: wid(1, 2), workspace: "main".into() })
        .unwrap();

    let main = reactor.tree().workspace("main").unwrap();
    let mail = reactor.tree().workspace("mail").unwrap();
    // The moved window is least-recently-used in its new container.
    assert_eq!(Some(wid(1, 1)), reactor.tree().most_recent_window_recursive(main));
    assert_eq!(None, reactor.tree().most_recent_window_recursive(mail));
}

#[test]
fn unknown_targets_are_reported_not_panicked() {
    let (_, mut reactor) = make_reactor();
    assert_eq!(
        Err(ReactorError::UnknownWorkspace("nope".into())),
        reactor.handle_event(Event::WindowCreated {
            wid: wid(1, 1),
            workspace: "nope".into(),
            is_floating: false,
        })
    );
    assert_eq!(
        Err(ReactorError::UnknownWindow(wid(9, 9))),
        reactor.handle_event(Event::WindowStructureChanged(wid(9, 9)))
    );
}

#[test]
fn rejected_focus_events_leave_the_history_untouched() {
    let (source, mut reactor) = make_reactor();
    reactor.handle_event(Event::WorkspaceCreated { name: "main".into() }).unwrap();
    open_window(&mut reactor, &source, wid(1, 1), "main", "a");
    focus(&mut reactor, "main", wid(1, 1));

    assert_eq!(
        Err(ReactorError::UnknownWindow(wid(9, 9))),
        reactor.handle_event(Event::FocusChanged {
            workspace: "main".into(),
            wid: Some(wid(9, 9)),
        })
    );
    // The phantom window never entered the history.
    assert_eq!(Some(wid(1, 1)), reactor.focus().current().unwrap().window);
    assert_eq!(None, reactor.focus().previous());
}

#[test]
fn grouping_with_an_unknown_window_changes_nothing() {
    let (source, mut reactor) = make_reactor();
    reactor.handle_event(Event::WorkspaceCreated { name: "main".into() }).unwrap();
    open_window(&mut reactor, &source, wid(1, 1), "main", "a");
    open_window(&mut reactor, &source, wid(1, 2), "main", "b");
    let n1 = reactor.tree().window_node(wid(1, 1)).unwrap();
    let parent = n1.parent(reactor.tree().map()).unwrap();
    let before: Vec<_> = reactor.tree().children(parent).collect();

    assert_eq!(
        Err(ReactorError::UnknownWindow(wid(9, 9))),
        reactor.handle_event(Event::GroupWindows {
            wids: vec![wid(1, 1), wid(9, 9), wid(1, 2)],
            layout: LayoutKind::Tabbed,
        })
    );
    // No container was created and no window moved.
    let after: Vec<_> = reactor.tree().children(parent).collect();
    assert_eq!(before, after);
}

#[test]
fn a_repeated_window_created_event_is_rejected() {
    let (source, mut reactor) = make_reactor();
    reactor.handle_event(Event::WorkspaceCreated { name: "main".into() }).unwrap();
    open_window(&mut reactor, &source, wid(1, 1), "main", "a");
    let node = reactor.tree().window_node(wid(1, 1)).unwrap();

    assert_eq!(
        Err(ReactorError::DuplicateWindow(wid(1, 1))),
        reactor.handle_event(Event::WindowCreated {
            wid: wid(1, 1),
            workspace: "main".into(),
            is_floating: true,
        })
    );
    // The original node is still the one the index points at.
    assert_eq!(Some(node), reactor.tree().window_node(wid(1, 1)));
    let parent = node.parent(reactor.tree().map()).unwrap();
    assert_eq!(1, reactor.tree().children(parent).count());
}

#[test(tokio::test)]
async fn events_sent_through_the_channel_are_applied_in_order() {
    let (_, mut reactor) = make_reactor();
    let (tx, rx) = channel();
    tx.send(Event::WorkspaceCreated { name: "main".into() });
    tx.send(Event::WindowCreated {
        wid: wid(1, 1),
        workspace: "main".into(),
        is_floating: false,
    });
    tx.send(Event::WindowCreated {
        wid: wid(1, 2),
        workspace: "main".into(),
        is_floating: false,
    });
    tx.send(Event::FocusChanged { workspace: "main".into(), wid: Some(wid(1, 2)) });
    tx.send(Event::FocusChanged { workspace: "main".into(), wid: Some(wid(1, 1)) });
    drop(tx);

    reactor.run(rx).await;
    let ws = reactor.tree().workspace("main").unwrap();
    assert_eq!(Some(wid(1, 1)), reactor.tree().most_recent_window_recursive(ws));
    assert_eq!(Some(wid(1, 2)), reactor.focus().previous().unwrap().window);
}

#[test(tokio::test)]
async fn debug_dump_renders_mru_stacks_and_focus() {
    let (source, mut reactor) = make_reactor();
    launch_app(&mut reactor, 1, "TextEdit");
    reactor.handle_event(Event::WorkspaceCreated { name: "main".into() }).unwrap();
    open_window(&mut reactor, &source, wid(1, 1), "main", "notes");
    open_window(&mut reactor, &source, wid(1, 2), "main", "draft");
    focus(&mut reactor, "main", wid(1, 2));
    focus(&mut reactor, "main", wid(1, 1));

    let dump = reactor.debug_mru().await;
    assert!(dump.contains("Workspace 'main':"), "{dump}");
    assert!(
        dump.contains("mostRecentWindowRecursive: windowId=1/1, app=TextEdit, title=\"notes\""),
        "{dump}"
    );
    assert!(dump.contains("[MRU] Container(layout=horizontal"), "{dump}");
    assert!(
        dump.contains("[MRU] Window(id=1/1, app=TextEdit, title=\"notes\", floating=false)"),
        "{dump}"
    );
    assert!(
        dump.contains("[1] Window(id=1/2, app=TextEdit, title=\"draft\", floating=false)"),
        "{dump}"
    );
    assert!(
        dump.contains("Focused: windowId=1/1, app=TextEdit, title=\"notes\""),
        "{dump}"
    );
    assert!(
        dump.contains("=== Previous Focus ===\nFocused: windowId=1/2"),
        "{dump}"
    );
}

#[test(tokio::test)]
async fn debug_dump_survives_title_fetch_failure() {
    let (source, mut reactor) = make_reactor();
    reactor.handle_event(Event::WorkspaceCreated { name: "main".into() }).unwrap();
    open_window(&mut reactor, &source, wid(1, 1), "main", "a");
    open_window(&mut reactor, &source, wid(1, 2), "main", "b");
    source.break_title(wid(1, 1));
    focus(&mut reactor, "main", wid(1, 1));

    let dump = reactor.debug_mru().await;
    assert!(dump.contains("title=\"<title unavailable>\""), "{dump}");
    // The other window still rendered normally.
    assert!(dump.contains("title=\"b\""), "{dump}");
}

#[test(tokio::test)]
async fn debug_dump_is_side_effect_free() {
    let (source, mut reactor) = make_reactor();
    reactor.handle_event(Event::WorkspaceCreated { name: "main".into() }).unwrap();
    open_window(&mut reactor, &source, wid(1, 1), "main", "a");
    open_window(&mut reactor, &source, wid(1, 2), "main", "b");
    focus(&mut reactor, "main", wid(1, 2));

    let before = reactor.debug_mru().await;
    let after = reactor.debug_mru().await;
    assert_eq!(before, after);

    let ws = reactor.tree().workspace("main").unwrap();
    assert_eq!(Some(wid(1, 2)), reactor.tree().most_recent_window_recursive(ws));
}

#[test(tokio::test)]
async fn empty_workspace_dumps_an_empty_stack() {
    let (_, mut reactor) = make_reactor();
    reactor.handle_event(Event::WorkspaceCreated { name: "bare".into() }).unwrap();
    let ws = reactor.tree().workspace("bare").unwrap();
    assert_eq!(None, reactor.tree().most_recent_window_recursive(ws));

    let dump = reactor.debug_mru().await;
    assert!(dump.contains("mostRecentWindowRecursive: (none)"), "{dump}");
    assert!(dump.contains("(empty MRU stack)"), "{dump}");
}
