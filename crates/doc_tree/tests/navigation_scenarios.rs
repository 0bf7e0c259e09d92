use doc_tree::testing::{HostEvent, RecordingHost};
use doc_tree::{DocKey, InsertOutcome, NavigationTree, TabAction};

type Tree = NavigationTree<RecordingHost<&'static str>>;

fn key(raw: &str) -> DocKey {
    DocKey::from(raw)
}

fn path_keys(tree: &Tree) -> Vec<&str> {
    tree.active_path().iter().map(|n| n.key().as_str()).collect()
}

fn assert_levels_match_path(tree: &Tree) {
    let path = tree.active_path();
    assert_eq!(tree.level_count(), path.len());
    assert_eq!(tree.host().attached(), path.len());
    for (depth, (level, node)) in tree.levels().iter().zip(&path).enumerate() {
        assert_eq!(level.contents, [*node.content()], "level {depth}");
        let active: Vec<_> = level.tabs.iter().filter(|t| t.active).collect();
        assert_eq!(active.len(), 1, "level {depth} has one active tab");
        assert_eq!(&active[0].key, node.key());
    }
}

#[test]
fn dog_cat_fish() {
    let mut tree = Tree::new(RecordingHost::default());

    tree.insert_root(key("A"), "Dog", "dog").unwrap();
    assert_eq!(tree.roots().len(), 1);
    assert_eq!(tree.active_root(), Some(&key("A")));
    assert_eq!(path_keys(&tree), ["A"]);
    assert_eq!(tree.level_count(), 1);

    tree.insert_under(key("B"), "Cat", "cat", Some(&key("A")))
        .unwrap();
    let a = &tree.roots()[0];
    assert_eq!(a.children().len(), 1);
    assert_eq!(a.selected_child(), Some(&key("B")));
    assert_eq!(path_keys(&tree), ["A", "B"]);
    assert_eq!(tree.level_count(), 2);

    tree.insert_under(key("C"), "Fish", "fish", Some(&key("A")))
        .unwrap();
    let a = &tree.roots()[0];
    let children: Vec<_> = a.children().iter().map(|c| c.key().as_str()).collect();
    assert_eq!(children, ["B", "C"]);
    assert_eq!(a.selected_child(), Some(&key("C")));

    // The first inserted sibling stays non-closable even though C is selected.
    let strip = &tree.levels()[1].tabs;
    assert_eq!(strip.len(), 2);
    assert_eq!(strip[0].label, "Cat");
    assert!(!strip[0].closable());
    assert!(!strip[0].active);
    assert_eq!(strip[1].label, "Fish");
    assert!(strip[1].closable());
    assert!(strip[1].active);
    assert_levels_match_path(&tree);

    let close = strip[1].on_close.clone().unwrap();
    assert_eq!(
        close,
        TabAction::CloseChild {
            parent: key("A"),
            child: key("C")
        }
    );
    tree.apply(&close).unwrap();
    assert_eq!(tree.roots()[0].selected_child(), Some(&key("B")));
    assert_eq!(path_keys(&tree), ["A", "B"]);
    assert_levels_match_path(&tree);
}

#[test]
fn closing_a_deep_branch_shrinks_the_stack() {
    let mut tree = Tree::new(RecordingHost::default());
    tree.insert_root(key("A"), "Dog", "dog").unwrap();
    tree.insert_under(key("B"), "Cat", "cat", Some(&key("A")))
        .unwrap();
    tree.insert_under(key("C"), "Fish", "fish", Some(&key("A")))
        .unwrap();
    tree.insert_under(key("D"), "Shark", "shark", Some(&key("C")))
        .unwrap();
    tree.insert_under(key("E"), "Whale", "whale", Some(&key("D")))
        .unwrap();
    assert_eq!(path_keys(&tree), ["A", "C", "D", "E"]);
    assert_levels_match_path(&tree);

    tree.apply(&TabAction::CloseChild {
        parent: key("A"),
        child: key("C"),
    })
    .unwrap();
    assert_eq!(path_keys(&tree), ["A", "B"]);
    assert_levels_match_path(&tree);
    assert!(tree.find_in_active(&key("E")).is_none());

    let detached = tree
        .host()
        .events
        .iter()
        .filter(|e| matches!(e, HostEvent::Detached { .. }))
        .count();
    assert_eq!(detached, 2);
}

#[test]
fn reselecting_roots_reuses_the_top_container() {
    let mut tree = Tree::new(RecordingHost::default());
    tree.insert_root(key("A"), "Dog", "dog").unwrap();
    tree.insert_under(key("B"), "Cat", "cat", Some(&key("A")))
        .unwrap();
    tree.insert_under(key("Z"), "Search", "search", None).unwrap();
    assert_eq!(path_keys(&tree), ["Z"]);
    let top = tree.levels()[0].id;

    tree.apply(&TabAction::SelectRoot(key("A"))).unwrap();
    assert_eq!(path_keys(&tree), ["A", "B"]);
    assert_eq!(tree.levels()[0].id, top);
    assert_levels_match_path(&tree);

    let roots = &tree.levels()[0].tabs;
    assert_eq!(roots.iter().filter(|t| t.closable()).count(), 1);
    assert!(!roots[0].closable());
}

#[test]
fn re_navigation_only_reports_where_to_scroll() {
    let mut tree = Tree::new(RecordingHost::default());
    tree.insert_root(key("A"), "Dog", "dog").unwrap();
    tree.insert_under(key("B"), "Cat", "cat", Some(&key("A")))
        .unwrap();
    tree.insert_under(key("C"), "Fish", "fish", Some(&key("A")))
        .unwrap();
    let events = tree.host().events.clone();

    // B is open but not on the active path
    let outcome = tree
        .insert_under(key("B"), "Cat", "cat", Some(&key("C")))
        .unwrap();
    assert_eq!(outcome, InsertOutcome::AlreadyOpen { visible_depth: None });

    // A is the top of the stack
    let outcome = tree
        .insert_under(key("A"), "Dog", "dog", Some(&key("C")))
        .unwrap();
    assert_eq!(outcome.visible_depth(), Some(0));

    assert_eq!(tree.host().events, events);
    assert_eq!(path_keys(&tree), ["A", "C"]);
}

#[test]
fn tab_counts_allow_all_but_first_to_close() {
    let mut tree = Tree::new(RecordingHost::default());
    tree.insert_root(key("root"), "Root", "root").unwrap();
    let children = ["c1", "c2", "c3", "c4", "c5"];
    for child in children {
        tree.insert_under(key(child), child, "page", Some(&key("root")))
            .unwrap();
    }

    let strip = &tree.levels()[1].tabs;
    assert_eq!(strip.len(), children.len());
    assert_eq!(strip.iter().filter(|t| t.closable()).count(), children.len() - 1);
    assert!(!strip[0].closable());

    let strip = &tree.levels()[0].tabs;
    assert_eq!(strip.len(), 1);
    assert_eq!(strip.iter().filter(|t| t.closable()).count(), 0);
}
