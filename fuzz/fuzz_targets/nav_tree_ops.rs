#![no_main]

use std::collections::HashSet;

use doc_tree::testing::RecordingHost;
use doc_tree::{DocKey, NavigationTree, TabAction, TreeError};
use libfuzzer_sys::fuzz_target;

type Tree = NavigationTree<RecordingHost<u8>>;

fn key(n: u8) -> DocKey {
    DocKey::new(format!("/doc/{}", n % 16))
}

fn drawn_action(tree: &Tree, level: u8, tab: u8, close: bool) -> Option<TabAction> {
    let levels = tree.levels();
    if levels.is_empty() {
        return None;
    }
    let level = &levels[level as usize % levels.len()];
    if level.tabs.is_empty() {
        return None;
    }
    let tab = &level.tabs[tab as usize % level.tabs.len()];
    if close {
        tab.on_close.clone()
    } else {
        Some(tab.on_select.clone())
    }
}

fn check(tree: &Tree) {
    let path = tree.active_path();
    assert_eq!(tree.level_count(), path.len());
    assert_eq!(tree.host().attached(), tree.level_count());
    assert_eq!(tree.active_root().is_none(), tree.is_empty());

    for (level, node) in tree.levels().iter().zip(&path) {
        assert_eq!(level.contents, [*node.content()]);
        let active: Vec<_> = level.tabs.iter().filter(|t| t.active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(&active[0].key, node.key());
        let closable = level.tabs.iter().filter(|t| t.closable()).count();
        assert_eq!(closable, level.tabs.len().saturating_sub(1));
        assert!(level.tabs.first().is_none_or(|t| !t.closable()));
    }

    if let Some(root) = tree.active_root_node() {
        let keys = root.subtree_keys();
        let unique: HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len());
    }
}

fuzz_target!(|data: &[u8]| {
    let mut tree = Tree::new(RecordingHost::default());

    for op in data.chunks_exact(3) {
        let result = match op[0] % 5 {
            0 | 1 => {
                let ancestor = (op[2] & 0x80 != 0).then(|| key(op[2]));
                tree.insert_under(key(op[1]), "doc", op[1] % 16, ancestor.as_ref())
                    .map(drop)
            }
            2 => match drawn_action(&tree, op[1], op[2], false) {
                Some(action) => tree.apply(&action),
                None => Ok(()),
            },
            3 => match drawn_action(&tree, op[1], op[2], true) {
                Some(action) => tree.apply(&action),
                None => Ok(()),
            },
            // stale actions aimed at whatever key the input names
            _ => {
                let action = match op[2] % 4 {
                    0 => TabAction::SelectRoot(key(op[1])),
                    1 => TabAction::CloseRoot(key(op[1])),
                    2 => TabAction::SelectChild { parent: key(op[2]), child: key(op[1]) },
                    _ => TabAction::CloseChild { parent: key(op[2]), child: key(op[1]) },
                };
                match tree.apply(&action) {
                    Err(TreeError::UnknownKey(_)) | Err(TreeError::InvalidState { .. }) => Ok(()),
                    other => other,
                }
            }
        };
        assert!(result.is_ok(), "{result:?}");
        check(&tree);
    }
});
