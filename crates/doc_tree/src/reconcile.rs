//! Reconciliation of the active path against the level containers.

use crate::{DocumentNode, LevelContainer, LevelHost, NavigationTree, Tab, TabAction, TreeError};
use core_types::DocKey;

impl<H: LevelHost> NavigationTree<H> {
    /// Bring the level containers in line with the current active path.
    ///
    /// Every container on the path is cleared and fully repopulated; reuse
    /// happens per container, never within one. Containers beyond the path
    /// are detached.
    pub fn redraw(&mut self) -> Result<(), TreeError> {
        let Self {
            roots,
            active_root,
            levels,
            host,
        } = self;
        let roots: &[DocumentNode<H::Content>] = roots;

        let root = active_root
            .as_ref()
            .and_then(|key| roots.iter().find(|r| r.key() == key))
            .ok_or(TreeError::EmptyTree)?;
        let path = root.active_path_from_here();

        for (depth, node) in path.iter().enumerate() {
            if let Some(level) = levels.get_mut(depth) {
                level.clear();
            } else {
                levels.push(host.allocate(depth));
            }
            let level = &mut levels[depth];

            if depth == 0 {
                add_sibling_tabs(level, roots, None, node.key());
            } else {
                let parent = path[depth - 1];
                add_sibling_tabs(level, parent.children(), Some(parent.key()), node.key());
            }
            level.set_content(node.content());
        }

        let surplus = levels.len().saturating_sub(path.len());
        for level in levels.drain(path.len()..) {
            host.detach(level);
        }

        log::debug!(
            target: "doc_tree",
            "redraw: {} level(s), {surplus} detached",
            path.len()
        );
        Ok(())
    }
}

/// One tab per sibling in insertion order. The first sibling of every set
/// has no close action, so a level can never be emptied from its own strip.
fn add_sibling_tabs<L: LevelContainer>(
    level: &mut L,
    siblings: &[DocumentNode<L::Content>],
    parent: Option<&DocKey>,
    active: &DocKey,
) {
    for (i, sibling) in siblings.iter().enumerate() {
        let key = sibling.key().clone();
        let (on_select, on_close) = match parent {
            None => (TabAction::SelectRoot(key.clone()), TabAction::CloseRoot(key.clone())),
            Some(parent) => (
                TabAction::SelectChild {
                    parent: parent.clone(),
                    child: key.clone(),
                },
                TabAction::CloseChild {
                    parent: parent.clone(),
                    child: key.clone(),
                },
            ),
        };

        level.add_tab(Tab {
            label: sibling.title().to_owned(),
            active: &key == active,
            key,
            on_select,
            on_close: (i > 0).then_some(on_close),
        });
    }
}
