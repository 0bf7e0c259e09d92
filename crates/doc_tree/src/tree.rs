//! The navigation tree and its state operations.
//!
//! Invariants:
//! - `active_root`, if set, is the key of an entry in `roots`; it is only
//!   `None` while `roots` is empty.
//! - after every redraw `levels.len()` equals the active path length, and
//!   `levels[i]` shows the document at depth `i` of that path.
//! - duplicate detection and ancestor lookup only look at the active root's
//!   subtree.

use crate::{DocumentNode, LevelHost, TabAction, TreeError};
use core_types::DocKey;

/// Where an inserted document ended up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Opened as a new root (no ancestor, or the ancestor was not open).
    Root,
    /// Nested under its ancestor and selected there.
    Nested { visible_depth: Option<usize> },
    /// Already open under the active root; nothing changed.
    AlreadyOpen { visible_depth: Option<usize> },
}

impl InsertOutcome {
    /// Depth of the document on the active path, if it is drawn.
    pub fn visible_depth(&self) -> Option<usize> {
        match self {
            InsertOutcome::Root => Some(0),
            InsertOutcome::Nested { visible_depth } | InsertOutcome::AlreadyOpen { visible_depth } => {
                *visible_depth
            }
        }
    }
}

pub struct NavigationTree<H: LevelHost> {
    pub(crate) roots: Vec<DocumentNode<H::Content>>,
    pub(crate) active_root: Option<DocKey>,
    pub(crate) levels: Vec<H::Level>,
    pub(crate) host: H,
}

impl<H: LevelHost> NavigationTree<H> {
    pub fn new(host: H) -> Self {
        Self {
            roots: Vec::new(),
            active_root: None,
            levels: Vec::new(),
            host,
        }
    }

    // -- Accessors ---
    pub fn roots(&self) -> &[DocumentNode<H::Content>] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn active_root(&self) -> Option<&DocKey> {
        self.active_root.as_ref()
    }

    pub fn active_root_node(&self) -> Option<&DocumentNode<H::Content>> {
        let key = self.active_root.as_ref()?;
        self.roots.iter().find(|r| r.key() == key)
    }

    fn active_root_node_mut(&mut self) -> Option<&mut DocumentNode<H::Content>> {
        let key = self.active_root.as_ref()?;
        self.roots.iter_mut().find(|r| r.key() == key)
    }

    /// The documents drawn top to bottom; empty when nothing is open.
    pub fn active_path(&self) -> Vec<&DocumentNode<H::Content>> {
        self.active_root_node()
            .map(|root| root.active_path_from_here())
            .unwrap_or_default()
    }

    pub fn find_in_active(&self, key: &DocKey) -> Option<&DocumentNode<H::Content>> {
        self.active_root_node()?.find_by_key(key)
    }

    fn find_in_active_mut(&mut self, key: &DocKey) -> Option<&mut DocumentNode<H::Content>> {
        self.active_root_node_mut()?.find_by_key_mut(key)
    }

    /// Position of `key` on the active path.
    pub fn visible_depth(&self, key: &DocKey) -> Option<usize> {
        self.active_path().iter().position(|n| n.key() == key)
    }

    pub fn levels(&self) -> &[H::Level] {
        &self.levels
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    // -- Insertion ---

    /// Open a document at the root level and make it the active root.
    ///
    /// A root with the same key is replaced in place, subtree included.
    pub fn insert_root(
        &mut self,
        key: DocKey,
        title: impl Into<String>,
        content: H::Content,
    ) -> Result<InsertOutcome, TreeError> {
        let node = DocumentNode::new(key.clone(), title, content);
        match self.roots.iter_mut().find(|r| r.key() == &key) {
            Some(slot) => *slot = node,
            None => self.roots.push(node),
        }
        log::debug!(target: "doc_tree", "opened `{key}` as root");
        self.active_root = Some(key);
        self.redraw()?;
        Ok(InsertOutcome::Root)
    }

    /// Open a document that was reached from the document keyed `ancestor`.
    ///
    /// Re-opening a document that is already under the active root changes
    /// nothing and skips the redraw. An ancestor that is not open (or no
    /// ancestor at all) makes the document a new root rather than dropping it.
    pub fn insert_under(
        &mut self,
        key: DocKey,
        title: impl Into<String>,
        content: H::Content,
        ancestor: Option<&DocKey>,
    ) -> Result<InsertOutcome, TreeError> {
        if self.find_in_active(&key).is_some() {
            log::debug!(target: "doc_tree", "`{key}` is already open");
            return Ok(InsertOutcome::AlreadyOpen {
                visible_depth: self.visible_depth(&key),
            });
        }

        let parent = ancestor.and_then(|a| self.find_in_active_mut(a));
        let Some(parent) = parent else {
            log::debug!(
                target: "doc_tree",
                "ancestor {ancestor:?} of `{key}` is not open; opening as root"
            );
            return self.insert_root(key, title, content);
        };

        parent.add_child(DocumentNode::new(key.clone(), title, content));
        parent.set_selected_child(&key)?;
        log::debug!(target: "doc_tree", "opened `{key}` under `{}`", parent.key());

        self.redraw()?;
        Ok(InsertOutcome::Nested {
            visible_depth: self.visible_depth(&key),
        })
    }

    // -- Tab operations ---

    /// Close a root document and everything opened from it.
    ///
    /// Closing the active root falls back to the most recently inserted
    /// remaining root. Closing the last root detaches every level.
    pub fn remove_root(&mut self, key: &DocKey) -> Result<DocumentNode<H::Content>, TreeError> {
        let idx = self
            .roots
            .iter()
            .position(|r| r.key() == key)
            .ok_or_else(|| TreeError::UnknownKey(key.clone()))?;
        let removed = self.roots.remove(idx);

        if self.active_root.as_ref() == Some(key) {
            self.active_root = self.roots.last().map(|r| r.key().clone());
        }
        log::debug!(target: "doc_tree", "closed root `{key}`");

        if self.roots.is_empty() {
            self.detach_all();
        } else {
            self.redraw()?;
        }
        Ok(removed)
    }

    pub fn select_root(&mut self, key: &DocKey) -> Result<(), TreeError> {
        if !self.roots.iter().any(|r| r.key() == key) {
            return Err(TreeError::UnknownKey(key.clone()));
        }
        self.active_root = Some(key.clone());
        self.redraw()
    }

    pub fn select_child(&mut self, parent: &DocKey, child: &DocKey) -> Result<(), TreeError> {
        let node = self
            .find_in_active_mut(parent)
            .ok_or_else(|| TreeError::UnknownKey(parent.clone()))?;
        node.set_selected_child(child)?;
        self.redraw()
    }

    pub fn close_child(
        &mut self,
        parent: &DocKey,
        child: &DocKey,
    ) -> Result<DocumentNode<H::Content>, TreeError> {
        let node = self
            .find_in_active_mut(parent)
            .ok_or_else(|| TreeError::UnknownKey(parent.clone()))?;
        let removed = node
            .remove_child(child)
            .ok_or_else(|| TreeError::UnknownKey(child.clone()))?;
        log::debug!(target: "doc_tree", "closed `{child}` under `{parent}`");
        self.redraw()?;
        Ok(removed)
    }

    /// Run a tab action emitted by a drawn level.
    pub fn apply(&mut self, action: &TabAction) -> Result<(), TreeError> {
        match action {
            TabAction::SelectRoot(key) => self.select_root(key),
            TabAction::CloseRoot(key) => self.remove_root(key).map(drop),
            TabAction::SelectChild { parent, child } => self.select_child(parent, child),
            TabAction::CloseChild { parent, child } => self.close_child(parent, child).map(drop),
        }
    }

    fn detach_all(&mut self) {
        while let Some(level) = self.levels.pop() {
            self.host.detach(level);
        }
    }
}
