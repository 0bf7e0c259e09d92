use crate::TreeError;
use core_types::DocKey;

/// One open document and the documents opened from it.
///
/// Invariants:
/// - `selected_child`, if set, is the key of an entry in `children`.
/// - a node without children has no selection.
/// - children keep insertion order; that order is the tab order.
#[derive(Debug)]
pub struct DocumentNode<C> {
    key: DocKey,
    title: String,
    content: C,
    children: Vec<DocumentNode<C>>,
    selected_child: Option<DocKey>,
}

impl<C> DocumentNode<C> {
    pub fn new(key: DocKey, title: impl Into<String>, content: C) -> Self {
        Self {
            key,
            title: title.into(),
            content,
            children: Vec::new(),
            selected_child: None,
        }
    }

    pub fn key(&self) -> &DocKey {
        &self.key
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &C {
        &self.content
    }

    pub fn children(&self) -> &[DocumentNode<C>] {
        &self.children
    }

    pub fn selected_child(&self) -> Option<&DocKey> {
        self.selected_child.as_ref()
    }

    pub fn child(&self, key: &DocKey) -> Option<&DocumentNode<C>> {
        self.children.iter().find(|c| &c.key == key)
    }

    /// Insert `child` under its own key. An existing entry with the same key
    /// is replaced in place and keeps its tab position.
    pub fn add_child(&mut self, child: DocumentNode<C>) {
        match self.children.iter_mut().find(|c| c.key == child.key) {
            Some(slot) => *slot = child,
            None => self.children.push(child),
        }
    }

    pub fn set_selected_child(&mut self, key: &DocKey) -> Result<(), TreeError> {
        if self.child(key).is_none() {
            log::error!(
                target: "doc_tree",
                "refusing to select `{key}`: not a child of `{}`",
                self.key
            );
            return Err(TreeError::InvalidState {
                parent: self.key.clone(),
                child: key.clone(),
            });
        }
        self.selected_child = Some(key.clone());
        Ok(())
    }

    /// Remove a child together with its whole subtree.
    ///
    /// Closing the selected child falls back to the most recently inserted
    /// remaining child, or to no selection when none remain. Closing any
    /// other child leaves the selection alone.
    pub fn remove_child(&mut self, key: &DocKey) -> Option<DocumentNode<C>> {
        let idx = self.children.iter().position(|c| &c.key == key)?;
        let removed = self.children.remove(idx);
        if self.selected_child.as_ref() == Some(key) {
            self.selected_child = self.children.last().map(|c| c.key.clone());
        }
        Some(removed)
    }

    /// Depth-first search of this node and its descendants; siblings are
    /// visited in insertion order and the first match wins.
    pub fn find_by_key(&self, key: &DocKey) -> Option<&DocumentNode<C>> {
        if &self.key == key {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_by_key(key))
    }

    pub fn find_by_key_mut(&mut self, key: &DocKey) -> Option<&mut DocumentNode<C>> {
        if &self.key == key {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_by_key_mut(key))
    }

    /// This node followed by the selected child, its selected child, and so on.
    pub fn active_path_from_here(&self) -> Vec<&DocumentNode<C>> {
        let mut path = vec![self];
        let mut current = self;
        while let Some(next) = current.selected_child.as_ref().and_then(|k| current.child(k)) {
            path.push(next);
            current = next;
        }
        path
    }

    /// Every key in this subtree, depth first.
    pub fn subtree_keys(&self) -> Vec<&DocKey> {
        let mut out = Vec::new();
        self.collect_keys(&mut out);
        out
    }

    fn collect_keys<'a>(&'a self, out: &mut Vec<&'a DocKey>) {
        out.push(&self.key);
        for c in &self.children {
            c.collect_keys(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(key: &str) -> DocumentNode<()> {
        DocumentNode::new(DocKey::from(key), key.trim_start_matches('/'), ())
    }

    fn key(raw: &str) -> DocKey {
        DocKey::from(raw)
    }

    #[test]
    fn fresh_node_has_no_selection() {
        let node = doc("/a");
        assert!(node.children().is_empty());
        assert_eq!(node.selected_child(), None);
        assert_eq!(node.active_path_from_here().len(), 1);
    }

    #[test]
    fn add_child_keeps_insertion_order() {
        let mut node = doc("/a");
        node.add_child(doc("/b"));
        node.add_child(doc("/c"));
        node.add_child(doc("/d"));
        let keys: Vec<_> = node.children().iter().map(|c| c.key().as_str()).collect();
        assert_eq!(keys, ["/b", "/c", "/d"]);
    }

    #[test]
    fn add_child_with_existing_key_replaces_in_place() {
        let mut node = doc("/a");
        node.add_child(doc("/b"));
        node.add_child(doc("/c"));
        node.add_child(DocumentNode::new(key("/b"), "Bee", ()));
        assert_eq!(node.children().len(), 2);
        assert_eq!(node.children()[0].title(), "Bee");
    }

    #[test]
    fn selecting_absent_child_is_invalid_state() {
        let mut node = doc("/a");
        node.add_child(doc("/b"));
        node.set_selected_child(&key("/b")).unwrap();

        let err = node.set_selected_child(&key("/zzz")).unwrap_err();
        assert_eq!(
            err,
            TreeError::InvalidState {
                parent: key("/a"),
                child: key("/zzz")
            }
        );
        // selection is left untouched
        assert_eq!(node.selected_child(), Some(&key("/b")));
    }

    #[test]
    fn removing_selected_child_falls_back_to_most_recent() {
        let mut node = doc("/a");
        node.add_child(doc("/b"));
        node.add_child(doc("/c"));
        node.add_child(doc("/d"));
        node.set_selected_child(&key("/c")).unwrap();

        assert!(node.remove_child(&key("/c")).is_some());
        assert_eq!(node.selected_child(), Some(&key("/d")));
    }

    #[test]
    fn removing_other_child_preserves_selection() {
        let mut node = doc("/a");
        node.add_child(doc("/b"));
        node.add_child(doc("/c"));
        node.add_child(doc("/d"));
        node.set_selected_child(&key("/b")).unwrap();

        node.remove_child(&key("/d"));
        assert_eq!(node.selected_child(), Some(&key("/b")));
    }

    #[test]
    fn removing_last_child_clears_selection() {
        let mut node = doc("/a");
        node.add_child(doc("/b"));
        node.set_selected_child(&key("/b")).unwrap();

        node.remove_child(&key("/b"));
        assert_eq!(node.selected_child(), None);
        assert!(node.children().is_empty());
    }

    #[test]
    fn removing_unknown_child_is_none() {
        let mut node = doc("/a");
        node.add_child(doc("/b"));
        assert!(node.remove_child(&key("/x")).is_none());
        assert_eq!(node.children().len(), 1);
    }

    #[test]
    fn removing_child_drops_its_subtree() {
        let mut node = doc("/a");
        let mut b = doc("/b");
        b.add_child(doc("/b1"));
        node.add_child(b);

        let removed = node.remove_child(&key("/b")).unwrap();
        assert_eq!(removed.children().len(), 1);
        assert!(node.find_by_key(&key("/b1")).is_none());
    }

    #[test]
    fn find_by_key_searches_depth_first() {
        let mut root = doc("/a");
        let mut b = doc("/b");
        b.add_child(doc("/b1"));
        root.add_child(b);
        root.add_child(doc("/c"));

        assert_eq!(root.find_by_key(&key("/a")).map(|n| n.title()), Some("a"));
        assert_eq!(root.find_by_key(&key("/b1")).map(|n| n.title()), Some("b1"));
        assert!(root.find_by_key(&key("/nope")).is_none());
        assert_eq!(root.subtree_keys().len(), 4);
    }

    #[test]
    fn active_path_follows_selection() {
        let mut root = doc("/a");
        let mut b = doc("/b");
        b.add_child(doc("/b1"));
        b.set_selected_child(&key("/b1")).unwrap();
        root.add_child(b);
        root.add_child(doc("/c"));
        root.set_selected_child(&key("/b")).unwrap();

        let path: Vec<_> = root
            .active_path_from_here()
            .iter()
            .map(|n| n.key().as_str())
            .collect();
        assert_eq!(path, ["/a", "/b", "/b1"]);

        root.set_selected_child(&key("/c")).unwrap();
        assert_eq!(root.active_path_from_here().len(), 2);
    }
}
