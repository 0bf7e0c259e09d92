//! The seam between the tree and whatever puts levels on screen.

use core_types::DocKey;

/// What a tab does when it is clicked.
///
/// Actions name their targets by key only. The tree re-resolves them when
/// they are applied, so a tab rendered before a structural change can never
/// act on a node that has since moved or been dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TabAction {
    SelectRoot(DocKey),
    CloseRoot(DocKey),
    SelectChild { parent: DocKey, child: DocKey },
    CloseChild { parent: DocKey, child: DocKey },
}

impl TabAction {
    /// The document the action is aimed at.
    pub fn target(&self) -> &DocKey {
        match self {
            TabAction::SelectRoot(key) | TabAction::CloseRoot(key) => key,
            TabAction::SelectChild { child, .. } | TabAction::CloseChild { child, .. } => child,
        }
    }
}

/// One entry in a level's tab strip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tab {
    pub label: String,
    pub key: DocKey,
    pub active: bool,
    pub on_select: TabAction,
    /// `None` means the tab is drawn without a close affordance.
    pub on_close: Option<TabAction>,
}

impl Tab {
    pub fn closable(&self) -> bool {
        self.on_close.is_some()
    }
}

/// A reusable visual slot showing one document plus its sibling tabs.
pub trait LevelContainer {
    type Content;

    /// Drop the content and every tab. The container itself stays where it is.
    fn clear(&mut self);

    /// Append one tab; tabs keep call order.
    fn add_tab(&mut self, tab: Tab);

    /// Attach the document content. Called once per clear cycle; a second
    /// call appends rather than replaces.
    fn set_content(&mut self, content: &Self::Content);
}

/// The visible container that level containers are appended to and removed from.
pub trait LevelHost {
    type Content;
    type Level: LevelContainer<Content = Self::Content>;

    /// Create a fresh container for `depth` and attach it after the existing ones.
    fn allocate(&mut self, depth: usize) -> Self::Level;

    /// Detach a surplus container. The default just drops it.
    fn detach(&mut self, level: Self::Level) {
        drop(level);
    }
}
