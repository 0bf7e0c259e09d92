/// A document reduced to what the level view renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub title: String,
    pub blocks: Vec<Block>,
    /// Element ids in document order with the index of the block they sit in.
    pub anchors: Vec<(String, usize)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub runs: Vec<Inline>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Heading(u8),
    Paragraph,
    ListItem,
    Preformatted,
    Quote,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Link { text: String, href: String },
}

impl Inline {
    pub fn text(&self) -> &str {
        match self {
            Inline::Text(t) | Inline::Link { text: t, .. } => t,
        }
    }
}

impl Block {
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(Inline::text).collect()
    }
}

impl Page {
    /// Block holding the element with this id. Ids after the last block map to it.
    pub fn block_for_anchor(&self, id: &str) -> Option<usize> {
        let last = self.blocks.len().checked_sub(1)?;
        self.anchors
            .iter()
            .find(|(anchor, _)| anchor == id)
            .map(|(_, block)| (*block).min(last))
    }

    pub fn links(&self) -> impl Iterator<Item = (&str, &str)> {
        self.blocks.iter().flat_map(|b| &b.runs).filter_map(|run| match run {
            Inline::Link { text, href } => Some((text.as_str(), href.as_str())),
            Inline::Text(_) => None,
        })
    }
}
