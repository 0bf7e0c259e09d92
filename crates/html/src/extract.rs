use crate::dom_builder::build_dom;
use crate::page::{Block, BlockKind, Inline, Page};
use crate::tokenizer::tokenize;
use crate::types::{Element, Node};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Id of the element holding the main content.
    pub content_id: String,
    /// Class of the element whose text becomes the page title.
    pub title_class: String,
    /// Elements with this class are left out entirely.
    pub strip_class: String,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            content_id: "content".to_string(),
            title_class: "mw-first-heading".to_string(),
            strip_class: "mw-editsection".to_string(),
        }
    }
}

/// Turn an HTML document into a [`Page`].
///
/// `fallback_title` is used when neither the title element nor `<title>`
/// yields any text.
pub fn extract_page(html: &str, fallback_title: &str, opts: &ExtractOptions) -> Page {
    let doc = build_dom(tokenize(html));

    let title = doc
        .find(&|e| e.has_class(&opts.title_class))
        .map(|e| text_of(e, opts))
        .filter(|t| !t.is_empty())
        .or_else(|| {
            doc.find(&|e| e.name == "title")
                .map(|e| text_of(e, opts))
                .filter(|t| !t.is_empty())
        })
        .unwrap_or_else(|| fallback_title.to_string());

    let content = doc
        .find(&|e| e.id() == Some(opts.content_id.as_str()))
        .or_else(|| doc.find(&|e| e.name == "body"))
        .unwrap_or(&doc);

    let mut collector = Collector::new(opts);
    collector.walk(content);
    collector.flush();

    log::debug!(
        target: "html",
        "extracted `{title}`: {} block(s), {} anchor(s)",
        collector.blocks.len(),
        collector.anchors.len()
    );
    Page {
        title,
        blocks: collector.blocks,
        anchors: collector.anchors,
    }
}

fn is_skipped(e: &Element, opts: &ExtractOptions) -> bool {
    matches!(
        e.name.as_str(),
        "script" | "style" | "noscript" | "head" | "template"
    ) || (!opts.strip_class.is_empty() && e.has_class(&opts.strip_class))
}

enum Flow {
    Block(BlockKind),
    /// Starts a new block without changing its kind.
    Break,
    Inline,
}

fn flow_of(name: &str) -> Flow {
    match name {
        "h1" => Flow::Block(BlockKind::Heading(1)),
        "h2" => Flow::Block(BlockKind::Heading(2)),
        "h3" => Flow::Block(BlockKind::Heading(3)),
        "h4" => Flow::Block(BlockKind::Heading(4)),
        "h5" => Flow::Block(BlockKind::Heading(5)),
        "h6" => Flow::Block(BlockKind::Heading(6)),
        "p" | "dd" | "dt" | "caption" | "figcaption" => Flow::Block(BlockKind::Paragraph),
        "li" => Flow::Block(BlockKind::ListItem),
        "pre" => Flow::Block(BlockKind::Preformatted),
        "blockquote" => Flow::Block(BlockKind::Quote),
        "div" | "section" | "article" | "main" | "table" | "tr" | "td" | "th" | "ul" | "ol"
        | "dl" | "figure" | "hr" => Flow::Break,
        _ => Flow::Inline,
    }
}

/// Text content with whitespace collapsed, skipping stripped elements.
fn text_of(e: &Element, opts: &ExtractOptions) -> String {
    fn gather(e: &Element, opts: &ExtractOptions, out: &mut String) {
        for child in &e.children {
            match child {
                Node::Text(t) => {
                    out.push_str(t);
                    out.push(' ');
                }
                Node::Element(c) if !is_skipped(c, opts) => gather(c, opts, out),
                Node::Element(_) => {}
            }
        }
    }
    let mut raw = String::new();
    gather(e, opts, &mut raw);
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

struct Collector<'o> {
    opts: &'o ExtractOptions,
    blocks: Vec<Block>,
    anchors: Vec<(String, usize)>,
    kinds: Vec<BlockKind>,
    runs: Vec<Inline>,
    pending_space: bool,
    pre_depth: usize,
}

impl<'o> Collector<'o> {
    fn new(opts: &'o ExtractOptions) -> Self {
        Self {
            opts,
            blocks: Vec::new(),
            anchors: Vec::new(),
            kinds: Vec::new(),
            runs: Vec::new(),
            pending_space: false,
            pre_depth: 0,
        }
    }

    fn walk(&mut self, e: &Element) {
        if is_skipped(e, self.opts) {
            return;
        }
        // Empty blocks are never pushed, so the next block lands at this index.
        if let Some(id) = e.id() {
            self.anchors.push((id.to_string(), self.blocks.len()));
        }

        match e.name.as_str() {
            "a" => {
                if let Some(href) = e.attr("href") {
                    self.push_link(text_of(e, self.opts), href);
                    return;
                }
            }
            "br" => {
                self.push_raw("\n");
                return;
            }
            _ => {}
        }

        let flow = flow_of(&e.name);
        match flow {
            Flow::Block(kind) => {
                self.flush();
                self.kinds.push(kind);
                if kind == BlockKind::Preformatted {
                    self.pre_depth += 1;
                }
            }
            Flow::Break => self.flush(),
            Flow::Inline => {}
        }

        for child in &e.children {
            match child {
                Node::Element(c) => self.walk(c),
                Node::Text(t) => self.push_text(t),
            }
        }

        match flow {
            Flow::Block(kind) => {
                self.flush();
                self.kinds.pop();
                if kind == BlockKind::Preformatted {
                    self.pre_depth -= 1;
                }
            }
            Flow::Break => self.flush(),
            Flow::Inline => {}
        }
    }

    fn push_text(&mut self, text: &str) {
        if self.pre_depth > 0 {
            self.push_raw(text);
            return;
        }
        let mut collapsed = String::with_capacity(text.len());
        for ch in text.chars() {
            if ch.is_whitespace() && ch != '\u{00A0}' {
                self.pending_space = true;
                continue;
            }
            if self.pending_space && (!self.runs.is_empty() || !collapsed.is_empty()) {
                collapsed.push(' ');
            }
            self.pending_space = false;
            collapsed.push(ch);
        }
        if !collapsed.is_empty() {
            self.push_raw(&collapsed);
        }
    }

    fn push_raw(&mut self, text: &str) {
        if let Some(Inline::Text(last)) = self.runs.last_mut() {
            last.push_str(text);
        } else {
            self.runs.push(Inline::Text(text.to_string()));
        }
    }

    fn push_link(&mut self, text: String, href: &str) {
        if text.is_empty() {
            return;
        }
        if self.pending_space && !self.runs.is_empty() {
            self.push_raw(" ");
        }
        self.pending_space = false;
        self.runs.push(Inline::Link {
            text,
            href: href.to_string(),
        });
    }

    fn flush(&mut self) {
        self.pending_space = false;
        let runs = std::mem::take(&mut self.runs);
        if runs.iter().all(|r| r.text().trim().is_empty()) {
            return;
        }
        let kind = self.kinds.last().copied().unwrap_or(BlockKind::Paragraph);
        self.blocks.push(Block { kind, runs });
    }
}
