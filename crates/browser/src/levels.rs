//! egui-backed level containers.
//!
//! The tree fills [`EguiLevel`]s through [`LevelContainer`]; the shell draws
//! them top to bottom with [`show_level`] and feeds the returned
//! [`LevelAction`]s back.

use std::sync::Arc;

use doc_tree::{DocKey, LevelContainer, LevelHost, Tab, TabAction};
use egui::{Align, Align2, FontId, Frame, RichText, ScrollArea, Ui};
use html::{Block, BlockKind, Inline, Page};

const ELLIPSIS: &str = "...";

/// Shorten `label` to at most `max` chars, ending in `...` when cut.
pub fn truncate_label(label: &str, max: usize) -> String {
    if label.chars().count() <= max {
        return label.to_owned();
    }
    let keep = max.saturating_sub(ELLIPSIS.len());
    let mut out: String = label.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

#[derive(Debug)]
pub struct EguiLevel {
    id: u64,
    depth: usize,
    tabs: Vec<Tab>,
    pages: Vec<Arc<Page>>,
}

impl EguiLevel {
    fn new(id: u64, depth: usize) -> Self {
        Self {
            id,
            depth,
            tabs: Vec::new(),
            pages: Vec::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn pages(&self) -> &[Arc<Page>] {
        &self.pages
    }

    /// Key of the document this level shows.
    pub fn active_key(&self) -> Option<&DocKey> {
        self.tabs.iter().find(|t| t.active).map(|t| &t.key)
    }
}

impl LevelContainer for EguiLevel {
    type Content = Arc<Page>;

    fn clear(&mut self) {
        self.tabs.clear();
        self.pages.clear();
    }

    fn add_tab(&mut self, tab: Tab) {
        self.tabs.push(tab);
    }

    fn set_content(&mut self, content: &Arc<Page>) {
        self.pages.push(Arc::clone(content));
    }
}

/// Hands out levels with ids that stay unique for the life of the shell,
/// so egui widget state (scroll offsets) sticks to a container, not a depth.
#[derive(Debug, Default)]
pub struct EguiLevelHost {
    next_id: u64,
}

impl LevelHost for EguiLevelHost {
    type Content = Arc<Page>;
    type Level = EguiLevel;

    fn allocate(&mut self, depth: usize) -> EguiLevel {
        self.next_id += 1;
        log::trace!(target: "browser.levels", "allocate level {} at depth {depth}", self.next_id);
        EguiLevel::new(self.next_id, depth)
    }

    fn detach(&mut self, level: EguiLevel) {
        log::trace!(target: "browser.levels", "detach level {} (depth {})", level.id, level.depth);
    }
}

/// What the user did inside a level this frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LevelAction {
    Tab(TabAction),
    Link { from: DocKey, href: String },
    CopyLink(DocKey),
}

/// Where the view should scroll once the target is laid out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollTarget {
    Level(usize),
    Block { depth: usize, block: usize },
}

pub fn show_level(
    ui: &mut Ui,
    level: &EguiLevel,
    tab_label_max: usize,
    scroll: &mut Option<ScrollTarget>,
) -> Vec<LevelAction> {
    let mut actions = Vec::new();

    let frame = Frame::group(ui.style()).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            let strip_width = (ui.available_width() - 90.0).max(60.0);
            tab_strip(ui, level, tab_label_max, strip_width, &mut actions);
            if let Some(key) = level.active_key() {
                if ui
                    .small_button("🔗 Copy link")
                    .on_hover_text(key.as_str())
                    .clicked()
                {
                    actions.push(LevelAction::CopyLink(key.clone()));
                }
            }
        });
        ui.separator();

        let from = level.active_key().cloned();
        for page in &level.pages {
            for (i, block) in page.blocks.iter().enumerate() {
                let response = show_block(ui, i, block, from.as_ref(), &mut actions);
                let target = ScrollTarget::Block {
                    depth: level.depth,
                    block: i,
                };
                if *scroll == Some(target) {
                    response.scroll_to_me(Some(Align::TOP));
                    *scroll = None;
                }
            }
        }
    });

    if *scroll == Some(ScrollTarget::Level(level.depth)) {
        frame.response.scroll_to_me(Some(Align::TOP));
        *scroll = None;
    }
    actions
}

fn tab_strip(
    ui: &mut Ui,
    level: &EguiLevel,
    tab_label_max: usize,
    width: f32,
    actions: &mut Vec<LevelAction>,
) {
    let output = ScrollArea::horizontal()
        .id_salt(("tab_strip", level.id))
        .max_width(width)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                for tab in &level.tabs {
                    let label = truncate_label(&tab.label, tab_label_max);
                    let mut response = ui.selectable_label(tab.active, label);
                    if tab.label.chars().count() > tab_label_max {
                        response = response.on_hover_text(&tab.label);
                    }
                    if response.clicked() && !tab.active {
                        actions.push(LevelAction::Tab(tab.on_select.clone()));
                    }
                    if let Some(close) = &tab.on_close {
                        if ui.small_button("✖").on_hover_text("Close").clicked() {
                            actions.push(LevelAction::Tab(close.clone()));
                        }
                    }
                    ui.add_space(4.0);
                }
            });
        });

    let rect = output.inner_rect;
    let (left, right) = overflow_hints(output.state.offset.x, output.content_size.x, rect.width());
    let painter = ui.painter_at(rect);
    let color = ui.visuals().strong_text_color();
    let font = FontId::proportional(12.0);
    if left {
        painter.text(rect.left_center(), Align2::LEFT_CENTER, "◀", font.clone(), color);
    }
    if right {
        painter.text(rect.right_center(), Align2::RIGHT_CENTER, "▶", font, color);
    }
}

/// Whether tabs are hidden to the left and to the right of the strip viewport.
fn overflow_hints(offset: f32, content_width: f32, viewport_width: f32) -> (bool, bool) {
    const SLACK: f32 = 0.5;
    let hidden_right = content_width - viewport_width - offset;
    (offset > SLACK, hidden_right > SLACK)
}

fn show_block(
    ui: &mut Ui,
    index: usize,
    block: &Block,
    from: Option<&DocKey>,
    actions: &mut Vec<LevelAction>,
) -> egui::Response {
    match block.kind {
        BlockKind::Preformatted => {
            ui.label(RichText::new(block.plain_text()).monospace())
        }
        BlockKind::Quote => {
            ui.indent(("quote", index), |ui| {
                inline_runs(ui, block, None, "", from, actions)
            })
            .response
        }
        BlockKind::ListItem => inline_runs(ui, block, None, "• ", from, actions),
        BlockKind::Heading(n) => {
            let size = match n {
                1 => 26.0,
                2 => 21.0,
                3 => 18.0,
                _ => 15.0,
            };
            inline_runs(ui, block, Some(size), "", from, actions)
        }
        BlockKind::Paragraph => inline_runs(ui, block, None, "", from, actions),
    }
}

fn inline_runs(
    ui: &mut Ui,
    block: &Block,
    heading_size: Option<f32>,
    prefix: &str,
    from: Option<&DocKey>,
    actions: &mut Vec<LevelAction>,
) -> egui::Response {
    let styled = |text: &str| {
        let rich = RichText::new(text);
        match heading_size {
            Some(size) => rich.size(size).strong(),
            None => rich,
        }
    };

    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = 0.0;
        if !prefix.is_empty() {
            ui.label(prefix);
        }
        for run in &block.runs {
            match run {
                Inline::Text(text) => {
                    ui.label(styled(text));
                }
                Inline::Link { text, href } => {
                    if ui.link(styled(text)).on_hover_text(href).clicked() {
                        if let Some(from) = from {
                            actions.push(LevelAction::Link {
                                from: from.clone(),
                                href: href.clone(),
                            });
                        }
                    }
                }
            }
        }
    })
    .response
}
