use std::sync::mpsc;

use egui::{Align, CentralPanel, Context, Frame, Key, Margin, ScrollArea, TextEdit, TopBottomPanel};

use app_api::{RepaintHandle, UiApp};
use bus::{CoreCommand, CoreEvent, Placement};
use config::BurrowserConfig;
use core_types::DocKey;
use doc_tree::{NavigationTree, TabAction, TreeError};

use crate::levels::{EguiLevelHost, LevelAction, ScrollTarget, show_level};
use crate::links::{LinkResolver, LinkTarget, ResolverError};
use crate::nav::NavigationGate;

/// The browser window: an address bar over the stacked levels of the
/// navigation tree.
pub struct ShellApp {
    tree: NavigationTree<EguiLevelHost>,
    resolver: LinkResolver,
    gate: NavigationGate,

    cmd_tx: Option<mpsc::Sender<CoreCommand>>,
    repaint: Option<RepaintHandle>,

    address: String,
    status: Option<String>,
    tab_label_max: usize,

    start: Option<LinkTarget>,
    pending_scroll: Option<ScrollTarget>,
    pending_external: Vec<String>,
    pending_copy: Option<String>,
}

impl ShellApp {
    /// `start` overrides the configured start page; it may be a URL, a site
    /// path or an article title.
    pub fn new(config: &BurrowserConfig, start: Option<&str>) -> Result<Self, ResolverError> {
        let resolver = LinkResolver::new(&config.site)?;
        let start = match start {
            Some(input) => resolver.classify_address(input),
            None => resolver.classify_address(&config.site.start_url()),
        };
        let address = match &start {
            LinkTarget::Internal { key, .. } => resolver.share_url(key),
            _ => String::new(),
        };

        Ok(Self {
            tree: NavigationTree::new(EguiLevelHost::default()),
            resolver,
            gate: NavigationGate::new(config.navigation.single_flight),
            cmd_tx: None,
            repaint: None,
            address,
            status: None,
            tab_label_max: config.ui.tab_label_max,
            start: Some(start),
            pending_scroll: None,
            pending_external: Vec::new(),
            pending_copy: None,
        })
    }

    pub fn tree(&self) -> &NavigationTree<EguiLevelHost> {
        &self.tree
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    // -- Navigation ---

    fn open(&mut self, target: LinkTarget, ancestor: Option<DocKey>) {
        match target {
            LinkTarget::Ignore => {}
            LinkTarget::Anchor(id) => {
                if let Some(from) = ancestor {
                    self.scroll_to_anchor(&from, &id);
                }
            }
            LinkTarget::External(url) | LinkTarget::Blocked(url) => {
                log::info!(target: "browser", "opening `{url}` in the system browser");
                self.pending_external.push(url);
                self.poke_redraw();
            }
            LinkTarget::Internal { url, key } => self.navigate(url, key, ancestor),
        }
    }

    fn navigate(&mut self, url: String, key: DocKey, ancestor: Option<DocKey>) {
        let (request_id, superseded) = self.gate.begin();
        for id in superseded {
            log::debug!(target: "browser", "superseding request {id}");
            self.send_cmd(CoreCommand::CancelRequest { request_id: id });
        }

        log::info!(target: "browser", "fetching `{key}` (request {request_id})");
        self.status = Some(format!("Fetching {url} …"));
        self.send_cmd(CoreCommand::FetchDocument {
            request_id,
            url,
            placement: Placement { key, ancestor },
        });
        self.poke_redraw();
    }

    fn scroll_to_anchor(&mut self, from: &DocKey, id: &str) {
        let Some(depth) = self.tree.visible_depth(from) else {
            return;
        };
        let block = self
            .tree
            .find_in_active(from)
            .and_then(|node| node.content().block_for_anchor(id));
        match block {
            Some(block) => self.pending_scroll = Some(ScrollTarget::Block { depth, block }),
            None => log::debug!(target: "browser", "no anchor `{id}` in `{from}`"),
        }
    }

    fn submit_address(&mut self) {
        let target = self.resolver.classify_address(&self.address);
        self.open(target, None);
    }

    pub(crate) fn handle_level_action(&mut self, action: LevelAction) {
        match action {
            LevelAction::Tab(tab) => self.apply_tab_action(&tab),
            LevelAction::Link { from, href } => {
                let target = self.resolver.classify(&href);
                self.open(target, Some(from));
            }
            LevelAction::CopyLink(key) => {
                self.pending_copy = Some(self.resolver.share_url(&key));
            }
        }
    }

    fn apply_tab_action(&mut self, action: &TabAction) {
        match self.tree.apply(action) {
            Ok(()) => {}
            Err(TreeError::UnknownKey(key)) => {
                log::warn!(target: "browser", "tab action on `{key}` which is no longer open");
            }
            Err(err) => log::error!(target: "browser", "tab action failed: {err}"),
        }
    }

    // -- UI ---

    fn ui_address_bar(&mut self, ui: &mut egui::Ui) {
        const BAR_HEIGHT: f32 = 28.0;

        let response = Frame::new()
            .fill(ui.visuals().extreme_bg_color)
            .stroke(egui::Stroke::new(1.0, ui.visuals().widgets.inactive.bg_stroke.color))
            .corner_radius(6.0)
            .inner_margin(Margin::symmetric(4, 4))
            .show(ui, |ui| {
                ui.add_sized(
                    [ui.available_width(), BAR_HEIGHT],
                    TextEdit::singleline(&mut self.address)
                        .hint_text("Article title, path or URL")
                        .vertical_align(Align::Center),
                )
            })
            .inner;

        if response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
            self.submit_address();
        }
    }

    fn ui_levels(&mut self, ui: &mut egui::Ui) -> Vec<LevelAction> {
        let mut actions = Vec::new();
        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                if self.tree.is_empty() {
                    ui.weak("Nothing open. Type an article title above.");
                }
                for level in self.tree.levels() {
                    actions.extend(show_level(
                        ui,
                        level,
                        self.tab_label_max,
                        &mut self.pending_scroll,
                    ));
                    ui.add_space(6.0);
                }
            });
        actions
    }

    fn flush_outbound(&mut self, ctx: &Context) {
        for url in self.pending_external.drain(..) {
            ctx.open_url(egui::OpenUrl::new_tab(url));
        }
        if let Some(link) = self.pending_copy.take() {
            self.status = Some(format!("Copied {link}"));
            ctx.copy_text(link);
        }
    }

    fn send_cmd(&self, cmd: CoreCommand) {
        match &self.cmd_tx {
            Some(tx) => {
                if tx.send(cmd).is_err() {
                    log::error!(target: "browser", "bus closed; command dropped");
                }
            }
            None => log::warn!(target: "browser", "no bus sender set; command dropped"),
        }
    }

    fn poke_redraw(&self) {
        if let Some(repaint) = &self.repaint {
            repaint.request_repaint();
        }
    }
}

impl UiApp for ShellApp {
    fn ui(&mut self, ctx: &Context) {
        TopBottomPanel::top("address_bar").show(ctx, |ui| {
            ui.horizontal(|ui| self.ui_address_bar(ui));
        });
        TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            let busy = self.gate.in_flight() > 0;
            ui.horizontal(|ui| {
                if busy {
                    ui.spinner();
                }
                if let Some(status) = &self.status {
                    ui.label(status);
                }
            });
        });

        let actions = CentralPanel::default()
            .show(ctx, |ui| self.ui_levels(ui))
            .inner;
        for action in actions {
            self.handle_level_action(action);
        }

        self.flush_outbound(ctx);
    }

    fn set_bus_sender(&mut self, tx: mpsc::Sender<CoreCommand>) {
        self.cmd_tx = Some(tx);
        if let Some(start) = self.start.take() {
            self.open(start, None);
        }
    }

    fn on_core_event(&mut self, evt: CoreEvent) {
        if !self.gate.is_current(evt.request_id()) {
            log::debug!(target: "browser", "dropping stale event for request {}", evt.request_id());
            return;
        }

        match evt {
            CoreEvent::NetworkDone {
                request_id,
                url,
                placement,
                content_type,
                body,
            } => {
                self.status = Some(format!("Parsing {url} …"));
                self.send_cmd(CoreCommand::ParseDocument {
                    request_id,
                    url,
                    placement,
                    content_type,
                    body,
                });
            }

            CoreEvent::NetworkError {
                request_id,
                url,
                error,
            }
            | CoreEvent::ParseError {
                request_id,
                url,
                error,
            } => {
                self.gate.finish(request_id);
                log::warn!(target: "browser", "loading `{url}` failed: {error}");
                self.status = Some(format!("Could not load {url}: {error}"));
            }

            CoreEvent::DocumentParsed {
                request_id,
                url,
                placement,
                page,
            } => {
                self.gate.finish(request_id);
                let Placement { key, ancestor } = placement;
                let title = if page.title.trim().is_empty() {
                    key.to_string()
                } else {
                    page.title.clone()
                };
                self.address = self.resolver.share_url(&key);

                match self.tree.insert_under(key, title, page, ancestor.as_ref()) {
                    Ok(outcome) => {
                        self.pending_scroll = outcome.visible_depth().map(ScrollTarget::Level);
                        self.status = Some(format!("Loaded {url}"));
                    }
                    Err(err) => {
                        log::error!(target: "browser", "could not open `{url}`: {err}");
                        debug_assert!(err != TreeError::EmptyTree, "insert left the tree empty");
                        self.status = Some(err.to_string());
                    }
                }
            }
        }
        self.poke_redraw();
    }

    fn set_repaint_handle(&mut self, h: RepaintHandle) {
        self.repaint = Some(h);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use html::{Block, BlockKind, Inline, Page};

    fn shell(single_flight: bool) -> (ShellApp, mpsc::Receiver<CoreCommand>) {
        let mut config = BurrowserConfig::default();
        config.navigation.single_flight = single_flight;
        let mut app = ShellApp::new(&config, Some("Dog")).unwrap();
        let (tx, rx) = mpsc::channel();
        app.set_bus_sender(tx);
        (app, rx)
    }

    fn page(title: &str, anchors: &[(&str, usize)]) -> Arc<Page> {
        Arc::new(Page {
            title: title.into(),
            blocks: vec![
                Block {
                    kind: BlockKind::Paragraph,
                    runs: vec![Inline::Text("intro".into())],
                };
                3
            ],
            anchors: anchors.iter().map(|(id, b)| (id.to_string(), *b)).collect(),
        })
    }

    fn expect_fetch(rx: &mpsc::Receiver<CoreCommand>) -> (u64, String, Placement) {
        match rx.try_recv() {
            Ok(CoreCommand::FetchDocument {
                request_id,
                url,
                placement,
            }) => (request_id, url, placement),
            other => panic!("expected fetch, got {other:?}"),
        }
    }

    fn parsed(request_id: u64, placement: Placement, title: &str) -> CoreEvent {
        CoreEvent::DocumentParsed {
            request_id,
            url: format!("https://en.wikipedia.org{}", placement.key),
            placement,
            page: page(title, &[("History", 2)]),
        }
    }

    #[test]
    fn start_page_is_fetched_once_the_bus_is_connected() {
        let (_app, rx) = shell(true);
        let (id, url, placement) = expect_fetch(&rx);
        assert_eq!(id, 1);
        assert_eq!(url, "https://en.wikipedia.org/wiki/Dog?useskin=vector");
        assert_eq!(placement.key, DocKey::from("/wiki/Dog"));
        assert_eq!(placement.ancestor, None);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn fetched_bodies_go_to_the_parser_and_parsed_pages_open_as_root() {
        let (mut app, rx) = shell(true);
        let (id, url, placement) = expect_fetch(&rx);

        app.on_core_event(CoreEvent::NetworkDone {
            request_id: id,
            url: url.clone(),
            placement: placement.clone(),
            content_type: Some("text/html".into()),
            body: "<p>woof</p>".into(),
        });
        assert!(matches!(
            rx.try_recv(),
            Ok(CoreCommand::ParseDocument { request_id, .. }) if request_id == id
        ));

        app.on_core_event(parsed(id, placement, "Dog"));
        assert_eq!(app.tree().active_root(), Some(&DocKey::from("/wiki/Dog")));
        assert_eq!(app.tree().level_count(), 1);
        assert_eq!(app.tree().levels()[0].tabs()[0].label, "Dog");
        assert_eq!(app.pending_scroll, Some(ScrollTarget::Level(0)));
    }

    #[test]
    fn links_open_under_the_document_they_were_clicked_in() {
        let (mut app, rx) = shell(true);
        let (id, _, placement) = expect_fetch(&rx);
        app.on_core_event(parsed(id, placement, "Dog"));

        app.handle_level_action(LevelAction::Link {
            from: DocKey::from("/wiki/Dog"),
            href: "/wiki/Cat#Behavior".into(),
        });
        let (id, url, placement) = expect_fetch(&rx);
        assert_eq!(url, "https://en.wikipedia.org/wiki/Cat?useskin=vector");
        assert_eq!(placement.ancestor, Some(DocKey::from("/wiki/Dog")));

        app.on_core_event(parsed(id, placement, "Cat"));
        let path: Vec<_> = app.tree().active_path().iter().map(|n| n.key().to_string()).collect();
        assert_eq!(path, ["/wiki/Dog", "/wiki/Cat"]);
        assert_eq!(app.pending_scroll, Some(ScrollTarget::Level(1)));
    }

    #[test]
    fn a_new_navigation_cancels_and_ignores_the_previous_one() {
        let (mut app, rx) = shell(true);
        let (first, _, first_placement) = expect_fetch(&rx);

        app.handle_level_action(LevelAction::Link {
            from: DocKey::from("/wiki/Dog"),
            href: "/wiki/Cat".into(),
        });
        assert!(matches!(
            rx.try_recv(),
            Ok(CoreCommand::CancelRequest { request_id }) if request_id == first
        ));
        let (second, _, second_placement) = expect_fetch(&rx);

        app.on_core_event(parsed(first, first_placement, "Dog"));
        assert!(app.tree().is_empty());

        // the ancestor never opened, so the page becomes a root
        app.on_core_event(parsed(second, second_placement, "Cat"));
        assert_eq!(app.tree().active_root(), Some(&DocKey::from("/wiki/Cat")));
    }

    #[test]
    fn without_single_flight_both_requests_land() {
        let (mut app, rx) = shell(false);
        let (first, _, first_placement) = expect_fetch(&rx);
        app.handle_level_action(LevelAction::Link {
            from: DocKey::from("/wiki/Dog"),
            href: "/wiki/Cat".into(),
        });
        let (second, _, second_placement) = expect_fetch(&rx);

        app.on_core_event(parsed(first, first_placement, "Dog"));
        app.on_core_event(parsed(second, second_placement, "Cat"));
        let path: Vec<_> = app.tree().active_path().iter().map(|n| n.key().to_string()).collect();
        assert_eq!(path, ["/wiki/Dog", "/wiki/Cat"]);
    }

    #[test]
    fn errors_end_the_request_and_show_a_status() {
        let (mut app, rx) = shell(true);
        let (id, url, _) = expect_fetch(&rx);
        app.on_core_event(CoreEvent::NetworkError {
            request_id: id,
            url,
            error: "HTTP 404".into(),
        });
        assert!(app.status().unwrap().contains("HTTP 404"));
        assert_eq!(app.gate.in_flight(), 0);
        assert!(app.tree().is_empty());
    }

    #[test]
    fn anchors_scroll_within_the_clicked_document() {
        let (mut app, rx) = shell(true);
        let (id, _, placement) = expect_fetch(&rx);
        app.on_core_event(parsed(id, placement, "Dog"));
        app.pending_scroll = None;

        app.handle_level_action(LevelAction::Link {
            from: DocKey::from("/wiki/Dog"),
            href: "#History".into(),
        });
        assert_eq!(app.pending_scroll, Some(ScrollTarget::Block { depth: 0, block: 2 }));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn offsite_and_ignored_links_leave_the_app() {
        let (mut app, rx) = shell(true);
        let _ = expect_fetch(&rx);
        for href in ["https://example.org/", "/wiki/Encyclopedia"] {
            app.handle_level_action(LevelAction::Link {
                from: DocKey::from("/wiki/Dog"),
                href: href.into(),
            });
        }
        assert_eq!(app.pending_external.len(), 2);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn stale_tab_actions_are_ignored() {
        let (mut app, rx) = shell(true);
        let (id, _, placement) = expect_fetch(&rx);
        app.on_core_event(parsed(id, placement, "Dog"));

        app.handle_level_action(LevelAction::Tab(TabAction::CloseRoot(DocKey::from("/wiki/Gone"))));
        assert_eq!(app.tree().roots().len(), 1);

        app.handle_level_action(LevelAction::Tab(TabAction::CloseRoot(DocKey::from("/wiki/Dog"))));
        assert!(app.tree().is_empty());
        assert_eq!(app.tree().level_count(), 0);
    }

    #[test]
    fn copy_link_queues_the_share_url() {
        let (mut app, _rx) = shell(true);
        app.handle_level_action(LevelAction::CopyLink(DocKey::from("/wiki/Dog")));
        assert_eq!(app.pending_copy.as_deref(), Some("https://en.wikipedia.org/wiki/Dog"));
    }
}
