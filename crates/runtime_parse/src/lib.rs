use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use std::time::Instant;

use bus::{CoreCommand, CoreEvent};
use html::{ExtractOptions, extract_page, is_html};

/// Run the extraction runtime on its own thread until the command channel closes.
pub fn start_parse_runtime(
    cmd_rx: Receiver<CoreCommand>,
    evt_tx: Sender<CoreEvent>,
    opts: ExtractOptions,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            let CoreCommand::ParseDocument {
                request_id,
                url,
                placement,
                content_type,
                body,
            } = cmd
            else {
                continue;
            };

            if !is_html(content_type.as_deref()) {
                let ct = content_type.unwrap_or_default();
                log::warn!(target: "runtime_parse", "#{request_id} {url}: not HTML ({ct})");
                let _ = evt_tx.send(CoreEvent::ParseError {
                    request_id,
                    url,
                    error: format!("unsupported content type `{ct}`"),
                });
                continue;
            }

            let start = Instant::now();
            let page = extract_page(&body, placement.key.as_str(), &opts);
            log::debug!(
                target: "runtime_parse",
                "#{request_id} extracted `{}` in {:?}",
                page.title,
                start.elapsed()
            );
            let _ = evt_tx.send(CoreEvent::DocumentParsed {
                request_id,
                url,
                placement,
                page: Arc::new(page),
            });
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bus::Placement;
    use core_types::DocKey;
    use std::sync::mpsc;
    use std::time::Duration;

    fn parse(content_type: Option<&str>, body: &str) -> CoreEvent {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (evt_tx, evt_rx) = mpsc::channel();
        start_parse_runtime(cmd_rx, evt_tx, ExtractOptions::default());
        cmd_tx
            .send(CoreCommand::ParseDocument {
                request_id: 1,
                url: "https://en.wikipedia.org/wiki/Cat?useskin=vector".into(),
                placement: Placement {
                    key: DocKey::from("/wiki/Cat"),
                    ancestor: Some(DocKey::from("/wiki/Dog")),
                },
                content_type: content_type.map(str::to_string),
                body: body.to_string(),
            })
            .unwrap();
        evt_rx.recv_timeout(Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn html_becomes_a_page_with_its_placement() {
        let evt = parse(
            Some("text/html; charset=UTF-8"),
            r#"<div id="content"><h1 class="mw-first-heading">Cat</h1><p>Meow.</p></div>"#,
        );
        let CoreEvent::DocumentParsed {
            request_id,
            placement,
            page,
            ..
        } = evt
        else {
            panic!("expected DocumentParsed, got {evt:?}");
        };
        assert_eq!(request_id, 1);
        assert_eq!(placement.ancestor, Some(DocKey::from("/wiki/Dog")));
        assert_eq!(page.title, "Cat");
        assert_eq!(page.blocks.len(), 2);
    }

    #[test]
    fn untitled_document_is_named_after_its_key() {
        let evt = parse(None, "<p>no heading</p>");
        assert!(
            matches!(&evt, CoreEvent::DocumentParsed { page, .. } if page.title == "/wiki/Cat"),
            "{evt:?}"
        );
    }

    #[test]
    fn non_html_is_a_parse_error() {
        let evt = parse(Some("image/png"), "\u{89}PNG");
        assert!(
            matches!(&evt, CoreEvent::ParseError { request_id: 1, error, .. } if error.contains("image/png")),
            "{evt:?}"
        );
    }
}
