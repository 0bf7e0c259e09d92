use std::collections::HashMap;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
    mpsc::{Receiver, Sender},
};
use std::thread;

use bus::{CoreCommand, CoreEvent};
use core_types::RequestId;
use net::{FetchError, HttpClient, NetOptions};

/// Run the network runtime on its own thread until the command channel closes.
///
/// Each fetch runs on a short-lived worker so a slow response never blocks
/// cancellation of another request.
pub fn start_net_runtime(
    cmd_rx: Receiver<CoreCommand>,
    evt_tx: Sender<CoreEvent>,
    opts: NetOptions,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let client = Arc::new(HttpClient::new(&opts));
        // one cancel flag per request_id, dropped once its worker is done
        let mut cancels: HashMap<RequestId, Arc<AtomicBool>> = HashMap::new();

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                CoreCommand::FetchDocument {
                    request_id,
                    url,
                    placement,
                } => {
                    cancels.retain(|_, flag| Arc::strong_count(flag) > 1);
                    let cancel = cancels
                        .entry(request_id)
                        .or_insert_with(|| Arc::new(AtomicBool::new(false)))
                        .clone();

                    let client = Arc::clone(&client);
                    let evt_tx = evt_tx.clone();
                    thread::spawn(move || {
                        log::debug!(target: "runtime_net", "#{request_id} GET {url}");
                        let evt = match client.fetch(&url, &cancel) {
                            Ok(result) => CoreEvent::NetworkDone {
                                request_id,
                                url: result.url,
                                placement,
                                content_type: result.content_type,
                                body: result.body,
                            },
                            Err(FetchError::Cancelled) => {
                                log::debug!(target: "runtime_net", "#{request_id} cancelled");
                                return;
                            }
                            Err(err) => {
                                log::warn!(target: "runtime_net", "#{request_id} {url}: {err}");
                                CoreEvent::NetworkError {
                                    request_id,
                                    url,
                                    error: err.to_string(),
                                }
                            }
                        };
                        let _ = evt_tx.send(evt);
                    });
                }

                CoreCommand::CancelRequest { request_id } => {
                    if let Some(flag) = cancels.remove(&request_id) {
                        flag.store(true, Ordering::Release);
                    }
                }

                CoreCommand::ParseDocument { .. } => {}
            }
        }
        log::debug!(target: "runtime_net", "command channel closed; stopping");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bus::Placement;
    use core_types::DocKey;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::time::Duration;

    fn placement() -> Placement {
        Placement {
            key: DocKey::from("/wiki/Dog"),
            ancestor: None,
        }
    }

    #[test]
    fn fetch_reports_network_done() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf);
            let body = "<p>woof</p>";
            let _ = write!(
                stream,
                "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
        });

        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (evt_tx, evt_rx) = mpsc::channel();
        start_net_runtime(cmd_rx, evt_tx, NetOptions::default());
        cmd_tx
            .send(CoreCommand::FetchDocument {
                request_id: 7,
                url: format!("http://{addr}/wiki/Dog"),
                placement: placement(),
            })
            .unwrap();

        match evt_rx.recv_timeout(Duration::from_secs(10)).unwrap() {
            CoreEvent::NetworkDone {
                request_id,
                body,
                placement: got,
                ..
            } => {
                assert_eq!(request_id, 7);
                assert_eq!(body, "<p>woof</p>");
                assert_eq!(got, placement());
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn connection_failure_reports_network_error() {
        // bind then drop so the port is closed
        let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();

        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (evt_tx, evt_rx) = mpsc::channel();
        start_net_runtime(cmd_rx, evt_tx, NetOptions::default());
        cmd_tx
            .send(CoreCommand::FetchDocument {
                request_id: 3,
                url: format!("http://{addr}/"),
                placement: placement(),
            })
            .unwrap();

        let evt = evt_rx.recv_timeout(Duration::from_secs(10)).unwrap();
        assert!(
            matches!(evt, CoreEvent::NetworkError { request_id: 3, .. }),
            "{evt:?}"
        );
    }

    #[test]
    fn runtime_stops_when_commands_close() {
        let (cmd_tx, cmd_rx) = mpsc::channel::<CoreCommand>();
        let (evt_tx, _evt_rx) = mpsc::channel();
        let handle = start_net_runtime(cmd_rx, evt_tx, NetOptions::default());
        drop(cmd_tx);
        handle.join().unwrap();
    }
}
