use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};

use core_types::{DocKey, RequestId};
use html::Page;

/// Where a fetched document goes once it is parsed. Travels with the request
/// so the UI never has to remember it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub key: DocKey,
    /// Key of the document the link was clicked in; `None` opens a root.
    pub ancestor: Option<DocKey>,
}

#[derive(Debug)]
pub enum CoreCommand {
    // Network requests
    FetchDocument {
        request_id: RequestId,
        url: String,
        placement: Placement,
    },
    CancelRequest {
        request_id: RequestId,
    },
    // Document extraction
    ParseDocument {
        request_id: RequestId,
        url: String,
        placement: Placement,
        content_type: Option<String>,
        body: String,
    },
}

#[derive(Debug)]
pub enum CoreEvent {
    // Network -> UI
    NetworkDone {
        request_id: RequestId,
        url: String,
        placement: Placement,
        content_type: Option<String>,
        body: String,
    },
    NetworkError {
        request_id: RequestId,
        url: String,
        error: String,
    },
    // Parser -> UI
    DocumentParsed {
        request_id: RequestId,
        url: String,
        placement: Placement,
        page: Arc<Page>,
    },
    ParseError {
        request_id: RequestId,
        url: String,
        error: String,
    },
}

impl CoreCommand {
    pub fn request_id(&self) -> RequestId {
        match self {
            CoreCommand::FetchDocument { request_id, .. }
            | CoreCommand::CancelRequest { request_id }
            | CoreCommand::ParseDocument { request_id, .. } => *request_id,
        }
    }
}

impl CoreEvent {
    pub fn request_id(&self) -> RequestId {
        match self {
            CoreEvent::NetworkDone { request_id, .. }
            | CoreEvent::NetworkError { request_id, .. }
            | CoreEvent::DocumentParsed { request_id, .. }
            | CoreEvent::ParseError { request_id, .. } => *request_id,
        }
    }
}

pub struct Bus {
    pub cmd_tx: Sender<CoreCommand>,
    pub evt_rx: Receiver<CoreEvent>,
    pub evt_tx: Sender<CoreEvent>, // shareable for runtimes
}
