//! Request bookkeeping for navigations in flight.

use core_types::RequestId;

/// Hands out request ids and decides which runtime events still matter.
///
/// In single-flight mode a new navigation supersedes the pending one: its
/// id is returned for cancellation and its events are ignored from then on.
/// Otherwise every started navigation stays current until it finishes, and
/// documents are inserted in completion order.
#[derive(Debug)]
pub struct NavigationGate {
    single_flight: bool,
    last_id: RequestId,
    pending: Vec<RequestId>,
}

impl NavigationGate {
    pub fn new(single_flight: bool) -> Self {
        Self {
            single_flight,
            last_id: 0,
            pending: Vec::new(),
        }
    }

    /// Start a navigation. Returns its id and the ids it supersedes.
    pub fn begin(&mut self) -> (RequestId, Vec<RequestId>) {
        self.last_id = self.last_id.wrapping_add(1);
        let superseded = if self.single_flight {
            std::mem::take(&mut self.pending)
        } else {
            Vec::new()
        };
        self.pending.push(self.last_id);
        (self.last_id, superseded)
    }

    pub fn is_current(&self, request_id: RequestId) -> bool {
        self.pending.contains(&request_id)
    }

    /// The navigation completed or failed.
    pub fn finish(&mut self, request_id: RequestId) {
        self.pending.retain(|id| *id != request_id);
    }

    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }
}
