//! Recording level host for tests and fuzzing.
//!
//! [`RecordingHost`] hands out [`RecordingLevel`]s with a unique id each and
//! logs every allocation and detach, so callers can check that containers
//! are reused by depth and never leaked or duplicated.

use crate::{LevelContainer, LevelHost, Tab};
use std::marker::PhantomData;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostEvent {
    Allocated { id: usize, depth: usize },
    Detached { id: usize },
}

#[derive(Debug)]
pub struct RecordingLevel<C> {
    pub id: usize,
    pub depth: usize,
    pub tabs: Vec<Tab>,
    pub contents: Vec<C>,
    /// How many times the level was cleared for reuse.
    pub clears: usize,
}

impl<C: Clone> LevelContainer for RecordingLevel<C> {
    type Content = C;

    fn clear(&mut self) {
        self.tabs.clear();
        self.contents.clear();
        self.clears += 1;
    }

    fn add_tab(&mut self, tab: Tab) {
        self.tabs.push(tab);
    }

    fn set_content(&mut self, content: &C) {
        self.contents.push(content.clone());
    }
}

#[derive(Debug)]
pub struct RecordingHost<C> {
    next_id: usize,
    pub events: Vec<HostEvent>,
    _content: PhantomData<C>,
}

impl<C> Default for RecordingHost<C> {
    fn default() -> Self {
        Self {
            next_id: 0,
            events: Vec::new(),
            _content: PhantomData,
        }
    }
}

impl<C> RecordingHost<C> {
    /// Levels allocated and not yet detached.
    pub fn attached(&self) -> usize {
        self.events.iter().fold(0usize, |n, e| match e {
            HostEvent::Allocated { .. } => n + 1,
            HostEvent::Detached { .. } => n.saturating_sub(1),
        })
    }
}

impl<C: Clone> LevelHost for RecordingHost<C> {
    type Content = C;
    type Level = RecordingLevel<C>;

    fn allocate(&mut self, depth: usize) -> RecordingLevel<C> {
        let id = self.next_id;
        self.next_id += 1;
        self.events.push(HostEvent::Allocated { id, depth });
        RecordingLevel {
            id,
            depth,
            tabs: Vec::new(),
            contents: Vec::new(),
            clears: 0,
        }
    }

    fn detach(&mut self, level: RecordingLevel<C>) {
        self.events.push(HostEvent::Detached { id: level.id });
    }
}
