use std::cmp::Ordering;

use super::core::{Command, Ticks};

/// A queued command keyed by the time left until it fires, counted from the last extraction.
#[derive(Debug)]
pub struct Event {
    command: Box<dyn Command>,
    delta: Ticks,
    seq: u64,
}

impl Event {
    /// `seq` orders events with equal deltas by insertion.
    pub(crate) fn new(command: Box<dyn Command>, seq: u64) -> Self {
        Self {
            delta: command.delay(),
            command,
            seq,
        }
    }

    pub fn delta(&self) -> Ticks {
        self.delta
    }

    pub(crate) fn set_delta(&mut self, delta: Ticks) {
        self.delta = delta;
    }

    pub fn command(&self) -> &dyn Command {
        self.command.as_ref()
    }

    pub(crate) fn into_command(self) -> Box<dyn Command> {
        self.command
    }

    pub(crate) fn snapshot(&self) -> EventSnapshot {
        EventSnapshot {
            name: self.command.name().to_string(),
            delay: self.command.delay(),
            duration: self.command.duration(),
            delta: self.delta,
            internal: self.command.is_internal(),
        }
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.delta == other.delta && self.seq == other.seq
    }
}

impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap pops the smallest delta, then the oldest insertion.
        other
            .delta
            .cmp(&self.delta)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Read-only view of a queued event for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSnapshot {
    pub name: String,
    pub delay: Ticks,
    pub duration: Ticks,
    pub delta: Ticks,
    pub internal: bool,
}
