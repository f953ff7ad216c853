use crate::job::Page;
use crate::process::ProcessId;
use crate::Time;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// What happens when an event fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Run the dispatcher's fetch-execute cycle. The process is the one that scheduled it.
    FetchExecute(ProcessId),
    /// The I/O for a faulted page has finished and the page can be placed in memory.
    PageFaultComplete { process: ProcessId, page: Page },
}

/// An `Event` is a payload scheduled for a point in simulated time. The `sequence` number is
/// handed out by the queue on insertion and only breaks ties between events due at the same
/// time: the event scheduled first runs first.
#[derive(Debug, Clone, Copy)]
pub struct Event {
    pub time: Time,
    pub sequence: u64,
    pub kind: EventKind,
}

impl Event {
    fn key(&self) -> (Time, u64) {
        (self.time, self.sequence)
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
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
        self.key().cmp(&other.key())
    }
}

/// A min-priority queue of events ordered by `(time, sequence)`.
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Reverse<Event>>,
    next_sequence: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `kind` to fire at `time` and return the sequence number it was given.
    pub fn schedule(&mut self, time: Time, kind: EventKind) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(Reverse(Event {
            time,
            sequence,
            kind,
        }));
        sequence
    }

    /// Remove and return the earliest event.
    pub fn pop(&mut self) -> Option<Event> {
        self.heap.pop().map(|Reverse(event)| event)
    }

    pub fn peek(&self) -> Option<&Event> {
        self.heap.peek().map(|Reverse(event)| event)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
