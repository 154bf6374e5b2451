// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Event queue with deterministic ordering.
//!
//! Events are ordered by time and then by the order in which they were
//! scheduled, so two events at the same tick always run first-in first-out.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::app::TimerId;
use crate::packet::AmPacket;
use crate::types::{NodeId, SimTime};

/// What happens to a mote when its event runs.
#[derive(Clone, Debug, PartialEq)]
pub enum EventKind {
    Boot,
    Timer {
        timer: TimerId,
        generation: u64,
    },
    Receive(AmPacket),
}

#[derive(Clone, Debug)]
pub struct Event {
    pub time: SimTime,
    sequence: u64,
    pub node: NodeId,
    pub kind: EventKind,
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.time.cmp(&other.time) {
            Ordering::Equal => self.sequence.cmp(&other.sequence),
            ord => ord,
        }
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Event {}

/// Pending events of the whole simulation.
#[derive(Default)]
pub struct EventQueue {
    heap: BinaryHeap<Reverse<Event>>,
    next_sequence: u64,
}

impl EventQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, time: SimTime, node: NodeId, kind: EventKind) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(Reverse(Event {
            time,
            sequence,
            node,
            kind,
        }));
    }

    pub fn pop(&mut self) -> Option<Event> {
        self.heap.pop().map(|Reverse(event)| event)
    }

    #[must_use]
    pub fn next_time(&self) -> Option<SimTime> {
        self.heap.peek().map(|Reverse(event)| event.time)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }
}
