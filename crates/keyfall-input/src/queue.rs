use std::collections::VecDeque;

use crate::edge::InputEdge;

/// An edge stamped with the song time at the instant it was received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampedEdge {
    pub edge: InputEdge,
    pub song_time_us: i64,
}

/// FIFO of stamped edges, drained once per tick.
#[derive(Debug, Default)]
pub struct InputQueue {
    edges: VecDeque<StampedEdge>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, edge: InputEdge, song_time_us: i64) {
        self.edges.push_back(StampedEdge { edge, song_time_us });
    }

    /// Take every queued edge in arrival order.
    pub fn drain(&mut self) -> impl Iterator<Item = StampedEdge> + '_ {
        self.edges.drain(..)
    }

    pub fn clear(&mut self) {
        self.edges.clear();
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}
