use std::collections::HashMap;

use crate::edge::{InputEdge, InputSource};

/// Turns raw down/up notifications into debounced edges.
///
/// Tracks pressed state per source: a held key reports repeated "down"
/// events on most platforms, but only the first one yields an edge.
#[derive(Debug, Default)]
pub struct EdgeDetector {
    /// Sources currently held, with the lane each was pressed on.
    held: HashMap<InputSource, usize>,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw down notification. Returns a Press edge only on the up -> down transition.
    pub fn press(&mut self, source: InputSource, lane: usize) -> Option<InputEdge> {
        if self.held.contains_key(&source) {
            return None;
        }
        self.held.insert(source.clone(), lane);
        Some(InputEdge::press(source, lane))
    }

    /// Raw up notification. Returns a Release edge on the lane the source was
    /// pressed on, or `None` if it was not held.
    pub fn release(&mut self, source: &InputSource) -> Option<InputEdge> {
        let lane = self.held.remove(source)?;
        Some(InputEdge::release(source.clone(), lane))
    }

    /// Release every held source (focus loss, session reset).
    pub fn release_all(&mut self) -> Vec<InputEdge> {
        let mut edges: Vec<InputEdge> = self
            .held
            .drain()
            .map(|(source, lane)| InputEdge::release(source, lane))
            .collect();
        edges.sort_by_key(|e| e.lane);
        edges
    }

    pub fn is_pressed(&self, source: &InputSource) -> bool {
        self.held.contains_key(source)
    }

    /// Whether any source is holding `lane`.
    pub fn is_lane_held(&self, lane: usize) -> bool {
        self.held.values().any(|&l| l == lane)
    }

    pub fn held_count(&self) -> usize {
        self.held.len()
    }
}
