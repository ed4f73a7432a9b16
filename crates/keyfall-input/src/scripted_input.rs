//! Scripted (autoplay) input generated from a chart.

use keyfall_model::Chart;
use log::debug;

use crate::edge::{EdgeKind, InputEdge, InputSource};
use crate::queue::StampedEdge;

/// Autoplay tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptedInputConfig {
    /// Added to every press time. Negative presses early.
    pub offset_us: i64,
    /// Skip every n-th note (1-based) so the miss path is exercised.
    /// `None` or `Some(0)` plays every note.
    pub miss_every: Option<usize>,
    /// How long each scripted press is held before release.
    pub hold_us: i64,
}

impl Default for ScriptedInputConfig {
    fn default() -> Self {
        Self {
            offset_us: 0,
            miss_every: None,
            hold_us: 50_000,
        }
    }
}

/// Pre-computed autoplay event.
#[derive(Debug, Clone, Copy)]
struct ScriptedEvent {
    time_us: i64,
    lane: usize,
    kind: EdgeKind,
}

/// Replays press/release edges at note target times.
pub struct ScriptedInput {
    events: Vec<ScriptedEvent>,
    cursor: usize,
    skipped: usize,
}

impl ScriptedInput {
    pub fn new(chart: &Chart, config: ScriptedInputConfig) -> Self {
        let (events, skipped) = Self::build_events(chart, &config);
        debug!(
            "Scripted input: {} events for {} notes ({} skipped)",
            events.len(),
            chart.len(),
            skipped
        );
        Self {
            events,
            cursor: 0,
            skipped,
        }
    }

    fn build_events(chart: &Chart, config: &ScriptedInputConfig) -> (Vec<ScriptedEvent>, usize) {
        let skip_every = config.miss_every.filter(|&n| n > 0);
        let mut presses: Vec<(i64, usize)> = Vec::with_capacity(chart.len());
        let mut skipped = 0;

        for (index, note) in chart.notes().iter().enumerate() {
            if let Some(n) = skip_every
                && (index + 1) % n == 0
            {
                skipped += 1;
                continue;
            }
            let time_us = note.target_time_us.saturating_add(config.offset_us).max(0);
            presses.push((time_us, note.lane));
        }

        let mut events = Vec::with_capacity(presses.len() * 2);
        for (i, &(time_us, lane)) in presses.iter().enumerate() {
            // Release before the next press on the same lane so edges alternate
            let next_on_lane = presses[i + 1..]
                .iter()
                .find(|&&(_, l)| l == lane)
                .map(|&(t, _)| t);
            let mut release_us = time_us.saturating_add(config.hold_us.max(0));
            if let Some(next) = next_on_lane {
                release_us = release_us.min(next);
            }
            events.push(ScriptedEvent {
                time_us,
                lane,
                kind: EdgeKind::Press,
            });
            events.push(ScriptedEvent {
                time_us: release_us,
                lane,
                kind: EdgeKind::Release,
            });
        }

        // Releases sort ahead of presses at the same instant
        events.sort_by_key(|e| (e.time_us, e.kind == EdgeKind::Press));
        (events, skipped)
    }

    /// Every event due at or before `song_time_us`, stamped with its own
    /// scripted time.
    pub fn poll_up_to(&mut self, song_time_us: i64) -> Vec<StampedEdge> {
        let mut due = Vec::new();
        while let Some(event) = self.events.get(self.cursor) {
            if event.time_us > song_time_us {
                break;
            }
            let source = InputSource::Script(event.lane);
            let edge = match event.kind {
                EdgeKind::Press => InputEdge::press(source, event.lane),
                EdgeKind::Release => InputEdge::release(source, event.lane),
            };
            due.push(StampedEdge {
                edge,
                song_time_us: event.time_us,
            });
            self.cursor += 1;
        }
        due
    }

    /// Rewind to the first event.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.events.len()
    }

    pub fn remaining(&self) -> usize {
        self.events.len() - self.cursor
    }

    /// Notes deliberately left unplayed.
    pub fn skipped_notes(&self) -> usize {
        self.skipped
    }
}
