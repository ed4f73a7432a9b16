use serde::{Deserialize, Serialize};

/// A single note in the chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Lane index (0-indexed)
    pub lane: usize,
    /// Target time in microseconds
    pub target_time_us: i64,
    /// Set once, by a hit or by the timeout miss
    #[serde(skip)]
    judged: bool,
}

impl Note {
    /// Create a note from a target time in seconds. `None` if the time is
    /// NaN or infinite.
    pub fn new(lane: usize, target_time_secs: f64) -> Option<Self> {
        if !target_time_secs.is_finite() {
            return None;
        }
        Some(Self::at_us(
            lane,
            (target_time_secs * 1_000_000.0).round() as i64,
        ))
    }

    pub fn at_us(lane: usize, target_time_us: i64) -> Self {
        Self {
            lane,
            target_time_us,
            judged: false,
        }
    }

    /// Target time in seconds.
    pub fn target_time(&self) -> f64 {
        self.target_time_us as f64 / 1_000_000.0
    }

    pub fn is_judged(&self) -> bool {
        self.judged
    }

    /// Latch the note as judged. Returns `false` if it already was, in which
    /// case the caller must not fold a second judgment.
    pub fn mark_judged(&mut self) -> bool {
        if self.judged {
            return false;
        }
        self.judged = true;
        true
    }

    pub(crate) fn clear_judged(&mut self) {
        self.judged = false;
    }
}
