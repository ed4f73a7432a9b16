use std::collections::VecDeque;

/// Collects tap timing deltas and suggests a calibration offset.
///
/// A delta is the song time at which the player tapped minus the time the
/// beat was expected. Consistently positive deltas mean the player hears the
/// audio late, so song time should be pulled back by a positive offset.
#[derive(Debug)]
pub struct OffsetCalibrator {
    samples: VecDeque<i64>,
    max_samples: usize,
}

impl OffsetCalibrator {
    /// Fewer taps than this give no suggestion.
    pub const MIN_SAMPLES: usize = 4;

    pub fn new(max_samples: usize) -> Self {
        let max_samples = max_samples.max(1);
        Self {
            samples: VecDeque::with_capacity(max_samples),
            max_samples,
        }
    }

    /// Record one delta in microseconds. The oldest sample is dropped when full.
    pub fn record(&mut self, delta_us: i64) {
        if self.samples.len() >= self.max_samples {
            self.samples.pop_front();
        }
        self.samples.push_back(delta_us);
    }

    /// Record a tap at `tap_song_time_us` against a beat expected at `expected_us`.
    pub fn record_tap(&mut self, tap_song_time_us: i64, expected_us: i64) {
        self.record(tap_song_time_us - expected_us);
    }

    pub fn mean_us(&self) -> Option<i64> {
        if self.samples.is_empty() {
            return None;
        }
        let total: i64 = self.samples.iter().sum();
        Some(total / self.samples.len() as i64)
    }

    pub fn median_us(&self) -> Option<i64> {
        if self.samples.is_empty() {
            return None;
        }
        let mut sorted: Vec<i64> = self.samples.iter().copied().collect();
        sorted.sort_unstable();
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            Some((sorted[mid - 1] + sorted[mid]) / 2)
        } else {
            Some(sorted[mid])
        }
    }

    pub fn min_us(&self) -> Option<i64> {
        self.samples.iter().min().copied()
    }

    pub fn max_us(&self) -> Option<i64> {
        self.samples.iter().max().copied()
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Offset to apply given the offset that was active while the taps were
    /// recorded. Uses the median so a single stray tap does not skew it.
    pub fn suggested_offset_us(&self, current_offset_us: i64) -> Option<i64> {
        if self.samples.len() < Self::MIN_SAMPLES {
            return None;
        }
        self.median_us().map(|m| current_offset_us + m)
    }
}

impl Default for OffsetCalibrator {
    fn default() -> Self {
        Self::new(32)
    }
}
