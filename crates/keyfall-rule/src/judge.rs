use serde::{Deserialize, Serialize};

use crate::{GOOD_SCORE, GOOD_WINDOW_US, MISS_SCORE, PERFECT_SCORE, PERFECT_WINDOW_US};

/// Judgment rating for a single note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rating {
    Perfect,
    Good,
    Miss,
}

impl Rating {
    /// Score awarded for this rating.
    pub fn score(self) -> u32 {
        match self {
            Self::Perfect => PERFECT_SCORE,
            Self::Good => GOOD_SCORE,
            Self::Miss => MISS_SCORE,
        }
    }

    /// Whether this rating keeps the combo going.
    pub fn continues_combo(self) -> bool {
        !matches!(self, Self::Miss)
    }

    /// Text shown to the player.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Perfect => "PERFECT",
            Self::Good => "GOOD",
            Self::Miss => "MISS",
        }
    }
}

/// Outcome of judging one note at one song time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitResult {
    pub rating: Rating,
    pub score_delta: u32,
    /// Song time minus target time. Negative = early (fast), positive = late (slow).
    pub offset_us: i64,
}

impl HitResult {
    /// Absolute timing error in microseconds.
    pub fn time_diff_us(&self) -> i64 {
        self.offset_us.abs()
    }

    /// Absolute timing error in seconds.
    pub fn time_diff(&self) -> f64 {
        self.time_diff_us() as f64 / 1_000_000.0
    }

    pub fn is_early(&self) -> bool {
        self.offset_us < 0
    }

    pub fn is_late(&self) -> bool {
        self.offset_us > 0
    }
}

/// Judge a note with target time `target_time_us` against `song_time_us`.
///
/// Both window bounds are inclusive: exactly 60ms is Perfect, exactly 120ms is Good.
pub fn evaluate_hit(target_time_us: i64, song_time_us: i64) -> HitResult {
    let offset_us = song_time_us - target_time_us;
    let diff = offset_us.abs();
    let rating = if diff <= PERFECT_WINDOW_US {
        Rating::Perfect
    } else if diff <= GOOD_WINDOW_US {
        Rating::Good
    } else {
        Rating::Miss
    };
    HitResult {
        rating,
        score_delta: rating.score(),
        offset_us,
    }
}

/// Seconds-based variant of [`evaluate_hit`]. Inputs are rounded to whole
/// microseconds before comparison so window edges stay exact.
pub fn evaluate_hit_secs(target_time: f64, song_time: f64) -> HitResult {
    let to_us = |secs: f64| (secs * 1_000_000.0).round() as i64;
    evaluate_hit(to_us(target_time), to_us(song_time))
}
