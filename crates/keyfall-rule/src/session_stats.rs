use serde::{Deserialize, Serialize};

use crate::grade::Grade;
use crate::judge::{HitResult, Rating};
use crate::{GOOD_SCORE, PERFECT_SCORE};

/// Running totals for one play session.
///
/// Only [`process_judgment`](Self::process_judgment) changes the counters,
/// which keeps `current_combo <= max_combo` and `score == sum of deltas`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    perfect_count: u32,
    good_count: u32,
    miss_count: u32,
    current_combo: u32,
    max_combo: u32,
    score: u64,
    /// Early non-Miss hits
    fast_count: u32,
    /// Late non-Miss hits
    slow_count: u32,
    /// Sum of signed offsets over non-Miss hits, for the mean timing error
    offset_sum_us: i64,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one judgment into the totals.
    pub fn process_judgment(&mut self, result: &HitResult) {
        match result.rating {
            Rating::Miss => {
                self.miss_count += 1;
                self.current_combo = 0;
                return;
            }
            Rating::Perfect => self.perfect_count += 1,
            Rating::Good => self.good_count += 1,
        }

        self.current_combo += 1;
        self.max_combo = self.max_combo.max(self.current_combo);
        self.score += u64::from(result.score_delta);
        self.offset_sum_us += result.offset_us;
        if result.is_early() {
            self.fast_count += 1;
        } else if result.is_late() {
            self.slow_count += 1;
        }
    }

    /// Zero every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn perfect_count(&self) -> u32 {
        self.perfect_count
    }

    pub fn good_count(&self) -> u32 {
        self.good_count
    }

    pub fn miss_count(&self) -> u32 {
        self.miss_count
    }

    pub fn current_combo(&self) -> u32 {
        self.current_combo
    }

    pub fn max_combo(&self) -> u32 {
        self.max_combo
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn fast_count(&self) -> u32 {
        self.fast_count
    }

    pub fn slow_count(&self) -> u32 {
        self.slow_count
    }

    /// Number of notes judged so far, Misses included.
    pub fn total_judged(&self) -> u32 {
        self.perfect_count + self.good_count + self.miss_count
    }

    /// `(P*100 + G*50) / (judged*100) * 100`, or 0 before any judgment.
    pub fn accuracy(&self) -> f64 {
        let total = u64::from(self.total_judged());
        if total == 0 {
            return 0.0;
        }
        let weighted = u64::from(self.perfect_count) * u64::from(PERFECT_SCORE)
            + u64::from(self.good_count) * u64::from(GOOD_SCORE);
        // Single division so exact breakpoints (e.g. 90.0) stay exact
        (weighted * 100) as f64 / (total * u64::from(PERFECT_SCORE)) as f64
    }

    pub fn grade(&self) -> Grade {
        Grade::from_accuracy(self.accuracy())
    }

    /// Mean signed timing error over non-Miss hits.
    pub fn mean_offset_us(&self) -> Option<i64> {
        let hits = self.perfect_count + self.good_count;
        if hits == 0 {
            None
        } else {
            Some(self.offset_sum_us / i64::from(hits))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::evaluate_hit;

    fn result(rating: Rating) -> HitResult {
        HitResult {
            rating,
            score_delta: rating.score(),
            offset_us: 0,
        }
    }

    #[test]
    fn new_stats_are_zero() {
        let stats = SessionStats::new();
        assert_eq!(stats.total_judged(), 0);
        assert_eq!(stats.score(), 0);
        assert_eq!(stats.accuracy(), 0.0);
        assert_eq!(stats.grade(), Grade::F);
        assert_eq!(stats.mean_offset_us(), None);
    }

    #[test]
    fn combo_accounting_sequence() {
        let mut stats = SessionStats::new();
        for rating in [
            Rating::Perfect,
            Rating::Perfect,
            Rating::Miss,
            Rating::Good,
            Rating::Perfect,
        ] {
            stats.process_judgment(&result(rating));
        }
        assert_eq!(stats.current_combo(), 2);
        assert_eq!(stats.max_combo(), 2);
        assert_eq!(stats.score(), 350);
        assert_eq!(stats.miss_count(), 1);
        assert_eq!(stats.perfect_count(), 3);
        assert_eq!(stats.good_count(), 1);
    }

    #[test]
    fn accuracy_and_grade() {
        let mut stats = SessionStats::new();
        for _ in 0..8 {
            stats.process_judgment(&result(Rating::Perfect));
        }
        for _ in 0..2 {
            stats.process_judgment(&result(Rating::Good));
        }
        assert_eq!(stats.accuracy(), 90.0);
        assert_eq!(stats.grade(), Grade::A);
    }

    #[test]
    fn misses_lower_accuracy() {
        let mut stats = SessionStats::new();
        stats.process_judgment(&result(Rating::Perfect));
        stats.process_judgment(&result(Rating::Miss));
        assert_eq!(stats.accuracy(), 50.0);
        assert_eq!(stats.grade(), Grade::F);
    }

    #[test]
    fn all_perfect_is_s() {
        let mut stats = SessionStats::new();
        for _ in 0..20 {
            stats.process_judgment(&result(Rating::Perfect));
        }
        assert_eq!(stats.accuracy(), 100.0);
        assert_eq!(stats.grade(), Grade::S);
    }

    #[test]
    fn fast_slow_and_mean_offset() {
        let mut stats = SessionStats::new();
        stats.process_judgment(&evaluate_hit(1_000_000, 970_000));
        stats.process_judgment(&evaluate_hit(2_000_000, 2_050_000));
        stats.process_judgment(&evaluate_hit(3_000_000, 3_000_000));
        stats.process_judgment(&evaluate_hit(4_000_000, 4_500_000));

        assert_eq!(stats.fast_count(), 1);
        assert_eq!(stats.slow_count(), 1);
        assert_eq!(stats.miss_count(), 1);
        // Misses are excluded from the mean
        assert_eq!(stats.mean_offset_us(), Some(6_666));
    }

    #[test]
    fn combo_never_exceeds_max() {
        let mut stats = SessionStats::new();
        let ratings = [Rating::Good, Rating::Miss, Rating::Perfect, Rating::Perfect, Rating::Miss];
        for rating in ratings.iter().cycle().take(40) {
            stats.process_judgment(&result(*rating));
            assert!(stats.current_combo() <= stats.max_combo());
        }
    }

    #[test]
    fn reset_zeroes_everything() {
        let mut stats = SessionStats::new();
        stats.process_judgment(&evaluate_hit(0, 10_000));
        stats.process_judgment(&result(Rating::Miss));
        stats.reset();
        assert_eq!(stats, SessionStats::default());
    }
}
