use keyfall_rule::{Grade, SessionStats};
use serde::{Deserialize, Serialize};

/// Final result of a finished session.
///
/// Only produced by the Running -> Ended transition, so a report always
/// describes a complete play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub score: u64,
    pub max_combo: u32,
    pub perfect_count: u32,
    pub good_count: u32,
    pub miss_count: u32,
    pub accuracy: f64,
    pub grade: Grade,
    pub fast_count: u32,
    pub slow_count: u32,
    pub mean_offset_us: Option<i64>,
    pub total_notes: usize,
}

impl SessionReport {
    pub fn from_stats(stats: &SessionStats, total_notes: usize) -> Self {
        Self {
            score: stats.score(),
            max_combo: stats.max_combo(),
            perfect_count: stats.perfect_count(),
            good_count: stats.good_count(),
            miss_count: stats.miss_count(),
            accuracy: stats.accuracy(),
            grade: stats.grade(),
            fast_count: stats.fast_count(),
            slow_count: stats.slow_count(),
            mean_offset_us: stats.mean_offset_us(),
            total_notes,
        }
    }

    /// Perfect + Good + Miss.
    pub fn judged_count(&self) -> u32 {
        self.perfect_count + self.good_count + self.miss_count
    }

    /// No Miss in the whole chart.
    pub fn is_full_combo(&self) -> bool {
        self.miss_count == 0 && self.judged_count() as usize == self.total_notes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyfall_rule::evaluate_hit;

    #[test]
    fn snapshot_from_stats() {
        let mut stats = SessionStats::new();
        stats.process_judgment(&evaluate_hit(1_000_000, 1_000_000));
        stats.process_judgment(&evaluate_hit(2_000_000, 2_100_000));
        let report = SessionReport::from_stats(&stats, 2);

        assert_eq!(report.score, 150);
        assert_eq!(report.max_combo, 2);
        assert_eq!(report.perfect_count, 1);
        assert_eq!(report.good_count, 1);
        assert_eq!(report.accuracy, 75.0);
        assert_eq!(report.grade, Grade::C);
        assert_eq!(report.slow_count, 1);
        assert!(report.is_full_combo());
    }

    #[test]
    fn serializes_camel_case() {
        let report = SessionReport::from_stats(&SessionStats::new(), 0);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["maxCombo"], 0);
        assert_eq!(json["grade"], "F");
        assert!(json["meanOffsetUs"].is_null());
    }
}
