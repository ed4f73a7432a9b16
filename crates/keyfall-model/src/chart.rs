use crate::{MAX_TARGET_TIME_US, TRAVEL_DURATION_US};
use crate::error::ChartError;
use crate::note::Note;

/// Time-sorted note sequence for one play session.
///
/// Note data is fixed once built; only the per-note `judged` latch changes.
/// The same chart is reused across replays via [`reset_judgments`](Self::reset_judgments).
#[derive(Debug, Clone)]
pub struct Chart {
    lane_count: usize,
    notes: Vec<Note>,
}

impl Chart {
    /// Validate and sort the notes. Notes with equal target times keep their
    /// input order.
    pub fn new(lane_count: usize, mut notes: Vec<Note>) -> Result<Self, ChartError> {
        if lane_count == 0 {
            return Err(ChartError::NoLanes);
        }
        for (index, note) in notes.iter().enumerate() {
            if note.lane >= lane_count {
                return Err(ChartError::LaneOutOfRange {
                    index,
                    lane: note.lane,
                    lane_count,
                });
            }
            if note.target_time_us < 0 {
                return Err(ChartError::NegativeTime {
                    index,
                    time_us: note.target_time_us,
                });
            }
            if note.target_time_us > MAX_TARGET_TIME_US {
                return Err(ChartError::TimeOutOfRange {
                    index,
                    time_us: note.target_time_us,
                });
            }
        }
        notes.sort_by_key(|n| n.target_time_us);
        for note in &mut notes {
            note.clear_judged();
        }
        Ok(Self { lane_count, notes })
    }

    /// Build a chart from `(lane, seconds)` pairs.
    pub fn from_secs(lane_count: usize, notes: &[(usize, f64)]) -> Result<Self, ChartError> {
        let mut built = Vec::with_capacity(notes.len());
        for (index, &(lane, secs)) in notes.iter().enumerate() {
            let note = Note::new(lane, secs).ok_or(ChartError::NonFiniteTime { index })?;
            built.push(note);
        }
        Self::new(lane_count, built)
    }

    pub fn lane_count(&self) -> usize {
        self.lane_count
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn note(&self, index: usize) -> Option<&Note> {
        self.notes.get(index)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn last_note_time_us(&self) -> Option<i64> {
        self.notes.last().map(|n| n.target_time_us)
    }

    /// Last target time plus the travel window. The session ends once song
    /// time passes this.
    pub fn duration_us(&self) -> i64 {
        self.last_note_time_us().unwrap_or(0) + TRAVEL_DURATION_US
    }

    /// Latch note `index` as judged. Returns `false` if it was already judged
    /// or does not exist.
    pub fn mark_judged(&mut self, index: usize) -> bool {
        self.notes.get_mut(index).is_some_and(Note::mark_judged)
    }

    /// Clear every `judged` flag in place for a replay.
    pub fn reset_judgments(&mut self) {
        for note in &mut self.notes {
            note.clear_judged();
        }
    }

    pub fn judged_count(&self) -> usize {
        self.notes.iter().filter(|n| n.is_judged()).count()
    }

    pub fn all_judged(&self) -> bool {
        self.notes.iter().all(Note::is_judged)
    }

    /// Indices of notes whose target time lies in `[from_us, to_us]`.
    /// Relies on the sort order to skip straight to the window.
    pub fn indices_between(&self, from_us: i64, to_us: i64) -> std::ops::Range<usize> {
        let start = self.notes.partition_point(|n| n.target_time_us < from_us);
        let end = self.notes.partition_point(|n| n.target_time_us <= to_us);
        start..end.max(start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_chart() -> Chart {
        Chart::from_secs(4, &[(1, 2.0), (0, 1.0), (3, 3.5), (2, 1.0)]).unwrap()
    }

    #[test]
    fn sorts_by_target_time_stably() {
        let chart = sample_chart();
        let order: Vec<(usize, i64)> = chart
            .notes()
            .iter()
            .map(|n| (n.lane, n.target_time_us))
            .collect();
        assert_eq!(
            order,
            vec![(0, 1_000_000), (2, 1_000_000), (1, 2_000_000), (3, 3_500_000)]
        );
    }

    #[test]
    fn duration_adds_travel_window() {
        let chart = sample_chart();
        assert_eq!(chart.last_note_time_us(), Some(3_500_000));
        assert_eq!(chart.duration_us(), 5_500_000);
    }

    #[test]
    fn empty_chart_duration_is_travel_window() {
        let chart = Chart::new(4, Vec::new()).unwrap();
        assert!(chart.is_empty());
        assert_eq!(chart.duration_us(), TRAVEL_DURATION_US);
        assert!(chart.all_judged());
    }

    #[test]
    fn rejects_invalid_notes() {
        assert_eq!(Chart::new(0, Vec::new()).unwrap_err(), ChartError::NoLanes);
        assert_eq!(
            Chart::new(4, vec![Note::at_us(0, 0), Note::at_us(4, 10)]).unwrap_err(),
            ChartError::LaneOutOfRange {
                index: 1,
                lane: 4,
                lane_count: 4
            }
        );
        assert_eq!(
            Chart::new(4, vec![Note::at_us(1, -5)]).unwrap_err(),
            ChartError::NegativeTime {
                index: 0,
                time_us: -5
            }
        );
        assert_eq!(
            Chart::from_secs(4, &[(0, 1.0), (1, f64::NAN)]).unwrap_err(),
            ChartError::NonFiniteTime { index: 1 }
        );
    }

    #[test]
    fn rejects_times_past_the_representable_range() {
        assert_eq!(
            Chart::from_secs(4, &[(0, 1e300)]).unwrap_err(),
            ChartError::TimeOutOfRange {
                index: 0,
                time_us: i64::MAX
            }
        );
        assert!(matches!(
            Chart::new(4, vec![Note::at_us(0, 5), Note::at_us(1, MAX_TARGET_TIME_US + 1)]),
            Err(ChartError::TimeOutOfRange { index: 1, .. })
        ));

        let chart = Chart::new(1, vec![Note::at_us(0, MAX_TARGET_TIME_US)]).unwrap();
        assert_eq!(chart.duration_us(), i64::MAX);
    }

    #[test]
    fn construction_clears_judged_flags() {
        let mut note = Note::at_us(0, 100);
        note.mark_judged();
        let chart = Chart::new(1, vec![note]).unwrap();
        assert!(!chart.notes()[0].is_judged());
    }

    #[test]
    fn mark_and_reset_judgments() {
        let mut chart = sample_chart();
        assert!(chart.mark_judged(1));
        assert!(!chart.mark_judged(1));
        assert!(!chart.mark_judged(99));
        assert_eq!(chart.judged_count(), 1);

        chart.reset_judgments();
        assert_eq!(chart.judged_count(), 0);
        assert_eq!(chart.len(), 4);
    }

    #[test]
    fn indices_between_is_inclusive() {
        let chart = sample_chart();
        assert_eq!(chart.indices_between(1_000_000, 2_000_000), 0..3);
        assert_eq!(chart.indices_between(1_000_001, 1_999_999), 2..2);
        assert_eq!(chart.indices_between(3_000_000, 9_000_000), 3..4);
        assert_eq!(chart.indices_between(5_000_000, 4_000_000), 4..4);
    }
}
