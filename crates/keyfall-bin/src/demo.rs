use keyfall_model::{Chart, ChartError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Silence before the first note (seconds).
const LEAD_IN_SECS: f64 = 2.0;
/// Eighth notes at 120 BPM.
const STEP_SECS: f64 = 0.25;
/// Quarter notes at 120 BPM.
const BEAT_SECS: f64 = 0.5;

/// Seeded random chart for running without a chart file. The same seed
/// always yields the same chart.
pub fn demo_chart(seed: u64, lane_count: usize, note_count: usize) -> Result<Chart, ChartError> {
    if lane_count == 0 {
        return Err(ChartError::NoLanes);
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut time = LEAD_IN_SECS;
    let mut notes = Vec::with_capacity(note_count);
    for _ in 0..note_count {
        notes.push((rng.gen_range(0..lane_count), time));
        // Occasional rest
        time += STEP_SECS * rng.gen_range(1..=2) as f64;
    }
    Chart::from_secs(lane_count, &notes)
}

/// Single-lane click track for offset calibration: one beat every half
/// second after the lead-in.
pub fn metronome_chart(beat_count: usize) -> Result<Chart, ChartError> {
    let beats: Vec<(usize, f64)> = (0..beat_count)
        .map(|i| (0, LEAD_IN_SECS + i as f64 * BEAT_SECS))
        .collect();
    Chart::from_secs(1, &beats)
}
