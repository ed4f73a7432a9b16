// Chart model: notes, the time-sorted chart, and the on-disk chart schema

mod chart;
mod chart_file;
mod error;
mod note;

pub use chart::Chart;
pub use chart_file::{ChartFile, ChartFileNote};
pub use error::ChartError;
pub use note::Note;

/// How long a note is visible before its target time (microseconds).
/// Also the tail added after the last note to get the chart duration.
pub const TRAVEL_DURATION_US: i64 = 2_000_000;

/// Latest accepted note target time, so that adding the travel window to
/// the last note cannot overflow.
pub const MAX_TARGET_TIME_US: i64 = i64::MAX - TRAVEL_DURATION_US;

/// How long a note stays visible past its target time (microseconds).
pub const MISS_GRACE_WINDOW_US: i64 = 500_000;
