use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChartError {
    #[error("chart must have at least one lane")]
    NoLanes,

    #[error("note {index}: lane {lane} out of range (lane count {lane_count})")]
    LaneOutOfRange {
        index: usize,
        lane: usize,
        lane_count: usize,
    },

    #[error("note {index}: negative target time {time_us}us")]
    NegativeTime { index: usize, time_us: i64 },

    #[error("note {index}: target time {time_us}us is too far in the future")]
    TimeOutOfRange { index: usize, time_us: i64 },

    #[error("note {index}: target time is not a finite number")]
    NonFiniteTime { index: usize },
}
