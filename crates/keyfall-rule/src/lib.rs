// Hit judgment, score/combo accumulation, grades and combo milestones

mod combo_milestone;
mod grade;
mod judge;
mod session_stats;

pub use combo_milestone::{COMBO_MILESTONES, ComboMilestones};
pub use grade::Grade;
pub use judge::{HitResult, Rating, evaluate_hit, evaluate_hit_secs};
pub use session_stats::SessionStats;

/// Perfect window, inclusive (microseconds).
pub const PERFECT_WINDOW_US: i64 = 60_000;
/// Good window, inclusive (microseconds). Anything further is a Miss.
pub const GOOD_WINDOW_US: i64 = 120_000;

pub const PERFECT_SCORE: u32 = 100;
pub const GOOD_SCORE: u32 = 50;
pub const MISS_SCORE: u32 = 0;

/// A note whose target time is more than this far behind song time is
/// missed by the timeout scan (microseconds). Kept as its own constant; it
/// happens to equal the Good window.
pub const LATE_MISS_THRESHOLD_US: i64 = 120_000;
