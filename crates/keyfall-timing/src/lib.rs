// Audio clock: the single source of song time, plus the output devices behind it

mod calibration;
mod clock;
mod error;
#[cfg(feature = "kira")]
mod kira_output;
#[cfg(any(test, feature = "test-support"))]
mod manual_output;
mod output;

pub use calibration::OffsetCalibrator;
pub use clock::AudioClock;
pub use error::{ClockError, OutputError};
#[cfg(feature = "kira")]
pub use kira_output::KiraOutput;
#[cfg(any(test, feature = "test-support"))]
pub use manual_output::{ManualClockHandle, ManualOutput};
pub use output::{AudioOutput, SystemOutput};

/// Microseconds per second, for converting between the `_us` and seconds APIs.
pub const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Convert seconds to whole microseconds, rounding to nearest.
pub fn secs_to_us(secs: f64) -> i64 {
    (secs * MICROS_PER_SECOND).round() as i64
}

/// Convert microseconds to seconds.
pub fn us_to_secs(us: i64) -> f64 {
    us as f64 / MICROS_PER_SECOND
}
