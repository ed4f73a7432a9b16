use std::time::Instant;

use crate::error::OutputError;

/// Abstraction over the audio output device that owns the hardware clock.
/// Implementations: SystemOutput (synthetic), KiraOutput (kira, feature `kira`),
/// ManualOutput (testing).
///
/// `now_us` must be monotonically non-decreasing and cheap enough to call from
/// both the frame loop and input handlers.
pub trait AudioOutput {
    /// Acquire the device and begin playback from position zero.
    fn open(&mut self) -> Result<(), OutputError>;

    /// Current device clock reading in microseconds from an arbitrary epoch.
    fn now_us(&self) -> i64;

    /// Suspend playback. The clock may or may not keep running.
    fn suspend(&mut self);

    /// Resume playback after [`suspend`](Self::suspend).
    fn resume(&mut self);

    /// Release the device.
    fn close(&mut self) -> Result<(), OutputError>;
}

impl<O: AudioOutput + ?Sized> AudioOutput for Box<O> {
    fn open(&mut self) -> Result<(), OutputError> {
        (**self).open()
    }

    fn now_us(&self) -> i64 {
        (**self).now_us()
    }

    fn suspend(&mut self) {
        (**self).suspend()
    }

    fn resume(&mut self) {
        (**self).resume()
    }

    fn close(&mut self) -> Result<(), OutputError> {
        (**self).close()
    }
}

/// Synthetic output driven by `std::time::Instant`.
///
/// Used when no song audio is available, so a session can still be played
/// against a steady clock.
#[derive(Debug)]
pub struct SystemOutput {
    epoch: Instant,
    open: bool,
}

impl SystemOutput {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            open: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

impl Default for SystemOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioOutput for SystemOutput {
    fn open(&mut self) -> Result<(), OutputError> {
        self.epoch = Instant::now();
        self.open = true;
        Ok(())
    }

    fn now_us(&self) -> i64 {
        self.epoch.elapsed().as_micros() as i64
    }

    fn suspend(&mut self) {}

    fn resume(&mut self) {}

    fn close(&mut self) -> Result<(), OutputError> {
        self.open = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_output_monotonic() {
        let mut output = SystemOutput::new();
        output.open().unwrap();
        let t1 = output.now_us();
        let t2 = output.now_us();
        assert!(t2 >= t1);
    }

    #[test]
    fn system_output_open_close() {
        let mut output = SystemOutput::new();
        assert!(!output.is_open());
        output.open().unwrap();
        assert!(output.is_open());
        output.close().unwrap();
        assert!(!output.is_open());
        // Closing twice is harmless
        output.close().unwrap();
    }

    #[test]
    fn boxed_output_delegates() {
        let mut output: Box<dyn AudioOutput> = Box::new(SystemOutput::new());
        output.open().unwrap();
        assert!(output.now_us() >= 0);
        output.close().unwrap();
    }
}
