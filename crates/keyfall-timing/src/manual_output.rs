use std::cell::Cell;
use std::rc::Rc;

use crate::error::OutputError;
use crate::output::AudioOutput;

#[derive(Debug, Default)]
struct ManualState {
    now_us: Cell<i64>,
    open: Cell<bool>,
    suspended: Cell<bool>,
    refuse_open: Cell<bool>,
    fail_close: Cell<bool>,
    open_count: Cell<u32>,
    close_count: Cell<u32>,
}

/// Output whose device clock only moves when a test advances it.
#[derive(Debug, Default)]
pub struct ManualOutput {
    state: Rc<ManualState>,
}

/// Shared handle for driving a [`ManualOutput`] after it has been moved into a clock.
#[derive(Debug, Clone)]
pub struct ManualClockHandle {
    state: Rc<ManualState>,
}

impl ManualOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an output together with the handle that controls it.
    pub fn with_handle() -> (Self, ManualClockHandle) {
        let output = Self::new();
        let handle = output.handle();
        (output, handle)
    }

    pub fn handle(&self) -> ManualClockHandle {
        ManualClockHandle {
            state: Rc::clone(&self.state),
        }
    }
}

impl ManualClockHandle {
    pub fn set_time_us(&self, us: i64) {
        self.state.now_us.set(us);
    }

    pub fn advance_us(&self, delta_us: i64) {
        self.state.now_us.set(self.state.now_us.get() + delta_us);
    }

    pub fn advance_secs(&self, secs: f64) {
        self.advance_us(crate::secs_to_us(secs));
    }

    pub fn now_us(&self) -> i64 {
        self.state.now_us.get()
    }

    /// Make subsequent `open()` calls fail as if the device were blocked.
    pub fn set_refuse_open(&self, refuse: bool) {
        self.state.refuse_open.set(refuse);
    }

    /// Make subsequent `close()` calls report a teardown failure.
    pub fn set_fail_close(&self, fail: bool) {
        self.state.fail_close.set(fail);
    }

    pub fn is_open(&self) -> bool {
        self.state.open.get()
    }

    pub fn is_suspended(&self) -> bool {
        self.state.suspended.get()
    }

    pub fn open_count(&self) -> u32 {
        self.state.open_count.get()
    }

    pub fn close_count(&self) -> u32 {
        self.state.close_count.get()
    }
}

impl AudioOutput for ManualOutput {
    fn open(&mut self) -> Result<(), OutputError> {
        if self.state.refuse_open.get() {
            return Err(OutputError::Unavailable("device blocked".to_string()));
        }
        self.state.open.set(true);
        self.state.suspended.set(false);
        self.state.open_count.set(self.state.open_count.get() + 1);
        Ok(())
    }

    fn now_us(&self) -> i64 {
        self.state.now_us.get()
    }

    fn suspend(&mut self) {
        self.state.suspended.set(true);
    }

    fn resume(&mut self) {
        self.state.suspended.set(false);
    }

    fn close(&mut self) -> Result<(), OutputError> {
        self.state.close_count.set(self.state.close_count.get() + 1);
        self.state.open.set(false);
        self.state.suspended.set(false);
        if self.state.fail_close.get() {
            return Err(OutputError::Teardown("device did not respond".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_drives_output_clock() {
        let (output, handle) = ManualOutput::with_handle();
        assert_eq!(output.now_us(), 0);
        handle.advance_us(1_000_000);
        assert_eq!(output.now_us(), 1_000_000);
        handle.advance_secs(0.5);
        assert_eq!(output.now_us(), 1_500_000);
        handle.set_time_us(5_000_000);
        assert_eq!(output.now_us(), 5_000_000);
    }

    #[test]
    fn refuse_open_reports_unavailable() {
        let (mut output, handle) = ManualOutput::with_handle();
        handle.set_refuse_open(true);
        assert!(matches!(output.open(), Err(OutputError::Unavailable(_))));
        assert!(!handle.is_open());
        assert_eq!(handle.open_count(), 0);
    }

    #[test]
    fn failing_close_still_releases() {
        let (mut output, handle) = ManualOutput::with_handle();
        output.open().unwrap();
        handle.set_fail_close(true);
        assert!(matches!(output.close(), Err(OutputError::Teardown(_))));
        assert!(!handle.is_open());
        assert_eq!(handle.close_count(), 1);
    }
}
