use log::{info, warn};

use crate::error::ClockError;
use crate::output::AudioOutput;
use crate::{secs_to_us, us_to_secs};

/// Song clock derived from an audio output's hardware clock.
///
/// Every other component reads elapsed time through [`song_time_us`](Self::song_time_us);
/// nothing derives time from frame counts or wall-clock timers. Pause time is
/// measured with the same device clock, so suspend/resume latency of the
/// output is absorbed instead of accumulating as drift.
///
/// The calibration offset is player configuration and survives `stop()`.
/// Everything else returns to its pre-start default.
pub struct AudioClock<O: AudioOutput> {
    output: O,
    /// Device clock reading at `start()`.
    origin_us: i64,
    /// Total length of completed pauses.
    paused_accumulated_us: i64,
    /// Device clock reading when the current pause began.
    pause_started_us: Option<i64>,
    calibration_offset_us: i64,
    playing: bool,
}

impl<O: AudioOutput> AudioClock<O> {
    pub fn new(output: O) -> Self {
        Self {
            output,
            origin_us: 0,
            paused_accumulated_us: 0,
            pause_started_us: None,
            calibration_offset_us: 0,
            playing: false,
        }
    }

    /// Opens the output and begins playback from zero.
    ///
    /// Calling this while already playing performs a full [`stop`](Self::stop)
    /// first. On failure the clock stays stopped; there are no retries.
    pub fn start(&mut self) -> Result<(), ClockError> {
        if self.playing {
            self.stop();
        }

        self.output
            .open()
            .map_err(ClockError::PlaybackUnavailable)?;

        self.origin_us = self.output.now_us();
        self.paused_accumulated_us = 0;
        self.pause_started_us = None;
        self.playing = true;
        info!(
            "Audio clock started (origin {}us, offset {}us)",
            self.origin_us, self.calibration_offset_us
        );
        Ok(())
    }

    /// Halts playback and releases the output. Safe to call from any state.
    pub fn stop(&mut self) {
        if self.playing {
            if let Err(e) = self.output.close() {
                warn!("Audio device teardown failed, continuing: {e}");
            }
            info!("Audio clock stopped");
        }
        self.origin_us = 0;
        self.paused_accumulated_us = 0;
        self.pause_started_us = None;
        self.playing = false;
    }

    /// Freezes song time. No-op if not playing or already paused.
    pub fn pause(&mut self) {
        if !self.playing || self.pause_started_us.is_some() {
            return;
        }
        self.pause_started_us = Some(self.output.now_us());
        self.output.suspend();
    }

    /// Unfreezes song time, excluding the pause interval. No-op if not paused.
    pub fn resume(&mut self) {
        let Some(started) = self.pause_started_us.take() else {
            return;
        };
        self.output.resume();
        let paused_for = (self.output.now_us() - started).max(0);
        self.paused_accumulated_us += paused_for;
    }

    /// Current song time in microseconds, net of pauses and calibration offset.
    /// Returns 0 when not playing.
    pub fn song_time_us(&self) -> i64 {
        if !self.playing {
            return 0;
        }
        let now = self
            .pause_started_us
            .unwrap_or_else(|| self.output.now_us());
        now.saturating_sub(self.origin_us)
            .saturating_sub(self.paused_accumulated_us)
            .saturating_sub(self.calibration_offset_us)
            .max(0)
    }

    /// Current song time in seconds.
    pub fn song_time(&self) -> f64 {
        us_to_secs(self.song_time_us())
    }

    /// Sets the calibration offset in seconds. A positive value makes song time smaller.
    pub fn set_offset(&mut self, seconds: f64) {
        if !seconds.is_finite() {
            warn!("Ignoring non-finite calibration offset {seconds}");
            return;
        }
        self.set_offset_us(secs_to_us(seconds));
    }

    pub fn set_offset_us(&mut self, offset_us: i64) {
        self.calibration_offset_us = offset_us;
    }

    pub fn offset_us(&self) -> i64 {
        self.calibration_offset_us
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_paused(&self) -> bool {
        self.pause_started_us.is_some()
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }
}

impl<O: AudioOutput> Drop for AudioClock<O> {
    fn drop(&mut self) {
        self.stop();
    }
}
