//! Kira-backed output: a kira clock is the device clock, the song plays on
//! the same audio thread.

use std::path::PathBuf;

use kira::clock::{ClockHandle, ClockSpeed};
use kira::sound::static_sound::{StaticSoundData, StaticSoundHandle};
use kira::{AudioManager, AudioManagerSettings, DefaultBackend, Tween};
use log::{info, warn};

use crate::error::OutputError;
use crate::output::AudioOutput;

/// Clock resolution. The fractional tick position is interpolated by kira,
/// so readings advance once per audio block regardless of this value.
const TICKS_PER_SECOND: f64 = 1000.0;

pub struct KiraOutput {
    song_path: Option<PathBuf>,
    manager: Option<AudioManager<DefaultBackend>>,
    clock: Option<ClockHandle>,
    song: Option<StaticSoundHandle>,
}

impl KiraOutput {
    /// Create an output that plays `song_path` on open, or only runs the clock
    /// when no song is given.
    pub fn new(song_path: Option<PathBuf>) -> Self {
        Self {
            song_path,
            manager: None,
            clock: None,
            song: None,
        }
    }

    /// Mutable access to the audio manager while the device is open, for
    /// sharing it with sound effect playback.
    pub fn manager_mut(&mut self) -> Option<&mut AudioManager<DefaultBackend>> {
        self.manager.as_mut()
    }

    fn load_song(&self) -> Result<Option<StaticSoundData>, OutputError> {
        let Some(path) = &self.song_path else {
            return Ok(None);
        };
        StaticSoundData::from_file(path)
            .map(Some)
            .map_err(|e| OutputError::Decode {
                path: path.clone(),
                reason: e.to_string(),
            })
    }
}

impl AudioOutput for KiraOutput {
    fn open(&mut self) -> Result<(), OutputError> {
        // Decode before touching the device so a bad file leaves nothing open
        let song = self.load_song()?;

        let mut manager = AudioManager::<DefaultBackend>::new(AudioManagerSettings::default())
            .map_err(|e| OutputError::Unavailable(format!("Failed to create audio manager: {e}")))?;
        let mut clock = manager
            .add_clock(ClockSpeed::TicksPerSecond(TICKS_PER_SECOND))
            .map_err(|e| OutputError::Unavailable(format!("Failed to add clock: {e}")))?;

        clock.start();
        if let Some(data) = song {
            let handle = manager
                .play(data)
                .map_err(|e| OutputError::Unavailable(format!("Failed to play song: {e}")))?;
            self.song = Some(handle);
        }

        info!(
            "KiraOutput: opened (song: {})",
            self.song_path
                .as_ref()
                .map_or_else(|| "none".to_string(), |p| p.display().to_string())
        );
        self.clock = Some(clock);
        self.manager = Some(manager);
        Ok(())
    }

    fn now_us(&self) -> i64 {
        self.clock.as_ref().map_or(0, |clock| {
            let time = clock.time();
            ((time.ticks as f64 + time.fraction) * 1_000_000.0 / TICKS_PER_SECOND).round() as i64
        })
    }

    fn suspend(&mut self) {
        if let Some(clock) = self.clock.as_mut() {
            clock.pause();
        }
        if let Some(song) = self.song.as_mut() {
            song.pause(Tween::default());
        }
    }

    fn resume(&mut self) {
        if let Some(clock) = self.clock.as_mut() {
            clock.start();
        }
        if let Some(song) = self.song.as_mut() {
            song.resume(Tween::default());
        }
    }

    fn close(&mut self) -> Result<(), OutputError> {
        if let Some(mut song) = self.song.take() {
            song.stop(Tween::default());
        }
        if let Some(mut clock) = self.clock.take() {
            clock.stop();
        }
        if self.manager.take().is_none() {
            warn!("KiraOutput: close called without an open device");
        }
        Ok(())
    }
}
