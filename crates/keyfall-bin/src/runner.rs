use anyhow::{Result, bail};
use keyfall_config::GameConfig;
use keyfall_input::{
    EdgeDetector, EdgeKind, InputEdge, InputSource, KeyMap, ScriptedInput, ScriptedInputConfig,
    StampedEdge,
};
use keyfall_model::Chart;
use keyfall_play::{Session, SessionReport, SessionSettings, SoundEffects, TickOutcome};
use keyfall_timing::{AudioClock, AudioOutput, OffsetCalibrator};
use log::{info, warn};

use crate::renderer::LogRenderer;

/// Taps further than this from every beat are not counted.
const MAX_TAP_DISTANCE_US: i64 = 250_000;

/// Replays scripted lane edges as the keys bound to those lanes.
///
/// Each edge goes through the same key lookup and debounce as a real key
/// event, so the configured bindings decide which lanes can be played.
pub struct ScriptedKeyboard {
    keys: KeyMap,
    detector: EdgeDetector,
}

impl ScriptedKeyboard {
    pub fn new(keys: KeyMap) -> Self {
        Self {
            keys,
            detector: EdgeDetector::new(),
        }
    }

    /// `None` when the lane has no key bound or the key state did not change.
    pub fn strike(&mut self, stamped: &StampedEdge) -> Option<InputEdge> {
        let key = self.keys.key_for(stamped.edge.lane)?;
        let source = InputSource::Keyboard(key.to_string());
        match stamped.edge.kind {
            EdgeKind::Press => {
                let lane = self.keys.lane_for(key)?;
                self.detector.press(source, lane)
            }
            EdgeKind::Release => self.detector.release(&source),
        }
    }

    pub fn release_all(&mut self) {
        self.detector.release_all();
    }
}

/// Wire an output, chart and sound effects into a session configured from `config`.
pub fn build_session<O: AudioOutput, S: SoundEffects>(
    output: O,
    chart: Chart,
    sounds: S,
    config: &GameConfig,
) -> Session<O, LogRenderer, S> {
    let mut clock = AudioClock::new(output);
    clock.set_offset_us(config.calibration_offset_us());
    Session::new(clock, chart, LogRenderer::new(), sounds).with_settings(SessionSettings {
        feedback_duration_us: config.feedback_duration_us(),
        miss_shake_intensity: config.miss_shake_intensity,
    })
}

/// Start the session and tick it to the end, feeding scripted input through
/// the keys in `keys`.
///
/// `wait_frame` is called before every tick and paces the loop.
pub fn play<O: AudioOutput, S: SoundEffects>(
    session: &mut Session<O, LogRenderer, S>,
    keys: &KeyMap,
    autoplay: ScriptedInputConfig,
    mut wait_frame: impl FnMut(),
) -> Result<SessionReport> {
    let mut script = ScriptedInput::new(session.chart(), autoplay);
    for lane in 0..session.chart().lane_count() {
        if keys.key_for(lane).is_none() {
            warn!("No key bound to lane {lane}; its notes will be missed");
        }
    }
    let mut keyboard = ScriptedKeyboard::new(keys.clone());
    session.start()?;

    loop {
        wait_frame();
        let song_time_us = session.song_time_us();
        for stamped in script.poll_up_to(song_time_us) {
            if let Some(edge) = keyboard.strike(&stamped) {
                session.input_queue_mut().push(edge, stamped.song_time_us);
            }
        }
        match session.tick() {
            TickOutcome::Continue => {}
            TickOutcome::Ended(report) => {
                keyboard.release_all();
                info!("Played {} frames", session.renderer().frames());
                return Ok(report);
            }
            TickOutcome::Stopped => bail!("session stopped before the chart ended"),
        }
    }
}

/// Result of a calibration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calibration {
    pub taps: usize,
    pub median_us: i64,
    pub suggested_offset_us: i64,
}

/// Tap along to `beats` with scripted input and suggest a calibration offset.
///
/// Taps are stamped with the song time at which they are read, like a real
/// key event, and matched to the nearest beat. `None` when too few taps
/// landed near a beat.
pub fn calibrate<O: AudioOutput>(
    clock: &mut AudioClock<O>,
    beats: &Chart,
    autoplay: ScriptedInputConfig,
    mut wait_frame: impl FnMut(),
) -> Result<Option<Calibration>> {
    let mut script = ScriptedInput::new(beats, autoplay);
    let mut calibrator = OffsetCalibrator::new(beats.len());
    clock.start()?;

    loop {
        wait_frame();
        let song_time_us = clock.song_time_us();
        for stamped in script.poll_up_to(song_time_us) {
            if !stamped.edge.is_press() {
                continue;
            }
            if let Some(beat_us) = nearest_beat(beats, song_time_us) {
                calibrator.record_tap(song_time_us, beat_us);
            }
        }
        if script.is_finished() || song_time_us > beats.duration_us() {
            break;
        }
    }
    let current_offset_us = clock.offset_us();
    clock.stop();

    let (Some(median_us), Some(suggested_offset_us)) = (
        calibrator.median_us(),
        calibrator.suggested_offset_us(current_offset_us),
    ) else {
        warn!(
            "Only {} taps near a beat; need {}",
            calibrator.sample_count(),
            OffsetCalibrator::MIN_SAMPLES
        );
        return Ok(None);
    };
    info!(
        "Calibration: {} taps, mean {:?}us, median {median_us}us, range {:?}..{:?}us",
        calibrator.sample_count(),
        calibrator.mean_us(),
        calibrator.min_us(),
        calibrator.max_us()
    );
    Ok(Some(Calibration {
        taps: calibrator.sample_count(),
        median_us,
        suggested_offset_us,
    }))
}

fn nearest_beat(beats: &Chart, tap_us: i64) -> Option<i64> {
    beats
        .indices_between(tap_us - MAX_TAP_DISTANCE_US, tap_us + MAX_TAP_DISTANCE_US)
        .map(|i| beats.notes()[i].target_time_us)
        .min_by_key(|&t| (t - tap_us).abs())
}
