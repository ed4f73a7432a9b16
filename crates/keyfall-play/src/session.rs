use keyfall_input::{InputEdge, InputQueue, StampedEdge};
use keyfall_model::{Chart, MISS_GRACE_WINDOW_US, TRAVEL_DURATION_US};
use keyfall_rule::{
    ComboMilestones, GOOD_WINDOW_US, HitResult, LATE_MISS_THRESHOLD_US, Rating, SessionStats,
    evaluate_hit,
};
use keyfall_timing::{AudioClock, AudioOutput};
use log::{debug, info, warn};

use crate::collaborators::{Renderer, SoundEffects, VisibleNote};
use crate::error::SessionError;
use crate::report::SessionReport;

/// Session phase state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Not started, or reset for replay.
    Idle,
    /// Acquiring the audio clock.
    Loading,
    /// Ticking.
    Running,
    /// Song time passed the chart duration. Terminal until `reset()`.
    Ended,
}

/// Result of one tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Schedule the next frame.
    Continue,
    /// The session finished on this tick. Nothing was rendered.
    Ended(SessionReport),
    /// Not running; nothing was done.
    Stopped,
}

/// Presentation tuning that does not affect judgment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSettings {
    /// How long judgment text stays up, in song time.
    pub feedback_duration_us: i64,
    pub miss_shake_intensity: f32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            feedback_duration_us: 500_000,
            miss_shake_intensity: 5.0,
        }
    }
}

/// Whether a judgment plays sounds and drives the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cues {
    Live,
    /// Folded into the stats only. Used on the tick that ends the session.
    Silent,
}

/// Judgment text on screen until `expires_at_us`.
#[derive(Debug, Clone, Copy)]
struct Feedback {
    rating: Rating,
    expires_at_us: i64,
}

/// One play of a chart.
///
/// Owns the clock, so every timestamp (render, input, miss detection) comes
/// from the same [`AudioClock::song_time_us`]. The caller drives it by
/// calling [`tick`](Self::tick) once per frame and delivering input through
/// [`handle_press`](Self::handle_press) or the input queue.
pub struct Session<O: AudioOutput, R: Renderer, S: SoundEffects> {
    phase: SessionPhase,
    clock: AudioClock<O>,
    chart: Chart,
    renderer: R,
    sounds: S,
    stats: SessionStats,
    milestones: ComboMilestones,
    input: InputQueue,
    feedback: Option<Feedback>,
    shaking: bool,
    settings: SessionSettings,
    /// Every note before this index is judged.
    miss_cursor: usize,
    /// Reused per-frame buffer.
    visible: Vec<VisibleNote>,
    last_report: Option<SessionReport>,
}

impl<O: AudioOutput, R: Renderer, S: SoundEffects> Session<O, R, S> {
    pub fn new(clock: AudioClock<O>, chart: Chart, renderer: R, sounds: S) -> Self {
        Self {
            phase: SessionPhase::Idle,
            clock,
            chart,
            renderer,
            sounds,
            stats: SessionStats::new(),
            milestones: ComboMilestones::new(),
            input: InputQueue::new(),
            feedback: None,
            shaking: false,
            settings: SessionSettings::default(),
            miss_cursor: 0,
            visible: Vec::new(),
            last_report: None,
        }
    }

    pub fn with_settings(mut self, settings: SessionSettings) -> Self {
        self.settings = settings;
        self
    }

    // --- lifecycle ---

    /// Idle -> Loading -> Running. On a playback failure the session returns
    /// to Idle and the error is surfaced.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.phase != SessionPhase::Idle {
            return Err(SessionError::NotIdle(self.phase));
        }
        self.phase = SessionPhase::Loading;
        self.clear_play_state();

        if let Err(e) = self.clock.start() {
            warn!("Session start failed: {e}");
            self.phase = SessionPhase::Idle;
            return Err(e.into());
        }

        self.phase = SessionPhase::Running;
        info!(
            "Session started: {} notes, {} lanes, duration {}us",
            self.chart.len(),
            self.chart.lane_count(),
            self.chart.duration_us()
        );
        Ok(())
    }

    /// Advance one frame. Call once per animation frame while Running.
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != SessionPhase::Running {
            return TickOutcome::Stopped;
        }

        let song_time_us = self.clock.song_time_us();
        if song_time_us > self.chart.duration_us() {
            return TickOutcome::Ended(self.finish(song_time_us));
        }

        self.drain_input(Cues::Live);
        self.render(song_time_us);
        self.scan_misses(song_time_us, Cues::Live);

        if self.phase == SessionPhase::Running {
            TickOutcome::Continue
        } else {
            TickOutcome::Stopped
        }
    }

    pub fn pause(&mut self) {
        if self.phase == SessionPhase::Running {
            self.clock.pause();
        }
    }

    pub fn resume(&mut self) {
        if self.phase == SessionPhase::Running {
            self.clock.resume();
        }
    }

    /// Stop ticking, drop pending feedback and release the audio device.
    /// A Running session goes back to Idle; an Ended one stays Ended.
    pub fn stop(&mut self) {
        if matches!(self.phase, SessionPhase::Running | SessionPhase::Loading) {
            info!("Session stopped at {}us", self.clock.song_time_us());
            self.phase = SessionPhase::Idle;
        }
        self.clock.stop();
        self.clear_feedback();
    }

    /// Stop, then clear everything a replay of the same chart needs cleared.
    pub fn reset(&mut self) {
        self.stop();
        self.clear_play_state();
        self.last_report = None;
        self.phase = SessionPhase::Idle;
    }

    fn clear_play_state(&mut self) {
        self.stats.reset();
        self.milestones.reset();
        self.chart.reset_judgments();
        self.input.clear();
        self.clear_feedback();
        self.miss_cursor = 0;
    }

    fn finish(&mut self, song_time_us: i64) -> SessionReport {
        // A long frame gap can jump straight past the end; nothing is left unjudged
        self.drain_input(Cues::Silent);
        self.scan_misses(song_time_us, Cues::Silent);

        self.phase = SessionPhase::Ended;
        let report = SessionReport::from_stats(&self.stats, self.chart.len());
        self.clock.stop();
        self.clear_feedback();
        info!(
            "Session ended: score {} max combo {} accuracy {:.2}% grade {}",
            report.score, report.max_combo, report.accuracy, report.grade
        );
        self.last_report = Some(report.clone());
        report
    }

    // --- input ---

    /// Queue an edge stamped with the current song time. Judged on the next tick.
    /// Edges arriving while paused are dropped; ones queued before the pause
    /// keep their stamp and are judged even if the draining tick is paused.
    pub fn queue_edge(&mut self, edge: InputEdge) {
        if self.phase != SessionPhase::Running || self.clock.is_paused() {
            debug!("Dropping {:?} edge from {}: not accepting input", edge.kind, edge.source);
            return;
        }
        let song_time_us = self.clock.song_time_us();
        self.input.push(edge, song_time_us);
    }

    /// Judge a press on `lane` right now, re-sampling the clock. Ignored while paused.
    pub fn handle_press(&mut self, lane: usize) -> Option<HitResult> {
        if self.clock.is_paused() {
            return None;
        }
        let song_time_us = self.clock.song_time_us();
        self.judge_press(lane, song_time_us, Cues::Live)
    }

    /// Judge an edge that was stamped at `song_time_us`. Releases are ignored.
    pub fn handle_edge(&mut self, edge: &InputEdge, song_time_us: i64) -> Option<HitResult> {
        self.judge_edge(edge, song_time_us, Cues::Live)
    }

    fn judge_edge(&mut self, edge: &InputEdge, song_time_us: i64, cues: Cues) -> Option<HitResult> {
        if !edge.is_press() {
            return None;
        }
        self.judge_press(edge.lane, song_time_us, cues)
    }

    fn drain_input(&mut self, cues: Cues) {
        if self.input.is_empty() {
            return;
        }
        let pending: Vec<StampedEdge> = self.input.drain().collect();
        for stamped in pending {
            self.judge_edge(&stamped.edge, stamped.song_time_us, cues);
        }
    }

    fn judge_press(&mut self, lane: usize, song_time_us: i64, cues: Cues) -> Option<HitResult> {
        if self.phase != SessionPhase::Running {
            return None;
        }
        if lane >= self.chart.lane_count() {
            return None;
        }

        let index = self.find_candidate(lane, song_time_us)?;
        let target_time_us = self.chart.note(index)?.target_time_us;
        if !self.chart.mark_judged(index) {
            return None;
        }

        let result = evaluate_hit(target_time_us, song_time_us);
        debug!(
            "Lane {lane} note {index}: {} ({:+}us)",
            result.rating.as_str(),
            result.offset_us
        );
        self.apply_judgment(&result, song_time_us, cues);
        Some(result)
    }

    /// Unjudged note in `lane` nearest to `song_time_us` within the Good
    /// window. Ties go to the earlier note.
    fn find_candidate(&self, lane: usize, song_time_us: i64) -> Option<usize> {
        let range = self.chart.indices_between(
            song_time_us.saturating_sub(GOOD_WINDOW_US),
            song_time_us.saturating_add(GOOD_WINDOW_US),
        );
        let notes = self.chart.notes();
        range
            .filter(|&i| notes[i].lane == lane && !notes[i].is_judged())
            .min_by_key(|&i| (notes[i].target_time_us - song_time_us).abs())
    }

    // --- judgment side effects ---

    fn apply_judgment(&mut self, result: &HitResult, song_time_us: i64, cues: Cues) {
        self.stats.process_judgment(result);
        if cues == Cues::Silent {
            return;
        }
        self.show_feedback(result.rating, song_time_us);

        if result.rating == Rating::Miss {
            self.sounds.play_miss();
            self.renderer.set_shake(self.settings.miss_shake_intensity);
            self.shaking = true;
        } else {
            self.sounds.play_hit(result.rating);
        }

        if let Some(milestone) = self.milestones.observe(self.stats.current_combo()) {
            debug!("Combo milestone {milestone}");
            self.sounds.play_combo_chime(milestone);
        }
    }

    fn show_feedback(&mut self, rating: Rating, song_time_us: i64) {
        self.feedback = Some(Feedback {
            rating,
            expires_at_us: song_time_us.saturating_add(self.settings.feedback_duration_us),
        });
    }

    fn clear_feedback(&mut self) {
        self.feedback = None;
        if self.shaking {
            self.renderer.set_shake(0.0);
            self.shaking = false;
        }
    }

    // --- per-frame passes ---

    fn render(&mut self, song_time_us: i64) {
        if self
            .feedback
            .is_some_and(|f| song_time_us >= f.expires_at_us)
        {
            self.clear_feedback();
        }

        self.collect_visible(song_time_us);

        self.renderer.clear();
        self.renderer.draw_lanes(self.chart.lane_count());
        self.renderer.draw_hit_line();
        self.renderer.draw_notes(&self.visible, song_time_us);
        self.renderer
            .draw_score(self.stats.score(), self.stats.current_combo());
        if let Some(feedback) = self.feedback {
            self.renderer.draw_feedback(feedback.rating.as_str());
        }
    }

    /// Unjudged notes with `-grace < target - song < travel`.
    fn collect_visible(&mut self, song_time_us: i64) {
        self.visible.clear();
        let range = self.chart.indices_between(
            song_time_us.saturating_sub(MISS_GRACE_WINDOW_US - 1),
            song_time_us.saturating_add(TRAVEL_DURATION_US - 1),
        );
        let notes = self.chart.notes();
        self.visible.extend(
            range
                .filter(|&i| !notes[i].is_judged())
                .map(|i| VisibleNote {
                    index: i,
                    lane: notes[i].lane,
                    target_time_us: notes[i].target_time_us,
                    time_until_hit_us: notes[i].target_time_us - song_time_us,
                }),
        );
    }

    /// Judge as Miss every unjudged note more than the late threshold behind.
    fn scan_misses(&mut self, song_time_us: i64, cues: Cues) {
        let cutoff_us = song_time_us - LATE_MISS_THRESHOLD_US;
        let end = self
            .chart
            .notes()
            .partition_point(|n| n.target_time_us < cutoff_us);

        while self
            .chart
            .note(self.miss_cursor)
            .is_some_and(|n| n.is_judged())
        {
            self.miss_cursor += 1;
        }

        for index in self.miss_cursor..end {
            let Some(note) = self.chart.note(index) else {
                break;
            };
            let target_time_us = note.target_time_us;
            if !self.chart.mark_judged(index) {
                continue;
            }
            let result = evaluate_hit(target_time_us, song_time_us);
            debug!(
                "Note {index} missed ({}us late)",
                song_time_us - target_time_us
            );
            self.apply_judgment(&result, song_time_us, cues);
        }
    }

    // --- accessors ---

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    pub fn clock(&self) -> &AudioClock<O> {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut AudioClock<O> {
        &mut self.clock
    }

    pub fn song_time_us(&self) -> i64 {
        self.clock.song_time_us()
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn sounds(&self) -> &S {
        &self.sounds
    }

    pub fn sounds_mut(&mut self) -> &mut S {
        &mut self.sounds
    }

    pub fn input_queue_mut(&mut self) -> &mut InputQueue {
        &mut self.input
    }

    /// Text of the feedback currently on screen.
    pub fn pending_feedback(&self) -> Option<&'static str> {
        self.feedback.map(|f| f.rating.as_str())
    }

    /// Report of the last finished play, until `reset()`.
    pub fn last_report(&self) -> Option<&SessionReport> {
        self.last_report.as_ref()
    }
}

impl<O: AudioOutput, R: Renderer, S: SoundEffects> Drop for Session<O, R, S> {
    fn drop(&mut self) {
        self.stop();
    }
}
