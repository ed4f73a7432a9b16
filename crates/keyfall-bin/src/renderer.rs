use keyfall_play::{Renderer, VisibleNote};
use log::{debug, trace};

/// Headless renderer: frames go to the log instead of a screen.
#[derive(Debug, Default)]
pub struct LogRenderer {
    frames: u64,
    lane_count: usize,
    last_feedback: Option<String>,
    feedback_drawn: bool,
    shake: f32,
}

impl LogRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn shake(&self) -> f32 {
        self.shake
    }
}

impl Renderer for LogRenderer {
    fn clear(&mut self) {
        // Feedback absent for a whole frame means it expired
        if !self.feedback_drawn {
            self.last_feedback = None;
        }
        self.feedback_drawn = false;
        self.frames += 1;
    }

    fn draw_lanes(&mut self, lane_count: usize) {
        self.lane_count = lane_count;
    }

    fn draw_hit_line(&mut self) {}

    fn draw_notes(&mut self, notes: &[VisibleNote], song_time_us: i64) {
        if !log::log_enabled!(log::Level::Trace) {
            return;
        }
        let mut lanes = vec!['.'; self.lane_count];
        // Mark lanes with a note within 100ms of the hit line
        for note in notes {
            if note.time_until_hit_us.abs() <= 100_000
                && let Some(slot) = lanes.get_mut(note.lane)
            {
                *slot = '#';
            }
        }
        let lanes: String = lanes.into_iter().collect();
        trace!(
            "frame {} @{}us [{lanes}] {} visible",
            self.frames,
            song_time_us,
            notes.len()
        );
    }

    fn draw_score(&mut self, score: u64, combo: u32) {
        trace!("score {score} combo {combo}");
    }

    fn draw_feedback(&mut self, text: &str) {
        self.feedback_drawn = true;
        if self.last_feedback.as_deref() != Some(text) {
            debug!("feedback: {text}");
            self.last_feedback = Some(text.to_string());
        }
    }

    fn set_shake(&mut self, intensity: f32) {
        if intensity > 0.0 {
            debug!("shake {intensity}");
        }
        self.shake = intensity;
    }
}
