use keyfall_model::TRAVEL_DURATION_US;
use keyfall_rule::Rating;

/// A note inside the visible travel window for this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleNote {
    /// Index into the chart's note list.
    pub index: usize,
    pub lane: usize,
    pub target_time_us: i64,
    /// `target - song`. Positive while approaching, negative once past the hit line.
    pub time_until_hit_us: i64,
}

impl VisibleNote {
    /// Travel progress: 0.0 when the note enters at the top, 1.0 at the hit
    /// line, above 1.0 once it has passed.
    pub fn progress(&self) -> f64 {
        1.0 - self.time_until_hit_us as f64 / TRAVEL_DURATION_US as f64
    }
}

/// Drawing surface driven by the session every Running tick.
///
/// Calls arrive in a fixed order per frame: `clear`, `draw_lanes`,
/// `draw_hit_line`, `draw_notes`, `draw_score`, then `draw_feedback` when
/// feedback is pending. `set_shake` may arrive at any point.
pub trait Renderer {
    fn clear(&mut self);
    fn draw_lanes(&mut self, lane_count: usize);
    fn draw_hit_line(&mut self);
    fn draw_notes(&mut self, notes: &[VisibleNote], song_time_us: i64);
    fn draw_score(&mut self, score: u64, combo: u32);
    fn draw_feedback(&mut self, text: &str);
    fn set_shake(&mut self, intensity: f32);
}

/// Fire-and-forget sound cues.
pub trait SoundEffects {
    fn play_hit(&mut self, rating: Rating);
    fn play_miss(&mut self);
    fn play_combo_chime(&mut self, combo: u32);
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn clear(&mut self) {
        (**self).clear()
    }

    fn draw_lanes(&mut self, lane_count: usize) {
        (**self).draw_lanes(lane_count)
    }

    fn draw_hit_line(&mut self) {
        (**self).draw_hit_line()
    }

    fn draw_notes(&mut self, notes: &[VisibleNote], song_time_us: i64) {
        (**self).draw_notes(notes, song_time_us)
    }

    fn draw_score(&mut self, score: u64, combo: u32) {
        (**self).draw_score(score, combo)
    }

    fn draw_feedback(&mut self, text: &str) {
        (**self).draw_feedback(text)
    }

    fn set_shake(&mut self, intensity: f32) {
        (**self).set_shake(intensity)
    }
}

impl<S: SoundEffects + ?Sized> SoundEffects for Box<S> {
    fn play_hit(&mut self, rating: Rating) {
        (**self).play_hit(rating)
    }

    fn play_miss(&mut self) {
        (**self).play_miss()
    }

    fn play_combo_chime(&mut self, combo: u32) {
        (**self).play_combo_chime(combo)
    }
}
