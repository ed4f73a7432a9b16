//! Recording collaborators for tests and benchmarks. No window or audio device needed.

use keyfall_rule::Rating;

use crate::collaborators::{Renderer, SoundEffects, VisibleNote};

/// Recorded renderer call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Lanes(usize),
    HitLine,
    Notes {
        notes: Vec<VisibleNote>,
        song_time_us: i64,
    },
    Score {
        score: u64,
        combo: u32,
    },
    Feedback(String),
    Shake(f32),
}

/// Renderer that records every call.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    commands: Vec<DrawCommand>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded commands.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Clear recorded commands.
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Number of frames drawn (one `Clear` per frame).
    pub fn frame_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Clear))
            .count()
    }

    /// Commands from the most recent `Clear` onwards.
    pub fn last_frame(&self) -> &[DrawCommand] {
        let start = self
            .commands
            .iter()
            .rposition(|c| matches!(c, DrawCommand::Clear))
            .unwrap_or(0);
        &self.commands[start..]
    }

    /// Notes drawn in the most recent frame.
    pub fn last_visible_notes(&self) -> Vec<VisibleNote> {
        self.last_frame()
            .iter()
            .find_map(|c| match c {
                DrawCommand::Notes { notes, .. } => Some(notes.clone()),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// Feedback text drawn in the most recent frame.
    pub fn last_feedback(&self) -> Option<&str> {
        self.last_frame().iter().find_map(|c| match c {
            DrawCommand::Feedback(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// Latest shake intensity set, if any.
    pub fn current_shake(&self) -> Option<f32> {
        self.commands.iter().rev().find_map(|c| match c {
            DrawCommand::Shake(v) => Some(*v),
            _ => None,
        })
    }
}

impl Renderer for RecordingRenderer {
    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn draw_lanes(&mut self, lane_count: usize) {
        self.commands.push(DrawCommand::Lanes(lane_count));
    }

    fn draw_hit_line(&mut self) {
        self.commands.push(DrawCommand::HitLine);
    }

    fn draw_notes(&mut self, notes: &[VisibleNote], song_time_us: i64) {
        self.commands.push(DrawCommand::Notes {
            notes: notes.to_vec(),
            song_time_us,
        });
    }

    fn draw_score(&mut self, score: u64, combo: u32) {
        self.commands.push(DrawCommand::Score { score, combo });
    }

    fn draw_feedback(&mut self, text: &str) {
        self.commands.push(DrawCommand::Feedback(text.to_string()));
    }

    fn set_shake(&mut self, intensity: f32) {
        self.commands.push(DrawCommand::Shake(intensity));
    }
}

/// Recorded sound cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    Hit(Rating),
    Miss,
    ComboChime(u32),
}

/// Sound effects that record every cue.
#[derive(Debug, Default)]
pub struct RecordingSounds {
    cues: Vec<SoundCue>,
}

impl RecordingSounds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cues(&self) -> &[SoundCue] {
        &self.cues
    }

    pub fn chimes(&self) -> Vec<u32> {
        self.cues
            .iter()
            .filter_map(|c| match c {
                SoundCue::ComboChime(combo) => Some(*combo),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.cues.clear();
    }
}

impl SoundEffects for RecordingSounds {
    fn play_hit(&mut self, rating: Rating) {
        self.cues.push(SoundCue::Hit(rating));
    }

    fn play_miss(&mut self) {
        self.cues.push(SoundCue::Miss);
    }

    fn play_combo_chime(&mut self, combo: u32) {
        self.cues.push(SoundCue::ComboChime(combo));
    }
}
