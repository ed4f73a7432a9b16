/// Combo counts that trigger a celebration cue.
pub const COMBO_MILESTONES: [u32; 4] = [10, 20, 50, 100];

/// Tracks which combo milestones have already fired.
///
/// Each milestone fires at most once per streak; every milestone re-arms
/// once the combo drops back to zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComboMilestones {
    fired: [bool; COMBO_MILESTONES.len()],
}

impl ComboMilestones {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe the current combo after a judgment. Returns the milestone
    /// reached, if one fires now.
    pub fn observe(&mut self, combo: u32) -> Option<u32> {
        if combo == 0 {
            self.reset();
            return None;
        }
        let idx = COMBO_MILESTONES.iter().position(|&m| m == combo)?;
        if self.fired[idx] {
            return None;
        }
        self.fired[idx] = true;
        Some(combo)
    }

    pub fn reset(&mut self) {
        self.fired = [false; COMBO_MILESTONES.len()];
    }
}
