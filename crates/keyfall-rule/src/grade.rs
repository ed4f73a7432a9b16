use serde::{Deserialize, Serialize};

/// Letter grade derived from accuracy (0.0 - 100.0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    S,
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Calculate grade from accuracy.
    pub fn from_accuracy(accuracy: f64) -> Self {
        if accuracy >= 95.0 {
            Self::S
        } else if accuracy >= 90.0 {
            Self::A
        } else if accuracy >= 80.0 {
            Self::B
        } else if accuracy >= 70.0 {
            Self::C
        } else if accuracy >= 60.0 {
            Self::D
        } else {
            Self::F
        }
    }

    /// Get the display string for this grade.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S => "S",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
