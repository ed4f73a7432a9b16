use std::fmt;

/// Physical origin of an input edge.
///
/// Concurrent presses from different sources stay distinguishable, which is
/// what lets two fingers on two lanes register independently.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InputSource {
    /// Keyboard key, by key name (e.g. "d", "ArrowLeft").
    Keyboard(String),
    /// Touch point, by pointer identifier.
    Touch(u64),
    /// Scripted autoplay input for a lane.
    Script(usize),
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyboard(key) => write!(f, "key:{key}"),
            Self::Touch(id) => write!(f, "touch:{id}"),
            Self::Script(lane) => write!(f, "script:{lane}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    Press,
    Release,
}

/// A single debounced down or up transition on a lane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEdge {
    pub source: InputSource,
    pub lane: usize,
    pub kind: EdgeKind,
}

impl InputEdge {
    pub fn press(source: InputSource, lane: usize) -> Self {
        Self {
            source,
            lane,
            kind: EdgeKind::Press,
        }
    }

    pub fn release(source: InputSource, lane: usize) -> Self {
        Self {
            source,
            lane,
            kind: EdgeKind::Release,
        }
    }

    pub fn is_press(&self) -> bool {
        self.kind == EdgeKind::Press
    }
}
