// Session loop: renders, judges input and detects misses, all against the audio clock

mod collaborators;
mod error;
pub mod recorder;
mod report;
mod session;

pub use collaborators::{Renderer, SoundEffects, VisibleNote};
pub use error::SessionError;
pub use report::SessionReport;
pub use session::{Session, SessionPhase, SessionSettings, TickOutcome};
