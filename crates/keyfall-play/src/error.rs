use keyfall_timing::ClockError;

use crate::session::SessionPhase;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session can only start from Idle (current phase: {0:?})")]
    NotIdle(SessionPhase),
    /// The audio device could not be opened; the session is back in Idle.
    #[error(transparent)]
    PlaybackUnavailable(#[from] ClockError),
}
