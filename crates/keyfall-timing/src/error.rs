use std::path::PathBuf;

use thiserror::Error;

/// Failures reported by an [`AudioOutput`](crate::AudioOutput) implementation.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("audio device unavailable: {0}")]
    Unavailable(String),

    #[error("failed to load song audio {}: {reason}", .path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("failed to release audio device: {0}")]
    Teardown(String),
}

/// Errors surfaced by [`AudioClock`](crate::AudioClock).
///
/// Teardown failures never appear here: `stop()` logs and swallows them.
#[derive(Debug, Error)]
pub enum ClockError {
    #[error("playback unavailable")]
    PlaybackUnavailable(#[source] OutputError),
}
