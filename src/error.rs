use std::io;
use thiserror::Error;

/// Errors surfaced by indexing and replay operations
#[derive(Debug, Error)]
pub enum ReplayError {
    /// The underlying store failed before reporting a clean end-of-log
    #[error("log read failed: {0}")]
    LogRead(#[from] io::Error),

    /// The operation requires at least one indexed event
    #[error("log index is empty")]
    EmptyIndex,

    /// The store ran out of events before the index said it should
    #[error("log ended before indexed event {0}")]
    TruncatedLog(usize),

    /// Playback factor must be positive and finite
    #[error("invalid playback factor: {0}")]
    InvalidPlaybackFactor(f64),
}
