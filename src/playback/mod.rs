pub mod engine;
pub mod ticker;

pub use engine::ReplayEngine;
pub use ticker::TickDriver;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// No continuous playback active
    Idle,
    /// Continuous playback active, driven by external wake-ups
    Playing,
}
