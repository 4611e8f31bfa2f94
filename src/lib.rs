//! Timed replay of recorded pub/sub event logs.
//!
//! A recorded log is scanned once into a [`LogIndex`] (parallel timestamps
//! and byte positions, normalized to start at relative time 0), then a
//! [`ReplayEngine`] seeks to arbitrary playback positions and republishes
//! events through an injected [`Publisher`] at a chosen speed. Continuous
//! playback is cooperative: an external wake-up source such as [`TickDriver`]
//! calls `tick(elapsed)` until the engine reports that the session boundary
//! has been reached.

pub mod core;
pub mod error;
pub mod index;
pub mod playback;
pub mod publish;
pub mod store;

pub use crate::core::LogEvent;
pub use crate::error::ReplayError;
pub use crate::index::{IndexBuilder, LogIndex};
pub use crate::playback::{PlaybackState, ReplayEngine, TickDriver};
pub use crate::publish::{ConsolePublisher, MemoryPublisher, Publisher};
pub use crate::store::{EventLogStore, FileLogStore, MemoryLogStore};
