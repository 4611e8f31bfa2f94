pub mod file;
pub mod memory;

pub use file::FileLogStore;
pub use memory::MemoryLogStore;

use crate::core::LogEvent;
use std::io;

/// Sequential and random access over a recorded event log
///
/// The on-disk format is owned by the implementation; the replay core only
/// needs byte positions it can hand back to `seek`. Implementations:
/// - [`FileLogStore`] for framed log files on disk
/// - [`MemoryLogStore`] for tests and simulation
pub trait EventLogStore {
    /// Current read position in bytes
    fn tell(&mut self) -> io::Result<u64>;

    /// Read the next event, or `None` at a clean end-of-log
    fn read_next_event(&mut self) -> io::Result<Option<LogEvent>>;

    /// Reposition the read cursor to a byte position previously returned by
    /// [`tell`](Self::tell)
    fn seek(&mut self, position: u64) -> io::Result<()>;
}
