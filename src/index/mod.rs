pub mod builder;

pub use builder::IndexBuilder;

use crate::error::ReplayError;
use crate::store::EventLogStore;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;

/// Time index over a recorded event log
///
/// Parallel arrays: entry `i` holds the log-relative timestamp (microseconds)
/// and the byte position of the i-th event. Timestamps are non-decreasing and
/// start at 0; `timestamp_offset` has already been subtracted from every raw
/// value. Built once per log by [`IndexBuilder`] and immutable afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogIndex {
    timestamps: Vec<i64>,
    file_positions: Vec<u64>,
    timestamp_offset: i64,
}

impl LogIndex {
    /// Index a whole log with default options
    pub fn build<S: EventLogStore>(store: &mut S) -> Result<Self, ReplayError> {
        IndexBuilder::new().build(store)
    }

    /// Number of indexed events
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Log-relative timestamp of event `index`, in microseconds
    pub fn timestamp(&self, index: usize) -> i64 {
        self.timestamps[index]
    }

    /// All log-relative timestamps, in log order
    pub fn timestamps(&self) -> &[i64] {
        &self.timestamps
    }

    /// Byte position of event `index` in the store
    pub fn file_position(&self, index: usize) -> u64 {
        self.file_positions[index]
    }

    /// Raw timestamp of the first event that had one; subtracted from every
    /// stored timestamp so the index starts at relative time 0
    pub fn timestamp_offset(&self) -> i64 {
        self.timestamp_offset
    }

    /// Index of the first event at or after `timestamp` (log-relative
    /// microseconds), leftmost on ties
    ///
    /// Requests past the last event clamp to the last index. Must not be
    /// called on an empty index; callers guard with [`is_empty`](Self::is_empty).
    pub fn find_event_index(&self, timestamp: i64) -> usize {
        debug_assert!(!self.is_empty());
        let index = self.timestamps.partition_point(|&t| t < timestamp);
        index.min(self.timestamps.len() - 1)
    }

    /// Timestamp of the last indexed event, in seconds
    pub fn end_time(&self) -> Result<f64, ReplayError> {
        match self.timestamps.last() {
            Some(&t) => Ok(t as f64 * 1e-6),
            None => Err(ReplayError::EmptyIndex),
        }
    }

    /// Write the index as JSON so large logs can be indexed once and reopened
    pub fn save(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer(BufWriter::new(file), self).map_err(io::Error::from)
    }

    /// Load an index previously written by [`save`](Self::save)
    pub fn load(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::open(path)?;
        serde_json::from_reader(BufReader::new(file)).map_err(io::Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogEvent;
    use crate::store::MemoryLogStore;

    fn index_over(timestamps: &[i64]) -> LogIndex {
        let events = timestamps
            .iter()
            .enumerate()
            .map(|(i, &t)| LogEvent::new(format!("chan{}", i), t, vec![i as u8]))
            .collect();
        LogIndex::build(&mut MemoryLogStore::new(events)).unwrap()
    }

    #[test]
    fn find_event_index_clamps_and_prefers_leftmost() {
        let index = index_over(&[0, 1_000_000, 1_000_000, 2_500_000]);
        assert_eq!(index.find_event_index(-5), 0);
        assert_eq!(index.find_event_index(0), 0);
        assert_eq!(index.find_event_index(1), 1);
        // Leftmost match on ties
        assert_eq!(index.find_event_index(1_000_000), 1);
        assert_eq!(index.find_event_index(2_500_000), 3);
        // Past the end clamps to the last index
        assert_eq!(index.find_event_index(99_000_000), 3);
    }

    #[test]
    fn end_time_is_last_timestamp_in_seconds() {
        let index = index_over(&[0, 250_000, 1_500_000]);
        assert!((index.end_time().unwrap() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn save_load_round_trip() {
        let index = index_over(&[0, 250_000, 1_000_000]);
        let path = std::env::temp_dir()
            .join(format!("event-replay-index-{}.json", std::process::id()));
        index.save(&path).unwrap();
        let loaded = LogIndex::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded.timestamps(), index.timestamps());
        assert_eq!(loaded.timestamp_offset(), index.timestamp_offset());
        assert_eq!(loaded.file_position(2), index.file_position(2));
    }
}
