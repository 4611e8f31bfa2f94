use crate::core::LogEvent;
use crate::store::EventLogStore;
use std::io;

/// Bytes a record header occupies in the framed file format
const RECORD_HEADER_LEN: u64 = 28;

/// In-memory event log for tests and simulation
///
/// Byte positions are synthesized from the framed size each record would
/// occupy on disk, so indexes built over this store look like real ones.
/// Read failures can be injected to exercise error paths.
pub struct MemoryLogStore {
    events: Vec<LogEvent>,
    offsets: Vec<u64>,
    end_offset: u64,
    cursor: usize,
    fail_after: Option<usize>,
    reads: usize,
}

impl MemoryLogStore {
    /// Create a store over the given events, in log order
    pub fn new(events: Vec<LogEvent>) -> Self {
        let mut offsets = Vec::with_capacity(events.len());
        let mut position = 0u64;
        for event in &events {
            offsets.push(position);
            position +=
                RECORD_HEADER_LEN + event.channel.len() as u64 + event.payload.len() as u64;
        }
        Self {
            events,
            offsets,
            end_offset: position,
            cursor: 0,
            fail_after: None,
            reads: 0,
        }
    }

    /// Make the store report an I/O error after `reads` successful reads
    pub fn fail_after(mut self, reads: usize) -> Self {
        self.fail_after = Some(reads);
        self
    }
}

impl EventLogStore for MemoryLogStore {
    fn tell(&mut self) -> io::Result<u64> {
        Ok(self
            .offsets
            .get(self.cursor)
            .copied()
            .unwrap_or(self.end_offset))
    }

    fn read_next_event(&mut self) -> io::Result<Option<LogEvent>> {
        if let Some(limit) = self.fail_after {
            if self.reads >= limit {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    "injected read failure",
                ));
            }
        }

        let event = self.events.get(self.cursor).cloned();
        if event.is_some() {
            self.cursor += 1;
            self.reads += 1;
        }
        Ok(event)
    }

    fn seek(&mut self, position: u64) -> io::Result<()> {
        if position == self.end_offset {
            self.cursor = self.events.len();
            return Ok(());
        }
        match self.offsets.binary_search(&position) {
            Ok(index) => {
                self.cursor = index;
                Ok(())
            }
            Err(_) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("no record starts at byte {}", position),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events() -> Vec<LogEvent> {
        vec![
            LogEvent::new("pose", 100, vec![1]),
            LogEvent::new("camera", 200, vec![2, 3]),
            LogEvent::new("pose", 300, vec![]),
        ]
    }

    #[test]
    fn reads_in_order_then_reports_end_of_log() {
        let mut store = MemoryLogStore::new(events());
        assert_eq!(store.read_next_event().unwrap().unwrap().timestamp, 100);
        assert_eq!(store.read_next_event().unwrap().unwrap().timestamp, 200);
        assert_eq!(store.read_next_event().unwrap().unwrap().timestamp, 300);
        assert!(store.read_next_event().unwrap().is_none());
    }

    #[test]
    fn tell_and_seek_round_trip() {
        let mut store = MemoryLogStore::new(events());
        store.read_next_event().unwrap();
        let second_pos = store.tell().unwrap();
        store.read_next_event().unwrap();
        store.read_next_event().unwrap();

        store.seek(second_pos).unwrap();
        assert_eq!(store.read_next_event().unwrap().unwrap().timestamp, 200);
    }

    #[test]
    fn seek_to_unknown_position_is_an_error() {
        let mut store = MemoryLogStore::new(events());
        assert!(store.seek(7).is_err());
    }

    #[test]
    fn injected_failure_surfaces_as_io_error() {
        let mut store = MemoryLogStore::new(events()).fail_after(1);
        assert!(store.read_next_event().is_ok());
        assert!(store.read_next_event().is_err());
    }
}
