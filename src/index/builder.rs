use crate::core::LogEvent;
use crate::error::ReplayError;
use crate::index::LogIndex;
use crate::store::EventLogStore;
use tracing::debug;

/// Derives an event's timestamp from its content; `None` means the event has
/// no timestamp of its own and inherits its predecessor's
pub type EventTimeFn<'a> = Box<dyn FnMut(&LogEvent) -> Option<i64> + 'a>;

/// Called at most once per log-second of indexing progress with the current
/// log-relative time; returning `false` stops indexing and keeps the partial
/// index
pub type ProgressFn<'a> = Box<dyn FnMut(f64) -> bool + 'a>;

/// One-pass log scanner producing a [`LogIndex`]
///
/// Each record's byte position is captured before it is read. Raw timestamps
/// come from the record itself unless an event-time callback overrides them;
/// events without a derivable timestamp inherit the previous event's resolved
/// timestamp. The first defined timestamp fixes the offset that normalizes
/// the index to start at relative time 0.
#[derive(Default)]
pub struct IndexBuilder<'a> {
    event_time_fn: Option<EventTimeFn<'a>>,
    progress_fn: Option<ProgressFn<'a>>,
}

impl<'a> IndexBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive timestamps from event content instead of the record header
    pub fn event_time_fn(mut self, f: impl FnMut(&LogEvent) -> Option<i64> + 'a) -> Self {
        self.event_time_fn = Some(Box::new(f));
        self
    }

    /// Report progress once per log-second; return `false` to stop early
    pub fn progress_fn(mut self, f: impl FnMut(f64) -> bool + 'a) -> Self {
        self.progress_fn = Some(Box::new(f));
        self
    }

    /// Scan the store to end-of-log (or early abort), recording each event's
    /// byte position and log-relative timestamp
    ///
    /// An empty log yields an empty index. A store read failure aborts the
    /// build with [`ReplayError::LogRead`]; no partial index is returned in
    /// that case.
    pub fn build<S: EventLogStore>(mut self, store: &mut S) -> Result<LogIndex, ReplayError> {
        let mut timestamps = Vec::new();
        let mut file_positions = Vec::new();
        let mut timestamp_offset = 0i64;
        let mut offset_defined = false;
        let mut last_timestamp = 0i64;
        let mut next_progress_time = 0.0f64;

        loop {
            let position = store.tell()?;
            let event = match store.read_next_event()? {
                Some(event) => event,
                None => break,
            };

            let raw = match &mut self.event_time_fn {
                Some(f) => f(&event),
                None => Some(event.timestamp),
            };

            // Events with no derivable timestamp inherit their predecessor's
            // (an event before any defined timestamp resolves to 0); the
            // first defined timestamp fixes the offset.
            let resolved = match raw {
                Some(t) => {
                    if !offset_defined {
                        timestamp_offset = t;
                        offset_defined = true;
                    }
                    t
                }
                None => last_timestamp,
            };
            last_timestamp = resolved;
            let timestamp = resolved - timestamp_offset;

            if let Some(f) = &mut self.progress_fn {
                let progress_time = timestamp as f64 * 1e-6;
                if progress_time >= next_progress_time {
                    next_progress_time += 1.0;
                    if !f(progress_time) {
                        debug!(
                            "index build stopped by progress callback after {} events",
                            timestamps.len()
                        );
                        break;
                    }
                }
            }

            file_positions.push(position);
            timestamps.push(timestamp);
        }

        debug!(
            "built log index: {} events, timestamp offset {}",
            timestamps.len(),
            timestamp_offset
        );

        Ok(LogIndex {
            timestamps,
            file_positions,
            timestamp_offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryLogStore;

    fn store(timestamps: &[i64]) -> MemoryLogStore {
        MemoryLogStore::new(
            timestamps
                .iter()
                .enumerate()
                .map(|(i, &t)| LogEvent::new(format!("chan{}", i), t, vec![i as u8]))
                .collect(),
        )
    }

    #[test]
    fn parallel_arrays_stay_in_lockstep() {
        let index = LogIndex::build(&mut store(&[100, 250, 400])).unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.timestamps().len(), 3);
        assert!(index.timestamps().windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn offset_normalizes_first_timestamp_to_zero() {
        let index = LogIndex::build(&mut store(&[5_000_000, 5_500_000, 7_000_000])).unwrap();
        assert_eq!(index.timestamp_offset(), 5_000_000);
        assert_eq!(index.timestamps(), &[0, 500_000, 2_000_000]);
    }

    #[test]
    fn empty_log_yields_empty_index() {
        let index = LogIndex::build(&mut MemoryLogStore::new(Vec::new())).unwrap();
        assert!(index.is_empty());
        assert!(matches!(index.end_time(), Err(ReplayError::EmptyIndex)));
    }

    #[test]
    fn event_time_fn_overrides_record_timestamp() {
        let index = IndexBuilder::new()
            .event_time_fn(|event| Some(event.timestamp * 2))
            .build(&mut store(&[10, 20, 30]))
            .unwrap();
        assert_eq!(index.timestamp_offset(), 20);
        assert_eq!(index.timestamps(), &[0, 20, 40]);
    }

    #[test]
    fn undefined_timestamp_inherits_predecessor() {
        let index = IndexBuilder::new()
            .event_time_fn(|event| {
                if event.channel == "chan1" {
                    None
                } else {
                    Some(event.timestamp)
                }
            })
            .build(&mut store(&[1_000_000, 2_000_000, 3_000_000]))
            .unwrap();
        assert_eq!(index.timestamps(), &[0, 0, 2_000_000]);
    }

    #[test]
    fn leading_undefined_timestamps_land_at_zero() {
        // No predecessor to inherit from; the offset is fixed by the first
        // defined timestamp.
        let index = IndexBuilder::new()
            .event_time_fn(|event| {
                if event.channel == "chan0" {
                    None
                } else {
                    Some(event.timestamp)
                }
            })
            .build(&mut store(&[9, 4_000_000, 5_000_000]))
            .unwrap();
        assert_eq!(index.timestamp_offset(), 4_000_000);
        assert_eq!(index.timestamps(), &[0, 0, 1_000_000]);
    }

    #[test]
    fn progress_is_rate_limited_to_log_seconds() {
        // 10 events over 4.5s of log time: one call per whole second
        let timestamps: Vec<i64> = (0..10).map(|i| i * 500_000).collect();
        let mut calls = Vec::new();
        let index = IndexBuilder::new()
            .progress_fn(|t| {
                calls.push(t);
                true
            })
            .build(&mut store(&timestamps))
            .unwrap();
        assert_eq!(index.len(), 10);
        assert_eq!(calls.len(), 5);
        for (call, expected) in calls.iter().zip([0.0, 1.0, 2.0, 3.0, 4.0]) {
            assert!((call - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn progress_abort_keeps_partial_index() {
        // 11 events, one per log-second; stop once progress reaches 5s. The
        // event that triggered the rejected callback is not kept.
        let timestamps: Vec<i64> = (0..=10).map(|i| i * 1_000_000).collect();
        let index = IndexBuilder::new()
            .progress_fn(|t| t < 5.0)
            .build(&mut store(&timestamps))
            .unwrap();
        assert_eq!(index.len(), 5);
        assert!((index.end_time().unwrap() - 4.0).abs() < 1e-6);
    }

    #[test]
    fn read_failure_surfaces_log_read_error() {
        let mut failing = store(&[0, 1, 2]).fail_after(2);
        let err = LogIndex::build(&mut failing).unwrap_err();
        assert!(matches!(err, ReplayError::LogRead(_)));
    }
}
