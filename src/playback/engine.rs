use crate::error::ReplayError;
use crate::index::LogIndex;
use crate::playback::PlaybackState;
use crate::publish::Publisher;
use crate::store::EventLogStore;
use std::time::Duration;
use tracing::debug;

const MICROS_PER_SECOND: f64 = 1e6;

/// Replay engine over an indexed event log
///
/// Owns the playback cursor: `next_event_index` points at the next event not
/// yet published, with the store's read position kept just before it. Seeking
/// repositions the cursor without publishing; advancing reads events from the
/// store and republishes them through the injected publisher, including the
/// event that straddles the time budget.
///
/// Continuous playback is cooperative: `start_playback` fixes a session
/// boundary and enters `Playing`, and an external wake-up source (such as
/// [`TickDriver`](crate::playback::TickDriver)) calls [`tick`](Self::tick)
/// until it reports `false`. The engine never blocks waiting for time to
/// pass. Not safe for concurrent seek/advance on the same instance; the
/// store's cursor and `next_event_index` move together.
pub struct ReplayEngine<S, P> {
    store: S,
    publisher: P,
    index: LogIndex,
    next_event_index: usize,
    playback_factor: f64,
    state: PlaybackState,
    end_timestamp: i64,
}

impl<S: EventLogStore, P: Publisher> ReplayEngine<S, P> {
    /// Create an engine over a store and the index built from it
    pub fn new(store: S, publisher: P, index: LogIndex) -> Self {
        Self {
            store,
            publisher,
            index,
            next_event_index: 0,
            playback_factor: 1.0,
            state: PlaybackState::Idle,
            end_timestamp: 0,
        }
    }

    /// Index of the next event not yet published; equals the index length
    /// once the end of the log is reached
    pub fn next_event_index(&self) -> usize {
        self.next_event_index
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn index(&self) -> &LogIndex {
        &self.index
    }

    /// The injected publisher, for callers that need to inspect or reuse it
    pub fn publisher_mut(&mut self) -> &mut P {
        &mut self.publisher
    }

    /// Speed multiplier applied to elapsed time during continuous playback
    pub fn playback_factor(&self) -> f64 {
        self.playback_factor
    }

    /// Set the playback speed; must be positive and finite
    pub fn set_playback_factor(&mut self, factor: f64) -> Result<(), ReplayError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(ReplayError::InvalidPlaybackFactor(factor));
        }
        self.playback_factor = factor;
        Ok(())
    }

    /// Timestamp of the last indexed event, in seconds
    pub fn end_time(&self) -> Result<f64, ReplayError> {
        self.index.end_time()
    }

    /// Place the cursor just before the first event at or after `play_time`
    /// seconds
    ///
    /// Publishes nothing. Requests past the end of the log clamp to the last
    /// event.
    pub fn seek(&mut self, play_time: f64) -> Result<(), ReplayError> {
        if self.index.is_empty() {
            return Err(ReplayError::EmptyIndex);
        }
        let index = self.index.find_event_index(micros(play_time));
        self.store.seek(self.index.file_position(index))?;
        self.next_event_index = index;
        Ok(())
    }

    /// Publish events from the cursor until `play_length` log-relative
    /// seconds past the current event have been covered
    ///
    /// The event that straddles the budget is still published. A no-op once
    /// the end of the log has been reached. The cursor must have been placed
    /// by a prior [`seek`](Self::seek).
    pub fn advance(&mut self, play_length: f64) -> Result<(), ReplayError> {
        let num_events = self.index.len();
        if self.next_event_index >= num_events {
            return Ok(());
        }

        let end_timestamp = self.index.timestamp(self.next_event_index) + micros(play_length);

        loop {
            let event = self
                .store
                .read_next_event()?
                .ok_or(ReplayError::TruncatedLog(self.next_event_index))?;
            self.next_event_index += 1;

            self.publisher.publish(&event.channel, &event.payload);

            if self.next_event_index >= num_events
                || self.index.timestamp(self.next_event_index) > end_timestamp
            {
                return Ok(());
            }
        }
    }

    /// Seek to `time` seconds and immediately publish the events within
    /// `play_length` seconds of it (scrubbing)
    pub fn seek_and_advance(&mut self, time: f64, play_length: f64) -> Result<(), ReplayError> {
        self.seek(time)?;
        self.advance(play_length)
    }

    /// Begin continuous playback of `play_length` seconds starting at
    /// `start_time`
    ///
    /// The session boundary is fixed here, in log-relative time measured from
    /// the first event at or after `start_time`. External wake-ups then drive
    /// [`tick`](Self::tick) until it reports `false`.
    pub fn start_playback(&mut self, start_time: f64, play_length: f64) -> Result<(), ReplayError> {
        self.seek(start_time)?;
        self.end_timestamp = self.index.timestamp(self.next_event_index) + micros(play_length);
        self.state = PlaybackState::Playing;
        debug!("playback started at {:.3}s for {:.3}s", start_time, play_length);
        Ok(())
    }

    /// One continuous-playback wake-up
    ///
    /// Advances by wall-clock `elapsed` scaled by the playback factor, then
    /// reports whether the driver should keep ticking. Returns `Ok(false)`
    /// when idle, or once the session boundary or the end of the log is
    /// reached (transitioning to idle).
    pub fn tick(&mut self, elapsed: Duration) -> Result<bool, ReplayError> {
        if self.state != PlaybackState::Playing {
            return Ok(false);
        }

        self.advance(elapsed.as_secs_f64() * self.playback_factor)?;

        let more = self.next_event_index < self.index.len()
            && self.index.timestamp(self.next_event_index) <= self.end_timestamp;
        if !more {
            self.state = PlaybackState::Idle;
            debug!("playback finished at event {}", self.next_event_index);
        }
        Ok(more)
    }

    /// Stop continuous playback
    ///
    /// Idempotent. A running driver observes the idle state on its next
    /// wake-up and exits.
    pub fn stop(&mut self) {
        if self.state != PlaybackState::Idle {
            debug!("playback stopped at event {}", self.next_event_index);
        }
        self.state = PlaybackState::Idle;
    }
}

/// Seconds to whole microseconds
fn micros(seconds: f64) -> i64 {
    (seconds * MICROS_PER_SECOND) as i64
}
