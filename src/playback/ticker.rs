use crate::error::ReplayError;
use crate::playback::ReplayEngine;
use crate::publish::Publisher;
use crate::store::EventLogStore;
use std::time::Duration;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::debug;

/// Wall-clock wake-up source for continuous playback
///
/// Ticks the engine at a fixed cadence, handing it the elapsed time since
/// the previous wake-up, until the engine reports playback is done. This is
/// the timer half of `start_playback`; any other driver (a UI loop, a test
/// harness) can call [`ReplayEngine::tick`] directly instead.
pub struct TickDriver {
    period: Duration,
}

impl TickDriver {
    /// Default tick cadence
    pub const DEFAULT_PERIOD: Duration = Duration::from_millis(10);

    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    /// Tick the engine until it reports playback is done
    ///
    /// Each wake-up does one bounded `tick`; the engine never blocks waiting
    /// for time to pass. Errors from a tick stop the driver and propagate.
    pub async fn run<S, P>(&self, engine: &mut ReplayEngine<S, P>) -> Result<(), ReplayError>
    where
        S: EventLogStore,
        P: Publisher,
    {
        let mut ticks = interval(self.period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut last = Instant::now();
        loop {
            let now = ticks.tick().await;
            let elapsed = now - last;
            last = now;

            if !engine.tick(elapsed)? {
                debug!("tick driver finished");
                return Ok(());
            }
        }
    }
}

impl Default for TickDriver {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PERIOD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogEvent;
    use crate::index::LogIndex;
    use crate::playback::PlaybackState;
    use crate::publish::MemoryPublisher;
    use crate::store::MemoryLogStore;

    #[tokio::test]
    async fn drives_playback_to_completion() {
        let events: Vec<LogEvent> = [0i64, 1_000_000, 2_500_000]
            .iter()
            .enumerate()
            .map(|(i, &t)| LogEvent::new(format!("chan{}", i), t, vec![i as u8]))
            .collect();
        let mut store = MemoryLogStore::new(events);
        let index = LogIndex::build(&mut store).unwrap();
        let mut engine = ReplayEngine::new(store, MemoryPublisher::new(), index);

        // 2.5s of log time at 1000x finishes within a few wall-clock ticks
        engine.set_playback_factor(1000.0).unwrap();
        let end = engine.end_time().unwrap();
        engine.start_playback(0.0, end).unwrap();

        TickDriver::new(Duration::from_millis(1))
            .run(&mut engine)
            .await
            .unwrap();

        assert_eq!(engine.state(), PlaybackState::Idle);
        assert_eq!(engine.publisher_mut().take_published().len(), 3);
    }

    #[tokio::test]
    async fn returns_immediately_for_an_idle_engine() {
        let mut store = MemoryLogStore::new(vec![LogEvent::new("chan0", 0, vec![0])]);
        let index = LogIndex::build(&mut store).unwrap();
        let mut engine = ReplayEngine::new(store, MemoryPublisher::new(), index);

        // No start_playback: the first tick observes the idle state
        TickDriver::default().run(&mut engine).await.unwrap();
        assert!(engine.publisher_mut().take_published().is_empty());
    }
}
