use anyhow::{Context, Result};
use event_replay::{ConsolePublisher, FileLogStore, IndexBuilder, ReplayEngine, TickDriver};
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .context("usage: event-replay <log file> [start-seconds] [speed]")?;
    let start_time: f64 = args
        .next()
        .map(|s| s.parse())
        .transpose()
        .context("start time must be a number of seconds")?
        .unwrap_or(0.0);
    let speed: f64 = args
        .next()
        .map(|s| s.parse())
        .transpose()
        .context("speed must be a number")?
        .unwrap_or(1.0);

    info!("reading {}", path);
    let mut store =
        FileLogStore::open(&path).with_context(|| format!("failed to open {}", path))?;

    let index = IndexBuilder::new()
        .progress_fn(|t| {
            info!("indexing... {:.0}s", t);
            true
        })
        .build(&mut store)
        .context("failed to index log")?;

    let mut engine = ReplayEngine::new(store, ConsolePublisher, index);
    engine.set_playback_factor(speed)?;

    let end_time = engine.end_time().context("log contains no events")?;
    info!(
        "indexed {} events covering {:.3}s of log time",
        engine.index().len(),
        end_time
    );

    engine.start_playback(start_time, end_time - start_time)?;
    TickDriver::new(Duration::from_millis(10))
        .run(&mut engine)
        .await?;

    info!("replay finished");
    Ok(())
}
