use tracing::debug;

/// Pub/sub transport the engine republishes events through
///
/// Publishing is fire-and-forget; the replay core never consults a result.
/// Engines take their publisher explicitly, there is no process-wide default
/// transport.
pub trait Publisher {
    fn publish(&mut self, channel: &str, payload: &[u8]);
}

/// Capturing publisher for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryPublisher {
    published: Vec<(String, Vec<u8>)>,
}

impl MemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Channels and payloads published so far, in order
    pub fn published(&self) -> &[(String, Vec<u8>)] {
        &self.published
    }

    /// Drain everything published so far (for verification)
    pub fn take_published(&mut self) -> Vec<(String, Vec<u8>)> {
        std::mem::take(&mut self.published)
    }
}

impl Publisher for MemoryPublisher {
    fn publish(&mut self, channel: &str, payload: &[u8]) {
        self.published.push((channel.to_string(), payload.to_vec()));
    }
}

/// Publisher that logs each event instead of sending it anywhere; used by
/// the CLI player
#[derive(Debug, Default)]
pub struct ConsolePublisher;

impl Publisher for ConsolePublisher {
    fn publish(&mut self, channel: &str, payload: &[u8]) {
        debug!("publish {} ({} bytes)", channel, payload.len());
    }
}
