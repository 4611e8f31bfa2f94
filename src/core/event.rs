use serde::{Deserialize, Serialize};

/// A single recorded pub/sub message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    /// Channel the event was originally published on
    pub channel: String,

    /// Original timestamp in microseconds
    pub timestamp: i64,

    /// Raw payload bytes, opaque to the replay core
    pub payload: Vec<u8>,
}

impl LogEvent {
    /// Create a new log event
    pub fn new(channel: impl Into<String>, timestamp: i64, payload: Vec<u8>) -> Self {
        Self {
            channel: channel.into(),
            timestamp,
            payload,
        }
    }

    /// Get the timestamp in seconds
    pub fn timestamp_seconds(&self) -> f64 {
        self.timestamp as f64 * 1e-6
    }
}
