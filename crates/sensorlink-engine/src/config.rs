//! Link configuration.

use sensorlink_capture::QueueConfig;
use serde::{Deserialize, Serialize};

use crate::DEFAULT_UPDATE_INTERVAL_SECS;

/// Settings for one producer/consumer pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Device name of the producer, used for thread names and logs.
    pub producer_name: String,

    /// Device name of the consumer.
    pub consumer_name: String,

    /// Interval requested when an interval feed is started without one.
    pub update_interval_secs: f64,

    /// Camera request queue.
    pub queue: QueueConfig,
}

impl LinkConfig {
    /// Parse a configuration; missing fields take their defaults.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            producer_name: "producer".to_string(),
            consumer_name: "consumer".to_string(),
            update_interval_secs: DEFAULT_UPDATE_INTERVAL_SECS,
            queue: QueueConfig::default(),
        }
    }
}
