//! Sensor feeds, camera feed and error reporting for SensorLink.
//!
//! This crate builds the producer and consumer behavior on top of the
//! channel registry: toggleable sensor feeds, the camera feed backed by
//! the exclusive capture queue, and the shared error channel.

mod camera;
mod catalog;
mod config;
mod consumer;
mod error;
mod error_channel;
mod feed;
mod metrics;
mod producer;
mod remote;

#[cfg(test)]
mod test_support;

pub use camera::{CameraFeed, CaptureObserver};
pub use catalog::{
    feed_for_enable, BatteryReading, ACCELEROMETER, ALL_FEEDS, BATTERY, DEVICE_MOTION, GYRO,
    HEADING, LOCATION, MAGNETOMETER, THERMAL,
};
pub use config::LinkConfig;
pub use consumer::Consumer;
pub use error::FeedError;
pub use error_channel::ErrorChannel;
pub use feed::{
    FeedDescriptor, FeedHandle, FeedSample, FeedSource, SampleCallback, ToggleState,
    ToggleableFeed,
};
pub use metrics::{FeedMetrics, FeedMetricsSnapshot};
pub use producer::Producer;
pub use remote::{CameraRemote, FeedRemote};

/// Update interval sent when an interval feed is started without one.
pub const DEFAULT_UPDATE_INTERVAL_SECS: f64 = 0.1;

/// Result type for feed operations.
pub type FeedResult<T> = Result<T, FeedError>;
