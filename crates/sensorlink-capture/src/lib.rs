//! Serialized access to an exclusive capture device.
//!
//! This crate provides [`ExclusiveRequestQueue`], a FIFO of capture requests
//! drained by a single worker thread that keeps at most one capture in
//! flight and gates on camera authorization.

mod authorization;
mod backend;
mod error;
mod queue;

pub use authorization::{AccessCallback, Availability, AuthorizationSource, FixedAuthorization};
pub use backend::{CaptureBackend, CaptureCallback, CaptureSink, PrepareCallback};
pub use error::CaptureError;
pub use queue::{ExclusiveRequestQueue, QueueStats};

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default number of pending requests before the overflow policy applies.
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;

/// Result type for capture operations.
pub type CaptureResult<T> = Result<T, CaptureError>;

/// What to do with a new request when the queue is full.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Refuse the new request.
    #[default]
    RejectNew,

    /// Evict the oldest pending request and accept the new one.
    DropOldest,
}

/// Request queue configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Maximum number of pending (not yet started) requests.
    pub capacity: usize,

    /// Overflow handling once `capacity` is reached.
    pub overflow: OverflowPolicy,

    /// Upper bound on an idle worker's sleep, in milliseconds.
    pub idle_poll_ms: u64,

    /// How often to re-check an undecided authorization, in milliseconds.
    pub authorization_poll_ms: u64,
}

impl QueueConfig {
    pub fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms.max(1))
    }

    pub fn authorization_poll(&self) -> Duration {
        Duration::from_millis(self.authorization_poll_ms.max(1))
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_QUEUE_CAPACITY,
            overflow: OverflowPolicy::RejectNew,
            idle_poll_ms: 250,
            authorization_poll_ms: 100,
        }
    }
}
