//! Error types for the capture module.

use thiserror::Error;

/// Errors that can occur while queueing or performing captures.
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    /// Camera access was denied; the queue accepts no further requests.
    #[error("Camera access denied")]
    AuthorizationDenied,

    /// The capture backend reported a failure.
    #[error("Image capture error: {0}")]
    Backend(String),

    /// The captured image could not be encoded.
    #[error("Image encoding error: {0}")]
    Encoding(String),

    /// The queue is at capacity and rejects new requests.
    #[error("Capture queue full ({capacity} pending)")]
    QueueFull { capacity: usize },

    /// The request was evicted to make room for a newer one.
    #[error("Capture request {request_id} dropped, queue full")]
    Dropped { request_id: i64 },

    /// The queue worker has stopped.
    #[error("Capture queue stopped")]
    Stopped,
}
