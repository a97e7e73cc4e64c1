//! Error types for the engine module.

use sensorlink_capture::CaptureError;
use sensorlink_ipc::{ChannelId, PayloadError};
use sensorlink_transport::TransportError;
use thiserror::Error;

/// Errors raised by feeds, the camera feed and the remotes.
#[derive(Debug, Error)]
pub enum FeedError {
    /// A received value could not be interpreted.
    #[error("Invalid payload on {channel}: {reason}")]
    InvalidPayload { channel: ChannelId, reason: String },

    /// Attaching or sending failed.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// A payload could not be encoded.
    #[error("Encoding error: {0}")]
    Encoding(#[from] PayloadError),

    /// The sensor source refused to start.
    #[error("Source error: {0}")]
    Source(String),

    /// The capture queue could not be started.
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),
}
