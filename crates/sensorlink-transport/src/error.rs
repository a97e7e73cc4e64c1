//! Error types for the transport module.

use sensorlink_ipc::{ChannelId, ValueType};
use thiserror::Error;

/// Errors that can occur while attaching channels or sending values.
#[derive(Debug, Error)]
pub enum TransportError {
    /// A channel with this identifier is already attached.
    #[error("Channel already attached: {0}")]
    DuplicateIdentifier(ChannelId),

    /// No channel with this identifier is attached.
    #[error("Channel not found: {0}")]
    NotFound(ChannelId),

    /// The link to the peer is not established.
    #[error("Not connected")]
    NotConnected,

    /// Send was requested before any value was set.
    #[error("Channel {0} has no value to send")]
    NoValue(ChannelId),

    /// A value of the wrong type was assigned to a channel.
    #[error("Channel {channel} expects {} values, got {}", .expected.name(), .found.name())]
    TypeMismatch {
        channel: ChannelId,
        expected: ValueType,
        found: ValueType,
    },

    /// The peer's receive queue is gone.
    #[error("Channel disconnected")]
    ChannelDisconnected,

    /// Send failed.
    #[error("Send failed: {0}")]
    SendFailed(String),
}
