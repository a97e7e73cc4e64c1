//! Error types for payload encoding and decoding.

use thiserror::Error;

use crate::value::ValueType;

/// Errors raised while converting between payloads and channel values.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// A payload could not be serialized.
    #[error("JSON encoding error: {0}")]
    Encode(#[source] serde_json::Error),

    /// A payload could not be deserialized.
    #[error("JSON decoding error: {0}")]
    Decode(#[source] serde_json::Error),

    /// The value has a different type than the one expected.
    #[error("expected {} value, found {}", .expected.name(), .found.name())]
    UnexpectedType {
        expected: ValueType,
        found: ValueType,
    },

    /// The value has the right type but is outside the accepted range.
    #[error("value out of range: {0}")]
    OutOfRange(String),
}
