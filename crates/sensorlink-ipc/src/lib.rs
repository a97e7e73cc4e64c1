//! Channel identifiers, typed values and payload schemas for SensorLink.
//!
//! This crate defines everything the producer and the consumer must agree
//! on: which channels exist, what type each carries, and the JSON schemas of
//! the structured payloads sent inside `Data` channels.

mod codec;
mod error;
mod ids;
mod types;
mod value;

pub use codec::{decode_json, encode_json, FromChannelValue, Json};
pub use error::PayloadError;
pub use ids::ChannelId;
pub use types::{
    AccelerometerData, Attitude, BatteryState, CameraPosition, CaptureRequest, CaptureResponse,
    DeviceMotionData, ErrorData, GyroData, HeadingData, LocationData, MagneticField,
    MagnetometerData, ResolutionPreset, ThermalLevel, ThreeAxis,
};
pub use value::{ChannelValue, ValueType};

/// Result type for payload conversions.
pub type PayloadResult<T> = Result<T, PayloadError>;
