//! Payload schemas carried inside `Data` channels and the scalar sample enums.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Capture resolution preset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolutionPreset {
    /// 352 x 288.
    Cif352x288,

    /// 1280 x 720.
    Hd1280x720,

    /// 1920 x 1080.
    Hd1920x1080,

    /// Highest quality the device supports.
    #[default]
    High,
}

impl ResolutionPreset {
    /// Returns the pixel dimensions, if the preset pins them.
    pub fn dimensions(self) -> Option<(u32, u32)> {
        match self {
            Self::Cif352x288 => Some((352, 288)),
            Self::Hd1280x720 => Some((1280, 720)),
            Self::Hd1920x1080 => Some((1920, 1080)),
            Self::High => None,
        }
    }
}

/// Which camera to capture from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CameraPosition {
    #[default]
    Front,
    Back,
}

/// A consumer request for one exclusive capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureRequest {
    /// Consumer-assigned identifier, echoed back in the response.
    #[serde(rename = "requestID")]
    pub request_id: i64,

    /// Capture duration in seconds (0 for a still image).
    pub duration: i64,

    /// Resolution preset.
    pub resolution_preset: ResolutionPreset,

    /// Camera selection.
    pub camera: CameraPosition,
}

impl CaptureRequest {
    /// Creates a still-image request with default parameters.
    pub fn still(request_id: i64) -> Self {
        Self {
            request_id,
            duration: 0,
            resolution_preset: ResolutionPreset::High,
            camera: CameraPosition::Front,
        }
    }
}

/// The result of a capture, keyed by the originating request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureResponse {
    #[serde(rename = "requestID")]
    pub request_id: i64,

    /// Encoded image bytes, carried as a base64 string.
    #[serde(with = "base64_data")]
    pub data: Bytes,
}

mod base64_data {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use bytes::Bytes;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded)
            .map(Bytes::from)
            .map_err(|e| de::Error::custom(format!("invalid base64 image data: {e}")))
    }
}

/// An error event sent over the error channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorData {
    pub message: String,
}

impl ErrorData {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A three-axis vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreeAxis {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl ThreeAxis {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Device orientation in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Attitude {
    pub pitch: f64,
    pub roll: f64,
    pub yaw: f64,
}

/// Calibrated magnetic field with its accuracy level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MagneticField {
    pub field: ThreeAxis,
    pub accuracy: i32,
}

/// Fused device motion sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceMotionData {
    pub attitude: Attitude,
    pub rotation_rate: ThreeAxis,
    pub user_acceleration: ThreeAxis,
    pub gravity: ThreeAxis,
    pub magnetic_field: MagneticField,
    pub heading: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GyroData {
    pub rotation_rate: ThreeAxis,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AccelerometerData {
    pub acceleration: ThreeAxis,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MagnetometerData {
    pub magnetic_field: ThreeAxis,
}

/// Compass heading in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadingData {
    pub magnetic_heading: f64,
    pub true_heading: f64,
}

/// A single location fix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationData {
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub horizontal_accuracy: f64,
    pub vertical_accuracy: f64,
    pub speed: f64,
    pub course: f64,
}

/// Battery charging state, sent as an `Int8`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i8)]
pub enum BatteryState {
    #[default]
    Unknown = 0,
    Unplugged = 1,
    Charging = 2,
    Full = 3,
}

impl BatteryState {
    pub fn raw(self) -> i8 {
        self as i8
    }

    pub fn from_raw(raw: i8) -> Option<Self> {
        match raw {
            0 => Some(Self::Unknown),
            1 => Some(Self::Unplugged),
            2 => Some(Self::Charging),
            3 => Some(Self::Full),
            _ => None,
        }
    }
}

/// Thermal pressure level, sent as an `Int8`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(i8)]
pub enum ThermalLevel {
    #[default]
    Nominal = 0,
    Fair = 1,
    Serious = 2,
    Critical = 3,
}

impl ThermalLevel {
    pub fn raw(self) -> i8 {
        self as i8
    }

    pub fn from_raw(raw: i8) -> Option<Self> {
        match raw {
            0 => Some(Self::Nominal),
            1 => Some(Self::Fair),
            2 => Some(Self::Serious),
            3 => Some(Self::Critical),
            _ => None,
        }
    }
}
