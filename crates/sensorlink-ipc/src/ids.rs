//! Channel identifiers shared by producer and consumer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies a channel on both ends of a link.
///
/// Peers match channels by the numeric value, never by name, so the
/// discriminants below are part of the protocol and must not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum ChannelId {
    /// Error side-channel.
    Error = 0,

    // Motion
    DeviceMotionOn = 1,
    DeviceMotionData = 2,
    GyroOn = 3,
    GyroData = 4,
    AccelerometerOn = 5,
    AccelerometerData = 6,
    MagnetometerOn = 7,
    MagnetometerData = 8,

    // Location
    StandardLocationServiceOn = 9,
    HeadingOn = 10,
    HeadingData = 11,
    LocationData = 12,

    // Camera
    PhotoRequest = 13,
    ImageData = 14,

    // Power and thermal
    BatteryStatusOn = 15,
    BatteryLevel = 16,
    BatteryState = 17,
    ThermalStatusOn = 18,
    ThermalState = 19,
}

impl ChannelId {
    /// Every known identifier, in numeric order.
    pub const ALL: [ChannelId; 20] = [
        Self::Error,
        Self::DeviceMotionOn,
        Self::DeviceMotionData,
        Self::GyroOn,
        Self::GyroData,
        Self::AccelerometerOn,
        Self::AccelerometerData,
        Self::MagnetometerOn,
        Self::MagnetometerData,
        Self::StandardLocationServiceOn,
        Self::HeadingOn,
        Self::HeadingData,
        Self::LocationData,
        Self::PhotoRequest,
        Self::ImageData,
        Self::BatteryStatusOn,
        Self::BatteryLevel,
        Self::BatteryState,
        Self::ThermalStatusOn,
        Self::ThermalState,
    ];

    /// Returns the wire value.
    pub fn raw(self) -> u8 {
        self as u8
    }

    /// Looks up an identifier by its wire value.
    pub fn from_raw(raw: u8) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }

    /// Returns the display name used in logs and error reports.
    pub fn name(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::DeviceMotionOn => "deviceMotionOn",
            Self::DeviceMotionData => "deviceMotionData",
            Self::GyroOn => "gyroOn",
            Self::GyroData => "gyroData",
            Self::AccelerometerOn => "accelerometerOn",
            Self::AccelerometerData => "accelerometerData",
            Self::MagnetometerOn => "magnetometerOn",
            Self::MagnetometerData => "magnetometerData",
            Self::StandardLocationServiceOn => "standardLocationServiceOn",
            Self::HeadingOn => "headingOn",
            Self::HeadingData => "headingData",
            Self::LocationData => "locationData",
            Self::PhotoRequest => "requestPhoto",
            Self::ImageData => "imageData",
            Self::BatteryStatusOn => "batteryStatusOn",
            Self::BatteryLevel => "batteryLevel",
            Self::BatteryState => "batteryState",
            Self::ThermalStatusOn => "thermalStatusOn",
            Self::ThermalState => "thermalState",
        }
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.raw())
    }
}

impl From<ChannelId> for u8 {
    fn from(id: ChannelId) -> Self {
        id.raw()
    }
}

impl TryFrom<u8> for ChannelId {
    type Error = String;

    fn try_from(raw: u8) -> Result<Self, String> {
        Self::from_raw(raw).ok_or_else(|| format!("unknown channel identifier {raw}"))
    }
}
