//! The sensor feeds a producer can expose.

use sensorlink_ipc::{
    encode_json, AccelerometerData, BatteryState, ChannelId, ChannelValue, DeviceMotionData,
    GyroData, HeadingData, LocationData, MagnetometerData, PayloadResult, ThermalLevel, ValueType,
};
use serde::{Deserialize, Serialize};

use crate::feed::{FeedDescriptor, FeedSample};

pub const BATTERY: FeedDescriptor = FeedDescriptor {
    name: "battery",
    enable: ChannelId::BatteryStatusOn,
    enable_type: ValueType::Bool,
    data: &[
        (ChannelId::BatteryLevel, ValueType::Float),
        (ChannelId::BatteryState, ValueType::Int8),
    ],
};

pub const THERMAL: FeedDescriptor = FeedDescriptor {
    name: "thermal",
    enable: ChannelId::ThermalStatusOn,
    enable_type: ValueType::Bool,
    data: &[(ChannelId::ThermalState, ValueType::Int8)],
};

pub const DEVICE_MOTION: FeedDescriptor = FeedDescriptor {
    name: "device motion",
    enable: ChannelId::DeviceMotionOn,
    enable_type: ValueType::Double,
    data: &[(ChannelId::DeviceMotionData, ValueType::Data)],
};

pub const GYRO: FeedDescriptor = FeedDescriptor {
    name: "gyro",
    enable: ChannelId::GyroOn,
    enable_type: ValueType::Double,
    data: &[(ChannelId::GyroData, ValueType::Data)],
};

pub const ACCELEROMETER: FeedDescriptor = FeedDescriptor {
    name: "accelerometer",
    enable: ChannelId::AccelerometerOn,
    enable_type: ValueType::Double,
    data: &[(ChannelId::AccelerometerData, ValueType::Data)],
};

pub const MAGNETOMETER: FeedDescriptor = FeedDescriptor {
    name: "magnetometer",
    enable: ChannelId::MagnetometerOn,
    enable_type: ValueType::Double,
    data: &[(ChannelId::MagnetometerData, ValueType::Data)],
};

pub const LOCATION: FeedDescriptor = FeedDescriptor {
    name: "location",
    enable: ChannelId::StandardLocationServiceOn,
    enable_type: ValueType::Bool,
    data: &[(ChannelId::LocationData, ValueType::Data)],
};

pub const HEADING: FeedDescriptor = FeedDescriptor {
    name: "heading",
    enable: ChannelId::HeadingOn,
    enable_type: ValueType::Bool,
    data: &[(ChannelId::HeadingData, ValueType::Data)],
};

/// Every feed in the catalog.
pub const ALL_FEEDS: [FeedDescriptor; 8] = [
    BATTERY,
    THERMAL,
    DEVICE_MOTION,
    GYRO,
    ACCELEROMETER,
    MAGNETOMETER,
    LOCATION,
    HEADING,
];

/// Battery charge level (0.0 to 1.0) and charging state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BatteryReading {
    pub level: f32,
    pub state: BatteryState,
}

impl FeedSample for BatteryReading {
    const FEED: FeedDescriptor = BATTERY;

    fn encode(&self) -> PayloadResult<Vec<(ChannelId, ChannelValue)>> {
        Ok(vec![
            (ChannelId::BatteryLevel, ChannelValue::Float(self.level)),
            (ChannelId::BatteryState, ChannelValue::Int8(self.state.raw())),
        ])
    }
}

impl FeedSample for ThermalLevel {
    const FEED: FeedDescriptor = THERMAL;

    fn encode(&self) -> PayloadResult<Vec<(ChannelId, ChannelValue)>> {
        Ok(vec![(ChannelId::ThermalState, ChannelValue::Int8(self.raw()))])
    }
}

macro_rules! json_sample {
    ($sample:ty, $feed:expr, $channel:expr) => {
        impl FeedSample for $sample {
            const FEED: FeedDescriptor = $feed;

            fn encode(&self) -> PayloadResult<Vec<(ChannelId, ChannelValue)>> {
                Ok(vec![($channel, encode_json(self)?)])
            }
        }
    };
}

json_sample!(DeviceMotionData, DEVICE_MOTION, ChannelId::DeviceMotionData);
json_sample!(GyroData, GYRO, ChannelId::GyroData);
json_sample!(AccelerometerData, ACCELEROMETER, ChannelId::AccelerometerData);
json_sample!(MagnetometerData, MAGNETOMETER, ChannelId::MagnetometerData);
json_sample!(LocationData, LOCATION, ChannelId::LocationData);
json_sample!(HeadingData, HEADING, ChannelId::HeadingData);

/// Look up the feed whose enable channel is `id`.
pub fn feed_for_enable(id: ChannelId) -> Option<FeedDescriptor> {
    ALL_FEEDS.iter().copied().find(|feed| feed.enable == id)
}
