//! Conversions between payloads and channel values.
//!
//! Structured payloads travel as JSON inside `Data` values; scalar samples
//! map directly onto the matching `ChannelValue` variant.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::PayloadError;
use crate::value::{ChannelValue, ValueType};
use crate::PayloadResult;

/// Serializes a payload into a `Data` value.
pub fn encode_json<T: Serialize>(payload: &T) -> PayloadResult<ChannelValue> {
    let bytes = serde_json::to_vec(payload).map_err(PayloadError::Encode)?;
    Ok(ChannelValue::Data(Bytes::from(bytes)))
}

/// Deserializes a payload out of a `Data` value.
pub fn decode_json<T: DeserializeOwned>(value: &ChannelValue) -> PayloadResult<T> {
    let data = value.as_data().ok_or(PayloadError::UnexpectedType {
        expected: ValueType::Data,
        found: value.value_type(),
    })?;
    serde_json::from_slice(data).map_err(PayloadError::Decode)
}

/// Types that can be read out of a received channel value.
pub trait FromChannelValue: Sized {
    /// The channel type this decoder expects.
    const VALUE_TYPE: ValueType;

    fn from_channel_value(value: &ChannelValue) -> PayloadResult<Self>;
}

fn mismatch(expected: ValueType, value: &ChannelValue) -> PayloadError {
    PayloadError::UnexpectedType {
        expected,
        found: value.value_type(),
    }
}

impl FromChannelValue for bool {
    const VALUE_TYPE: ValueType = ValueType::Bool;

    fn from_channel_value(value: &ChannelValue) -> PayloadResult<Self> {
        value.as_bool().ok_or_else(|| mismatch(Self::VALUE_TYPE, value))
    }
}

impl FromChannelValue for i8 {
    const VALUE_TYPE: ValueType = ValueType::Int8;

    fn from_channel_value(value: &ChannelValue) -> PayloadResult<Self> {
        value.as_int8().ok_or_else(|| mismatch(Self::VALUE_TYPE, value))
    }
}

impl FromChannelValue for i32 {
    const VALUE_TYPE: ValueType = ValueType::Int32;

    fn from_channel_value(value: &ChannelValue) -> PayloadResult<Self> {
        value.as_int32().ok_or_else(|| mismatch(Self::VALUE_TYPE, value))
    }
}

impl FromChannelValue for f32 {
    const VALUE_TYPE: ValueType = ValueType::Float;

    fn from_channel_value(value: &ChannelValue) -> PayloadResult<Self> {
        value.as_float().ok_or_else(|| mismatch(Self::VALUE_TYPE, value))
    }
}

impl FromChannelValue for f64 {
    const VALUE_TYPE: ValueType = ValueType::Double;

    fn from_channel_value(value: &ChannelValue) -> PayloadResult<Self> {
        value.as_double().ok_or_else(|| mismatch(Self::VALUE_TYPE, value))
    }
}

impl FromChannelValue for Bytes {
    const VALUE_TYPE: ValueType = ValueType::Data;

    fn from_channel_value(value: &ChannelValue) -> PayloadResult<Self> {
        value
            .as_data()
            .cloned()
            .ok_or_else(|| mismatch(Self::VALUE_TYPE, value))
    }
}

/// Marks a payload carried as JSON inside a `Data` channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Json<T>(pub T);

impl<T: DeserializeOwned> FromChannelValue for Json<T> {
    const VALUE_TYPE: ValueType = ValueType::Data;

    fn from_channel_value(value: &ChannelValue) -> PayloadResult<Self> {
        decode_json(value).map(Json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CaptureRequest, ErrorData};

    #[test]
    fn test_json_payload_through_data_value() {
        let value = encode_json(&CaptureRequest::still(42)).unwrap();
        assert_eq!(value.value_type(), ValueType::Data);

        let decoded: CaptureRequest = decode_json(&value).unwrap();
        assert_eq!(decoded.request_id, 42);
    }

    #[test]
    fn test_decode_json_rejects_scalar() {
        let err = decode_json::<ErrorData>(&ChannelValue::Bool(true)).unwrap_err();
        assert!(matches!(
            err,
            PayloadError::UnexpectedType {
                expected: ValueType::Data,
                found: ValueType::Bool
            }
        ));
    }

    #[test]
    fn test_decode_json_rejects_malformed_bytes() {
        let value = ChannelValue::Data(Bytes::from_static(b"{not json"));
        assert!(matches!(
            decode_json::<ErrorData>(&value),
            Err(PayloadError::Decode(_))
        ));
    }

    #[test]
    fn test_scalar_decoders() {
        assert!(bool::from_channel_value(&ChannelValue::Bool(false)).is_ok());
        assert!(f32::from_channel_value(&ChannelValue::Double(1.0)).is_err());
        assert_eq!(i8::from_channel_value(&ChannelValue::Int8(-2)).unwrap(), -2);
    }
}
