//! Typed channel values.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// The declared type of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    Bool,
    Int8,
    Int32,
    Float,
    Double,
    /// Opaque binary payload.
    Data,
}

impl ValueType {
    /// Returns the display name of this type.
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int8 => "int8",
            Self::Int32 => "int32",
            Self::Float => "float",
            Self::Double => "double",
            Self::Data => "data",
        }
    }
}

/// A value carried by a channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelValue {
    Bool(bool),
    Int8(i8),
    Int32(i32),
    Float(f32),
    Double(f64),
    Data(Bytes),
}

impl ChannelValue {
    /// Returns the type of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Bool(_) => ValueType::Bool,
            Self::Int8(_) => ValueType::Int8,
            Self::Int32(_) => ValueType::Int32,
            Self::Float(_) => ValueType::Float,
            Self::Double(_) => ValueType::Double,
            Self::Data(_) => ValueType::Data,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int8(&self) -> Option<i8> {
        match self {
            Self::Int8(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int32(&self) -> Option<i32> {
        match self {
            Self::Int32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_data(&self) -> Option<&Bytes> {
        match self {
            Self::Data(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for ChannelValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i8> for ChannelValue {
    fn from(v: i8) -> Self {
        Self::Int8(v)
    }
}

impl From<i32> for ChannelValue {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<f32> for ChannelValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<f64> for ChannelValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<Bytes> for ChannelValue {
    fn from(v: Bytes) -> Self {
        Self::Data(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_reject_other_types() {
        let value = ChannelValue::Bool(true);
        assert_eq!(value.as_bool(), Some(true));
        assert_eq!(value.as_double(), None);
        assert_eq!(value.as_data(), None);

        let value = ChannelValue::Double(0.5);
        assert_eq!(value.as_double(), Some(0.5));
        assert_eq!(value.as_bool(), None);
    }

    #[test]
    fn test_value_type_matches_variant() {
        assert_eq!(ChannelValue::from(3i8).value_type(), ValueType::Int8);
        assert_eq!(ChannelValue::from(0.25f32).value_type(), ValueType::Float);
        assert_eq!(
            ChannelValue::from(Bytes::from_static(b"{}")).value_type(),
            ValueType::Data
        );
    }
}
