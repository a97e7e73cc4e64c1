//! A single typed channel.

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard, RwLock};
use sensorlink_ipc::{ChannelId, ChannelValue, ValueType};

use crate::error::TransportError;
use crate::TransportResult;

/// Receive handler attached to a channel.
pub type Handler = Arc<dyn Fn(&ChannelValue) + Send + Sync>;

/// A named, typed value slot shared with the peer.
///
/// Setting the value does not transmit it; see
/// [`ChannelRegistry::send`](crate::ChannelRegistry::send).
pub struct Channel {
    id: ChannelId,
    value_type: ValueType,
    value: Mutex<Option<ChannelValue>>,
    handler: RwLock<Option<Handler>>,
}

impl Channel {
    pub(crate) fn new(id: ChannelId, value_type: ValueType) -> Self {
        Self {
            id,
            value_type,
            value: Mutex::new(None),
            handler: RwLock::new(None),
        }
    }

    /// Returns the channel identifier.
    pub fn id(&self) -> ChannelId {
        self.id
    }

    /// Returns the declared value type.
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Returns the display name.
    pub fn name(&self) -> &'static str {
        self.id.name()
    }

    /// Returns the current value, if any.
    pub fn value(&self) -> Option<ChannelValue> {
        self.value.lock().clone()
    }

    /// Set the current value without sending it.
    pub fn set_value(&self, value: ChannelValue) -> TransportResult<()> {
        self.check_type(&value)?;
        *self.value.lock() = Some(value);
        Ok(())
    }

    /// Returns true if a receive handler is attached.
    pub fn has_handler(&self) -> bool {
        self.handler.read().is_some()
    }

    pub(crate) fn check_type(&self, value: &ChannelValue) -> TransportResult<()> {
        if value.value_type() == self.value_type {
            Ok(())
        } else {
            Err(TransportError::TypeMismatch {
                channel: self.id,
                expected: self.value_type,
                found: value.value_type(),
            })
        }
    }

    pub(crate) fn lock_value(&self) -> MutexGuard<'_, Option<ChannelValue>> {
        self.value.lock()
    }

    pub(crate) fn handler(&self) -> Option<Handler> {
        self.handler.read().clone()
    }

    pub(crate) fn replace_handler(&self, handler: Option<Handler>) -> Option<Handler> {
        std::mem::replace(&mut *self.handler.write(), handler)
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("id", &self.id)
            .field("value_type", &self.value_type)
            .field("has_handler", &self.has_handler())
            .finish()
    }
}
