//! Channel registry: attach, look up, receive and send typed channels.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use sensorlink_ipc::{ChannelId, ChannelValue, ValueType};
use tracing::{debug, info, trace, warn};

use crate::channel::{Channel, Handler};
use crate::error::TransportError;
use crate::subscription::Subscription;
use crate::TransportResult;

/// The capabilities the registry needs from the underlying link.
///
/// Inbound values do not go through this trait; whoever owns the receive
/// side feeds them into [`ChannelRegistry::dispatch`] from a single context.
pub trait ChannelTransport: Send + Sync {
    /// Returns true while the peer is reachable.
    fn is_connected(&self) -> bool;

    /// Transmit one value to the peer.
    fn transmit(&self, id: ChannelId, value: &ChannelValue) -> TransportResult<()>;
}

type DisconnectListener = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct DisconnectListeners {
    next_id: AtomicU64,
    entries: Mutex<Vec<(u64, DisconnectListener)>>,
}

/// Maps channel identifiers to typed channels for one device.
pub struct ChannelRegistry {
    transport: Arc<dyn ChannelTransport>,
    channels: RwLock<HashMap<ChannelId, Arc<Channel>>>,
    disconnect_listeners: Arc<DisconnectListeners>,
}

impl ChannelRegistry {
    /// Create an empty registry sending through `transport`.
    pub fn new(transport: Arc<dyn ChannelTransport>) -> Self {
        Self {
            transport,
            channels: RwLock::new(HashMap::new()),
            disconnect_listeners: Arc::new(DisconnectListeners::default()),
        }
    }

    /// Register a channel.
    pub fn attach(&self, id: ChannelId, value_type: ValueType) -> TransportResult<Arc<Channel>> {
        let mut channels = self.channels.write();
        if channels.contains_key(&id) {
            return Err(TransportError::DuplicateIdentifier(id));
        }

        let channel = Arc::new(Channel::new(id, value_type));
        channels.insert(id, Arc::clone(&channel));
        debug!(channel = %id, value_type = value_type.name(), "Channel attached");
        Ok(channel)
    }

    /// Remove a channel and its handler.
    pub fn detach(&self, id: ChannelId) -> TransportResult<()> {
        let channel = self
            .channels
            .write()
            .remove(&id)
            .ok_or(TransportError::NotFound(id))?;
        channel.replace_handler(None);
        debug!(channel = %id, "Channel detached");
        Ok(())
    }

    /// Look up an attached channel.
    pub fn lookup(&self, id: ChannelId) -> TransportResult<Arc<Channel>> {
        self.channels
            .read()
            .get(&id)
            .cloned()
            .ok_or(TransportError::NotFound(id))
    }

    /// Returns the identifiers of all attached channels, sorted.
    pub fn attached(&self) -> Vec<ChannelId> {
        let mut ids: Vec<_> = self.channels.read().keys().copied().collect();
        ids.sort();
        ids
    }

    /// Install the receive handler for a channel, replacing any previous one.
    pub fn set_handler<F>(&self, channel: &Channel, handler: F)
    where
        F: Fn(&ChannelValue) + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(handler);
        if channel.replace_handler(Some(handler)).is_some() {
            debug!(channel = %channel.id(), "Replaced channel handler");
        }
    }

    /// Remove the receive handler for a channel.
    pub fn clear_handler(&self, channel: &Channel) {
        channel.replace_handler(None);
    }

    /// Returns true while the peer is reachable.
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Transmit the channel's current value.
    pub fn send(&self, channel: &Channel) -> TransportResult<()> {
        if !self.transport.is_connected() {
            return Err(TransportError::NotConnected);
        }

        let value = channel.value().ok_or(TransportError::NoValue(channel.id()))?;
        trace!(channel = %channel.id(), "Sending value");
        self.transport.transmit(channel.id(), &value)
    }

    /// Set the channel's value and transmit it.
    ///
    /// The value stays locked until the transmit returns, so concurrent
    /// publishers on one channel cannot send each other's values.
    pub fn publish(&self, channel: &Channel, value: ChannelValue) -> TransportResult<()> {
        channel.check_type(&value)?;

        let mut slot = channel.lock_value();
        *slot = Some(value);

        if !self.transport.is_connected() {
            return Err(TransportError::NotConnected);
        }

        match slot.as_ref() {
            Some(value) => {
                trace!(channel = %channel.id(), "Publishing value");
                self.transport.transmit(channel.id(), value)
            }
            None => Err(TransportError::NoValue(channel.id())),
        }
    }

    /// Deliver a value received from the peer.
    ///
    /// Must only be called from the device's single dispatch context so that
    /// handlers for one channel never run concurrently.
    pub fn dispatch(&self, id: ChannelId, value: ChannelValue) {
        let Some(channel) = self.channels.read().get(&id).cloned() else {
            warn!(channel = %id, "Received value for unattached channel");
            return;
        };

        if channel.check_type(&value).is_ok() {
            *channel.lock_value() = Some(value.clone());
        } else {
            debug!(
                channel = %id,
                expected = channel.value_type().name(),
                found = value.value_type().name(),
                "Received value with unexpected type"
            );
        }

        match channel.handler() {
            Some(handler) => handler(&value),
            None => trace!(channel = %id, "No handler attached, value stored"),
        }
    }

    /// Register a callback for peer disconnection.
    pub fn on_disconnect<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let listeners = &self.disconnect_listeners;
        let id = listeners.next_id.fetch_add(1, Ordering::Relaxed);
        listeners.entries.lock().push((id, Arc::new(listener)));

        let weak: Weak<DisconnectListeners> = Arc::downgrade(listeners);
        Subscription::new(move || {
            if let Some(listeners) = weak.upgrade() {
                listeners.entries.lock().retain(|(entry, _)| *entry != id);
            }
        })
    }

    /// Notify every disconnect listener.
    pub fn handle_disconnect(&self) {
        let listeners: Vec<DisconnectListener> = self
            .disconnect_listeners
            .entries
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        info!(listeners = listeners.len(), "Peer disconnected");
        for listener in listeners {
            listener();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize};

    #[derive(Default)]
    struct RecordingTransport {
        connected: AtomicBool,
        sent: Mutex<Vec<(ChannelId, ChannelValue)>>,
    }

    impl RecordingTransport {
        fn connected() -> Arc<Self> {
            let transport = Self::default();
            transport.connected.store(true, Ordering::SeqCst);
            Arc::new(transport)
        }
    }

    impl ChannelTransport for RecordingTransport {
        fn is_connected(&self) -> bool {
            self.connected.load(Ordering::SeqCst)
        }

        fn transmit(&self, id: ChannelId, value: &ChannelValue) -> TransportResult<()> {
            self.sent.lock().push((id, value.clone()));
            Ok(())
        }
    }

    #[test]
    fn test_attach_rejects_duplicate_identifier() {
        let registry = ChannelRegistry::new(RecordingTransport::connected());
        registry.attach(ChannelId::BatteryLevel, ValueType::Float).unwrap();

        let err = registry
            .attach(ChannelId::BatteryLevel, ValueType::Float)
            .unwrap_err();
        assert!(matches!(
            err,
            TransportError::DuplicateIdentifier(ChannelId::BatteryLevel)
        ));
    }

    #[test]
    fn test_lookup_missing_channel() {
        let registry = ChannelRegistry::new(RecordingTransport::connected());
        assert!(matches!(
            registry.lookup(ChannelId::GyroData),
            Err(TransportError::NotFound(ChannelId::GyroData))
        ));
    }

    #[test]
    fn test_set_value_does_not_transmit() {
        let transport = RecordingTransport::connected();
        let registry = ChannelRegistry::new(transport.clone());
        let channel = registry.attach(ChannelId::ThermalState, ValueType::Int8).unwrap();

        channel.set_value(ChannelValue::Int8(2)).unwrap();
        assert!(transport.sent.lock().is_empty());

        registry.send(&channel).unwrap();
        assert_eq!(
            transport.sent.lock().as_slice(),
            &[(ChannelId::ThermalState, ChannelValue::Int8(2))]
        );
    }

    #[test]
    fn test_set_value_rejects_wrong_type() {
        let registry = ChannelRegistry::new(RecordingTransport::connected());
        let channel = registry.attach(ChannelId::BatteryLevel, ValueType::Float).unwrap();

        assert!(matches!(
            channel.set_value(ChannelValue::Bool(true)),
            Err(TransportError::TypeMismatch { .. })
        ));
        assert_eq!(channel.value(), None);
    }

    #[test]
    fn test_send_without_value() {
        let registry = ChannelRegistry::new(RecordingTransport::connected());
        let channel = registry.attach(ChannelId::BatteryLevel, ValueType::Float).unwrap();

        assert!(matches!(
            registry.send(&channel),
            Err(TransportError::NoValue(ChannelId::BatteryLevel))
        ));
    }

    #[test]
    fn test_send_while_disconnected() {
        let transport = Arc::new(RecordingTransport::default());
        let registry = ChannelRegistry::new(transport.clone());
        let channel = registry.attach(ChannelId::BatteryLevel, ValueType::Float).unwrap();

        assert!(matches!(
            registry.publish(&channel, ChannelValue::Float(0.5)),
            Err(TransportError::NotConnected)
        ));
        assert!(transport.sent.lock().is_empty());
    }

    #[test]
    fn test_dispatch_invokes_latest_handler_in_order() {
        let registry = ChannelRegistry::new(RecordingTransport::connected());
        let channel = registry.attach(ChannelId::GyroOn, ValueType::Double).unwrap();

        let first_calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&first_calls);
        registry.set_handler(&channel, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        registry.set_handler(&channel, move |value| {
            sink.lock().push(value.as_double().unwrap());
        });

        registry.dispatch(ChannelId::GyroOn, ChannelValue::Double(0.1));
        registry.dispatch(ChannelId::GyroOn, ChannelValue::Double(0.2));

        assert_eq!(first_calls.load(Ordering::SeqCst), 0);
        assert_eq!(received.lock().as_slice(), &[0.1, 0.2]);
        assert_eq!(channel.value(), Some(ChannelValue::Double(0.2)));
    }

    #[test]
    fn test_dispatch_passes_mistyped_value_without_storing() {
        let registry = ChannelRegistry::new(RecordingTransport::connected());
        let channel = registry.attach(ChannelId::BatteryStatusOn, ValueType::Bool).unwrap();

        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        registry.set_handler(&channel, move |value| {
            *sink.lock() = Some(value.clone());
        });

        registry.dispatch(ChannelId::BatteryStatusOn, ChannelValue::Int32(5));
        assert_eq!(*seen.lock(), Some(ChannelValue::Int32(5)));
        assert_eq!(channel.value(), None);
    }

    #[test]
    fn test_dispatch_unknown_channel_is_dropped() {
        let registry = ChannelRegistry::new(RecordingTransport::connected());
        registry.dispatch(ChannelId::LocationData, ChannelValue::Bool(true));
        assert!(registry.attached().is_empty());
    }

    #[test]
    fn test_disconnect_listener_released_by_subscription() {
        let registry = ChannelRegistry::new(RecordingTransport::connected());
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        let subscription = registry.on_disconnect(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        registry.handle_disconnect();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        drop(subscription);
        registry.handle_disconnect();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_detach_allows_reattach() {
        let registry = ChannelRegistry::new(RecordingTransport::connected());
        registry.attach(ChannelId::Error, ValueType::Data).unwrap();
        registry.detach(ChannelId::Error).unwrap();
        assert!(registry.attach(ChannelId::Error, ValueType::Data).is_ok());
    }
}
