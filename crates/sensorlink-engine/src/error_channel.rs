//! The shared error channel of a device.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use sensorlink_ipc::{decode_json, encode_json, ChannelId, ErrorData, ValueType};
use sensorlink_transport::{Channel, ChannelRegistry, TransportResult};
use tracing::{debug, error, warn};

/// Best-effort reporting of failures to the peer.
///
/// One instance per registry. Every feed on the device reports through it.
/// Reporting never fails and never recurses: when the error event itself
/// cannot be delivered it is logged locally and dropped.
pub struct ErrorChannel {
    registry: Arc<ChannelRegistry>,
    channel: Arc<Channel>,
    reported: AtomicU64,
    dropped: AtomicU64,
}

impl ErrorChannel {
    /// Attach the `Error` channel on `registry`.
    ///
    /// Fails with `DuplicateIdentifier` if the registry already has one.
    pub fn attach(registry: Arc<ChannelRegistry>) -> TransportResult<Arc<Self>> {
        let channel = registry.attach(ChannelId::Error, ValueType::Data)?;
        Ok(Arc::new(Self {
            registry,
            channel,
            reported: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }))
    }

    /// Log `message` and forward it to the peer if connected.
    pub fn report(&self, message: impl Into<String>) {
        let message = message.into();
        error!(%message, "Reporting error");
        self.reported.fetch_add(1, Ordering::Relaxed);

        if !self.registry.is_connected() {
            debug!("Not connected, error event dropped");
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        }

        let value = match encode_json(&ErrorData::new(message)) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to encode error event: {}", e);
                self.dropped.fetch_add(1, Ordering::Relaxed);
                return;
            }
        };

        if let Err(e) = self.registry.publish(&self.channel, value) {
            warn!("Failed to send error event: {}", e);
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Observe errors reported by the peer.
    ///
    /// Undecodable events are logged and skipped; they are not reported back.
    pub fn on_peer_error<F>(&self, observer: F)
    where
        F: Fn(&ErrorData) + Send + Sync + 'static,
    {
        self.registry.set_handler(&self.channel, move |value| {
            match decode_json::<ErrorData>(value) {
                Ok(event) => observer(&event),
                Err(e) => warn!("Undecodable error event from peer: {}", e),
            }
        });
    }

    /// Number of reports made, whether or not they reached the peer.
    pub fn reported(&self) -> u64 {
        self.reported.load(Ordering::Relaxed)
    }

    /// Number of reports that could not be delivered.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::registry;
    use bytes::Bytes;
    use parking_lot::Mutex;
    use sensorlink_ipc::ChannelValue;
    use sensorlink_transport::TransportError;

    #[test]
    fn test_report_sends_error_data() {
        let (registry, transport) = registry();
        let errors = ErrorChannel::attach(registry).unwrap();

        errors.report("Camera access denied");

        assert_eq!(transport.errors(), vec!["Camera access denied".to_string()]);
        assert_eq!(errors.reported(), 1);
        assert_eq!(errors.dropped(), 0);
    }

    #[test]
    fn test_report_while_disconnected_is_dropped() {
        let (registry, transport) = registry();
        transport.set_connected(false);
        let errors = ErrorChannel::attach(registry).unwrap();

        errors.report("lost");

        assert!(transport.sent().is_empty());
        assert_eq!(errors.dropped(), 1);
    }

    #[test]
    fn test_second_attach_is_duplicate() {
        let (registry, _transport) = registry();
        let _errors = ErrorChannel::attach(Arc::clone(&registry)).unwrap();

        assert!(matches!(
            ErrorChannel::attach(registry),
            Err(TransportError::DuplicateIdentifier(ChannelId::Error))
        ));
    }

    #[test]
    fn test_no_event_sent_on_attach() {
        let (registry, transport) = registry();
        let _errors = ErrorChannel::attach(registry).unwrap();
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn test_peer_errors_are_observed() {
        let (registry, transport) = registry();
        let errors = ErrorChannel::attach(Arc::clone(&registry)).unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        errors.on_peer_error(move |event| sink.lock().push(event.message.clone()));

        let event = encode_json(&ErrorData::new("thermal shutdown")).unwrap();
        registry.dispatch(ChannelId::Error, event);
        registry.dispatch(ChannelId::Error, ChannelValue::Data(Bytes::from_static(b"nope")));

        assert_eq!(*seen.lock(), vec!["thermal shutdown".to_string()]);
        assert!(transport.sent().is_empty());
    }
}
