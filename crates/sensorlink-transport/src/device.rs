//! A device: one channel registry plus its serialized dispatch thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use tracing::{debug, info, instrument, warn};

use crate::link::{Inbound, LinkEnd};
use crate::registry::{ChannelRegistry, ChannelTransport};
use crate::DISPATCH_POLL_INTERVAL;

/// Owns a registry and delivers inbound values to it from one thread.
///
/// All receive handlers of a device run on this thread, in receipt order.
pub struct Device {
    name: String,
    registry: Arc<ChannelRegistry>,
    dispatcher: Option<JoinHandle<()>>,
    should_stop: Arc<AtomicBool>,
}

impl Device {
    /// Create a device and start its dispatch thread.
    #[instrument(name = "device_start", skip_all, fields(device = %name))]
    pub fn start(
        name: &str,
        transport: Arc<dyn ChannelTransport>,
        inbound: Receiver<Inbound>,
    ) -> Self {
        let registry = Arc::new(ChannelRegistry::new(transport));
        let should_stop = Arc::new(AtomicBool::new(false));

        let thread_registry = Arc::clone(&registry);
        let thread_stop = Arc::clone(&should_stop);
        let thread_name = name.to_string();
        let dispatcher = thread::Builder::new()
            .name(format!("{name}-dispatch"))
            .spawn(move || dispatch_loop(&thread_name, &thread_registry, &inbound, &thread_stop));

        let dispatcher = match dispatcher {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("Failed to spawn dispatch thread: {}", e);
                None
            }
        };

        info!("Device started");
        Self {
            name: name.to_string(),
            registry,
            dispatcher,
            should_stop,
        }
    }

    /// Create a device on one end of an in-memory link.
    pub fn from_link(name: &str, end: LinkEnd) -> Self {
        Self::start(name, end.transport, end.inbound)
    }

    /// Returns the device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the device's channel registry.
    pub fn registry(&self) -> &Arc<ChannelRegistry> {
        &self.registry
    }

    /// Returns true while the peer is reachable.
    pub fn is_connected(&self) -> bool {
        self.registry.is_connected()
    }

    /// Returns true while the dispatch thread is running.
    pub fn is_dispatching(&self) -> bool {
        self.dispatcher
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop the dispatch thread.
    #[instrument(name = "device_stop", skip(self), fields(device = %self.name))]
    pub fn stop(&mut self) {
        self.should_stop.store(true, Ordering::SeqCst);

        if let Some(handle) = self.dispatcher.take() {
            if handle.thread().id() == thread::current().id() {
                warn!("Device stopped from its own dispatch thread, not joining");
                return;
            }
            let _ = handle.join();
            info!("Device stopped");
        }
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        self.stop();
    }
}

fn dispatch_loop(
    name: &str,
    registry: &ChannelRegistry,
    inbound: &Receiver<Inbound>,
    should_stop: &AtomicBool,
) {
    debug!(device = name, "Dispatch loop starting");
    let mut connected = registry.is_connected();

    while !should_stop.load(Ordering::SeqCst) {
        match inbound.recv_timeout(DISPATCH_POLL_INTERVAL) {
            Ok(Inbound::Value { id, value }) => registry.dispatch(id, value),
            Ok(Inbound::Disconnected) => {
                if connected {
                    connected = false;
                    registry.handle_disconnect();
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                if connected && !registry.is_connected() {
                    connected = false;
                    registry.handle_disconnect();
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                if connected {
                    registry.handle_disconnect();
                }
                info!(device = name, "Inbound queue closed, dispatch loop exiting");
                break;
            }
        }
    }

    debug!(device = name, "Dispatch loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::link_pair;
    use parking_lot::Mutex;
    use sensorlink_ipc::{ChannelId, ChannelValue, ValueType};
    use std::time::Duration;

    #[test]
    fn test_values_dispatched_in_order() {
        let (a, b, _control) = link_pair();
        let producer = Device::from_link("producer", a);
        let consumer = Device::from_link("consumer", b);

        let sender = consumer
            .registry()
            .attach(ChannelId::BatteryStatusOn, ValueType::Bool)
            .unwrap();
        let receiver = producer
            .registry()
            .attach(ChannelId::BatteryStatusOn, ValueType::Bool)
            .unwrap();

        let (tx, rx) = crossbeam_channel::unbounded();
        producer.registry().set_handler(&receiver, move |value| {
            let _ = tx.send(value.as_bool());
        });

        for enabled in [true, false, true] {
            consumer
                .registry()
                .publish(&sender, ChannelValue::Bool(enabled))
                .unwrap();
        }

        let received: Vec<_> = (0..3)
            .map(|_| rx.recv_timeout(Duration::from_secs(1)).unwrap())
            .collect();
        assert_eq!(received, vec![Some(true), Some(false), Some(true)]);
    }

    #[test]
    fn test_disconnect_reaches_listeners() {
        let (a, b, control) = link_pair();
        let producer = Device::from_link("producer", a);
        let _consumer = Device::from_link("consumer", b);

        let (tx, rx) = crossbeam_channel::unbounded();
        let _subscription = producer.registry().on_disconnect(move || {
            let _ = tx.send(());
        });

        control.disconnect();
        assert!(rx.recv_timeout(Duration::from_secs(1)).is_ok());
        assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());
        assert!(!producer.is_connected());
    }

    #[test]
    fn test_stop_joins_dispatch_thread() {
        let (a, _b, _control) = link_pair();
        let mut device = Device::from_link("producer", a);
        assert!(device.is_dispatching());

        device.stop();
        assert!(!device.is_dispatching());
    }

    #[test]
    fn test_handlers_run_on_dispatch_thread() {
        let (a, b, _control) = link_pair();
        let producer = Device::from_link("producer", a);
        let consumer = Device::from_link("consumer", b);

        let sender = consumer
            .registry()
            .attach(ChannelId::GyroOn, ValueType::Double)
            .unwrap();
        let receiver = producer
            .registry()
            .attach(ChannelId::GyroOn, ValueType::Double)
            .unwrap();

        let thread_names = Arc::new(Mutex::new(Vec::new()));
        let names = Arc::clone(&thread_names);
        let (tx, rx) = crossbeam_channel::unbounded();
        producer.registry().set_handler(&receiver, move |_| {
            names
                .lock()
                .push(thread::current().name().map(str::to_string));
            let _ = tx.send(());
        });

        consumer
            .registry()
            .publish(&sender, ChannelValue::Double(0.1))
            .unwrap();
        rx.recv_timeout(Duration::from_secs(1)).unwrap();

        assert_eq!(
            thread_names.lock().as_slice(),
            &[Some("producer-dispatch".to_string())]
        );
    }
}
