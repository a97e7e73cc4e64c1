//! Shared test doubles.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use sensorlink_ipc::{decode_json, ChannelId, ChannelValue, ErrorData};
use sensorlink_transport::{ChannelRegistry, ChannelTransport, TransportResult};

pub const WAIT: Duration = Duration::from_secs(2);

/// Records every transmitted value and forwards it to a channel.
pub struct RecordingTransport {
    connected: AtomicBool,
    sent: Mutex<Vec<(ChannelId, ChannelValue)>>,
    tx: Sender<(ChannelId, ChannelValue)>,
    rx: Receiver<(ChannelId, ChannelValue)>,
}

impl RecordingTransport {
    pub fn connected() -> Arc<Self> {
        let (tx, rx) = crossbeam_channel::unbounded();
        Arc::new(Self {
            connected: AtomicBool::new(true),
            sent: Mutex::new(Vec::new()),
            tx,
            rx,
        })
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<(ChannelId, ChannelValue)> {
        self.sent.lock().clone()
    }

    pub fn sent_on(&self, id: ChannelId) -> Vec<ChannelValue> {
        self.sent
            .lock()
            .iter()
            .filter(|(channel, _)| *channel == id)
            .map(|(_, value)| value.clone())
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.sent_on(ChannelId::Error)
            .iter()
            .map(|value| decode_json::<ErrorData>(value).unwrap().message)
            .collect()
    }

    /// Wait for the next value sent on `id`, skipping other channels.
    pub fn wait_for(&self, id: ChannelId) -> ChannelValue {
        loop {
            let (channel, value) = self.rx.recv_timeout(WAIT).unwrap();
            if channel == id {
                return value;
            }
        }
    }
}

impl ChannelTransport for RecordingTransport {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn transmit(&self, id: ChannelId, value: &ChannelValue) -> TransportResult<()> {
        self.sent.lock().push((id, value.clone()));
        let _ = self.tx.send((id, value.clone()));
        Ok(())
    }
}

pub fn registry() -> (Arc<ChannelRegistry>, Arc<RecordingTransport>) {
    let transport = RecordingTransport::connected();
    let registry = Arc::new(ChannelRegistry::new(transport.clone()));
    (registry, transport)
}
