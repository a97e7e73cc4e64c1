//! In-memory link between two devices.
//!
//! Each side's sends are queued as [`Inbound`] messages for the other side.
//! A shared connection flag lets either end observe disconnection, and
//! [`LinkControl::disconnect`] tears the link down for both.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, TrySendError};
use sensorlink_ipc::{ChannelId, ChannelValue};
use tracing::{info, warn};

use crate::error::TransportError;
use crate::registry::ChannelTransport;
use crate::{TransportResult, INBOUND_CHANNEL_CAPACITY};

/// A message delivered to a device's dispatch context.
#[derive(Debug, Clone)]
pub enum Inbound {
    /// A value sent by the peer.
    Value { id: ChannelId, value: ChannelValue },

    /// The link went down.
    Disconnected,
}

struct LinkShared {
    connected: AtomicBool,
    inbound_a: Sender<Inbound>,
    inbound_b: Sender<Inbound>,
}

/// One side's sending half of an in-memory link.
pub struct ChannelLink {
    peer: Sender<Inbound>,
    shared: Arc<LinkShared>,
    values_sent: AtomicU64,
    values_dropped: AtomicU64,
}

impl ChannelLink {
    /// Returns link statistics for this side.
    pub fn statistics(&self) -> LinkStatistics {
        LinkStatistics {
            values_sent: self.values_sent.load(Ordering::Relaxed),
            values_dropped: self.values_dropped.load(Ordering::Relaxed),
        }
    }
}

impl ChannelTransport for ChannelLink {
    fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::SeqCst)
    }

    fn transmit(&self, id: ChannelId, value: &ChannelValue) -> TransportResult<()> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }

        let message = Inbound::Value {
            id,
            value: value.clone(),
        };
        match self.peer.try_send(message) {
            Ok(()) => {
                self.values_sent.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                self.values_dropped.fetch_add(1, Ordering::Relaxed);
                Err(TransportError::SendFailed(format!(
                    "peer inbound queue full, dropped {}",
                    id.name()
                )))
            }
            Err(TrySendError::Disconnected(_)) => {
                self.values_dropped.fetch_add(1, Ordering::Relaxed);
                Err(TransportError::ChannelDisconnected)
            }
        }
    }
}

/// Per-side link statistics.
#[derive(Debug, Clone, Default)]
pub struct LinkStatistics {
    pub values_sent: u64,
    pub values_dropped: u64,
}

/// One end of a link: the transport to send with and the queue to dispatch from.
pub struct LinkEnd {
    pub transport: Arc<ChannelLink>,
    pub inbound: Receiver<Inbound>,
}

/// Controls the lifetime of a link shared by two ends.
#[derive(Clone)]
pub struct LinkControl {
    shared: Arc<LinkShared>,
}

impl LinkControl {
    /// Returns true while the link is up.
    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::SeqCst)
    }

    /// Take the link down and notify both ends.
    pub fn disconnect(&self) {
        if !self.shared.connected.swap(false, Ordering::SeqCst) {
            return;
        }

        info!("Link disconnected");
        for inbound in [&self.shared.inbound_a, &self.shared.inbound_b] {
            // A full queue is fine: the dispatcher also polls the connection flag.
            if let Err(TrySendError::Full(_)) = inbound.try_send(Inbound::Disconnected) {
                warn!("Inbound queue full, disconnect will be observed by polling");
            }
        }
    }
}

/// Create a connected pair of link ends.
pub fn link_pair() -> (LinkEnd, LinkEnd, LinkControl) {
    let (inbound_a, receiver_a) = crossbeam_channel::bounded(INBOUND_CHANNEL_CAPACITY);
    let (inbound_b, receiver_b) = crossbeam_channel::bounded(INBOUND_CHANNEL_CAPACITY);

    let shared = Arc::new(LinkShared {
        connected: AtomicBool::new(true),
        inbound_a: inbound_a.clone(),
        inbound_b: inbound_b.clone(),
    });

    let end_a = LinkEnd {
        transport: Arc::new(ChannelLink {
            peer: inbound_b,
            shared: Arc::clone(&shared),
            values_sent: AtomicU64::new(0),
            values_dropped: AtomicU64::new(0),
        }),
        inbound: receiver_a,
    };
    let end_b = LinkEnd {
        transport: Arc::new(ChannelLink {
            peer: inbound_a,
            shared: Arc::clone(&shared),
            values_sent: AtomicU64::new(0),
            values_dropped: AtomicU64::new(0),
        }),
        inbound: receiver_b,
    };

    (end_a, end_b, LinkControl { shared })
}
