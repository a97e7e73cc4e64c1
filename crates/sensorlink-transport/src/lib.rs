//! Typed channel registry and serialized dispatch for SensorLink.
//!
//! This crate provides the send/receive primitives every feed is built on:
//! a [`ChannelRegistry`] of typed channels, the [`ChannelTransport`] seam to
//! the underlying link, an in-memory link pair, and [`Device`], which runs
//! all receive handlers of one connection on a single dispatch thread.

mod channel;
mod device;
mod error;
mod link;
mod registry;
mod subscription;

pub use channel::{Channel, Handler};
pub use device::Device;
pub use error::TransportError;
pub use link::{link_pair, ChannelLink, Inbound, LinkControl, LinkEnd, LinkStatistics};
pub use registry::{ChannelRegistry, ChannelTransport};
pub use subscription::Subscription;

use std::time::Duration;

/// Channel capacity for inbound values per device.
pub const INBOUND_CHANNEL_CAPACITY: usize = 256;

/// How often an idle dispatch thread re-checks its stop flag and the link.
pub const DISPATCH_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;
