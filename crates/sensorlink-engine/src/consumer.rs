//! The consumer side: remote control of a producer's feeds and camera.

use std::sync::Arc;

use sensorlink_ipc::ErrorData;
use sensorlink_transport::{ChannelRegistry, Device, LinkEnd};
use tracing::{info, instrument};

use crate::config::LinkConfig;
use crate::error_channel::ErrorChannel;
use crate::feed::FeedDescriptor;
use crate::remote::{CameraRemote, FeedRemote};
use crate::FeedResult;

/// A device that consumes a producer's feeds.
pub struct Consumer {
    errors: Arc<ErrorChannel>,
    update_interval_secs: f64,
    device: Device,
}

impl Consumer {
    #[instrument(name = "consumer_new", skip_all, fields(device = device.name()))]
    pub fn new(device: Device, config: &LinkConfig) -> FeedResult<Self> {
        let errors = ErrorChannel::attach(Arc::clone(device.registry()))?;
        info!("Consumer ready");
        Ok(Self {
            errors,
            update_interval_secs: config.update_interval_secs,
            device,
        })
    }

    /// Create a consumer on one end of an in-memory link.
    pub fn from_link(end: LinkEnd, config: &LinkConfig) -> FeedResult<Self> {
        Self::new(Device::from_link(&config.consumer_name, end), config)
    }

    /// Attach the channels of one feed.
    pub fn feed(&self, descriptor: FeedDescriptor) -> FeedResult<FeedRemote> {
        let remote = FeedRemote::attach(self.device.registry(), &self.errors, descriptor)?;
        Ok(remote.with_default_interval(self.update_interval_secs))
    }

    /// Attach the camera channels.
    pub fn camera(&self) -> FeedResult<CameraRemote> {
        CameraRemote::attach(self.device.registry(), &self.errors)
    }

    /// Observe errors the producer reports.
    pub fn on_peer_error<F>(&self, observer: F)
    where
        F: Fn(&ErrorData) + Send + Sync + 'static,
    {
        self.errors.on_peer_error(observer);
    }

    pub fn errors(&self) -> &Arc<ErrorChannel> {
        &self.errors
    }

    pub fn registry(&self) -> &Arc<ChannelRegistry> {
        self.device.registry()
    }

    pub fn is_connected(&self) -> bool {
        self.device.is_connected()
    }
}
