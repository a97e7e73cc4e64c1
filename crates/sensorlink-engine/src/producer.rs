//! The producer side: feeds and the camera on one device.

use std::sync::Arc;

use sensorlink_capture::{AuthorizationSource, CaptureBackend, QueueConfig};
use sensorlink_transport::{ChannelRegistry, Device, LinkEnd};
use tracing::{info, instrument};

use crate::camera::CameraFeed;
use crate::config::LinkConfig;
use crate::error_channel::ErrorChannel;
use crate::feed::{FeedHandle, FeedSource, ToggleState, ToggleableFeed};
use crate::metrics::FeedMetricsSnapshot;
use crate::FeedResult;

/// A device exposing sensor feeds and a camera to its peer.
pub struct Producer {
    feeds: Vec<Box<dyn FeedHandle>>,
    camera: Option<CameraFeed>,
    errors: Arc<ErrorChannel>,
    queue_config: QueueConfig,
    device: Device,
}

impl Producer {
    #[instrument(name = "producer_new", skip_all, fields(device = device.name()))]
    pub fn new(device: Device, config: &LinkConfig) -> FeedResult<Self> {
        let errors = ErrorChannel::attach(Arc::clone(device.registry()))?;
        info!("Producer ready");
        Ok(Self {
            feeds: Vec::new(),
            camera: None,
            errors,
            queue_config: config.queue.clone(),
            device,
        })
    }

    /// Create a producer on one end of an in-memory link.
    pub fn from_link(end: LinkEnd, config: &LinkConfig) -> FeedResult<Self> {
        Self::new(Device::from_link(&config.producer_name, end), config)
    }

    /// Expose a sensor source as a toggleable feed.
    pub fn add_feed<S: FeedSource>(&mut self, source: S) -> FeedResult<()> {
        let feed = ToggleableFeed::attach(self.device.registry(), &self.errors, source)?;
        info!(feed = feed.descriptor().name, "Feed added");
        self.feeds.push(Box::new(feed));
        Ok(())
    }

    /// Expose a capture backend through the request queue.
    pub fn add_camera<B, A>(&mut self, backend: B, authorization: A) -> FeedResult<&CameraFeed>
    where
        B: CaptureBackend,
        A: AuthorizationSource,
    {
        let camera = CameraFeed::attach(
            self.device.registry(),
            &self.errors,
            backend,
            authorization,
            self.queue_config.clone(),
        )?;
        Ok(self.camera.insert(camera))
    }

    pub fn camera(&self) -> Option<&CameraFeed> {
        self.camera.as_ref()
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

    /// Returns the state of every feed, in the order they were added.
    pub fn feed_states(&self) -> Vec<(&'static str, ToggleState)> {
        self.feeds
            .iter()
            .map(|feed| (feed.descriptor().name, feed.state()))
            .collect()
    }

    pub fn feed_metrics(&self) -> Vec<(&'static str, FeedMetricsSnapshot)> {
        self.feeds
            .iter()
            .map(|feed| (feed.descriptor().name, feed.metrics()))
            .collect()
    }
}
