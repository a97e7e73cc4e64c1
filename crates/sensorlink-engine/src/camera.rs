//! Camera feed: capture requests in, images out.

use std::sync::{Arc, Weak};

use bytes::Bytes;
use parking_lot::RwLock;
use sensorlink_capture::{
    Availability, AuthorizationSource, CaptureBackend, CaptureError, CaptureSink,
    ExclusiveRequestQueue, QueueConfig, QueueStats,
};
use sensorlink_ipc::{
    decode_json, encode_json, CaptureRequest, CaptureResponse, ChannelId, ChannelValue, ValueType,
};
use sensorlink_transport::{Channel, ChannelRegistry, Subscription};
use tracing::{debug, info, instrument};

use crate::error::FeedError;
use crate::error_channel::ErrorChannel;
use crate::FeedResult;

/// Local callback for every completed capture.
pub type CaptureObserver = Arc<dyn Fn(&CaptureResponse) + Send + Sync>;

struct CameraInner {
    registry: Arc<ChannelRegistry>,
    errors: Arc<ErrorChannel>,
    image: Arc<Channel>,
    observer: RwLock<Option<CaptureObserver>>,
}

/// Serves `PhotoRequest` values through an [`ExclusiveRequestQueue`] and
/// publishes the results on `ImageData`.
pub struct CameraFeed {
    inner: Arc<CameraInner>,
    request: Arc<Channel>,
    queue: Arc<ExclusiveRequestQueue>,
    _disconnect: Subscription,
}

impl CameraFeed {
    #[instrument(name = "camera_attach", skip_all, fields(capacity = config.capacity))]
    pub fn attach<B, A>(
        registry: &Arc<ChannelRegistry>,
        errors: &Arc<ErrorChannel>,
        backend: B,
        authorization: A,
        config: QueueConfig,
    ) -> FeedResult<Self>
    where
        B: CaptureBackend,
        A: AuthorizationSource,
    {
        let request = registry.attach(ChannelId::PhotoRequest, ValueType::Data)?;
        let image = match registry.attach(ChannelId::ImageData, ValueType::Data) {
            Ok(image) => image,
            Err(e) => {
                let _ = registry.detach(ChannelId::PhotoRequest);
                return Err(e.into());
            }
        };

        let inner = Arc::new(CameraInner {
            registry: Arc::clone(registry),
            errors: Arc::clone(errors),
            image,
            observer: RwLock::new(None),
        });

        let sink: Arc<dyn CaptureSink> = inner.clone();
        let queue = match ExclusiveRequestQueue::start(backend, authorization, sink, config) {
            Ok(queue) => Arc::new(queue),
            Err(e) => {
                let _ = registry.detach(ChannelId::PhotoRequest);
                let _ = registry.detach(ChannelId::ImageData);
                return Err(e.into());
            }
        };

        let weak_inner: Weak<CameraInner> = Arc::downgrade(&inner);
        let weak_queue = Arc::downgrade(&queue);
        registry.set_handler(&request, move |value| {
            if let (Some(inner), Some(queue)) = (weak_inner.upgrade(), weak_queue.upgrade()) {
                inner.handle_request(&queue, value);
            }
        });

        let weak_queue = Arc::downgrade(&queue);
        let disconnect = registry.on_disconnect(move || {
            if let Some(queue) = weak_queue.upgrade() {
                let discarded = queue.clear_pending();
                info!(discarded, "Peer disconnected, pending captures discarded");
            }
        });

        info!("Camera feed attached");
        Ok(Self {
            inner,
            request,
            queue,
            _disconnect: disconnect,
        })
    }

    /// Observe each completed capture locally, in addition to sending it.
    pub fn on_capture<F>(&self, observer: F)
    where
        F: Fn(&CaptureResponse) + Send + Sync + 'static,
    {
        *self.inner.observer.write() = Some(Arc::new(observer));
    }

    /// Queue a capture directly, bypassing the request channel.
    pub fn request(&self, request: CaptureRequest) -> FeedResult<()> {
        self.queue.enqueue(request)?;
        Ok(())
    }

    pub fn availability(&self) -> Availability {
        self.queue.availability()
    }

    pub fn pending(&self) -> usize {
        self.queue.pending()
    }

    pub fn stats(&self) -> QueueStats {
        self.queue.stats()
    }
}

impl Drop for CameraFeed {
    fn drop(&mut self) {
        self.inner.registry.clear_handler(&self.request);
        let _ = self.inner.registry.detach(ChannelId::PhotoRequest);
        let _ = self.inner.registry.detach(ChannelId::ImageData);
    }
}

impl CameraInner {
    fn handle_request(&self, queue: &ExclusiveRequestQueue, value: &ChannelValue) {
        let request: CaptureRequest = match decode_json(value) {
            Ok(request) => request,
            Err(e) => {
                let error = FeedError::InvalidPayload {
                    channel: ChannelId::PhotoRequest,
                    reason: e.to_string(),
                };
                self.errors.report(error.to_string());
                return;
            }
        };

        let request_id = request.request_id;
        match queue.enqueue(request) {
            Ok(()) => debug!(request_id, "Capture request queued"),
            // Reported once by the queue when it terminated.
            Err(CaptureError::AuthorizationDenied) => {
                debug!(request_id, "Capture request ignored, camera access denied")
            }
            Err(e) => self.errors.report(format!("Capture request {request_id}: {e}")),
        }
    }

    fn publish_response(&self, response: &CaptureResponse) -> FeedResult<()> {
        let value = encode_json(response)?;
        self.registry.publish(&self.image, value)?;
        Ok(())
    }
}

impl CaptureSink for CameraInner {
    fn captured(&self, request: &CaptureRequest, image: Bytes) {
        let response = CaptureResponse {
            request_id: request.request_id,
            data: image,
        };

        let observer = self.observer.read().clone();
        if let Some(observer) = observer {
            observer(&response);
        }

        if let Err(e) = self.publish_response(&response) {
            self.errors
                .report(format!("Capture {}: {}", request.request_id, e));
        }
    }

    fn failed(&self, request: Option<&CaptureRequest>, error: &CaptureError) {
        match request {
            Some(request) => self
                .errors
                .report(format!("Capture {}: {}", request.request_id, error)),
            None => self.errors.report(error.to_string()),
        }
    }
}
