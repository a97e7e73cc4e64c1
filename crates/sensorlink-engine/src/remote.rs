//! Consumer-side handles for feeds and the camera.

use std::sync::{Arc, Weak};

use sensorlink_ipc::{
    decode_json, encode_json, CaptureRequest, CaptureResponse, ChannelId, ChannelValue,
    FromChannelValue, ValueType,
};
use sensorlink_transport::{Channel, ChannelRegistry, TransportError};
use tracing::debug;

use crate::error::FeedError;
use crate::error_channel::ErrorChannel;
use crate::feed::{attach_channels, FeedDescriptor};
use crate::{FeedResult, DEFAULT_UPDATE_INTERVAL_SECS};

/// Report a decode failure on `channel`, if the error channel is still alive.
fn report_invalid(errors: &Weak<ErrorChannel>, channel: ChannelId, reason: String) {
    if let Some(errors) = errors.upgrade() {
        errors.report(FeedError::InvalidPayload { channel, reason }.to_string());
    }
}

/// Controls one feed on the producer and receives its data.
pub struct FeedRemote {
    descriptor: FeedDescriptor,
    registry: Arc<ChannelRegistry>,
    errors: Weak<ErrorChannel>,
    enable: Arc<Channel>,
    data: Vec<Arc<Channel>>,
    default_interval: f64,
}

impl FeedRemote {
    pub fn attach(
        registry: &Arc<ChannelRegistry>,
        errors: &Arc<ErrorChannel>,
        descriptor: FeedDescriptor,
    ) -> FeedResult<Self> {
        let (enable, data) = attach_channels(registry, &descriptor)?;
        debug!(feed = descriptor.name, "Feed remote attached");
        Ok(Self {
            descriptor,
            registry: Arc::clone(registry),
            errors: Arc::downgrade(errors),
            enable,
            data,
            default_interval: DEFAULT_UPDATE_INTERVAL_SECS,
        })
    }

    /// Use `seconds` as the interval sent by [`FeedRemote::start`].
    pub fn with_default_interval(mut self, seconds: f64) -> Self {
        self.default_interval = seconds;
        self
    }

    pub fn descriptor(&self) -> &FeedDescriptor {
        &self.descriptor
    }

    /// Turn the feed on, at the default interval for interval feeds.
    pub fn start(&self) -> FeedResult<()> {
        let value = if self.descriptor.takes_interval() {
            ChannelValue::Double(self.default_interval)
        } else {
            ChannelValue::Bool(true)
        };
        self.registry.publish(&self.enable, value)?;
        Ok(())
    }

    /// Turn the feed on with an update interval in seconds.
    ///
    /// Fails with a type mismatch on feeds without an interval.
    pub fn set_interval(&self, seconds: f64) -> FeedResult<()> {
        self.registry.publish(&self.enable, ChannelValue::Double(seconds))?;
        Ok(())
    }

    pub fn stop(&self) -> FeedResult<()> {
        let value = if self.descriptor.takes_interval() {
            ChannelValue::Double(0.0)
        } else {
            ChannelValue::Bool(false)
        };
        self.registry.publish(&self.enable, value)?;
        Ok(())
    }

    /// Decode every value received on `id` as `T` and pass it to `handler`.
    ///
    /// Values that fail to decode are reported through the error channel.
    pub fn on_data<T, F>(&self, id: ChannelId, handler: F) -> FeedResult<()>
    where
        T: FromChannelValue + 'static,
        F: Fn(T) + Send + Sync + 'static,
    {
        let channel = self
            .data
            .iter()
            .find(|channel| channel.id() == id)
            .ok_or(TransportError::NotFound(id))?;

        if channel.value_type() != T::VALUE_TYPE {
            return Err(TransportError::TypeMismatch {
                channel: id,
                expected: channel.value_type(),
                found: T::VALUE_TYPE,
            }
            .into());
        }

        let errors = self.errors.clone();
        self.registry.set_handler(channel, move |value| {
            match T::from_channel_value(value) {
                Ok(decoded) => handler(decoded),
                Err(e) => report_invalid(&errors, id, e.to_string()),
            }
        });
        Ok(())
    }
}

impl Drop for FeedRemote {
    fn drop(&mut self) {
        for channel in std::iter::once(&self.enable).chain(self.data.iter()) {
            let _ = self.registry.detach(channel.id());
        }
    }
}

/// Sends capture requests to the producer and receives the images.
pub struct CameraRemote {
    registry: Arc<ChannelRegistry>,
    errors: Weak<ErrorChannel>,
    request: Arc<Channel>,
    image: Arc<Channel>,
}

impl CameraRemote {
    pub fn attach(registry: &Arc<ChannelRegistry>, errors: &Arc<ErrorChannel>) -> FeedResult<Self> {
        let request = registry.attach(ChannelId::PhotoRequest, ValueType::Data)?;
        let image = match registry.attach(ChannelId::ImageData, ValueType::Data) {
            Ok(image) => image,
            Err(e) => {
                let _ = registry.detach(ChannelId::PhotoRequest);
                return Err(e.into());
            }
        };

        Ok(Self {
            registry: Arc::clone(registry),
            errors: Arc::downgrade(errors),
            request,
            image,
        })
    }

    /// Ask the producer for one capture.
    pub fn request_capture(&self, request: &CaptureRequest) -> FeedResult<()> {
        let value = encode_json(request)?;
        self.registry.publish(&self.request, value)?;
        debug!(request_id = request.request_id, "Capture requested");
        Ok(())
    }

    /// Receive every capture response.
    pub fn on_image<F>(&self, handler: F)
    where
        F: Fn(CaptureResponse) + Send + Sync + 'static,
    {
        let errors = self.errors.clone();
        self.registry.set_handler(&self.image, move |value| {
            match decode_json::<CaptureResponse>(value) {
                Ok(response) => handler(response),
                Err(e) => report_invalid(&errors, ChannelId::ImageData, e.to_string()),
            }
        });
    }
}

impl Drop for CameraRemote {
    fn drop(&mut self) {
        let _ = self.registry.detach(self.request.id());
        let _ = self.registry.detach(self.image.id());
    }
}
