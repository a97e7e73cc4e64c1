//! Simulated sensors, camera and camera authorization.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::Mutex;
use sensorlink_capture::{
    AccessCallback, Availability, AuthorizationSource, CaptureBackend, CaptureCallback,
    CaptureError, PrepareCallback,
};
use sensorlink_engine::{FeedError, FeedResult, FeedSample, FeedSource, SampleCallback};
use sensorlink_ipc::{CameraPosition, CaptureRequest};
use sensorlink_transport::Subscription;
use tracing::debug;

/// A source that produces a sample every tick on its own thread.
pub struct TickerSource<T> {
    name: &'static str,
    default_interval: Duration,
    generate: fn(u64) -> T,
    latest: Arc<Mutex<Option<T>>>,
}

impl<T: FeedSample + Clone> TickerSource<T> {
    pub fn new(name: &'static str, default_interval: Duration, generate: fn(u64) -> T) -> Self {
        Self {
            name,
            default_interval,
            generate,
            latest: Arc::new(Mutex::new(Some(generate(0)))),
        }
    }
}

impl<T: FeedSample + Clone> FeedSource for TickerSource<T> {
    type Sample = T;

    fn subscribe(
        &self,
        interval: Option<Duration>,
        emit: SampleCallback<T>,
    ) -> FeedResult<Subscription> {
        let interval = interval.unwrap_or(self.default_interval);
        let stop = Arc::new(AtomicBool::new(false));

        let thread_stop = Arc::clone(&stop);
        let latest = Arc::clone(&self.latest);
        let generate = self.generate;
        let handle = thread::Builder::new()
            .name(format!("{}-ticker", self.name))
            .spawn(move || {
                let mut tick = 1;
                while !thread_stop.load(Ordering::SeqCst) {
                    thread::sleep(interval);
                    let sample = generate(tick);
                    *latest.lock() = Some(sample.clone());
                    emit(sample);
                    tick += 1;
                }
            })
            .map_err(|e| FeedError::Source(format!("failed to spawn ticker: {e}")))?;

        debug!(source = self.name, ?interval, "Ticker started");
        Ok(Subscription::new(move || {
            stop.store(true, Ordering::SeqCst);
            let _ = handle.join();
        }))
    }

    fn snapshot(&self) -> Option<T> {
        self.latest.lock().clone()
    }
}

/// A camera that takes a fixed time per capture.
pub struct SimulatedCamera {
    pub exposure: Duration,
    pub has_back_camera: bool,
}

impl CaptureBackend for SimulatedCamera {
    fn prepare(&mut self, done: PrepareCallback) {
        done(Ok(()));
    }

    fn capture_image(&mut self, request: &CaptureRequest, done: CaptureCallback) {
        if request.camera == CameraPosition::Back && !self.has_back_camera {
            done(Err(CaptureError::Backend("no back camera".to_string())));
            return;
        }

        let exposure = self.exposure;
        let request = request.clone();
        thread::spawn(move || {
            thread::sleep(exposure);
            let (width, height) = request.resolution_preset.dimensions().unwrap_or((4032, 3024));
            let image = format!("JPEG {}x{} #{}", width, height, request.request_id);
            done(Ok(Bytes::from(image)));
        });
    }
}

/// Grants camera access after a delay, like a user answering a prompt.
pub struct DelayedGrant {
    delay: Duration,
    granted: bool,
    status: Arc<Mutex<Availability>>,
}

impl DelayedGrant {
    pub fn new(delay: Duration, granted: bool) -> Self {
        Self {
            delay,
            granted,
            status: Arc::new(Mutex::new(Availability::Unknown)),
        }
    }
}

impl AuthorizationSource for DelayedGrant {
    fn current_status(&self) -> Availability {
        *self.status.lock()
    }

    fn request_access(&self, done: AccessCallback) {
        let delay = self.delay;
        let granted = self.granted;
        let status = Arc::clone(&self.status);
        thread::spawn(move || {
            thread::sleep(delay);
            *status.lock() = if granted {
                Availability::Granted
            } else {
                Availability::Denied
            };
            done(granted);
        });
    }
}
