//! Exclusive request queue and its worker.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};

use bytes::Bytes;
use parking_lot::{Condvar, Mutex};
use sensorlink_ipc::CaptureRequest;
use tracing::{debug, error, info, instrument, warn};

use crate::authorization::{Availability, AuthorizationSource};
use crate::backend::{CaptureBackend, CaptureSink};
use crate::error::CaptureError;
use crate::{CaptureResult, OverflowPolicy, QueueConfig};

/// Queue counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Requests accepted into the queue.
    pub enqueued: u64,

    /// Captures delivered to the sink.
    pub captured: u64,

    /// Captures that failed in the backend.
    pub failed: u64,

    /// Requests evicted, rejected, or discarded before starting.
    pub dropped: u64,
}

#[derive(Default)]
struct Counters {
    enqueued: AtomicU64,
    captured: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

#[derive(Default)]
struct QueueState {
    pending: VecDeque<CaptureRequest>,
    in_flight: Option<i64>,
    availability: Availability,
    access_requested: bool,
    access_result: Option<bool>,
    prepare_result: Option<CaptureResult<()>>,
    terminated: bool,
    stopping: bool,
}

struct QueueShared {
    state: Mutex<QueueState>,
    wake: Condvar,
    counters: Counters,
    config: QueueConfig,
    sink: Arc<dyn CaptureSink>,
}

impl QueueShared {
    fn notify(&self) {
        self.wake.notify_all();
    }
}

/// FIFO of capture requests serviced by a single worker thread.
///
/// At most one capture is in flight at any time. Results reach the
/// [`CaptureSink`] in dequeue order.
pub struct ExclusiveRequestQueue {
    shared: Arc<QueueShared>,
    worker: Option<JoinHandle<()>>,
}

impl ExclusiveRequestQueue {
    /// Start the worker. The backend moves into the worker thread.
    #[instrument(name = "capture_queue_start", skip_all, fields(capacity = config.capacity))]
    pub fn start<B, A>(
        backend: B,
        authorization: A,
        sink: Arc<dyn CaptureSink>,
        config: QueueConfig,
    ) -> CaptureResult<Self>
    where
        B: CaptureBackend,
        A: AuthorizationSource,
    {
        let shared = Arc::new(QueueShared {
            state: Mutex::new(QueueState::default()),
            wake: Condvar::new(),
            counters: Counters::default(),
            config,
            sink,
        });

        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("capture-queue".to_string())
            .spawn(move || worker_loop(backend, authorization, worker_shared))
            .map_err(|e| CaptureError::Backend(format!("failed to spawn worker: {e}")))?;

        info!("Capture queue started");
        Ok(Self {
            shared,
            worker: Some(worker),
        })
    }

    /// Append a request to the tail. Never blocks on the worker.
    ///
    /// Under [`OverflowPolicy::DropOldest`] an evicted request is reported to
    /// the sink as [`CaptureError::Dropped`].
    pub fn enqueue(&self, request: CaptureRequest) -> CaptureResult<()> {
        let capacity = self.shared.config.capacity.max(1);
        let mut state = self.shared.state.lock();

        if state.terminated {
            return Err(CaptureError::AuthorizationDenied);
        }
        if state.stopping {
            return Err(CaptureError::Stopped);
        }

        let mut evicted = None;
        if state.pending.len() >= capacity {
            match self.shared.config.overflow {
                OverflowPolicy::RejectNew => {
                    self.shared.counters.dropped.fetch_add(1, Ordering::Relaxed);
                    debug!(request_id = request.request_id, "Capture queue full, rejecting");
                    return Err(CaptureError::QueueFull { capacity });
                }
                OverflowPolicy::DropOldest => {
                    evicted = state.pending.pop_front();
                    self.shared.counters.dropped.fetch_add(1, Ordering::Relaxed);
                }
            }
        }

        debug!(
            request_id = request.request_id,
            pending = state.pending.len() + 1,
            "Capture request enqueued"
        );
        state.pending.push_back(request);
        self.shared.counters.enqueued.fetch_add(1, Ordering::Relaxed);
        drop(state);

        self.shared.notify();

        if let Some(evicted) = evicted {
            debug!(request_id = evicted.request_id, "Evicted oldest capture request");
            let error = CaptureError::Dropped {
                request_id: evicted.request_id,
            };
            self.shared.sink.failed(Some(&evicted), &error);
        }
        Ok(())
    }

    /// Discard every request that has not started. Returns how many were
    /// discarded. A capture already in flight still completes.
    pub fn clear_pending(&self) -> usize {
        let discarded = {
            let mut state = self.shared.state.lock();
            let discarded = state.pending.len();
            state.pending.clear();
            discarded
        };

        if discarded > 0 {
            self.shared
                .counters
                .dropped
                .fetch_add(discarded as u64, Ordering::Relaxed);
            debug!(discarded, "Pending capture requests discarded");
        }
        discarded
    }

    /// Current authorization state as seen by the worker.
    pub fn availability(&self) -> Availability {
        self.shared.state.lock().availability
    }

    /// Number of requests waiting to start.
    pub fn pending(&self) -> usize {
        self.shared.state.lock().pending.len()
    }

    /// The request currently being captured, if any.
    pub fn in_flight(&self) -> Option<i64> {
        self.shared.state.lock().in_flight
    }

    /// Returns true once authorization was denied.
    pub fn is_terminated(&self) -> bool {
        self.shared.state.lock().terminated
    }

    /// Returns a snapshot of the queue counters.
    pub fn stats(&self) -> QueueStats {
        let counters = &self.shared.counters;
        QueueStats {
            enqueued: counters.enqueued.load(Ordering::Relaxed),
            captured: counters.captured.load(Ordering::Relaxed),
            failed: counters.failed.load(Ordering::Relaxed),
            dropped: counters.dropped.load(Ordering::Relaxed),
        }
    }

    /// Stop the worker and wait for it to exit.
    ///
    /// A capture already in flight still delivers its result to the sink.
    #[instrument(name = "capture_queue_stop", skip(self))]
    pub fn stop(&mut self) {
        {
            let mut state = self.shared.state.lock();
            state.stopping = true;
        }
        self.shared.notify();

        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
            info!("Capture queue stopped");
        }
    }
}

impl Drop for ExclusiveRequestQueue {
    fn drop(&mut self) {
        self.stop();
    }
}

fn worker_loop<B, A>(mut backend: B, authorization: A, shared: Arc<QueueShared>)
where
    B: CaptureBackend,
    A: AuthorizationSource,
{
    debug!("Capture worker started");
    let sink = Arc::clone(&shared.sink);

    if !prepare_backend(&mut backend, &shared, sink.as_ref()) {
        debug!("Capture worker stopped during prepare");
        return;
    }

    loop {
        let mut state = shared.state.lock();
        if state.stopping {
            break;
        }

        if state.availability == Availability::Unknown {
            let resolved = match state.access_result.take() {
                Some(true) => Availability::Granted,
                Some(false) => Availability::Denied,
                None => authorization.current_status(),
            };
            if resolved.is_resolved() {
                info!(availability = %resolved, "Capture authorization resolved");
                state.availability = resolved;
            }
        }

        let availability = state.availability;
        match availability {
            Availability::Granted => {}
            Availability::Denied => {
                state.terminated = true;
                let discarded = state.pending.len() as u64;
                state.pending.clear();
                drop(state);

                shared.counters.dropped.fetch_add(discarded, Ordering::Relaxed);
                error!(discarded, "Camera access denied, capture queue terminated");
                sink.failed(None, &CaptureError::AuthorizationDenied);
                break;
            }
            Availability::Unknown => {
                if !state.access_requested {
                    state.access_requested = true;
                    drop(state);

                    info!("Requesting camera access");
                    let weak = Arc::downgrade(&shared);
                    authorization.request_access(Box::new(move |granted| {
                        if let Some(shared) = weak.upgrade() {
                            shared.state.lock().access_result = Some(granted);
                            shared.notify();
                        }
                    }));
                } else {
                    let timeout = shared.config.authorization_poll();
                    shared.wake.wait_for(&mut state, timeout);
                }
                continue;
            }
        }

        if state.in_flight.is_some() || state.pending.is_empty() {
            let timeout = shared.config.idle_poll();
            shared.wake.wait_for(&mut state, timeout);
            continue;
        }

        let Some(request) = state.pending.pop_front() else {
            continue;
        };
        state.in_flight = Some(request.request_id);
        drop(state);

        debug!(request_id = request.request_id, "Starting capture");
        let weak = Arc::downgrade(&shared);
        let completion_sink = Arc::clone(&sink);
        let completed = request.clone();
        backend.capture_image(
            &request,
            Box::new(move |result| complete_capture(&weak, completion_sink.as_ref(), &completed, result)),
        );
    }

    debug!("Capture worker stopped");
}

/// Run the backend's one-time setup. Returns false if the queue stopped first.
fn prepare_backend<B: CaptureBackend>(
    backend: &mut B,
    shared: &Arc<QueueShared>,
    sink: &dyn CaptureSink,
) -> bool {
    let weak = Arc::downgrade(shared);
    backend.prepare(Box::new(move |result| {
        if let Some(shared) = weak.upgrade() {
            shared.state.lock().prepare_result = Some(result);
            shared.notify();
        }
    }));

    let mut state = shared.state.lock();
    loop {
        if state.stopping {
            return false;
        }
        if let Some(result) = state.prepare_result.take() {
            drop(state);
            match result {
                Ok(()) => debug!("Capture backend prepared"),
                Err(e) => {
                    warn!("Capture backend prepare failed: {}", e);
                    sink.failed(None, &e);
                }
            }
            return true;
        }
        let timeout = shared.config.idle_poll();
        shared.wake.wait_for(&mut state, timeout);
    }
}

fn complete_capture(
    shared: &Weak<QueueShared>,
    sink: &dyn CaptureSink,
    request: &CaptureRequest,
    result: CaptureResult<Bytes>,
) {
    let shared = shared.upgrade();

    match result {
        Ok(image) => {
            debug!(request_id = request.request_id, bytes = image.len(), "Capture completed");
            sink.captured(request, image);
            if let Some(ref shared) = shared {
                shared.counters.captured.fetch_add(1, Ordering::Relaxed);
            }
        }
        Err(e) => {
            warn!(request_id = request.request_id, "Capture failed: {}", e);
            sink.failed(Some(request), &e);
            if let Some(ref shared) = shared {
                shared.counters.failed.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    if let Some(shared) = shared {
        shared.state.lock().in_flight = None;
        shared.notify();
    }
}
