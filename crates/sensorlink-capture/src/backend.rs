//! Capture backend and result sink seams.

use bytes::Bytes;
use sensorlink_ipc::CaptureRequest;

use crate::error::CaptureError;
use crate::CaptureResult;

/// Completion callback for [`CaptureBackend::prepare`].
pub type PrepareCallback = Box<dyn FnOnce(CaptureResult<()>) + Send>;

/// Completion callback for [`CaptureBackend::capture_image`].
pub type CaptureCallback = Box<dyn FnOnce(CaptureResult<Bytes>) + Send>;

/// Hardware that can perform one capture at a time.
///
/// The queue worker owns the backend exclusively and never calls
/// `capture_image` again before the previous callback has fired.
/// Callbacks may run on any thread, including inline.
pub trait CaptureBackend: Send + 'static {
    /// One-time asynchronous setup.
    fn prepare(&mut self, done: PrepareCallback);

    /// Capture one image for `request`.
    fn capture_image(&mut self, request: &CaptureRequest, done: CaptureCallback);
}

/// Receives capture outcomes, in dequeue order.
pub trait CaptureSink: Send + Sync {
    /// A capture finished successfully.
    fn captured(&self, request: &CaptureRequest, image: Bytes);

    /// A capture or the queue itself failed. `request` is `None` for
    /// queue-wide failures such as a denied authorization.
    fn failed(&self, request: Option<&CaptureRequest>, error: &CaptureError);
}
