//! Explicit subscription handles.

use std::fmt;

/// Keeps a registration alive; releasing it runs the cleanup exactly once.
///
/// Dropping the handle is equivalent to calling [`Subscription::cancel`].
#[must_use = "dropping a Subscription releases it immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Create a subscription that runs `release` when it ends.
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Create a subscription with nothing to release.
    pub fn detached() -> Self {
        Self { release: None }
    }

    /// Release the subscription now.
    pub fn cancel(mut self) {
        self.release_now();
    }

    /// Returns true if the release has not run yet.
    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
