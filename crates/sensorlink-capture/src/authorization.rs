//! Camera access availability.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether the exclusive resource may be used.
///
/// `Granted` and `Denied` are terminal for the lifetime of a queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    /// Access has not been decided yet.
    #[default]
    Unknown,

    /// Access was granted.
    Granted,

    /// Access was denied or is restricted.
    Denied,
}

impl Availability {
    /// Returns true once access has been decided either way.
    pub fn is_resolved(self) -> bool {
        !matches!(self, Self::Unknown)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Granted => "Granted",
            Self::Denied => "Denied",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Callback for an access request; receives whether access was granted.
pub type AccessCallback = Box<dyn FnOnce(bool) + Send>;

/// Source of the camera access decision.
pub trait AuthorizationSource: Send + 'static {
    /// Current status, without prompting.
    fn current_status(&self) -> Availability;

    /// Ask for access; `done` may run on any thread.
    fn request_access(&self, done: AccessCallback);
}

/// An authorization source with a fixed answer.
#[derive(Debug, Clone, Copy)]
pub struct FixedAuthorization(pub Availability);

impl AuthorizationSource for FixedAuthorization {
    fn current_status(&self) -> Availability {
        self.0
    }

    fn request_access(&self, done: AccessCallback) {
        done(self.0 == Availability::Granted);
    }
}
