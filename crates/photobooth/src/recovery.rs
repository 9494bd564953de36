//! Failure policy applied at every call site that talks to the service.
//!
//! Failures never escape as faults. Each one becomes the single `error`
//! string in [`BoothState`](crate::state::BoothState), replacing whatever
//! was there. Poll failures additionally end the session.

use tracing::warn;

use crate::error::BoothError;
use crate::state::BoothStore;

/// Where a failed request was issued from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallSite {
    Start,
    Stop,
    Poll,
    Gallery,
}

impl CallSite {
    /// Advisory shown to the user. Every variant points at the service.
    pub fn user_message(&self) -> &'static str {
        match self {
            CallSite::Start => {
                "Failed to start capture. Please check that the photo booth server is running."
            }
            CallSite::Stop => {
                "Failed to stop capture. Please check that the photo booth server is running."
            }
            CallSite::Poll => {
                "Lost connection to the photo booth server. Please check that it is running."
            }
            CallSite::Gallery => {
                "Unable to connect to the photo booth server. Please make sure it's running."
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CallSite::Start => "start",
            CallSite::Stop => "stop",
            CallSite::Poll => "poll",
            CallSite::Gallery => "gallery",
        }
    }
}

impl std::fmt::Display for CallSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Record a failure as the current user-facing error.
pub fn report(store: &BoothStore, site: CallSite, err: &BoothError) {
    warn!(%site, kind = ?err.kind(), "request failed: {}", err);
    store.update(|state| state.error = Some(site.user_message().to_string()));
}

/// Record a poll failure and end the session, if `generation` is still current.
///
/// Returns false when the poller was already superseded, in which case the
/// failure is only logged.
pub fn fail_session(store: &BoothStore, generation: u64, err: &BoothError) -> bool {
    warn!(site = %CallSite::Poll, kind = ?err.kind(), generation, "request failed: {}", err);
    store.update_for_generation(generation, |state| {
        state.error = Some(CallSite::Poll.user_message().to_string());
        state.is_capturing = false;
    })
}
