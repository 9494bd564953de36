//! Fixed-cadence status polling for an active session.
//!
//! One tick is: fetch a snapshot, apply it, and on a transition into
//! `"captured"` refresh the gallery. Ticks never overlap; the next one is
//! scheduled only after the previous one has fully completed, and a slow
//! response delays the cadence rather than stacking requests.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::client::CaptureBackend;
use crate::gallery::GallerySync;
use crate::recovery;
use crate::state::BoothStore;

/// Time between status requests. Tuned for a smooth live preview.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Why a poll loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollExit {
    /// Cancelled through its handle.
    Cancelled,
    /// A newer generation took over before this loop could write.
    Superseded,
    /// A status request failed and the session was ended.
    Failed,
}

/// Poll loop for one session. Consumed by [`StatusPoller::spawn`].
pub struct StatusPoller {
    backend: Arc<dyn CaptureBackend>,
    store: Arc<BoothStore>,
    gallery: GallerySync,
}

impl StatusPoller {
    pub fn new(
        backend: Arc<dyn CaptureBackend>,
        store: Arc<BoothStore>,
        gallery: GallerySync,
    ) -> Self {
        Self {
            backend,
            store,
            gallery,
        }
    }

    /// Run the loop as a task that writes only while `generation` is current.
    pub fn spawn(self, generation: u64) -> PollerHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let task = tokio::spawn(async move { self.run(generation, token).await });

        PollerHandle {
            generation,
            cancel,
            task: Some(task),
        }
    }

    async fn run(self, generation: u64, cancel: CancellationToken) -> PollExit {
        let mut interval = tokio::time::interval(POLL_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut was_captured = false;
        debug!(generation, "status poller started");

        let exit = loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break PollExit::Cancelled,
                _ = interval.tick() => {}
            }

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => break PollExit::Cancelled,
                result = self.backend.capture_status() => result,
            };

            let snapshot = match result {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    recovery::fail_session(&self.store, generation, &e);
                    cancel.cancel();
                    break PollExit::Failed;
                }
            };

            // A good tick clears any banner left by an earlier failed call.
            let applied = self.store.update_for_generation(generation, |state| {
                state.apply_snapshot(&snapshot);
                state.error = None;
            });
            if !applied {
                break PollExit::Superseded;
            }
            trace!(generation, status = %snapshot.status, countdown = ?snapshot.countdown, "snapshot applied");

            let captured = snapshot.is_captured();
            if captured && !was_captured {
                info!(generation, "photo captured, refreshing gallery");
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break PollExit::Cancelled,
                    _ = self.gallery.sync() => {}
                }
            }
            was_captured = captured;
        };

        debug!(generation, ?exit, "status poller stopped");
        exit
    }
}

/// Owned handle to a running poll loop.
///
/// Dropping the handle cancels the loop, so a poller can never outlive the
/// controller that spawned it.
#[derive(Debug)]
pub struct PollerHandle {
    generation: u64,
    cancel: CancellationToken,
    task: Option<JoinHandle<PollExit>>,
}

impl PollerHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the loop has exited, for any reason.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |task| task.is_finished())
    }

    /// Cancel the loop and wait for it to exit. Safe on a finished loop.
    pub async fn shutdown(mut self) -> Option<PollExit> {
        self.cancel.cancel();
        let task = self.task.take()?;
        match task.await {
            Ok(exit) => Some(exit),
            Err(e) => {
                warn!(generation = self.generation, "status poller task failed: {}", e);
                None
            }
        }
    }

    /// Cancel the loop without waiting for it.
    pub fn abort(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
