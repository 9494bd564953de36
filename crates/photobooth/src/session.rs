//! Session lifecycle: start and stop requests, and ownership of the poller.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::client::CaptureBackend;
use crate::gallery::GallerySync;
use crate::poller::{PollerHandle, StatusPoller};
use crate::recovery::{self, CallSite};
use crate::state::BoothStore;

pub const STATUS_STARTING: &str = "Starting capture session...";
pub const STATUS_START_FAILED: &str = "Failed to start capture";
pub const STATUS_STOPPING: &str = "Stopping capture session...";
pub const STATUS_STOPPED: &str = "Capture session stopped";
pub const STATUS_STOP_FAILED: &str = "Failed to stop capture";

/// Starts and stops sessions and holds the only handle to the poll loop.
///
/// `start` and `stop` are serialised on the poller slot, so at most one
/// loop exists and a new one is only spawned after the previous one has
/// been torn down.
pub struct SessionController {
    backend: Arc<dyn CaptureBackend>,
    store: Arc<BoothStore>,
    gallery: GallerySync,
    poller: Mutex<Option<PollerHandle>>,
}

impl SessionController {
    pub fn new(
        backend: Arc<dyn CaptureBackend>,
        store: Arc<BoothStore>,
        gallery: GallerySync,
    ) -> Self {
        Self {
            backend,
            store,
            gallery,
            poller: Mutex::new(None),
        }
    }

    /// Begin a session and start polling.
    ///
    /// A no-op returning false while a session is already active. On failure
    /// the session is left inactive and no polling happens.
    pub async fn start(&self) -> bool {
        let mut slot = self.poller.lock().await;

        let running = slot.as_ref().is_some_and(|handle| !handle.is_finished());
        if running || self.store.snapshot().is_capturing {
            debug!("start ignored, session already active");
            return false;
        }

        // A loop that ended on its own (poll failure) still needs reaping.
        if let Some(previous) = slot.take() {
            previous.shutdown().await;
        }

        self.store.update(|state| {
            state.error = None;
            state.is_capturing = true;
            state.status = STATUS_STARTING.to_string();
        });

        match self.backend.start_capture().await {
            Ok(()) => {
                let generation = self.store.advance_generation();
                let poller = StatusPoller::new(
                    self.backend.clone(),
                    self.store.clone(),
                    self.gallery.clone(),
                );
                *slot = Some(poller.spawn(generation));
                info!(generation, "capture session started");
                true
            }
            Err(e) => {
                recovery::report(&self.store, CallSite::Start, &e);
                self.store.update(|state| {
                    state.status = STATUS_START_FAILED.to_string();
                    state.is_capturing = false;
                });
                false
            }
        }
    }

    /// End the session.
    ///
    /// Always leaves the session inactive, including when the request fails
    /// or no session was active. Returns whether the service acknowledged.
    pub async fn stop(&self) -> bool {
        let mut slot = self.poller.lock().await;

        self.store.update(|state| {
            state.error = None;
            state.status = STATUS_STOPPING.to_string();
        });

        match self.backend.stop_capture().await {
            Ok(()) => {
                self.store.advance_generation();
                if let Some(handle) = slot.take() {
                    handle.shutdown().await;
                }
                self.store.update(|state| {
                    state.is_capturing = false;
                    state.status = STATUS_STOPPED.to_string();
                });
                info!("capture session stopped");
                true
            }
            Err(e) => {
                self.store.advance_generation();
                if let Some(handle) = slot.take() {
                    handle.abort();
                }
                recovery::report(&self.store, CallSite::Stop, &e);
                self.store.update(|state| {
                    state.status = STATUS_STOP_FAILED.to_string();
                    state.is_capturing = false;
                });
                false
            }
        }
    }

    /// Tear down polling without contacting the service.
    ///
    /// The service-side session, if any, is left running.
    pub async fn shutdown(&self) {
        let mut slot = self.poller.lock().await;
        self.store.advance_generation();
        if let Some(handle) = slot.take() {
            let exit = handle.shutdown().await;
            debug!(?exit, "poller torn down on shutdown");
        }
        self.store.update(|state| state.is_capturing = false);
    }

    /// Whether a poll loop is currently running.
    pub async fn is_polling(&self) -> bool {
        self.poller
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}
