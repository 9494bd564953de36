//! Observable client state.
//!
//! All state lives in one [`BoothState`] value behind a `watch` channel, so
//! every mutation is an atomic replace and observers see whole states. The
//! store also carries the poll generation: a poller only writes while the
//! generation it was spawned with is still current, which keeps a response
//! that was in flight at cancellation time from landing afterwards.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::trace;

use crate::types::{frame_data_url, CaptureStatus, CapturedImage, IDLE_STATUS};

/// Everything the UI renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoothState {
    pub is_capturing: bool,
    pub countdown: Option<u32>,
    pub status: String,
    pub current_frame: Option<String>,
    /// Latest user-facing error. Replaced, never accumulated.
    pub error: Option<String>,
    pub images: Vec<CapturedImage>,
    /// Image focused in the viewer. Independent of the session.
    pub selected_image: Option<CapturedImage>,
}

impl Default for BoothState {
    fn default() -> Self {
        Self {
            is_capturing: false,
            countdown: None,
            status: IDLE_STATUS.to_string(),
            current_frame: None,
            error: None,
            images: Vec::new(),
            selected_image: None,
        }
    }
}

impl BoothState {
    /// Replace the live fields with a snapshot. Absent values clear.
    pub fn apply_snapshot(&mut self, snapshot: &CaptureStatus) {
        self.countdown = snapshot.countdown;
        self.status = snapshot.status.clone();
        self.current_frame = snapshot.frame.clone();
    }

    /// The live session fields, available only while a session is active.
    pub fn live_view(&self) -> Option<LiveView<'_>> {
        self.is_capturing.then(|| LiveView {
            countdown: self.countdown,
            status: &self.status,
            frame: self.current_frame.as_deref(),
        })
    }
}

/// Borrowed view of the session fields of an active session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveView<'a> {
    pub countdown: Option<u32>,
    pub status: &'a str,
    pub frame: Option<&'a str>,
}

impl LiveView<'_> {
    pub fn frame_data_url(&self, mime: &str) -> Option<String> {
        self.frame.map(|frame| frame_data_url(frame, mime))
    }
}

/// Owner of [`BoothState`] and the poll generation counter.
#[derive(Debug)]
pub struct BoothStore {
    tx: watch::Sender<BoothState>,
    generation: AtomicU64,
}

impl Default for BoothStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BoothStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(BoothState::default());
        Self {
            tx,
            generation: AtomicU64::new(0),
        }
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> BoothState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<BoothState> {
        self.tx.subscribe()
    }

    /// Mutate the state unconditionally and notify observers.
    pub fn update(&self, f: impl FnOnce(&mut BoothState)) {
        self.tx.send_modify(f);
    }

    /// Mutate the state, notifying observers only when `f` returns true.
    pub fn update_if(&self, f: impl FnOnce(&mut BoothState) -> bool) -> bool {
        self.tx.send_if_modified(f)
    }

    /// Start a new poll generation, invalidating writes from older pollers.
    pub fn advance_generation(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        trace!(generation, "poll generation advanced");
        generation
    }

    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Mutate the state only if `generation` is still current.
    ///
    /// The check runs under the channel lock, so it cannot interleave with
    /// another write. Returns whether the mutation was applied.
    pub fn update_for_generation(&self, generation: u64, f: impl FnOnce(&mut BoothState)) -> bool {
        self.tx.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            f(state);
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(countdown: Option<u32>, status: &str, frame: Option<&str>) -> CaptureStatus {
        CaptureStatus {
            active: true,
            countdown,
            status: status.to_string(),
            frame: frame.map(str::to_string),
        }
    }

    #[test]
    fn test_absent_countdown_clears_previous_value() {
        let mut state = BoothState {
            is_capturing: true,
            ..Default::default()
        };

        state.apply_snapshot(&snapshot(Some(3), "counting", Some("AAAA")));
        assert_eq!(state.countdown, Some(3));
        assert_eq!(state.current_frame.as_deref(), Some("AAAA"));

        state.apply_snapshot(&snapshot(None, "idle", None));
        assert_eq!(state.countdown, None);
        assert_eq!(state.current_frame, None);
        assert_eq!(state.status, "idle");
    }

    #[test]
    fn test_live_view_hidden_when_not_capturing() {
        let mut state = BoothState::default();
        state.apply_snapshot(&snapshot(Some(1), "counting", Some("AAAA")));
        assert!(state.live_view().is_none());

        state.is_capturing = true;
        let view = state.live_view().unwrap();
        assert_eq!(view.countdown, Some(1));
        assert_eq!(view.status, "counting");
        assert_eq!(
            view.frame_data_url("image/png").as_deref(),
            Some("data:image/png;base64,AAAA")
        );
    }

    #[test]
    fn test_stale_generation_write_is_discarded() {
        let store = BoothStore::new();
        let first = store.advance_generation();
        assert!(store.update_for_generation(first, |s| s.status = "counting".into()));

        let second = store.advance_generation();
        assert!(!store.update_for_generation(first, |s| s.status = "stale".into()));
        assert_eq!(store.snapshot().status, "counting");

        assert!(store.update_for_generation(second, |s| s.status = "captured".into()));
        assert_eq!(store.current_generation(), second);
        assert_eq!(store.snapshot().status, "captured");
    }

    #[tokio::test]
    async fn test_subscribers_see_updates() {
        let store = BoothStore::new();
        let mut rx = store.subscribe();

        store.update(|s| s.error = Some("boom".into()));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().error.as_deref(), Some("boom"));
    }
}
