//! Shared helpers for photobooth integration tests.
//!
//! `ScriptedBackend` is an in-process capture service whose responses are
//! queued up front. Status requests pop from the script and fall back to a
//! steady snapshot once it runs dry; gallery requests repeat the last list.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use photobooth::{BoothError, CaptureBackend, CaptureStatus, CapturedImage};
use reqwest::StatusCode;

pub fn snapshot(status: &str, countdown: Option<u32>) -> CaptureStatus {
    CaptureStatus {
        active: true,
        countdown,
        status: status.to_string(),
        frame: Some("/9j/".to_string()),
    }
}

pub fn idle() -> CaptureStatus {
    CaptureStatus {
        active: true,
        countdown: None,
        status: "idle".to_string(),
        frame: None,
    }
}

pub fn image(id: &str) -> CapturedImage {
    CapturedImage {
        id: id.to_string(),
        url: format!("/images/{}.jpg", id),
        timestamp: format!("2024-05-01 10:00:{:0>2}", id.len()),
    }
}

fn server_error(path: &str, status: StatusCode) -> BoothError {
    BoothError::Request {
        url: format!("http://scripted{}", path),
        status,
    }
}

#[derive(Default)]
pub struct ScriptedBackend {
    statuses: Mutex<VecDeque<Result<CaptureStatus, StatusCode>>>,
    steady: Mutex<Option<CaptureStatus>>,
    galleries: Mutex<VecDeque<Vec<CapturedImage>>>,
    last_gallery: Mutex<Vec<CapturedImage>>,
    gallery_failure: Mutex<Option<StatusCode>>,
    start_failure: Mutex<Option<StatusCode>>,
    stop_failure: Mutex<Option<StatusCode>>,
    status_delay: Mutex<Duration>,

    pub poll_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub start_calls: AtomicUsize,
    pub stop_calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_statuses(self, statuses: impl IntoIterator<Item = CaptureStatus>) -> Self {
        self.statuses
            .lock()
            .unwrap()
            .extend(statuses.into_iter().map(Ok));
        self
    }

    /// Queue a failing status response after whatever is already scripted.
    pub fn then_status_error(self, status: StatusCode) -> Self {
        self.statuses.lock().unwrap().push_back(Err(status));
        self
    }

    pub fn with_steady(self, status: CaptureStatus) -> Self {
        *self.steady.lock().unwrap() = Some(status);
        self
    }

    pub fn with_galleries(self, galleries: impl IntoIterator<Item = Vec<CapturedImage>>) -> Self {
        self.galleries.lock().unwrap().extend(galleries);
        self
    }

    pub fn with_status_delay(self, delay: Duration) -> Self {
        *self.status_delay.lock().unwrap() = delay;
        self
    }

    pub fn fail_start(self, status: StatusCode) -> Self {
        *self.start_failure.lock().unwrap() = Some(status);
        self
    }

    pub fn fail_stop(self, status: StatusCode) -> Self {
        *self.stop_failure.lock().unwrap() = Some(status);
        self
    }

    pub fn set_gallery_failure(&self, status: Option<StatusCode>) {
        *self.gallery_failure.lock().unwrap() = status;
    }

    pub fn polls(&self) -> usize {
        self.poll_calls.load(Ordering::SeqCst)
    }

    pub fn lists(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn starts(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// Decrements the in-flight counter even when the request future is dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CaptureBackend for ScriptedBackend {
    async fn list_images(&self) -> Result<Vec<CapturedImage>, BoothError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = *self.gallery_failure.lock().unwrap() {
            return Err(server_error("/images", status));
        }

        let mut last = self.last_gallery.lock().unwrap();
        if let Some(next) = self.galleries.lock().unwrap().pop_front() {
            *last = next;
        }
        Ok(last.clone())
    }

    async fn start_capture(&self) -> Result<(), BoothError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        match *self.start_failure.lock().unwrap() {
            Some(status) => Err(server_error("/start-capture", status)),
            None => Ok(()),
        }
    }

    async fn stop_capture(&self) -> Result<(), BoothError> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        match *self.stop_failure.lock().unwrap() {
            Some(status) => Err(server_error("/stop-capture", status)),
            None => Ok(()),
        }
    }

    async fn capture_status(&self) -> Result<CaptureStatus, BoothError> {
        self.poll_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        let delay = *self.status_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let next = self.statuses.lock().unwrap().pop_front();
        match next {
            Some(Ok(status)) => Ok(status),
            Some(Err(code)) => Err(server_error("/capture-status", code)),
            None => Ok(self.steady.lock().unwrap().clone().unwrap_or_else(idle)),
        }
    }
}
