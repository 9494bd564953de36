//! Gallery synchronisation and viewer selection.

use std::sync::Arc;

use tracing::debug;

use crate::client::CaptureBackend;
use crate::recovery::{self, CallSite};
use crate::state::BoothStore;

/// Keeps `images` in step with the service.
///
/// Each sync replaces the whole collection. Overlapping syncs are harmless:
/// whichever completes last wins, and every result is a complete list.
/// Only `images`, `selected_image` and `error` are ever written here.
#[derive(Clone)]
pub struct GallerySync {
    backend: Arc<dyn CaptureBackend>,
    store: Arc<BoothStore>,
}

impl GallerySync {
    pub fn new(backend: Arc<dyn CaptureBackend>, store: Arc<BoothStore>) -> Self {
        Self { backend, store }
    }

    /// Fetch the full gallery and replace the local copy.
    ///
    /// On failure the previous images stay untouched. Returns whether the
    /// gallery was replaced.
    pub async fn sync(&self) -> bool {
        match self.backend.list_images().await {
            Ok(images) => {
                debug!(count = images.len(), "gallery replaced");
                self.store.update(|state| {
                    state.images = images;
                    state.error = None;
                });
                true
            }
            Err(e) => {
                recovery::report(&self.store, CallSite::Gallery, &e);
                false
            }
        }
    }

    /// Focus the image with `id`. Unknown ids leave the selection alone.
    pub fn select(&self, id: &str) -> bool {
        self.store.update_if(|state| {
            match state.images.iter().find(|image| image.id == id) {
                Some(image) => {
                    state.selected_image = Some(image.clone());
                    true
                }
                None => false,
            }
        })
    }

    pub fn close(&self) {
        self.store.update(|state| state.selected_image = None);
    }
}
