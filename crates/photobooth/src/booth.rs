//! The assembled client.

use std::sync::Arc;

use boothconf::BoothConfig;
use tokio::sync::watch;
use tracing::info;

use crate::client::{CaptureBackend, HttpBackend};
use crate::gallery::GallerySync;
use crate::session::SessionController;
use crate::state::{BoothState, BoothStore};

/// One client instance: shared state, gallery, and session controller.
///
/// Dropping it cancels any running poll loop.
pub struct PhotoBooth {
    store: Arc<BoothStore>,
    gallery: GallerySync,
    session: SessionController,
    frame_mime: String,
}

impl PhotoBooth {
    pub fn new(backend: Arc<dyn CaptureBackend>) -> Self {
        let store = Arc::new(BoothStore::new());
        let gallery = GallerySync::new(backend.clone(), store.clone());
        let session = SessionController::new(backend, store.clone(), gallery.clone());

        Self {
            store,
            gallery,
            session,
            frame_mime: boothconf::BackendConfig::default().frame_mime,
        }
    }

    /// MIME type used to turn the schemeless preview frame into a data URL.
    pub fn with_frame_mime(mut self, mime: impl Into<String>) -> Self {
        self.frame_mime = mime.into();
        self
    }

    pub fn frame_mime(&self) -> &str {
        &self.frame_mime
    }

    /// Build a client talking HTTP to the configured service.
    pub fn connect(config: &BoothConfig) -> Self {
        info!(url = %config.backend.url, "using capture service");
        Self::new(Arc::new(HttpBackend::new(&config.backend.url)))
            .with_frame_mime(config.backend.frame_mime.clone())
    }

    /// Startup work: the initial gallery sync.
    pub async fn init(&self) -> bool {
        self.gallery.sync().await
    }

    pub async fn start(&self) -> bool {
        self.session.start().await
    }

    pub async fn stop(&self) -> bool {
        self.session.stop().await
    }

    pub async fn refresh_gallery(&self) -> bool {
        self.gallery.sync().await
    }

    pub fn select_image(&self, id: &str) -> bool {
        self.gallery.select(id)
    }

    pub fn close_image(&self) {
        self.gallery.close()
    }

    pub fn snapshot(&self) -> BoothState {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<BoothState> {
        self.store.subscribe()
    }

    /// The live preview frame as a displayable data URL, while capturing.
    pub fn live_frame_url(&self) -> Option<String> {
        let state = self.store.snapshot();
        let live = state.live_view()?;
        live.frame_data_url(&self.frame_mime)
    }

    pub async fn is_polling(&self) -> bool {
        self.session.is_polling().await
    }

    /// Stop polling without telling the service, as on exit.
    pub async fn shutdown(&self) {
        self.session.shutdown().await
    }
}
