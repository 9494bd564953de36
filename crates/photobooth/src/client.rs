//! HTTP access to the capture service.
//!
//! The core only talks to the service through [`CaptureBackend`], so the
//! session logic can be driven by anything that speaks the same four calls.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::error::BoothError;
use crate::types::{CaptureStatus, CapturedImage};

/// The four operations the client needs from the capture service.
#[async_trait]
pub trait CaptureBackend: Send + Sync {
    /// `GET /images`: the full gallery, in service order.
    async fn list_images(&self) -> Result<Vec<CapturedImage>, BoothError>;

    /// `POST /start-capture`. The response body is ignored.
    async fn start_capture(&self) -> Result<(), BoothError>;

    /// `POST /stop-capture`. The response body is ignored.
    async fn stop_capture(&self) -> Result<(), BoothError>;

    /// `GET /capture-status`: one snapshot.
    async fn capture_status(&self) -> Result<CaptureStatus, BoothError>;
}

/// reqwest-backed [`CaptureBackend`].
///
/// No request timeout is set; calls take the transport's defaults.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a gallery URL against the service when it is root-relative.
    pub fn resolve_url(&self, url: &str) -> String {
        if url.starts_with('/') {
            format!("{}{}", self.base_url, url)
        } else {
            url.to_string()
        }
    }

    /// Fetch the image bytes behind a gallery entry.
    pub async fn download_image(&self, image: &CapturedImage) -> Result<Vec<u8>, BoothError> {
        let url = self.resolve_url(&image.url);
        debug!(id = %image.id, %url, "downloading image");

        let response = self.send(self.client.get(&url), &url).await?;
        let bytes = response.bytes().await.map_err(|source| BoothError::Decode {
            url: url.clone(),
            source,
        })?;
        Ok(bytes.to_vec())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request, mapping transport errors and non-2xx statuses.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<Response, BoothError> {
        let response = request.send().await.map_err(|source| BoothError::Connect {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(BoothError::Request {
                url: url.to_string(),
                status,
            });
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BoothError> {
        let url = self.endpoint(path);
        let response = self.send(self.client.get(&url), &url).await?;
        response.json().await.map_err(|source| BoothError::Decode { url, source })
    }

    async fn post_empty(&self, path: &str) -> Result<(), BoothError> {
        let url = self.endpoint(path);
        self.send(self.client.post(&url), &url).await?;
        Ok(())
    }
}

#[async_trait]
impl CaptureBackend for HttpBackend {
    async fn list_images(&self) -> Result<Vec<CapturedImage>, BoothError> {
        let images: Vec<CapturedImage> = self.get_json("/images").await?;
        debug!(count = images.len(), "listed images");
        Ok(images)
    }

    async fn start_capture(&self) -> Result<(), BoothError> {
        debug!("requesting capture start");
        self.post_empty("/start-capture").await
    }

    async fn stop_capture(&self) -> Result<(), BoothError> {
        debug!("requesting capture stop");
        self.post_empty("/stop-capture").await
    }

    async fn capture_status(&self) -> Result<CaptureStatus, BoothError> {
        let status: CaptureStatus = self.get_json("/capture-status").await?;
        trace!(status = %status.status, countdown = ?status.countdown, "capture status");
        Ok(status)
    }
}
