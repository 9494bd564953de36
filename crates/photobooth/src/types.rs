//! Wire types exchanged with the capture service.

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::BoothError;

/// Status value the service reports once a photo has been produced.
pub const CAPTURED_STATUS: &str = "captured";

/// Status value the service reports when no countdown is running.
pub const IDLE_STATUS: &str = "idle";

/// One image in the gallery, as listed by `GET /images`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedImage {
    pub id: String,
    /// Resolvable image resource; may be relative to the service base URL.
    pub url: String,
    /// Display-formatted capture time.
    pub timestamp: String,
}

/// One polled response from `GET /capture-status`.
///
/// `status` is an open vocabulary. Only [`CAPTURED_STATUS`] has meaning to
/// the client; anything else is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureStatus {
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub countdown: Option<u32>,
    pub status: String,
    /// Base64 image payload without a `data:` prefix.
    #[serde(default)]
    pub frame: Option<String>,
}

impl CaptureStatus {
    pub fn is_captured(&self) -> bool {
        self.status == CAPTURED_STATUS
    }

    /// Frame prefixed for display, if the snapshot carries one.
    pub fn frame_data_url(&self, mime: &str) -> Option<String> {
        self.frame.as_deref().map(|frame| frame_data_url(frame, mime))
    }
}

/// Prefix a bare base64 frame with a `data:` scheme.
pub fn frame_data_url(frame: &str, mime: &str) -> String {
    format!("data:{};base64,{}", mime, frame)
}

/// Decode a bare base64 frame into image bytes.
pub fn decode_frame(frame: &str) -> Result<Vec<u8>, BoothError> {
    base64::engine::general_purpose::STANDARD
        .decode(frame.trim())
        .map_err(BoothError::Frame)
}
