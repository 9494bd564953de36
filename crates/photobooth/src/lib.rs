//! Client-side controller for a remote photo capture service.
//!
//! The service runs the camera, countdown and storage. This crate drives it:
//! it starts and stops capture sessions, polls live status while a session
//! is active, and keeps a local copy of the gallery in sync whenever a photo
//! is produced.
//!
//! # Components
//!
//! - [`SessionController`] issues start/stop requests and owns the poll loop.
//! - [`StatusPoller`] fetches a snapshot every [`POLL_INTERVAL`] and applies it.
//! - [`GallerySync`] replaces the gallery wholesale from `GET /images`.
//! - [`recovery`] turns every failure into the single user-facing error.
//!
//! Everything observable lives in one [`BoothState`] owned by a [`BoothStore`].
//!
//! ```rust,no_run
//! # async fn demo() {
//! use photobooth::PhotoBooth;
//!
//! let config = boothconf::BoothConfig::load().unwrap();
//! let booth = PhotoBooth::connect(&config);
//! booth.init().await;
//! booth.start().await;
//! let mut updates = booth.subscribe();
//! while updates.changed().await.is_ok() {
//!     if let Some(live) = updates.borrow().live_view() {
//!         println!("{} {:?}", live.status, live.countdown);
//!     }
//! }
//! # }
//! ```

pub mod booth;
pub mod client;
pub mod error;
pub mod gallery;
pub mod poller;
pub mod recovery;
pub mod session;
pub mod state;
pub mod telemetry;
pub mod types;

pub use booth::PhotoBooth;
pub use client::{CaptureBackend, HttpBackend};
pub use error::{BoothError, FailureKind};
pub use gallery::GallerySync;
pub use poller::{PollExit, PollerHandle, StatusPoller, POLL_INTERVAL};
pub use recovery::CallSite;
pub use session::SessionController;
pub use state::{BoothState, BoothStore, LiveView};
pub use types::{CaptureStatus, CapturedImage, CAPTURED_STATUS};
