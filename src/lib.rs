//! # audio-dl
//!
//! Headless client for a remote audio extraction service: search a media URL, render the
//! result, and download the original or enhanced audio with progress reporting.
//!
//! ## Design Philosophy
//!
//! audio-dl is designed to be:
//! - **Headless** - Everything the user would see lives in an in-memory [`Surface`]
//! - **Sensible defaults** - Timings and labels work out of the box
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Event-driven** - Consumers subscribe to events, no polling required
//!
//! ## Quick Start
//!
//! ```no_run
//! use audio_dl::{AudioClient, Config, Variant};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = AudioClient::new(Config {
//!         base_url: "http://localhost:5000".to_string(),
//!         ..Default::default()
//!     })?;
//!
//!     // Subscribe to events
//!     let mut events = client.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     client.surface().set_url_input("https://www.youtube.com/watch?v=dQw4w9WgXcQ");
//!     if let Some(Ok(result)) = client.click_search().await {
//!         println!("found {}", result.metadata.title);
//!         if let Some(job) = client.click_download(Variant::Enhanced) {
//!             let saved = job.await??;
//!             println!("saved to {}", saved.location.display());
//!         }
//!     }
//!
//!     client.shutdown().await;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Search, render and download flows (decomposed into focused submodules)
pub mod client;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Auto-dismissing notifications
pub mod notification;
/// Progress overlays
pub mod progress;
/// Save targets for downloaded audio
pub mod save;
/// Remote extraction service
pub mod service;
/// In-memory document model
pub mod surface;
/// Deferred, cancellable callbacks
pub mod timer;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use client::AudioClient;
pub use config::{Config, FileCollisionAction, OverlayPolicy};
pub use error::{Error, ErrorKind, Result, SaveError};
pub use save::{DirectorySaver, MemorySaver, SaveHandler};
pub use service::{AudioBody, HealthStatus, HttpMediaService, MediaService};
pub use surface::Surface;
pub use types::{
    AudioInfo, DownloadJob, Event, FieldValue, JobId, Metadata, NotificationKind, SavedFile,
    SearchResult, Variant,
};

/// Run the client until a termination signal arrives, then shut it down.
///
/// Listens for SIGTERM and SIGINT on Unix and for Ctrl+C elsewhere.
///
/// # Example
///
/// ```no_run
/// use audio_dl::{AudioClient, Config, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = AudioClient::new(Config::default())?;
///     run_with_shutdown(client).await;
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(client: AudioClient) {
    wait_for_signal().await;
    client.shutdown().await;
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            // Restricted environments may refuse the handler
            tracing::warn!(error = %e, "could not register SIGTERM handler, waiting for Ctrl+C");
            ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => tracing::info!("received SIGTERM"),
        _ = ctrl_c() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    ctrl_c().await;
}

async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("received Ctrl+C"),
        Err(e) => tracing::error!(error = %e, "failed to listen for Ctrl+C"),
    }
}
