//! Client implementation split into focused submodules.
//!
//! The `AudioClient` struct and its methods are organized by flow:
//! - [`search`] - Search control handling and the remote lookup
//! - [`render`] - Result rendering and download action binding
//! - [`download`] - Download orchestration, progress milestones and saving

mod download;
mod render;
mod search;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use render::{ENHANCED_ACTION_LABEL, ENHANCED_EXPLANATION, ORIGINAL_ACTION_LABEL};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::notification::Notifier;
use crate::progress::ProgressReporter;
use crate::save::{DirectorySaver, SaveHandler};
use crate::service::{HealthStatus, HttpMediaService, MediaService};
use crate::surface::Surface;
use crate::timer::Scheduler;
use crate::types::{Event, JobId};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio_util::task::TaskTracker;
use url::Url;

/// Main client instance (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct AudioClient {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Parsed base URL, used to resolve relative endpoints
    pub(crate) base_url: Url,
    /// In-memory document the client renders into
    pub(crate) surface: Surface,
    /// Fixed-delay cleanups (notification fade, object URL release, overlay close)
    pub(crate) scheduler: Scheduler,
    /// Notification presenter
    pub(crate) notifier: Notifier,
    /// Progress overlay factory
    pub(crate) progress: ProgressReporter,
    /// Transport to the extraction service (trait object for pluggable implementations)
    pub(crate) service: Arc<dyn MediaService>,
    /// Save target for finished downloads
    pub(crate) saver: Arc<dyn SaveHandler>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Running download jobs
    pub(crate) jobs: TaskTracker,
    /// Next download job ID
    pub(crate) next_job_id: Arc<AtomicU64>,
}

impl std::fmt::Debug for AudioClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioClient")
            .field("base_url", &self.base_url.as_str())
            .field("overlay_policy", &self.config.overlay_policy)
            .field("running_jobs", &self.jobs.len())
            .finish_non_exhaustive()
    }
}

impl AudioClient {
    /// Create a client talking HTTP to `config.base_url` and saving into `config.save_dir`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is invalid, or [`Error::Network`] if
    /// the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let service = Arc::new(HttpMediaService::new(&config)?);
        let saver = Arc::new(DirectorySaver::from_config(&config.save));
        Self::with_parts(config, service, saver)
    }

    /// Create a client with a custom transport and save target
    ///
    /// # Examples
    ///
    /// ```
    /// use audio_dl::{AudioClient, Config};
    /// use audio_dl::save::MemorySaver;
    /// use audio_dl::service::HttpMediaService;
    /// use std::sync::Arc;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = Config::default();
    /// let service = Arc::new(HttpMediaService::new(&config)?);
    /// let saver = Arc::new(MemorySaver::new());
    ///
    /// let client = AudioClient::with_parts(config, service, saver)?;
    /// assert!(client.surface().control().enabled);
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_parts(
        config: Config,
        service: Arc<dyn MediaService>,
        saver: Arc<dyn SaveHandler>,
    ) -> Result<Self> {
        config.validate()?;
        let base_url = Url::parse(&config.base_url).map_err(|e| Error::Config {
            message: format!("base_url '{}' is not a valid URL: {}", config.base_url, e),
            key: Some("base_url".to_string()),
        })?;

        let (event_tx, _rx) = tokio::sync::broadcast::channel(config.event_capacity);
        let surface = Surface::new();
        let scheduler = Scheduler::new();
        let notifier = Notifier::new(
            surface.clone(),
            scheduler.clone(),
            event_tx.clone(),
            &config.timing,
        );
        let progress = ProgressReporter::new(surface.clone(), config.overlay_policy);

        tracing::info!(
            base_url = %base_url,
            overlay_policy = ?config.overlay_policy,
            "audio client initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            base_url,
            surface,
            scheduler,
            notifier,
            progress,
            service,
            saver,
            event_tx,
            jobs: TaskTracker::new(),
            next_job_id: Arc::new(AtomicU64::new(1)),
        })
    }

    /// Subscribe to client events
    ///
    /// Multiple subscribers are supported. Each subscriber receives all events independently.
    /// A subscriber that falls more than `event_capacity` events behind receives
    /// `RecvError::Lagged`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use audio_dl::{AudioClient, Config};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = AudioClient::new(Config::default())?;
    ///
    ///     let mut events = client.subscribe();
    ///     tokio::spawn(async move {
    ///         while let Ok(event) = events.recv().await {
    ///             tracing::info!(?event, "client event");
    ///         }
    ///     });
    ///
    ///     client.surface().set_url_input("https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    ///     client.click_search().await;
    ///     Ok(())
    /// }
    /// ```
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// The surface this client renders into
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Ask the extraction service whether it is up
    pub async fn health_check(&self) -> Result<HealthStatus> {
        self.service.health().await
    }

    /// Number of download jobs still running
    pub fn active_downloads(&self) -> usize {
        self.jobs.len()
    }

    /// Wait until every download started so far has settled
    ///
    /// Settled means the job reported its outcome; the delayed overlay close and success
    /// notification may still be pending.
    pub async fn wait_for_downloads(&self) {
        self.jobs.close();
        self.jobs.wait().await;
        self.jobs.reopen();
    }

    /// Wait for running downloads, then cancel every pending delayed cleanup
    ///
    /// Cancelled cleanups drop the elements they own, so once this returns the surface has
    /// no notification, overlay or save anchor left mounted. Timed behavior stops for good:
    /// later notifications are removed as soon as they are shown.
    pub async fn shutdown(&self) {
        tracing::info!(
            running = self.jobs.len(),
            pending_cleanups = self.scheduler.pending(),
            "shutting down audio client"
        );
        self.jobs.close();
        self.jobs.wait().await;
        self.scheduler.cancel_all();
        self.scheduler.settled().await;
        tracing::info!("audio client shut down");
    }

    /// Emit an event to all subscribers
    ///
    /// If there are no active subscribers, the event is silently dropped.
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }

    pub(crate) fn next_job_id(&self) -> JobId {
        JobId(self.next_job_id.fetch_add(1, Ordering::Relaxed))
    }
}
