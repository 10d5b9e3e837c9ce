//! Test configuration helpers for creating clients against mock or live services

use std::time::Duration;
use tempfile::TempDir;
use audio_dl::config::TimingConfig;
use audio_dl::{AudioClient, Config};

/// Error type for test configuration
#[derive(Debug)]
pub struct ConfigError(pub String);

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Config error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

/// Timings short enough for real-clock tests
pub fn fast_timing() -> TimingConfig {
    TimingConfig {
        notification_visible: Duration::from_millis(40),
        notification_fade: Duration::from_millis(10),
        object_url_release_delay: Duration::from_millis(10),
        overlay_close_delay: Duration::from_millis(20),
    }
}

/// Client talking to `base_url` and saving into a fresh temp dir
///
/// Returns the client and the temp dir (which must be kept alive).
pub fn create_client(base_url: &str) -> (AudioClient, TempDir) {
    create_client_with_timing(base_url, fast_timing())
}

/// Like [`create_client`] with explicit element lifetimes
pub fn create_client_with_timing(base_url: &str, timing: TimingConfig) -> (AudioClient, TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = Config {
        base_url: base_url.to_string(),
        timing,
        save: audio_dl::config::SaveConfig {
            save_dir: temp_dir.path().join("downloads"),
            ..Default::default()
        },
        ..Default::default()
    };
    let client = AudioClient::new(config).unwrap();
    (client, temp_dir)
}

/// Load the live service settings from the environment
///
/// Required environment variables:
/// - `AUDIO_DL_BASE_URL` - Base URL of a running extraction service
///
/// Optional environment variables:
/// - `AUDIO_DL_MEDIA_URL` - Media URL to search (default: a short public video)
pub fn load_live_config() -> Result<(String, String), ConfigError> {
    dotenvy::dotenv().ok();

    let base_url = std::env::var("AUDIO_DL_BASE_URL")
        .map_err(|_| ConfigError("AUDIO_DL_BASE_URL not set in environment".to_string()))?;
    let media_url = std::env::var("AUDIO_DL_MEDIA_URL")
        .unwrap_or_else(|_| "https://www.youtube.com/watch?v=jNQXAC9IVRw".to_string());

    Ok((base_url, media_url))
}

/// Whether a live service is configured
pub fn has_live_service() -> bool {
    load_live_config().is_ok()
}
