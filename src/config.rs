//! Configuration types for audio-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Lifetimes of transient surface elements
///
/// Groups the fixed delays that drive notification, overlay and object URL cleanup.
/// Used as a nested sub-config within [`Config`]. Serialized as milliseconds.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TimingConfig {
    /// How long a notification stays fully visible (default: 2000 ms)
    #[serde(default = "default_notification_visible", with = "millis_serde")]
    pub notification_visible: Duration,

    /// Fade-out duration; the notification is removed exactly this long after hiding starts
    /// (default: 500 ms)
    #[serde(default = "default_notification_fade", with = "millis_serde")]
    pub notification_fade: Duration,

    /// Delay before a save anchor and its object URL are released (default: 100 ms)
    #[serde(default = "default_object_url_release_delay", with = "millis_serde")]
    pub object_url_release_delay: Duration,

    /// Delay between "Download complete!" and closing the progress overlay (default: 1000 ms)
    #[serde(default = "default_overlay_close_delay", with = "millis_serde")]
    pub overlay_close_delay: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            notification_visible: default_notification_visible(),
            notification_fade: default_notification_fade(),
            object_url_release_delay: default_object_url_release_delay(),
            overlay_close_delay: default_overlay_close_delay(),
        }
    }
}

/// HTTP client settings for the extraction service
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Timeout for the search request (default: 120 seconds; extraction can be slow)
    #[serde(default = "default_search_timeout", with = "duration_serde")]
    pub search_timeout: Duration,

    /// Timeout for a whole audio download (None = no timeout; enhanced processing is slow)
    #[serde(default, with = "optional_duration_serde")]
    pub download_timeout: Option<Duration>,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            search_timeout: default_search_timeout(),
            download_timeout: None,
            user_agent: default_user_agent(),
        }
    }
}

/// Where saved audio files land
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SaveConfig {
    /// Directory for saved files (default: "downloads")
    #[serde(default = "default_save_dir")]
    pub save_dir: PathBuf,

    /// File collision handling
    #[serde(default)]
    pub file_collision: FileCollisionAction,
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            save_dir: default_save_dir(),
            file_collision: FileCollisionAction::default(),
        }
    }
}

/// Main configuration for [`AudioClient`](crate::AudioClient)
///
/// Fields are organized into logical sub-configs:
/// - [`timing`](TimingConfig): notification, overlay and object URL lifetimes
/// - [`http`](HttpConfig): request timeouts and headers
/// - [`save`](SaveConfig): save directory and collision handling
///
/// Sub-config fields are flattened, so the serialized form has no nesting.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the extraction service (default: "http://localhost:5000")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Transient element lifetimes
    #[serde(flatten)]
    pub timing: TimingConfig,

    /// HTTP client settings
    #[serde(flatten)]
    pub http: HttpConfig,

    /// Save target settings
    #[serde(flatten)]
    pub save: SaveConfig,

    /// How progress overlays of concurrent downloads relate to each other
    #[serde(default)]
    pub overlay_policy: OverlayPolicy,

    /// Event broadcast buffer size (default: 256)
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timing: TimingConfig::default(),
            http: HttpConfig::default(),
            save: SaveConfig::default(),
            overlay_policy: OverlayPolicy::default(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl Config {
    /// Check the configuration for values the client cannot run with
    pub fn validate(&self) -> Result<()> {
        let base = url::Url::parse(&self.base_url).map_err(|e| Error::Config {
            message: format!("base_url '{}' is not a valid URL: {}", self.base_url, e),
            key: Some("base_url".to_string()),
        })?;

        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::Config {
                message: format!(
                    "base_url must use http or https, got '{}'",
                    base.scheme()
                ),
                key: Some("base_url".to_string()),
            });
        }

        // broadcast::channel panics on a zero capacity
        if self.event_capacity == 0 {
            return Err(Error::Config {
                message: "event_capacity must be at least 1".to_string(),
                key: Some("event_capacity".to_string()),
            });
        }

        if self.save.save_dir.as_os_str().is_empty() {
            return Err(Error::Config {
                message: "save_dir must not be empty".to_string(),
                key: Some("save_dir".to_string()),
            });
        }

        Ok(())
    }
}

/// File collision handling strategy
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCollisionAction {
    /// Append (1), (2), etc. to filename (default)
    #[default]
    Rename,
    /// Overwrite existing file
    Overwrite,
    /// Refuse to save, keep existing
    Skip,
}

/// Progress overlay allocation policy
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayPolicy {
    /// Every download owns its overlay (default)
    #[default]
    PerJob,
    /// All downloads share one overlay key; updates and closes hit the first overlay
    /// carrying it, so concurrent jobs overwrite each other
    Shared,
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_notification_visible() -> Duration {
    Duration::from_millis(2000)
}

fn default_notification_fade() -> Duration {
    Duration::from_millis(500)
}

fn default_object_url_release_delay() -> Duration {
    Duration::from_millis(100)
}

fn default_overlay_close_delay() -> Duration {
    Duration::from_millis(1000)
}

fn default_search_timeout() -> Duration {
    Duration::from_secs(120)
}

fn default_user_agent() -> String {
    format!("audio-dl/{}", env!("CARGO_PKG_VERSION"))
}

fn default_save_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_event_capacity() -> usize {
    256
}

// Duration serialization helper (seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Optional Duration serialization helper (seconds)
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}

// Duration serialization helper (milliseconds)
mod millis_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
