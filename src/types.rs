//! Core types for audio-dl

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Unique identifier for a download job
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub u64);

impl JobId {
    /// Create a new JobId
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner u64 value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for JobId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which artifact of a search result is downloaded
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Audio as extracted
    Original,
    /// Audio with normalization, EQ and compression applied server-side
    Enhanced,
}

impl Variant {
    /// Capitalized label used in overlay headings
    pub fn label(&self) -> &'static str {
        match self {
            Variant::Original => "Original",
            Variant::Enhanced => "Enhanced",
        }
    }

    /// Suffix appended to the sanitized title when building the suggested filename
    pub fn filename_suffix(&self) -> &'static str {
        match self {
            Variant::Original => "",
            Variant::Enhanced => "_enhanced",
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Variant::Original => write!(f, "original"),
            Variant::Enhanced => write!(f, "enhanced"),
        }
    }
}

/// A scalar the service may send either as a JSON number or as text
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Numeric value
    Number(serde_json::Number),
    /// Text value
    Text(String),
}

impl FieldValue {
    /// Whether the value counts as absent for display purposes (zero or empty text)
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Number(n) => n.as_f64() == Some(0.0),
            FieldValue::Text(s) => s.is_empty(),
        }
    }

    /// Numeric value, if this is a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => n.as_f64(),
            FieldValue::Text(_) => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        FieldValue::Number(value.into())
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            // Integral floats print without a trailing ".0"
            FieldValue::Number(n) => match n.as_f64() {
                Some(v) if n.is_f64() && v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 => {
                    write!(f, "{}", v as i64)
                }
                _ => write!(f, "{}", n),
            },
        }
    }
}

/// Media metadata extracted by the service
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Media title
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    /// Channel / uploader
    #[serde(default)]
    pub artist: Option<String>,
    /// Human-formatted duration ("3:45")
    #[serde(default)]
    pub duration: Option<FieldValue>,
    /// Duration in seconds
    #[serde(default)]
    pub duration_seconds: Option<FieldValue>,
    /// View count
    #[serde(default)]
    pub views: Option<FieldValue>,
    /// Thumbnail URL
    #[serde(default, deserialize_with = "null_as_empty")]
    pub thumbnail: String,
    /// Upload date as reported by the service (YYYYMMDD)
    #[serde(default)]
    pub upload_date: Option<String>,
}

/// Description of the best available audio stream
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioInfo {
    /// Quality bucket ("High (>=256 kbps)")
    #[serde(default)]
    pub quality: Option<String>,
    /// Source bitrate
    #[serde(default)]
    pub bitrate: Option<FieldValue>,
    /// Source codec
    #[serde(default)]
    pub codec: Option<String>,
    /// Output container format
    #[serde(default)]
    pub format: Option<String>,
    /// Output quality targeted by the transcoder
    #[serde(default)]
    pub target_quality: Option<String>,
    /// Estimated output size in megabytes
    #[serde(default)]
    pub estimated_size_mb: Option<FieldValue>,
}

/// Text field where an explicit `null` reads as empty
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A successful search response
///
/// Immutable once produced; the displayed result is replaced wholesale by the next search.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Service-side media identifier
    #[serde(default)]
    pub video_id: Option<String>,
    /// Media metadata
    pub metadata: Metadata,
    /// Audio stream description
    #[serde(default)]
    pub audio_info: AudioInfo,
    /// Endpoint serving the original audio
    pub download_endpoint: String,
    /// Endpoint serving the enhanced audio
    pub download_enhanced_endpoint: String,
    /// Free-form note shown under the result
    #[serde(default)]
    pub note: Option<String>,
}

impl SearchResult {
    /// Endpoint for the given variant
    pub fn endpoint(&self, variant: Variant) -> &str {
        match variant {
            Variant::Original => &self.download_endpoint,
            Variant::Enhanced => &self.download_enhanced_endpoint,
        }
    }
}

/// Everything needed to run one download, built once from the rendered result
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadJob {
    /// Absolute URL of the audio endpoint
    pub endpoint: String,
    /// Suggested filename for the save
    pub filename: String,
    /// Media title, shown in the overlay and notifications
    pub title: String,
    /// Which artifact is downloaded
    pub variant: Variant,
}

/// Status text and percentage shown by a progress overlay
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressState {
    /// Status text
    pub text: String,
    /// Advisory percentage in `0..=100`
    pub percentage: u8,
}

impl ProgressState {
    /// Create a progress state, clamping the percentage to 100
    pub fn new(text: impl Into<String>, percentage: u8) -> Self {
        Self {
            text: text.into(),
            percentage: percentage.min(100),
        }
    }
}

/// Visual style of a notification
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Neutral status (default)
    #[default]
    Info,
    /// Operation succeeded
    Success,
    /// Operation failed
    Error,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationKind::Info => write!(f, "info"),
            NotificationKind::Success => write!(f, "success"),
            NotificationKind::Error => write!(f, "error"),
        }
    }
}

/// A short-lived status message
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Message text
    pub message: String,
    /// Visual style
    pub kind: NotificationKind,
}

/// Where a downloaded file ended up
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedFile {
    /// Location reported by the save target
    pub location: PathBuf,
    /// Number of bytes saved
    pub bytes: u64,
}

/// Event emitted by the client
///
/// Subscribe via [`AudioClient::subscribe`](crate::AudioClient::subscribe).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A search request is about to be sent
    SearchStarted {
        /// Trimmed URL being searched
        url: String,
    },

    /// A search succeeded
    SearchCompleted {
        /// Title of the found media
        title: String,
    },

    /// A search failed (including empty input)
    SearchFailed {
        /// Error message
        error: String,
    },

    /// The result region was replaced
    ResultRendered {
        /// Title of the rendered media
        title: String,
    },

    /// A download job started
    DownloadStarted {
        /// Job ID
        id: JobId,
        /// Downloaded variant
        variant: Variant,
        /// Media title
        title: String,
    },

    /// A download job reached a progress milestone
    DownloadProgress {
        /// Job ID
        id: JobId,
        /// Status text
        text: String,
        /// Advisory percentage
        percentage: u8,
    },

    /// The downloaded blob was handed to the save target
    DownloadSaved {
        /// Job ID
        id: JobId,
        /// Where the file was saved
        location: PathBuf,
        /// Size in bytes
        bytes: u64,
    },

    /// A download job finished successfully
    DownloadComplete {
        /// Job ID
        id: JobId,
        /// Downloaded variant
        variant: Variant,
        /// Media title
        title: String,
    },

    /// A download job failed
    DownloadFailed {
        /// Job ID
        id: JobId,
        /// Downloaded variant
        variant: Variant,
        /// Error message
        error: String,
    },

    /// A notification was shown
    Notified {
        /// Message text
        message: String,
        /// Visual style
        kind: NotificationKind,
    },
}
