//! Remote extraction service
//!
//! The client talks to the service only through the [`MediaService`] trait, so hosts and
//! tests can substitute their own transport. [`HttpMediaService`] is the production
//! implementation over `reqwest`.
//!
//! ## Protocol
//!
//! - `POST {base}/api/search` with `{"url": ...}` answers either a [`SearchResult`]
//!   (`success: true`) or `{"success": false, "error": ..., "details": ...}`.
//! - `GET <download endpoint>` answers the binary audio.
//! - `GET {base}/api/health` answers `{"status": "ok", "message": ...}`.

mod http;

pub use http::HttpMediaService;

use crate::error::Result;
use crate::types::SearchResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Fallback message when a failed search response names no error
pub const UNKNOWN_SERVER_ERROR: &str = "Unknown server error.";

/// Liveness report of the extraction service
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// "ok" when the service is up
    pub status: String,
    /// Free-form message
    #[serde(default)]
    pub message: Option<String>,
}

impl HealthStatus {
    /// Whether the service reported itself healthy
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Body of a successful audio response, read lazily
#[async_trait]
pub trait AudioBody: Send {
    /// Size announced by the server, if any
    fn content_length(&self) -> Option<u64>;

    /// Read the whole body into memory
    async fn into_bytes(self: Box<Self>) -> Result<Vec<u8>>;
}

/// Transport to the extraction service
///
/// # Examples
///
/// ```no_run
/// use audio_dl::config::Config;
/// use audio_dl::service::{HttpMediaService, MediaService};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let service = HttpMediaService::new(&Config::default())?;
///
/// let result = service.search("https://www.youtube.com/watch?v=dQw4w9WgXcQ").await?;
/// let body = service.fetch_audio(&result.download_endpoint).await?;
/// let bytes = body.into_bytes().await?;
/// println!("{}: {} bytes", result.metadata.title, bytes.len());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait MediaService: Send + Sync {
    /// Look up media metadata and download endpoints for `url`
    ///
    /// Returned endpoints are absolute.
    ///
    /// # Errors
    ///
    /// - [`Error::UnexpectedResponse`](crate::Error::UnexpectedResponse) for a non-JSON answer
    /// - [`Error::Server`](crate::Error::Server) for `success: false` or a non-OK status
    /// - [`Error::Network`](crate::Error::Network) for transport failures
    async fn search(&self, url: &str) -> Result<SearchResult>;

    /// Start fetching the audio served at `endpoint`
    ///
    /// Resolves once the response head arrives; the body is read through [`AudioBody`].
    ///
    /// # Errors
    ///
    /// [`Error::Http`](crate::Error::Http) when the endpoint answers a non-OK status.
    async fn fetch_audio(&self, endpoint: &str) -> Result<Box<dyn AudioBody>>;

    /// Query the service's health endpoint
    async fn health(&self) -> Result<HealthStatus>;
}

/// Outcome fields of a search response body
#[derive(Debug, Default)]
pub(crate) struct SearchFailure {
    pub(crate) success: bool,
    pub(crate) error: Option<String>,
    pub(crate) details: Option<String>,
}

impl SearchFailure {
    /// Read the outcome fields from any JSON body
    ///
    /// Bodies that are not objects, and fields of unexpected types, read as absent.
    /// Scalar `error`/`details` values are kept as their text.
    pub(crate) fn from_body(body: &[u8]) -> Self {
        let Ok(serde_json::Value::Object(fields)) = serde_json::from_slice(body) else {
            return Self::default();
        };

        Self {
            success: fields.get("success").and_then(|v| v.as_bool()) == Some(true),
            error: fields.get("error").and_then(scalar_text),
            details: fields.get("details").and_then(scalar_text),
        }
    }

    /// The server's `error`, else its `details`, else the generic fallback
    ///
    /// Empty strings count as absent.
    pub(crate) fn message(self) -> String {
        self.error
            .filter(|e| !e.is_empty())
            .or(self.details.filter(|d| !d.is_empty()))
            .unwrap_or_else(|| UNKNOWN_SERVER_ERROR.to_string())
    }
}

fn scalar_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
