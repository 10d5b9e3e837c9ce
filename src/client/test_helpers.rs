//! Shared test helpers for creating AudioClient instances in tests.

use crate::client::AudioClient;
use crate::config::{Config, OverlayPolicy};
use crate::error::{Error, Result};
use crate::save::MemorySaver;
use crate::service::{AudioBody, HealthStatus, MediaService};
use crate::types::{AudioInfo, FieldValue, Metadata, SearchResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Base URL the fake service pretends to live at
pub(crate) const BASE_URL: &str = "http://media.test";

/// In-process [`MediaService`] with scripted answers and call counters
#[derive(Default)]
pub(crate) struct FakeService {
    search_response: Mutex<Option<SearchResponse>>,
    audio: Mutex<HashMap<String, AudioResponse>>,
    delay: Mutex<Option<Duration>>,
    pub(crate) search_calls: AtomicUsize,
    pub(crate) fetch_calls: AtomicUsize,
}

#[derive(Clone)]
enum SearchResponse {
    Found(SearchResult),
    Server { status: u16, message: String },
    NonJson(String),
}

#[derive(Clone)]
enum AudioResponse {
    Bytes(Vec<u8>),
    Status(u16, &'static str),
}

impl FakeService {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer searches with `result`
    pub(crate) fn with_result(self: Arc<Self>, result: SearchResult) -> Arc<Self> {
        *self.search_response.lock().unwrap() = Some(SearchResponse::Found(result));
        self
    }

    /// Answer searches with `{success: false, error: message}`
    pub(crate) fn with_server_error(self: Arc<Self>, status: u16, message: &str) -> Arc<Self> {
        *self.search_response.lock().unwrap() = Some(SearchResponse::Server {
            status,
            message: message.to_string(),
        });
        self
    }

    /// Answer searches with a non-JSON body
    pub(crate) fn with_non_json(self: Arc<Self>, body: &str) -> Arc<Self> {
        *self.search_response.lock().unwrap() = Some(SearchResponse::NonJson(body.to_string()));
        self
    }

    /// Serve `data` at `endpoint`
    pub(crate) fn with_audio(self: Arc<Self>, endpoint: &str, data: &[u8]) -> Arc<Self> {
        self.audio
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), AudioResponse::Bytes(data.to_vec()));
        self
    }

    /// Answer `endpoint` with a non-OK status
    pub(crate) fn with_status(
        self: Arc<Self>,
        endpoint: &str,
        status: u16,
        status_text: &'static str,
    ) -> Arc<Self> {
        self.audio
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), AudioResponse::Status(status, status_text));
        self
    }

    /// Delay every answer by `delay`
    pub(crate) fn with_delay(self: Arc<Self>, delay: Duration) -> Arc<Self> {
        *self.delay.lock().unwrap() = Some(delay);
        self
    }

    pub(crate) fn search_count(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn fetch_count(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

struct FakeBody(Vec<u8>);

#[async_trait]
impl AudioBody for FakeBody {
    fn content_length(&self) -> Option<u64> {
        Some(self.0.len() as u64)
    }

    async fn into_bytes(self: Box<Self>) -> Result<Vec<u8>> {
        Ok(self.0)
    }
}

#[async_trait]
impl MediaService for FakeService {
    async fn search(&self, _url: &str) -> Result<SearchResult> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        let response = self.search_response.lock().unwrap().clone();
        match response {
            Some(SearchResponse::Found(result)) => Ok(result),
            Some(SearchResponse::Server { status, message }) => {
                Err(Error::Server { status, message })
            }
            Some(SearchResponse::NonJson(body)) => Err(Error::UnexpectedResponse {
                content_type: Some("text/html".to_string()),
                body,
            }),
            None => Err(Error::Server {
                status: 500,
                message: "no scripted search response".to_string(),
            }),
        }
    }

    async fn fetch_audio(&self, endpoint: &str) -> Result<Box<dyn AudioBody>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        let response = self.audio.lock().unwrap().get(endpoint).cloned();
        match response {
            Some(AudioResponse::Bytes(data)) => Ok(Box::new(FakeBody(data))),
            Some(AudioResponse::Status(status, text)) => Err(Error::Http {
                status,
                status_text: text.to_string(),
            }),
            None => Err(Error::Http {
                status: 404,
                status_text: "Not Found".to_string(),
            }),
        }
    }

    async fn health(&self) -> Result<HealthStatus> {
        Ok(HealthStatus {
            status: "ok".to_string(),
            message: Some("fake".to_string()),
        })
    }
}

/// A fully populated search result with relative endpoints
pub(crate) fn sample_result(title: &str) -> SearchResult {
    SearchResult {
        video_id: Some("abc123".to_string()),
        metadata: Metadata {
            title: title.to_string(),
            artist: Some("Band".to_string()),
            duration: Some(FieldValue::from("3:45")),
            duration_seconds: Some(FieldValue::from(225)),
            views: Some(FieldValue::from(1500)),
            thumbnail: "https://img.example/abc.jpg".to_string(),
            upload_date: Some("20240101".to_string()),
        },
        audio_info: AudioInfo {
            quality: Some("High (>=256 kbps)".to_string()),
            bitrate: Some(FieldValue::from("256 kbps")),
            codec: Some("opus".to_string()),
            format: Some("MP3".to_string()),
            target_quality: Some("320 kbps".to_string()),
            estimated_size_mb: Some(FieldValue::from("6.87")),
        },
        download_endpoint: "/api/download/abc123".to_string(),
        download_enhanced_endpoint: "/api/download/abc123/enhanced".to_string(),
        note: Some("Download starts when you click.".to_string()),
    }
}

/// Absolute URL of the original audio of [`sample_result`]
pub(crate) fn original_url() -> String {
    format!("{BASE_URL}/api/download/abc123")
}

/// Absolute URL of the enhanced audio of [`sample_result`]
pub(crate) fn enhanced_url() -> String {
    format!("{BASE_URL}/api/download/abc123/enhanced")
}

pub(crate) fn test_config(policy: OverlayPolicy) -> Config {
    Config {
        base_url: BASE_URL.to_string(),
        overlay_policy: policy,
        ..Default::default()
    }
}

/// Helper to create a test AudioClient over a fake service and an in-memory saver.
pub(crate) fn create_test_client(service: Arc<FakeService>) -> (AudioClient, MemorySaver) {
    create_test_client_with(service, OverlayPolicy::PerJob)
}

pub(crate) fn create_test_client_with(
    service: Arc<FakeService>,
    policy: OverlayPolicy,
) -> (AudioClient, MemorySaver) {
    let saver = MemorySaver::new();
    let client =
        AudioClient::with_parts(test_config(policy), service, Arc::new(saver.clone())).unwrap();
    (client, saver)
}

/// Render [`sample_result`] so download actions are bound
pub(crate) fn client_with_rendered_result(
    service: Arc<FakeService>,
    policy: OverlayPolicy,
) -> (AudioClient, MemorySaver) {
    let (client, saver) = create_test_client_with(service, policy);
    client.render_result(&sample_result("Song: Title/Mix"));
    (client, saver)
}
