//! HTTP transport for the extraction service

use super::{AudioBody, HealthStatus, MediaService, SearchFailure};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::SearchResult;
use crate::utils::resolve_endpoint;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// Timeout for the health probe
const HEALTH_TIMEOUT_SECS: u64 = 10;

#[derive(Serialize)]
struct SearchRequest<'a> {
    url: &'a str,
}

/// [`MediaService`] over `reqwest`
#[derive(Clone, Debug)]
pub struct HttpMediaService {
    client: reqwest::Client,
    base_url: Url,
    search_url: String,
    health_url: String,
    search_timeout: Duration,
    download_timeout: Option<Duration>,
}

impl HttpMediaService {
    /// Create a service client from the configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `base_url` does not parse, or [`Error::Network`] if the
    /// HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| Error::Config {
            message: format!("base_url '{}' is not a valid URL: {}", config.base_url, e),
            key: Some("base_url".to_string()),
        })?;

        let client = reqwest::Client::builder()
            .user_agent(config.http.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            search_url: service_url(&config.base_url, "/api/search"),
            health_url: service_url(&config.base_url, "/api/health"),
            base_url,
            search_timeout: config.http.search_timeout,
            download_timeout: config.http.download_timeout,
        })
    }

    /// URL the search request is posted to
    pub fn search_url(&self) -> &str {
        &self.search_url
    }

    /// URL of the health probe
    pub fn health_url(&self) -> &str {
        &self.health_url
    }

    /// Resolve a (possibly relative) endpoint against the base URL
    ///
    /// Absolute endpoints are returned unchanged.
    pub fn resolve_endpoint(&self, endpoint: &str) -> Result<String> {
        resolve_endpoint(&self.base_url, endpoint)
    }
}

/// Fixed service path under `base`, keeping any path prefix of the base URL
fn service_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

#[async_trait]
impl MediaService for HttpMediaService {
    async fn search(&self, url: &str) -> Result<SearchResult> {
        tracing::debug!(url, endpoint = %self.search_url, "posting search request");

        let response = self
            .client
            .post(&self.search_url)
            .timeout(self.search_timeout)
            .json(&SearchRequest { url })
            .send()
            .await?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let is_json = content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("application/json"));
        if !is_json {
            let body = response.text().await?;
            tracing::error!(
                status = status.as_u16(),
                content_type = ?content_type,
                body = %body,
                "search returned a non-JSON response"
            );
            return Err(Error::UnexpectedResponse { content_type, body });
        }

        let body = response.bytes().await?;
        let outcome = SearchFailure::from_body(&body);
        if !status.is_success() || !outcome.success {
            let message = outcome.message();
            tracing::warn!(status = status.as_u16(), error = %message, "search rejected by server");
            return Err(Error::Server {
                status: status.as_u16(),
                message,
            });
        }

        let mut result: SearchResult = serde_json::from_slice(&body)?;
        result.download_endpoint = self.resolve_endpoint(&result.download_endpoint)?;
        result.download_enhanced_endpoint =
            self.resolve_endpoint(&result.download_enhanced_endpoint)?;

        Ok(result)
    }

    async fn fetch_audio(&self, endpoint: &str) -> Result<Box<dyn AudioBody>> {
        let endpoint = self.resolve_endpoint(endpoint)?;

        let mut request = self.client.get(&endpoint);
        if let Some(timeout) = self.download_timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        tracing::debug!(
            endpoint = %endpoint,
            content_length = ?response.content_length(),
            "audio response received"
        );
        Ok(Box::new(HttpAudioBody { response }))
    }

    async fn health(&self) -> Result<HealthStatus> {
        let response = self
            .client
            .get(&self.health_url)
            .timeout(Duration::from_secs(HEALTH_TIMEOUT_SECS))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        Ok(response.json().await?)
    }
}

struct HttpAudioBody {
    response: reqwest::Response,
}

#[async_trait]
impl AudioBody for HttpAudioBody {
    fn content_length(&self) -> Option<u64> {
        self.response.content_length()
    }

    async fn into_bytes(self: Box<Self>) -> Result<Vec<u8>> {
        Ok(self.response.bytes().await?.to_vec())
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service_for(server: &MockServer) -> HttpMediaService {
        let config = Config {
            base_url: server.uri(),
            ..Default::default()
        };
        HttpMediaService::new(&config).unwrap()
    }

    fn search_payload() -> serde_json::Value {
        json!({
            "success": true,
            "video_id": "abc123",
            "metadata": {
                "title": "Song",
                "artist": "Band",
                "duration": "3:45",
                "views": 1500,
                "thumbnail": "https://img.example/abc.jpg"
            },
            "audio_info": {"quality": "High", "bitrate": "256 kbps", "codec": "opus", "format": "MP3"},
            "download_endpoint": "/api/download/abc123",
            "download_enhanced_endpoint": "/api/download/abc123/enhanced"
        })
    }

    #[tokio::test]
    async fn search_posts_url_and_resolves_endpoints() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/search"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"url": "https://youtu.be/abc123"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_payload()))
            .expect(1)
            .mount(&server)
            .await;

        let service = service_for(&server);
        let result = service.search("https://youtu.be/abc123").await.unwrap();

        assert_eq!(result.metadata.title, "Song");
        assert_eq!(
            result.download_endpoint,
            format!("{}/api/download/abc123", server.uri())
        );
        assert_eq!(
            result.download_enhanced_endpoint,
            format!("{}/api/download/abc123/enhanced", server.uri())
        );
    }

    #[tokio::test]
    async fn search_keeps_absolute_endpoints() {
        let server = MockServer::start().await;
        let mut payload = search_payload();
        payload["download_endpoint"] = json!("https://cdn.example.com/a.mp3");
        Mock::given(method("POST"))
            .and(path("/api/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(payload))
            .mount(&server)
            .await;

        let result = service_for(&server).search("https://x").await.unwrap();
        assert_eq!(result.download_endpoint, "https://cdn.example.com/a.mp3");
    }

    #[tokio::test]
    async fn non_json_response_is_protocol_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/search"))
            .respond_with(
                ResponseTemplate::new(502).set_body_raw("<h1>Bad Gateway</h1>", "text/html"),
            )
            .mount(&server)
            .await;

        let err = service_for(&server).search("https://x").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert_eq!(
            err.to_string(),
            "The server returned an unexpected (non-JSON) response."
        );
        match err {
            Error::UnexpectedResponse { content_type, body } => {
                assert_eq!(content_type.as_deref(), Some("text/html"));
                assert_eq!(body, "<h1>Bad Gateway</h1>");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn success_false_uses_server_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "error": "Invalid URL. Must start with http:// or https://"
            })))
            .mount(&server)
            .await;

        let err = service_for(&server).search("ftp://x").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Application);
        assert_eq!(
            err.to_string(),
            "Invalid URL. Must start with http:// or https://"
        );
    }

    #[tokio::test]
    async fn non_ok_status_falls_back_to_details_then_generic_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/search"))
            .and(body_json(json!({"url": "https://details"})))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "success": false,
                "details": "extractor crashed"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/search"))
            .and(body_json(json!({"url": "https://bare"})))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({})))
            .mount(&server)
            .await;

        let service = service_for(&server);

        let err = service.search("https://details").await.unwrap_err();
        assert_eq!(err.to_string(), "extractor crashed");
        assert_eq!(err.status(), Some(500));

        let err = service.search("https://bare").await.unwrap_err();
        assert_eq!(err.to_string(), "Unknown server error.");
    }

    #[tokio::test]
    async fn non_ok_status_with_success_true_is_still_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/search"))
            .respond_with(ResponseTemplate::new(400).set_body_json(search_payload()))
            .mount(&server)
            .await;

        let err = service_for(&server).search("https://x").await.unwrap_err();
        assert!(matches!(err, Error::Server { status: 400, .. }));
    }

    #[tokio::test]
    async fn fetch_audio_reads_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/download/abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3audio".to_vec()))
            .mount(&server)
            .await;

        let body = service_for(&server)
            .fetch_audio("/api/download/abc123")
            .await
            .unwrap();
        assert_eq!(body.content_length(), Some(8));
        assert_eq!(body.into_bytes().await.unwrap(), b"ID3audio");
    }

    #[tokio::test]
    async fn fetch_audio_404_carries_status_and_reason() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/download/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = match service_for(&server)
            .fetch_audio(&format!("{}/api/download/missing", server.uri()))
            .await
        {
            Err(e) => e,
            Ok(_) => panic!("expected a 404 failure"),
        };
        assert_eq!(err.to_string(), "Error 404: Not Found");
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ok",
                "message": "API running"
            })))
            .mount(&server)
            .await;

        let health = service_for(&server).health().await.unwrap();
        assert!(health.is_ok());
    }

    #[tokio::test]
    async fn health_keeps_base_path_prefix() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/svc/api/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let config = Config {
            base_url: format!("{}/svc", server.uri()),
            ..Default::default()
        };
        let service = HttpMediaService::new(&config).unwrap();
        assert_eq!(service.search_url(), format!("{}/svc/api/search", server.uri()));
        assert_eq!(service.health_url(), format!("{}/svc/api/health", server.uri()));

        let health = service.health().await.unwrap();
        assert!(health.is_ok());
        assert_eq!(health.message, None);
    }

    #[tokio::test]
    async fn failed_search_with_non_object_json_uses_fallback_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/search"))
            .and(body_json(json!({"url": "https://text"})))
            .respond_with(ResponseTemplate::new(502).set_body_json(json!("Bad gateway")))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/search"))
            .and(body_json(json!({"url": "https://numeric"})))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": 500})))
            .mount(&server)
            .await;

        let service = service_for(&server);

        let err = service.search("https://text").await.unwrap_err();
        assert!(matches!(err, Error::Server { status: 502, .. }));
        assert_eq!(err.to_string(), "Unknown server error.");

        let err = service.search("https://numeric").await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.to_string(), "500");
    }

    #[test]
    fn search_url_ignores_trailing_slash() {
        let config = Config {
            base_url: "http://localhost:5000/".to_string(),
            ..Default::default()
        };
        let service = HttpMediaService::new(&config).unwrap();
        assert_eq!(service.search_url(), "http://localhost:5000/api/search");
        assert_eq!(service.health_url(), "http://localhost:5000/api/health");
        assert_eq!(
            service.resolve_endpoint("/api/download/x").unwrap(),
            "http://localhost:5000/api/download/x"
        );
    }
}
