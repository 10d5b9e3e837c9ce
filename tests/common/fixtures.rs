//! Service fixtures: canned payloads and wiremock setups

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Bytes served as "audio"
pub const FAKE_MP3: &[u8] = b"ID3\x04\x00\x00\x00\x00\x00\x00fake-mp3-frames";

/// Bytes served as enhanced "audio"
pub const FAKE_ENHANCED_MP3: &[u8] = b"ID3\x04\x00\x00\x00\x00\x00\x00enhanced-frames";

/// A successful search payload with relative endpoints
pub fn search_payload(title: &str) -> Value {
    json!({
        "success": true,
        "video_id": "abc123",
        "metadata": {
            "title": title,
            "artist": "Band",
            "duration": "3:45",
            "duration_seconds": 225,
            "thumbnail": "https://img.example/abc.jpg",
            "views": 2_300_000,
            "upload_date": "20240101"
        },
        "audio_info": {
            "quality": "High (>=256 kbps)",
            "bitrate": "256 kbps",
            "codec": "opus",
            "format": "MP3",
            "target_quality": "320 kbps",
            "estimated_size_mb": 6.87
        },
        "download_endpoint": "/api/download/abc123",
        "download_enhanced_endpoint": "/api/download/abc123/enhanced",
        "note": "Download starts when you click."
    })
}

/// Start a mock service answering search and both downloads
pub async fn start_service(title: &str) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_payload(title)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/download/abc123"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "audio/mpeg")
                .set_body_bytes(FAKE_MP3.to_vec()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/download/abc123/enhanced"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "audio/mpeg")
                .set_body_bytes(FAKE_ENHANCED_MP3.to_vec()),
        )
        .mount(&server)
        .await;

    server
}
