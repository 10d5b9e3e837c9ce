//! Error types for audio-dl
//!
//! This module provides the error taxonomy for every client flow:
//! - Input errors (empty URL, handled locally without any network call)
//! - Protocol errors (the service answered with something other than JSON)
//! - Application errors (the service reported a failure or sent an unusable payload)
//! - Transport errors (network failures, non-OK download responses)
//! - Local errors while saving a downloaded file
//!
//! Every error is surfaced to the user as an error notification; [`Error::kind`] classifies
//! errors for hosts that want to react differently per category.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for audio-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for audio-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "base_url")
        key: Option<String>,
    },

    /// The search input was empty or whitespace-only
    #[error("Missing URL. Please try again.")]
    MissingUrl,

    /// The service answered a JSON endpoint with a non-JSON body
    #[error("The server returned an unexpected (non-JSON) response.")]
    UnexpectedResponse {
        /// Content type reported by the server, if any
        content_type: Option<String>,
        /// Raw response body, kept for diagnostics
        body: String,
    },

    /// The service reported a failure (`success: false` or a non-OK status with a JSON body)
    #[error("{message}")]
    Server {
        /// HTTP status of the response
        status: u16,
        /// Message supplied by the server, or a generic fallback
        message: String,
    },

    /// A download endpoint answered with a non-OK status
    #[error("Error {status}: {status_text}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Canonical reason phrase for the status
        status_text: String,
    },

    /// An endpoint could not be resolved against the configured base URL
    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        /// The endpoint as received from the service
        endpoint: String,
        /// Why it could not be resolved
        reason: String,
    },

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The search payload could not be decoded
    #[error("invalid response payload: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Saving the downloaded file failed
    #[error("save error: {0}")]
    Save(#[from] SaveError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while handing a downloaded blob to the save target
#[derive(Debug, Error)]
pub enum SaveError {
    /// File collision at destination
    #[error("file collision at {path}: {reason}")]
    FileCollision {
        /// The path where the collision occurred
        path: PathBuf,
        /// The reason for the collision (e.g., "file already exists")
        reason: String,
    },

    /// The suggested filename cannot be used as a file name
    #[error("invalid path {path}: {reason}")]
    InvalidPath {
        /// The offending path
        path: PathBuf,
        /// The reason the path is invalid
        reason: String,
    },

    /// The object URL carrying the blob was released before the save started
    #[error("object URL {0} was released before the save started")]
    Released(String),
}

/// Broad error categories used for classification and diagnostics
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid user input, handled without a network call
    Input,
    /// Response shape did not match the protocol (non-JSON where JSON was expected)
    Protocol,
    /// The service reported a failure or returned an unusable payload
    Application,
    /// Network failure or non-OK transfer response
    Transport,
    /// Local failure (saving, filesystem)
    Local,
    /// Invalid configuration
    Config,
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingUrl => ErrorKind::Input,
            Error::UnexpectedResponse { .. } => ErrorKind::Protocol,
            Error::Server { .. } | Error::Serialization(_) | Error::InvalidEndpoint { .. } => {
                ErrorKind::Application
            }
            Error::Network(_) | Error::Http { .. } => ErrorKind::Transport,
            Error::Save(_) | Error::Io(_) => ErrorKind::Local,
            Error::Config { .. } => ErrorKind::Config,
        }
    }

    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::MissingUrl => "missing_url",
            Error::UnexpectedResponse { .. } => "unexpected_response",
            Error::Server { .. } => "server_error",
            Error::Http { .. } => "http_error",
            Error::InvalidEndpoint { .. } => "invalid_endpoint",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "invalid_payload",
            Error::Save(e) => match e {
                SaveError::FileCollision { .. } => "file_collision",
                SaveError::InvalidPath { .. } => "invalid_path",
                SaveError::Released(_) => "object_url_released",
            },
            Error::Io(_) => "io_error",
        }
    }

    /// HTTP status carried by this error, if it came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Server { status, .. } | Error::Http { status, .. } => Some(*status),
            Error::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
