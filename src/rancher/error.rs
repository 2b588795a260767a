// ABOUTME: Error types for the Rancher API client and service index.
// ABOUTME: Transport, status and decode failures carry the URL they came from.

use crate::types::EnvironmentId;
use thiserror::Error;

/// Errors from talking to the Rancher API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid endpoint URL {url}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned {status}: {body}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Errors building the stack/service index.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("service {service} references non-existent stack ID {environment_id}")]
    DanglingEnvironment {
        service: String,
        environment_id: EnvironmentId,
    },
}

impl ApiError {
    /// Whether repeating the same request could succeed.
    ///
    /// Transport failures, server errors, conflicts and throttling are
    /// transient. Other client errors (bad credentials, unknown resource,
    /// rejected body) fail the same way every time.
    pub fn is_retriable(&self) -> bool {
        match self {
            ApiError::Request { .. } | ApiError::Decode { .. } => true,
            ApiError::Status { status, .. } => {
                status.is_server_error() || matches!(status.as_u16(), 408 | 409 | 423 | 429)
            }
            ApiError::InvalidEndpoint { .. } | ApiError::Client(_) => false,
        }
    }
}
