//! Error types for the aggregator
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Upstream Error Enum ==
/// Failure talking to the remote item API.
///
/// The core only distinguishes success from failure; the variants exist so
/// the diagnostic message and an HTTP-like status survive to the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpstreamError {
    /// Upstream answered with a non-success status
    #[error("status {status}: {body}")]
    Status { status: u16, body: String },

    /// Request could not be sent or the connection failed
    #[error("transport error: {0}")]
    Transport(String),

    /// The deadline elapsed before the upstream answered
    #[error("deadline exceeded")]
    Timeout,

    /// Payload was not the expected JSON shape
    #[error("malformed payload: {0}")]
    Decode(String),
}

impl UpstreamError {
    /// Returns the HTTP-like status associated with this failure.
    pub fn status(&self) -> u16 {
        match self {
            UpstreamError::Status { status, .. } => *status,
            UpstreamError::Timeout => 504,
            UpstreamError::Transport(_) | UpstreamError::Decode(_) => 502,
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout
        } else if err.is_decode() {
            UpstreamError::Decode(err.to_string())
        } else {
            UpstreamError::Transport(err.to_string())
        }
    }
}

// == Aggregator Error Enum ==
/// Error surfaced to API callers.
#[derive(Error, Debug)]
pub enum AggregatorError {
    /// Malformed input that cannot be clamped (e.g. a non-numeric id)
    #[error("{0}")]
    InvalidRequest(String),

    /// The upstream service failed for a request that cannot degrade
    #[error("{context}: {source}")]
    Upstream {
        context: String,
        #[source]
        source: UpstreamError,
    },
}

impl AggregatorError {
    /// Wraps an upstream failure with a short, machine-readable context.
    pub fn upstream(context: impl Into<String>, source: UpstreamError) -> Self {
        AggregatorError::Upstream {
            context: context.into(),
            source,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for AggregatorError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AggregatorError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::new(msg.clone()))
            }
            AggregatorError::Upstream { context, source } => (
                StatusCode::BAD_GATEWAY,
                ErrorResponse::new(context.clone()).with_detail(source.to_string()),
            ),
        };

        (status, Json(body)).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the aggregator.
pub type Result<T> = std::result::Result<T, AggregatorError>;
