//! Error type for REST API operations

use gemini_types::{ErrorReason, ErrorResponse};
use std::fmt;

/// Status reported when the server could not be reached at all
pub const UNREACHABLE_STATUS: u16 = 500;

const UNREACHABLE_MESSAGE: &str = "Failed to make request to Gemini API";

/// A failed REST call
///
/// Rejections carry the server's status and error body. Transport failures
/// are normalized to status 500 with reason `System` and the underlying
/// failure in `original_error`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Gemini API error {status}: {}: {}", .body.reason, .body.message)]
pub struct ApiError {
    /// HTTP status
    pub status: u16,
    /// Structured error body
    pub body: ErrorResponse,
}

impl ApiError {
    /// Create an error from a status and body
    pub fn new(status: u16, body: ErrorResponse) -> Self {
        Self { status, body }
    }

    /// Build from a non-2xx response
    ///
    /// Bodies that are not a Gemini error object keep the real status and
    /// surface the raw text with reason `Unknown`.
    pub fn from_response(status: u16, text: &str) -> Self {
        let body = serde_json::from_str::<ErrorResponse>(text)
            .unwrap_or_else(|_| ErrorResponse::new(ErrorReason::Unknown, text.trim()));
        Self::new(status, body)
    }

    /// The request never got a response
    pub fn unreachable(error: impl fmt::Display) -> Self {
        Self::new(
            UNREACHABLE_STATUS,
            ErrorResponse::new(ErrorReason::System, UNREACHABLE_MESSAGE)
                .with_original_error(error.to_string()),
        )
    }

    /// Client-side failure unrelated to the network
    pub fn system(message: impl Into<String>) -> Self {
        Self::new(
            UNREACHABLE_STATUS,
            ErrorResponse::new(ErrorReason::System, message),
        )
    }

    /// Reason code
    pub fn reason(&self) -> ErrorReason {
        self.body.reason
    }

    /// Human-readable message
    pub fn message(&self) -> &str {
        &self.body.message
    }

    /// Check if the server was never reached
    pub fn is_unreachable(&self) -> bool {
        self.body.original_error.is_some()
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        self.is_unreachable() || self.status == 429 || self.body.reason.is_transient()
    }
}

/// Result type for REST operations
pub type RestResult<T> = Result<T, ApiError>;
