//! Structured error bodies returned by the REST API

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason codes returned in the `reason` field of an error body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ErrorReason {
    ClientOrderIdTooLong,
    ClientOrderIdMustBeString,
    ConflictingOptions,
    ConflictingAccountName,
    EndpointMismatch,
    EndpointNotFound,
    InsufficientFunds,
    InvalidJson,
    InvalidNonce,
    InvalidOrderType,
    InvalidPrice,
    InvalidSymbol,
    Maintenance,
    MarketNotOpen,
    RateLimit,
    /// Server-side failure, or the client could not reach the server at all
    System,
    /// Any reason code this crate does not know about
    #[serde(other)]
    Unknown,
}

impl ErrorReason {
    /// Whether retrying the same request later may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimit | Self::Maintenance | Self::System | Self::MarketNotOpen)
    }
}

impl fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Error body: `{"result":"error","reason":"...","message":"..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `"error"`
    pub result: String,
    /// Machine-readable reason code
    pub reason: ErrorReason,
    /// Human-readable message
    pub message: String,
    /// Underlying client-side failure, when the request never got a response
    #[serde(rename = "originalError", skip_serializing_if = "Option::is_none", default)]
    pub original_error: Option<String>,
}

impl ErrorResponse {
    /// Create an error body
    pub fn new(reason: ErrorReason, message: impl Into<String>) -> Self {
        Self {
            result: "error".to_string(),
            reason,
            message: message.into(),
            original_error: None,
        }
    }

    /// Attach the underlying client-side failure
    pub fn with_original_error(mut self, error: impl Into<String>) -> Self {
        self.original_error = Some(error.into());
        self
    }
}
