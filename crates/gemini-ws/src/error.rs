//! Socket construction errors

use gemini_auth::AuthError;
use thiserror::Error;

use crate::transport::TransportError;

/// Errors returned when constructing a socket
///
/// Once a socket is running, failures are reported through its callbacks
/// instead.
#[derive(Error, Debug)]
pub enum WsError {
    /// Handshake could not be signed
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Transport could not be constructed
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Subscription could not be serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The socket has already shut down
    #[error("socket closed")]
    Closed,
}

/// Result type for socket operations
pub type WsResult<T> = Result<T, WsError>;
