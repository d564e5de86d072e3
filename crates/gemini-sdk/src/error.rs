//! SDK error type

use gemini_auth::AuthError;
use gemini_rest::ApiError;
use gemini_types::ParseModeError;
use gemini_ws::WsError;

/// Errors surfaced while setting up the client
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    /// Missing or unusable credentials
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// `GEMINI_MODE` held something other than sandbox or live
    #[error("Configuration error: {0}")]
    Mode(#[from] ParseModeError),

    /// REST client could not be created
    #[error("REST error: {0}")]
    Api(#[from] ApiError),

    /// Stream could not be started
    #[error("WebSocket error: {0}")]
    Socket(#[from] WsError),
}

/// Result type for SDK setup
pub type SdkResult<T> = Result<T, SdkError>;
