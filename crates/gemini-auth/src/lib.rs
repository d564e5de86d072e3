//! Request signing for the Gemini API
//!
//! Every private REST call and every authenticated WebSocket handshake
//! carries the same header triple:
//!
//! - `X-GEMINI-APIKEY` - the API key
//! - `X-GEMINI-PAYLOAD` - base64 of the JSON payload `{request, nonce, ...}`
//! - `X-GEMINI-SIGNATURE` - hex HMAC-SHA384 of the base64 payload, keyed by the secret
//!
//! # Example
//!
//! ```no_run
//! use gemini_auth::Credentials;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Load credentials from environment
//!     let creds = Credentials::from_env()?;
//!
//!     // Fresh nonce, fresh signature
//!     let headers = creds.signed_headers("/v1/order/events", &Default::default())?;
//!     for (name, value) in headers.iter() {
//!         println!("{}: {}", name, value);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod credentials;
mod error;
mod nonce;
mod signer;

pub use credentials::Credentials;
pub use error::{AuthError, AuthResult};
pub use nonce::NonceSource;
pub use signer::{
    build_payload, extra_fields, sign, SignedHeaders, SignedPayload, API_KEY_HEADER,
    PAYLOAD_HEADER, SIGNATURE_HEADER,
};
