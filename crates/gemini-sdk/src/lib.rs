//! High-level client for the Gemini exchange
//!
//! One [`Gemini`] value holds an API key pair and an environment. It hands
//! out the REST client and builds authenticated streams that keep
//! themselves alive: every (re)connection is signed with a fresh nonce,
//! silent connections are replaced by a heartbeat watchdog, and the
//! configured subscriptions are replayed after each open.
//!
//! # Quick Start
//!
//! ```no_run
//! use gemini_sdk::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let gemini = Gemini::new(Credentials::from_env()?, Mode::Live)?;
//!
//!     // Minute candles for BTCUSD
//!     let socket = gemini
//!         .socket(format!("{}/BTCUSD", MARKET_DATA_PATH))
//!         .subscribe(Subscription::market_data("candles_1m", ["BTCUSD"]))
//!         .on_error(|err| eprintln!("stream error: {}", err))
//!         .connect(|frame| println!("{}", frame))?;
//!
//!     tokio::signal::ctrl_c().await?;
//!     socket.close().await;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod prelude;

// Re-export main types
pub use client::{Gemini, MODE_ENV_VAR};
pub use error::{SdkError, SdkResult};

// Re-export commonly used types from dependencies
pub use gemini_auth::Credentials;
pub use gemini_rest::{ApiError, GeminiRestClient};
pub use gemini_types::{ErrorReason, Mode, Subscription, Subscriptions};
pub use gemini_ws::{ConnectionState, GeminiSocket, ReconnectConfig, SocketBuilder};
