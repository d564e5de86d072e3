//! Authenticated WebSocket connector for the Gemini API
//!
//! This crate keeps one long-lived, signed stream alive without supervision
//! from the caller.
//!
//! # Features
//!
//! - Handshake signed with a fresh nonce on every (re)connection
//! - Heartbeat watchdog that replaces silent connections
//! - Subscription replay after every open, byte-identical each time
//! - Raw frame delivery to a consumer callback, heartbeats included
//!
//! # Example
//!
//! ```no_run
//! use gemini_auth::Credentials;
//! use gemini_types::{Mode, Subscription};
//! use gemini_ws::{GeminiSocket, Handlers, SocketConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = Credentials::from_env()?;
//!     let config = SocketConfig::new(Mode::Sandbox, "/v2/marketdata/BTCUSD")
//!         .with_subscription(Subscription::market_data("candles_1m", ["BTCUSD"]));
//!
//!     let handlers = Handlers::new(|frame| println!("{}", frame))
//!         .on_error(|err| eprintln!("stream error: {}", err));
//!
//!     let socket = GeminiSocket::connect(credentials, config, handlers)?;
//!     socket.closed().await;
//!     Ok(())
//! }
//! ```

pub mod connection;
pub mod endpoint;
pub mod error;
pub mod handlers;
pub mod reconnect;
pub mod router;
pub mod subscription;
pub mod transport;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

// Re-export main types
pub use connection::{ConnectionState, GeminiSocket, SocketBuilder, SocketConfig};
pub use endpoint::{EndpointTarget, MARKET_DATA_PATH, ORDER_EVENTS_PATH};
pub use error::{WsError, WsResult};
pub use handlers::Handlers;
pub use reconnect::ReconnectConfig;
pub use router::{Liveness, MessageRouter, Routed};
pub use subscription::SubscriptionReplay;
pub use transport::{Transport, TransportError, TransportFactory, WsTransport, WsTransportFactory};
