//! REST API client for the Gemini exchange
//!
//! Public market data calls are plain GETs. Private calls are signed POSTs:
//! the request fields travel in the base64 `X-GEMINI-PAYLOAD` header next to
//! an HMAC-SHA384 signature, and the body stays empty.
//!
//! Every failure comes back as an [`ApiError`] carrying an HTTP status and a
//! structured error body. Network failures are reported as status 500 with
//! reason `System`, so callers have a single error shape to handle.
//!
//! # Example
//!
//! ```no_run
//! use gemini_auth::Credentials;
//! use gemini_rest::{GeminiRestClient, NewOrderRequest, OrderSide};
//! use gemini_types::Mode;
//! use rust_decimal::Decimal;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GeminiRestClient::new(Credentials::from_env()?, Mode::Sandbox)?;
//!
//!     let order = NewOrderRequest::limit("btcusd", OrderSide::Buy, Decimal::ONE, Decimal::new(3633, 0));
//!     match client.new_order(&order).await {
//!         Ok(status) => println!("Placed order {}", status.order_id),
//!         Err(e) => eprintln!("Rejected ({}): {}", e.status, e.message()),
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod types;

// Re-export main types
pub use client::{ClientConfig, GeminiRestClient};
pub use error::{ApiError, RestResult, UNREACHABLE_STATUS};
pub use types::{
    Balance, NewOrderRequest, NewOrderResponse, OrderExecutionOption, OrderSide, OrderType,
    SymbolDetailsResponse, TickerResponse,
};
