//! Re-exports for convenience
//!
//! Import everything you need with:
//! ```
//! use gemini_sdk::prelude::*;
//! ```

// Client
pub use crate::client::Gemini;
pub use crate::error::{SdkError, SdkResult};

// Signing
pub use gemini_auth::{AuthError, Credentials};

// Shared types
pub use gemini_types::{
    ErrorReason, ErrorResponse, FrameKind, Mode, Subscription, Subscriptions,
};

// Streaming
pub use gemini_ws::{
    ConnectionState, GeminiSocket, Handlers, ReconnectConfig, SocketBuilder, SocketConfig,
    TransportError, MARKET_DATA_PATH, ORDER_EVENTS_PATH,
};

// REST
pub use gemini_rest::{
    ApiError, Balance, ClientConfig, GeminiRestClient, NewOrderRequest, NewOrderResponse,
    OrderExecutionOption, OrderSide, OrderType, SymbolDetailsResponse, TickerResponse,
};

// Decimal for prices/quantities
pub use rust_decimal::Decimal;
