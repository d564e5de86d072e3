//! Types for Gemini REST API requests and responses

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// Market Data Types
// ============================================================================

/// `GET /v2/ticker/{symbol}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TickerResponse {
    /// Trading pair, e.g. "BTCUSD"
    pub symbol: String,
    /// Open price from 24 hours ago
    pub open: Decimal,
    /// 24 hour high
    pub high: Decimal,
    /// 24 hour low
    pub low: Decimal,
    /// Latest close
    pub close: Decimal,
    /// Hourly prices, most recent first
    #[serde(default)]
    pub changes: Vec<Decimal>,
    /// Best bid
    pub bid: Decimal,
    /// Best ask
    pub ask: Decimal,
}

impl TickerResponse {
    /// Get the mid price (average of bid and ask)
    pub fn mid_price(&self) -> Decimal {
        (self.bid + self.ask) / Decimal::TWO
    }

    /// Get the spread
    pub fn spread(&self) -> Decimal {
        self.ask - self.bid
    }
}

/// `GET /v1/symbols/details/{symbol}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SymbolDetailsResponse {
    pub symbol: String,
    pub base_currency: String,
    pub quote_currency: String,
    /// Smallest price increment
    pub tick_size: Decimal,
    pub quote_increment: Decimal,
    pub min_order_size: Decimal,
    /// e.g. "open", "closed", "limit_only"
    pub status: String,
    #[serde(default)]
    pub wrap_enabled: bool,
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub contract_type: Option<String>,
    #[serde(default)]
    pub contract_price_currency: Option<String>,
}

// ============================================================================
// Trading Types
// ============================================================================

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

/// Order type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    /// Limit order
    #[serde(rename = "exchange limit")]
    ExchangeLimit,
    /// Stop-limit order; requires `stop_price`
    #[serde(rename = "exchange stop limit")]
    ExchangeStopLimit,
}

/// Execution options for limit orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderExecutionOption {
    MakerOrCancel,
    ImmediateOrCancel,
    FillOrKill,
}

/// Body of `POST /v1/order/new`, merged into the signed payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewOrderRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_order_id: Option<String>,
    pub symbol: String,
    pub amount: Decimal,
    pub price: Decimal,
    pub side: OrderSide,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OrderExecutionOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_price: Option<Decimal>,
    /// Sub-account, for master API keys
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

impl NewOrderRequest {
    /// Create a limit order
    pub fn limit(symbol: impl Into<String>, side: OrderSide, amount: Decimal, price: Decimal) -> Self {
        Self {
            client_order_id: None,
            symbol: symbol.into(),
            amount,
            price,
            side,
            order_type: OrderType::ExchangeLimit,
            options: Vec::new(),
            stop_price: None,
            account: None,
        }
    }

    /// Create a stop-limit order
    pub fn stop_limit(
        symbol: impl Into<String>,
        side: OrderSide,
        amount: Decimal,
        price: Decimal,
        stop_price: Decimal,
    ) -> Self {
        Self {
            order_type: OrderType::ExchangeStopLimit,
            stop_price: Some(stop_price),
            ..Self::limit(symbol, side, amount, price)
        }
    }

    /// Set client order ID
    pub fn with_client_order_id(mut self, id: impl Into<String>) -> Self {
        self.client_order_id = Some(id.into());
        self
    }

    /// Add an execution option
    pub fn with_option(mut self, option: OrderExecutionOption) -> Self {
        self.options.push(option);
        self
    }

    /// Place on a sub-account
    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }
}

/// Order status returned by `POST /v1/order/new`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewOrderResponse {
    pub order_id: String,
    #[serde(default)]
    pub id: Option<String>,
    pub symbol: String,
    pub exchange: String,
    pub avg_execution_price: Decimal,
    #[serde(default)]
    pub client_order_id: Option<String>,
    pub side: OrderSide,
    #[serde(rename = "type")]
    pub order_type: String,
    pub timestamp: String,
    pub timestampms: u64,
    pub is_live: bool,
    pub is_cancelled: bool,
    pub is_hidden: bool,
    pub was_forced: bool,
    pub executed_amount: Decimal,
    pub remaining_amount: Decimal,
    #[serde(default)]
    pub options: Vec<String>,
    pub price: Decimal,
    pub original_amount: Decimal,
}

impl NewOrderResponse {
    /// Check if the order is completely filled
    pub fn is_filled(&self) -> bool {
        self.remaining_amount.is_zero() && !self.executed_amount.is_zero()
    }
}

// ============================================================================
// Account Types
// ============================================================================

/// One entry of `POST /v1/balances`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Balance {
    pub currency: String,
    /// Total balance
    pub amount: Decimal,
    /// Amount available for trading
    pub available: Decimal,
    #[serde(rename = "availableForWithdrawal", default)]
    pub available_for_withdrawal: Option<Decimal>,
    /// Account type, e.g. "exchange"
    #[serde(rename = "type", default)]
    pub account_type: Option<String>,
}
