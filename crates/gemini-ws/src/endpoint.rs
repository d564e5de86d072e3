//! WebSocket endpoint resolution

use gemini_types::Mode;
use std::fmt;

/// Market data stream path (v2)
pub const MARKET_DATA_PATH: &str = "/v2/marketdata";
/// Order events stream path
pub const ORDER_EVENTS_PATH: &str = "/v1/order/events";

/// Where a socket connects: `{base_url}{path}`
///
/// `path` is also the `request` field of the signed handshake payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointTarget {
    base_url: String,
    path: String,
}

impl EndpointTarget {
    /// Resolve a target from a mode and endpoint path
    pub fn new(mode: Mode, path: impl Into<String>) -> Self {
        Self::with_base_url(mode.ws_base_url(), path)
    }

    /// Target an explicit base URL
    pub fn with_base_url(base_url: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            path: path.into(),
        }
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Endpoint path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Full connection URL
    pub fn url(&self) -> String {
        format!("{}{}", self.base_url, self.path)
    }
}

impl fmt::Display for EndpointTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.base_url, self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_urls() {
        let sandbox = EndpointTarget::new(Mode::Sandbox, ORDER_EVENTS_PATH);
        assert_eq!(sandbox.url(), "wss://api.sandbox.gemini.com/v1/order/events");

        let live = EndpointTarget::new(Mode::Live, "/v2/marketdata/BTCUSD");
        assert_eq!(live.url(), "wss://api.gemini.com/v2/marketdata/BTCUSD");
        assert_eq!(live.path(), "/v2/marketdata/BTCUSD");
    }

    #[test]
    fn test_base_url_override() {
        let target = EndpointTarget::with_base_url("ws://127.0.0.1:9000/", MARKET_DATA_PATH);
        assert_eq!(target.base_url(), "ws://127.0.0.1:9000");
        assert_eq!(target.to_string(), "ws://127.0.0.1:9000/v2/marketdata");
    }
}
