//! WebSocket transport abstraction
//!
//! This module provides a trait-based abstraction over WebSocket connections,
//! enabling unit testing of the supervisor without real network calls.
//!
//! A [`TransportFactory`] builds one [`Transport`] per connection attempt from
//! the target URL and that attempt's freshly signed headers. Building is
//! synchronous and only fails when the handshake request itself is invalid;
//! network failures surface later from [`Transport::connect`].

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use gemini_auth::SignedHeaders;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, instrument};

/// Transport layer errors
#[derive(Error, Debug)]
pub enum TransportError {
    /// Handshake request could not be built (bad URL or header value)
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Connection failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Connection closed
    #[error("connection closed")]
    ConnectionClosed,

    /// Send failed
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Receive failed
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// Connection timeout
    #[error("connection timeout after {0:?}")]
    Timeout(Duration),

    /// Not connected
    #[error("not connected")]
    NotConnected,

    /// Protocol error
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Trait for WebSocket transport abstraction
///
/// This trait enables unit testing of connection logic by allowing
/// mock implementations to be injected instead of real WebSocket connections.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Connect to the WebSocket endpoint
    async fn connect(&mut self) -> Result<(), TransportError>;

    /// Send a text message
    async fn send(&mut self, message: &str) -> Result<(), TransportError>;

    /// Receive a text message
    ///
    /// Returns `None` if the connection was closed gracefully.
    async fn recv(&mut self) -> Result<Option<String>, TransportError>;

    /// Close the connection gracefully
    async fn close(&mut self) -> Result<(), TransportError>;

    /// Check if currently connected
    fn is_connected(&self) -> bool;

    /// Get the endpoint URL
    fn endpoint(&self) -> &str;
}

/// Builds a new transport for each connection attempt
pub trait TransportFactory: Send + Sync + 'static {
    /// Transport produced by this factory
    type Transport: Transport + 'static;

    /// Build an unconnected transport carrying `headers` on its handshake
    fn build(&self, url: &str, headers: &SignedHeaders) -> Result<Self::Transport, TransportError>;
}

/// Build the HTTP upgrade request with the signed header triple attached
pub fn handshake_request(url: &str, headers: &SignedHeaders) -> Result<Request, TransportError> {
    let mut request = url
        .into_client_request()
        .map_err(|e| TransportError::InvalidRequest(format!("{}: {}", url, e)))?;

    for (name, value) in headers.iter() {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        let value =
            HeaderValue::from_str(value).map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        request.headers_mut().insert(name, value);
    }

    Ok(request)
}

/// Real WebSocket transport using tokio-tungstenite
pub struct WsTransport {
    url: String,
    request: Option<Request>,
    stream: Option<WebSocketStream<MaybeTlsStream<TcpStream>>>,
    connect_timeout: Duration,
}

impl WsTransport {
    /// Create a new WebSocket transport with signed handshake headers
    pub fn new(url: impl Into<String>, headers: &SignedHeaders) -> Result<Self, TransportError> {
        let url = url.into();
        let request = handshake_request(&url, headers)?;
        Ok(Self {
            url,
            request: Some(request),
            stream: None,
            connect_timeout: Duration::from_secs(10),
        })
    }

    /// Set connection timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

#[async_trait]
impl Transport for WsTransport {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn connect(&mut self) -> Result<(), TransportError> {
        // Each handshake carries a single-use nonce
        let request = self.request.take().ok_or_else(|| {
            TransportError::ConnectionFailed("handshake request already used".into())
        })?;

        debug!("Connecting to WebSocket");

        let (ws_stream, _response) = timeout(self.connect_timeout, connect_async(request))
            .await
            .map_err(|_| TransportError::Timeout(self.connect_timeout))?
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        self.stream = Some(ws_stream);
        debug!("WebSocket connected");
        Ok(())
    }

    #[instrument(skip(self, message), fields(len = message.len()))]
    async fn send(&mut self, message: &str) -> Result<(), TransportError> {
        let stream = self.stream.as_mut().ok_or(TransportError::NotConnected)?;

        stream
            .send(Message::Text(message.to_string()))
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn recv(&mut self) -> Result<Option<String>, TransportError> {
        loop {
            let stream = self.stream.as_mut().ok_or(TransportError::NotConnected)?;

            match stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text)),
                Some(Ok(Message::Binary(data))) => {
                    return String::from_utf8(data)
                        .map(Some)
                        .map_err(|e| TransportError::Protocol(e.to_string()));
                }
                Some(Ok(Message::Close(_))) | None => {
                    self.stream = None;
                    return Ok(None);
                }
                // Pongs are queued by tungstenite itself
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => continue,
                Some(Err(e)) => {
                    // tungstenite streams are unusable after an error
                    self.stream = None;
                    return Err(TransportError::ReceiveFailed(e.to_string()));
                }
            }
        }
    }

    #[instrument(skip(self))]
    async fn close(&mut self) -> Result<(), TransportError> {
        if let Some(mut stream) = self.stream.take() {
            stream
                .close(None)
                .await
                .map_err(|e| TransportError::SendFailed(e.to_string()))?;
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}

/// Factory for [`WsTransport`]
#[derive(Debug, Clone)]
pub struct WsTransportFactory {
    connect_timeout: Duration,
}

impl Default for WsTransportFactory {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl WsTransportFactory {
    /// Create a factory with the default 10 second connect timeout
    pub fn new() -> Self {
        Self::default()
    }

    /// Set connection timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

impl TransportFactory for WsTransportFactory {
    type Transport = WsTransport;

    fn build(&self, url: &str, headers: &SignedHeaders) -> Result<WsTransport, TransportError> {
        Ok(WsTransport::new(url, headers)?.with_timeout(self.connect_timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gemini_auth::Credentials;
    use serde_json::Map;

    fn headers() -> SignedHeaders {
        Credentials::new("test-api-key", "test-api-secret")
            .unwrap()
            .signed_headers("/v1/order/events", &Map::new())
            .unwrap()
    }

    #[test]
    fn test_handshake_request_carries_headers() {
        let headers = headers();
        let request = handshake_request("wss://api.sandbox.gemini.com/v1/order/events", &headers).unwrap();

        assert_eq!(request.uri().path(), "/v1/order/events");
        assert_eq!(request.headers()["x-gemini-apikey"], "test-api-key");
        assert_eq!(request.headers()["x-gemini-payload"], headers.payload());
        assert_eq!(request.headers()["x-gemini-signature"], headers.signature());
    }

    #[test]
    fn test_malformed_url_fails_build() {
        let result = WsTransportFactory::new().build("not a url", &headers());
        assert!(matches!(result, Err(TransportError::InvalidRequest(_))));
    }

    #[test]
    fn test_build_does_not_connect() {
        let transport = WsTransportFactory::new()
            .build("wss://api.sandbox.gemini.com/v2/marketdata", &headers())
            .unwrap();
        assert!(!transport.is_connected());
        assert_eq!(transport.endpoint(), "wss://api.sandbox.gemini.com/v2/marketdata");
    }
}
