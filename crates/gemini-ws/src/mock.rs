//! Mock transport for testing
//!
//! [`MockFactory`] records every transport it builds as a [`MockConnection`],
//! the test-side handle used to push inbound frames and inspect what the
//! supervisor sent. `recv()` awaits the next pushed frame, so a silent mock
//! connection behaves like a silent server.

use async_trait::async_trait;
use gemini_auth::SignedHeaders;
use gemini_types::HEARTBEAT_TYPE;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::transport::{Transport, TransportError, TransportFactory};

/// Frame pushed into a mock connection
#[derive(Debug, Clone)]
pub enum MockFrame {
    /// Text frame delivered by `recv()`
    Text(String),
    /// Server-side close
    Close,
    /// Receive error; the connection stays up
    Error(String),
    /// Receive error that also drops the connection
    Fatal(String),
}

/// Test-side handle on one built transport
#[derive(Debug, Clone)]
pub struct MockConnection {
    url: String,
    headers: SignedHeaders,
    frames: mpsc::UnboundedSender<MockFrame>,
    sent: Arc<Mutex<Vec<String>>>,
    opened: Arc<AtomicBool>,
    closed: Arc<AtomicBool>,
}

impl MockConnection {
    /// URL the transport was built for
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Signed headers the transport was built with
    pub fn headers(&self) -> &SignedHeaders {
        &self.headers
    }

    /// Deliver a text frame
    pub fn push_text(&self, text: impl Into<String>) {
        let _ = self.frames.send(MockFrame::Text(text.into()));
    }

    /// Deliver a `{"type":"heartbeat"}` frame
    pub fn push_heartbeat(&self) {
        self.push_text(format!(r#"{{"type":"{}"}}"#, HEARTBEAT_TYPE));
    }

    /// Simulate a server-side close
    pub fn push_close(&self) {
        let _ = self.frames.send(MockFrame::Close);
    }

    /// Simulate a receive error
    pub fn push_error(&self, message: impl Into<String>) {
        let _ = self.frames.send(MockFrame::Error(message.into()));
    }

    /// Simulate a receive error that kills the connection
    pub fn push_fatal(&self, message: impl Into<String>) {
        let _ = self.frames.send(MockFrame::Fatal(message.into()));
    }

    /// Messages sent over this connection
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }

    /// Whether `connect()` succeeded
    pub fn was_opened(&self) -> bool {
        self.opened.load(Ordering::SeqCst)
    }

    /// Whether the client closed this connection
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Mock transport for testing
pub struct MockTransport {
    url: String,
    connected: bool,
    fail_connect: bool,
    stall_connect: bool,
    frames: mpsc::UnboundedReceiver<MockFrame>,
    sent: Arc<Mutex<Vec<String>>>,
    opened: Arc<AtomicBool>,
    closed: Arc<AtomicBool>,
    /// Simulate send failure
    pub fail_send: bool,
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&mut self) -> Result<(), TransportError> {
        if self.stall_connect {
            std::future::pending::<()>().await;
        }
        if self.fail_connect {
            return Err(TransportError::ConnectionFailed("mock connection failure".into()));
        }
        self.connected = true;
        self.opened.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn send(&mut self, message: &str) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        if self.fail_send {
            return Err(TransportError::SendFailed("mock send failure".into()));
        }
        self.sent.lock().push(message.to_string());
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<String>, TransportError> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        match self.frames.recv().await {
            Some(MockFrame::Text(text)) => Ok(Some(text)),
            Some(MockFrame::Error(message)) => Err(TransportError::ReceiveFailed(message)),
            Some(MockFrame::Fatal(message)) => {
                self.connected = false;
                Err(TransportError::ReceiveFailed(message))
            }
            Some(MockFrame::Close) | None => {
                self.connected = false;
                Ok(None)
            }
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.connected = false;
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}

#[derive(Default)]
struct FactoryState {
    connections: Mutex<Vec<MockConnection>>,
    fail_builds: AtomicUsize,
    fail_connects: AtomicUsize,
    stall_connects: AtomicUsize,
    fail_sends: AtomicBool,
    build_attempts: AtomicUsize,
}

/// Factory producing [`MockTransport`]s
///
/// Cheap to clone; clones share recorded connections.
#[derive(Clone, Default)]
pub struct MockFactory {
    state: Arc<FactoryState>,
}

impl MockFactory {
    /// Create a new mock factory
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `n` builds with [`TransportError::InvalidRequest`]
    pub fn fail_next_builds(&self, n: usize) {
        self.state.fail_builds.store(n, Ordering::SeqCst);
    }

    /// Make the next `n` built transports fail to connect
    pub fn fail_next_connects(&self, n: usize) {
        self.state.fail_connects.store(n, Ordering::SeqCst);
    }

    /// Make the next `n` built transports hang in `connect()`
    pub fn stall_next_connects(&self, n: usize) {
        self.state.stall_connects.store(n, Ordering::SeqCst);
    }

    /// Make every future transport fail its sends
    pub fn fail_sends(&self) {
        self.state.fail_sends.store(true, Ordering::SeqCst);
    }

    /// Number of `build()` calls, including failed ones
    pub fn build_attempts(&self) -> usize {
        self.state.build_attempts.load(Ordering::SeqCst)
    }

    /// Transports built so far
    pub fn connections(&self) -> Vec<MockConnection> {
        self.state.connections.lock().clone()
    }

    /// Number of transports built so far
    pub fn connection_count(&self) -> usize {
        self.state.connections.lock().len()
    }

    /// Most recently built transport
    pub fn last(&self) -> Option<MockConnection> {
        self.state.connections.lock().last().cloned()
    }

    fn take_one(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl TransportFactory for MockFactory {
    type Transport = MockTransport;

    fn build(&self, url: &str, headers: &SignedHeaders) -> Result<MockTransport, TransportError> {
        self.state.build_attempts.fetch_add(1, Ordering::SeqCst);
        if Self::take_one(&self.state.fail_builds) {
            return Err(TransportError::InvalidRequest("mock build failure".into()));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let sent = Arc::new(Mutex::new(Vec::new()));
        let opened = Arc::new(AtomicBool::new(false));
        let closed = Arc::new(AtomicBool::new(false));

        self.state.connections.lock().push(MockConnection {
            url: url.to_string(),
            headers: headers.clone(),
            frames: tx,
            sent: Arc::clone(&sent),
            opened: Arc::clone(&opened),
            closed: Arc::clone(&closed),
        });

        Ok(MockTransport {
            url: url.to_string(),
            connected: false,
            fail_connect: Self::take_one(&self.state.fail_connects),
            stall_connect: Self::take_one(&self.state.stall_connects),
            frames: rx,
            sent,
            opened,
            closed,
            fail_send: self.state.fail_sends.load(Ordering::SeqCst),
        })
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

    #[tokio::test]
    async fn test_mock_transport() {
        let factory = MockFactory::new();
        let mut transport = factory.build("wss://mock.test", &headers()).unwrap();
        let handle = factory.last().unwrap();
        handle.push_text(r#"{"type":"update"}"#);

        transport.connect().await.unwrap();
        assert!(transport.is_connected());

        let msg = transport.recv().await.unwrap();
        assert_eq!(msg, Some(r#"{"type":"update"}"#.to_string()));

        transport.send("hello").await.unwrap();
        assert_eq!(handle.sent(), vec!["hello"]);
    }

    #[tokio::test]
    async fn test_mock_connect_failure() {
        let factory = MockFactory::new();
        factory.fail_next_connects(1);

        let mut first = factory.build("wss://mock.test", &headers()).unwrap();
        assert!(matches!(first.connect().await, Err(TransportError::ConnectionFailed(_))));

        let mut second = factory.build("wss://mock.test", &headers()).unwrap();
        assert!(second.connect().await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_close() {
        let factory = MockFactory::new();
        let mut transport = factory.build("wss://mock.test", &headers()).unwrap();
        factory.last().unwrap().push_close();

        transport.connect().await.unwrap();
        let msg = transport.recv().await.unwrap();
        assert!(msg.is_none());
        assert!(!transport.is_connected());
    }

    #[test]
    fn test_build_failures_are_counted() {
        let factory = MockFactory::new();
        factory.fail_next_builds(2);

        assert!(factory.build("wss://mock.test", &headers()).is_err());
        assert!(factory.build("wss://mock.test", &headers()).is_err());
        assert!(factory.build("wss://mock.test", &headers()).is_ok());
        assert_eq!(factory.build_attempts(), 3);
        assert_eq!(factory.connection_count(), 1);
    }
}
