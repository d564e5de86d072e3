//! Authenticated streaming connection with heartbeat supervision
//!
//! A [`GeminiSocket`] owns one background supervisor task. The task holds the
//! only transport handle, signs every handshake with a fresh nonce, replays
//! subscriptions after each open, and replaces the connection when the
//! heartbeat watchdog finds it silent for too long.

use gemini_auth::Credentials;
use gemini_types::{Mode, Subscription, Subscriptions};
use parking_lot::RwLock;
use serde_json::Map;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval};
use tracing::{debug, error, info, warn};

use crate::endpoint::EndpointTarget;
use crate::error::{WsError, WsResult};
use crate::handlers::{CloseHook, ErrorHook, Handlers, HeartbeatHook};
use crate::reconnect::ReconnectConfig;
use crate::router::{Liveness, MessageRouter};
use crate::subscription::SubscriptionReplay;
use crate::transport::{Transport, TransportError, TransportFactory, WsTransportFactory};

/// WebSocket connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Handshake in progress (or waiting to retry one)
    Connecting,
    /// Connected; subscriptions sent
    Open,
    /// Tearing down the current handle
    Closing,
    /// No live handle
    Closed,
}

/// Configuration for a socket
#[derive(Debug, Clone)]
pub struct SocketConfig {
    /// Where to connect
    pub target: EndpointTarget,
    /// Subscriptions replayed after every open
    pub subscriptions: Subscriptions,
    /// Watchdog and retry timing
    pub reconnect: ReconnectConfig,
}

impl SocketConfig {
    /// Create a config for `path` in the given mode
    pub fn new(mode: Mode, path: impl Into<String>) -> Self {
        Self {
            target: EndpointTarget::new(mode, path),
            subscriptions: Subscriptions::default(),
            reconnect: ReconnectConfig::default(),
        }
    }

    /// Set the target
    pub fn with_target(mut self, target: EndpointTarget) -> Self {
        self.target = target;
        self
    }

    /// Append one subscription
    pub fn with_subscription(mut self, subscription: Subscription) -> Self {
        let mut all = std::mem::take(&mut self.subscriptions).into_vec();
        all.push(subscription);
        self.subscriptions = all.into();
        self
    }

    /// Replace the subscription set
    pub fn with_subscriptions(mut self, subscriptions: impl Into<Subscriptions>) -> Self {
        self.subscriptions = subscriptions.into();
        self
    }

    /// Set reconnection config
    pub fn with_reconnect(mut self, config: ReconnectConfig) -> Self {
        self.reconnect = config;
        self
    }
}

/// Builder for [`GeminiSocket`]
///
/// ```no_run
/// use gemini_auth::Credentials;
/// use gemini_types::{Mode, Subscription};
/// use gemini_ws::GeminiSocket;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let credentials = Credentials::from_env()?;
/// let socket = GeminiSocket::builder(credentials, "/v2/marketdata")
///     .mode(Mode::Sandbox)
///     .subscribe(Subscription::market_data("candles_1m", ["BTCUSD"]))
///     .on_close(|| eprintln!("connection closed"))
///     .connect(|frame| println!("{}", frame))?;
///
/// tokio::signal::ctrl_c().await?;
/// socket.close().await;
/// # Ok(())
/// # }
/// ```
pub struct SocketBuilder {
    credentials: Credentials,
    config: SocketConfig,
    on_heartbeat: Option<HeartbeatHook>,
    on_close: Option<CloseHook>,
    on_error: Option<ErrorHook>,
}

impl SocketBuilder {
    /// Start building a socket for `path` (sandbox by default)
    pub fn new(credentials: Credentials, path: impl Into<String>) -> Self {
        Self {
            credentials,
            config: SocketConfig::new(Mode::default(), path),
            on_heartbeat: None,
            on_close: None,
            on_error: None,
        }
    }

    /// Select sandbox or live
    pub fn mode(mut self, mode: Mode) -> Self {
        let path = self.config.target.path().to_string();
        self.config.target = EndpointTarget::new(mode, path);
        self
    }

    /// Connect to an explicit base URL instead of the mode's
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        let path = self.config.target.path().to_string();
        self.config.target = EndpointTarget::with_base_url(base_url, path);
        self
    }

    /// Add a subscription
    pub fn subscribe(mut self, subscription: Subscription) -> Self {
        self.config = self.config.with_subscription(subscription);
        self
    }

    /// Replace the subscription set
    pub fn subscriptions(mut self, subscriptions: impl Into<Subscriptions>) -> Self {
        self.config = self.config.with_subscriptions(subscriptions);
        self
    }

    /// Set watchdog and retry timing
    pub fn reconnect_config(mut self, config: ReconnectConfig) -> Self {
        self.config.reconnect = config;
        self
    }

    /// Called on each heartbeat frame
    pub fn on_heartbeat<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_heartbeat = Some(Arc::new(f));
        self
    }

    /// Called whenever a transport handle closes
    pub fn on_close<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_close = Some(Arc::new(f));
        self
    }

    /// Called on transport errors
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&TransportError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(f));
        self
    }

    /// Current configuration
    pub fn config(&self) -> &SocketConfig {
        &self.config
    }

    /// Connect over a real WebSocket
    ///
    /// Must be called within a Tokio runtime.
    pub fn connect<F>(self, on_message: F) -> WsResult<GeminiSocket>
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let factory = WsTransportFactory::new().with_timeout(self.config.reconnect.connect_timeout);
        self.connect_with(factory, on_message)
    }

    /// Connect using a custom transport factory
    pub fn connect_with<T, F>(self, factory: T, on_message: F) -> WsResult<GeminiSocket>
    where
        T: TransportFactory,
        F: Fn(&str) + Send + Sync + 'static,
    {
        let mut handlers = Handlers::new(on_message);
        handlers.set_heartbeat(self.on_heartbeat);
        handlers.set_close(self.on_close);
        handlers.set_error(self.on_error);
        GeminiSocket::connect_with(self.credentials, self.config, handlers, factory)
    }
}

#[derive(Debug)]
enum Command {
    Reconnect,
    Close,
}

#[derive(Debug)]
struct Shared {
    state: RwLock<ConnectionState>,
    reconnecting: AtomicBool,
    reconnect_requested: AtomicBool,
    connections: AtomicU64,
}

impl Shared {
    fn new() -> Self {
        Self {
            state: RwLock::new(ConnectionState::Connecting),
            reconnecting: AtomicBool::new(false),
            reconnect_requested: AtomicBool::new(false),
            connections: AtomicU64::new(0),
        }
    }

    fn set_state(&self, state: ConnectionState) {
        *self.state.write() = state;
    }
}

/// Handle to a supervised Gemini stream
///
/// Dropping the handle shuts the stream down, same as [`GeminiSocket::shutdown`].
#[derive(Debug)]
pub struct GeminiSocket {
    url: String,
    shared: Arc<Shared>,
    commands: mpsc::UnboundedSender<Command>,
    task: JoinHandle<()>,
}

impl GeminiSocket {
    /// Start building a socket
    pub fn builder(credentials: Credentials, path: impl Into<String>) -> SocketBuilder {
        SocketBuilder::new(credentials, path)
    }

    /// Connect over a real WebSocket
    pub fn connect(credentials: Credentials, config: SocketConfig, handlers: Handlers) -> WsResult<Self> {
        let factory = WsTransportFactory::new().with_timeout(config.reconnect.connect_timeout);
        Self::connect_with(credentials, config, handlers, factory)
    }

    /// Connect using a custom transport factory
    ///
    /// Returns an error only if the first transport cannot be constructed
    /// (malformed URL, unsignable handshake, unserializable subscription).
    /// Connection failures after that are reported to the error callback and
    /// retried by the watchdog. Must be called within a Tokio runtime.
    pub fn connect_with<T: TransportFactory>(
        credentials: Credentials,
        config: SocketConfig,
        handlers: Handlers,
        factory: T,
    ) -> WsResult<Self> {
        let SocketConfig {
            target,
            subscriptions,
            reconnect,
        } = config;

        let url = target.url();
        let replay = SubscriptionReplay::new(subscriptions)?;
        let headers = credentials.signed_headers(target.path(), &Map::new())?;
        let first = factory.build(&url, &headers)?;

        let shared = Arc::new(Shared::new());
        let (commands, command_rx) = mpsc::unbounded_channel();

        let supervisor = Supervisor {
            factory,
            credentials,
            target,
            url: url.clone(),
            config: reconnect,
            replay,
            router: MessageRouter::new(handlers.clone()),
            handlers,
            slot: ConnectionSlot::new(),
            liveness: Liveness::new(Instant::now()),
            shared: Arc::clone(&shared),
            commands: command_rx,
            shutdown: false,
        };

        info!("Connecting to {}", url);
        let task = tokio::spawn(supervisor.run(first));

        Ok(Self {
            url,
            shared,
            commands,
            task,
        })
    }

    /// Connection URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get the current connection state
    pub fn state(&self) -> ConnectionState {
        *self.shared.state.read()
    }

    /// Check if open
    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Number of successful opens so far
    pub fn connections(&self) -> u64 {
        self.shared.connections.load(Ordering::SeqCst)
    }

    /// Request a reconnect
    ///
    /// Returns `Ok(false)` if a reconnect is already pending or running.
    pub fn reconnect(&self) -> WsResult<bool> {
        if self.shared.reconnecting.load(Ordering::SeqCst)
            || self.shared.reconnect_requested.swap(true, Ordering::SeqCst)
        {
            return Ok(false);
        }
        self.commands
            .send(Command::Reconnect)
            .map_err(|_| WsError::Closed)?;
        Ok(true)
    }

    /// Request shutdown without waiting for it
    pub fn shutdown(&self) {
        let _ = self.commands.send(Command::Close);
    }

    /// Close the connection and wait for the supervisor to stop
    ///
    /// A handshake in flight is abandoned. No reconnect is attempted
    /// afterwards.
    pub async fn close(self) {
        self.shutdown();
        self.closed().await;
    }

    /// Wait for the supervisor to stop
    pub async fn closed(self) {
        if let Err(e) = self.task.await {
            self.shared.set_state(ConnectionState::Closed);
            error!("Socket supervisor failed: {}", e);
        }
    }
}

/// Owner of the single live transport handle
struct ConnectionSlot<T> {
    current: Option<T>,
}

impl<T: Transport> ConnectionSlot<T> {
    fn new() -> Self {
        Self { current: None }
    }

    /// Close and drop the current handle; true if it was open
    async fn close(&mut self) -> bool {
        match self.current.take() {
            Some(mut transport) => {
                let was_open = transport.is_connected();
                if let Err(e) = transport.close().await {
                    debug!(error = %e, "Error closing transport");
                }
                was_open
            }
            None => false,
        }
    }

    /// Replace the handle, closing the old one first
    async fn install(&mut self, next: T) {
        self.close().await;
        self.current = Some(next);
    }

    fn discard(&mut self) {
        self.current = None;
    }

    fn current_mut(&mut self) -> Option<&mut T> {
        self.current.as_mut()
    }

    fn is_connected(&self) -> bool {
        self.current.as_ref().is_some_and(|t| t.is_connected())
    }

    /// Next inbound frame; pending forever while nothing is connected
    async fn next_frame(&mut self) -> Result<Option<String>, TransportError> {
        match self.current.as_mut() {
            Some(transport) if transport.is_connected() => transport.recv().await,
            _ => std::future::pending().await,
        }
    }
}

struct Supervisor<F: TransportFactory> {
    factory: F,
    credentials: Credentials,
    target: EndpointTarget,
    url: String,
    config: ReconnectConfig,
    replay: SubscriptionReplay,
    router: MessageRouter,
    handlers: Handlers,
    slot: ConnectionSlot<F::Transport>,
    liveness: Liveness,
    shared: Arc<Shared>,
    commands: mpsc::UnboundedReceiver<Command>,
    shutdown: bool,
}

impl<F: TransportFactory> Supervisor<F> {
    async fn run(mut self, first: F::Transport) {
        let mut watchdog = self.config.watchdog();

        self.slot.install(first).await;
        self.open(&mut watchdog).await;

        while !self.shutdown {
            tokio::select! {
                biased;

                command = self.commands.recv() => match command {
                    Some(Command::Reconnect) => {
                        self.shared.reconnect_requested.store(false, Ordering::SeqCst);
                        info!("Reconnect requested for {}", self.url);
                        self.reconnect(&mut watchdog).await;
                    }
                    Some(Command::Close) | None => self.shutdown = true,
                },
                _ = watchdog.tick() => {
                    let now = Instant::now();
                    if self.liveness.is_stale(now, self.config.heartbeat_timeout) {
                        let silent = now.saturating_duration_since(self.liveness.last_heartbeat_at());
                        warn!("No heartbeat for {:?}, reconnecting to {}", silent, self.url);
                        self.reconnect(&mut watchdog).await;
                    }
                }
                frame = self.slot.next_frame() => self.on_frame(frame),
            }
        }

        self.shared.set_state(ConnectionState::Closing);
        if self.slot.close().await {
            self.handlers.invoke_close();
        }
        self.shared.set_state(ConnectionState::Closed);
        info!("Closed connection to {}", self.url);
    }

    /// Connect the installed handle and bring it into service
    async fn open(&mut self, watchdog: &mut Interval) {
        self.shared.set_state(ConnectionState::Connecting);
        let Some(transport) = self.slot.current_mut() else {
            return;
        };

        let result = {
            let connect = transport.connect();
            tokio::pin!(connect);
            loop {
                tokio::select! {
                    biased;

                    command = self.commands.recv() => match command {
                        Some(Command::Reconnect) => {
                            self.shared.reconnect_requested.store(false, Ordering::SeqCst);
                            debug!("Connect already in progress");
                        }
                        Some(Command::Close) | None => {
                            self.shutdown = true;
                            return;
                        }
                    },
                    result = &mut connect => break result,
                }
            }
        };

        match result {
            Ok(()) => {
                let count = self.shared.connections.fetch_add(1, Ordering::SeqCst) + 1;
                self.shared.set_state(ConnectionState::Open);
                info!(url = %self.url, connection = count, "Connected to Gemini");

                let sent = self.replay.replay(transport).await;
                if !self.replay.is_empty() {
                    debug!("Sent {}/{} subscriptions", sent, self.replay.len());
                }

                self.liveness.reset(Instant::now());
                watchdog.reset();
            }
            Err(e) => {
                warn!(url = %self.url, error = %e, "Connection failed");
                self.handlers.invoke_error(&e);
                self.slot.discard();
                self.shared.set_state(ConnectionState::Closed);
                self.handlers.invoke_close();
            }
        }
    }

    fn on_frame(&mut self, frame: Result<Option<String>, TransportError>) {
        match frame {
            Ok(Some(text)) => {
                self.router.route(&text, &mut self.liveness);
            }
            Ok(None) => {
                info!("Server closed connection to {}", self.url);
                self.slot.discard();
                self.shared.set_state(ConnectionState::Closed);
                self.handlers.invoke_close();
            }
            Err(e) => {
                warn!(error = %e, "Transport error");
                self.handlers.invoke_error(&e);
                if !self.slot.is_connected() {
                    self.slot.discard();
                    self.shared.set_state(ConnectionState::Closed);
                    self.handlers.invoke_close();
                }
            }
        }
    }

    /// Replace the current handle with a freshly signed one
    async fn reconnect(&mut self, watchdog: &mut Interval) {
        if self.shared.reconnecting.swap(true, Ordering::SeqCst) {
            debug!("Reconnect already in progress");
            return;
        }

        self.shared.set_state(ConnectionState::Closing);
        if self.slot.close().await {
            self.handlers.invoke_close();
        }

        loop {
            self.shared.set_state(ConnectionState::Connecting);
            match self.build_transport() {
                Ok(transport) => {
                    self.slot.install(transport).await;
                    break;
                }
                Err(e) => {
                    error!(
                        "Failed to create connection to {}: {}. Retrying in {:?}",
                        self.url, e, self.config.retry_delay
                    );
                    if !self.wait_retry().await {
                        self.shared.set_state(ConnectionState::Closed);
                        self.shared.reconnecting.store(false, Ordering::SeqCst);
                        return;
                    }
                }
            }
        }

        self.open(watchdog).await;
        self.shared.reconnecting.store(false, Ordering::SeqCst);
    }

    /// Sign a new handshake and build an unconnected transport
    fn build_transport(&self) -> WsResult<F::Transport> {
        let headers = self.credentials.signed_headers(self.target.path(), &Map::new())?;
        Ok(self.factory.build(&self.url, &headers)?)
    }

    /// Sleep out the retry delay; false if shutdown was requested meanwhile
    async fn wait_retry(&mut self) -> bool {
        let sleep = tokio::time::sleep(self.config.retry_delay);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                _ = &mut sleep => return true,
                command = self.commands.recv() => match command {
                    Some(Command::Reconnect) => {
                        self.shared.reconnect_requested.store(false, Ordering::SeqCst);
                        debug!("Reconnect already in progress");
                    }
                    Some(Command::Close) | None => {
                        self.shutdown = true;
                        return false;
                    }
                },
            }
        }
    }
}
