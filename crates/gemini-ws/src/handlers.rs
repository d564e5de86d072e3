//! Consumer callbacks for a socket
//!
//! The message handler is required; heartbeat, close and error hooks are
//! optional and invoked only when set. All callbacks run synchronously on the
//! supervisor task, so keep them fast. A callback that panics is logged and
//! the stream carries on.
//!
//! # Example
//!
//! ```
//! use gemini_ws::Handlers;
//!
//! let handlers = Handlers::new(|frame| println!("{}", frame))
//!     .on_heartbeat(|| println!("heartbeat"))
//!     .on_close(|| eprintln!("closed"))
//!     .on_error(|err| eprintln!("error: {}", err));
//! ```

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::error;

use crate::transport::TransportError;

/// Receives every inbound frame, raw
pub type MessageHandler = Arc<dyn Fn(&str) + Send + Sync>;
/// Called on each heartbeat
pub type HeartbeatHook = Arc<dyn Fn() + Send + Sync>;
/// Called whenever a transport handle closes
pub type CloseHook = Arc<dyn Fn() + Send + Sync>;
/// Called on transport-level errors
pub type ErrorHook = Arc<dyn Fn(&TransportError) + Send + Sync>;

/// Callback slots for one socket
pub struct Handlers {
    on_message: MessageHandler,
    on_heartbeat: Option<HeartbeatHook>,
    on_close: Option<CloseHook>,
    on_error: Option<ErrorHook>,
}

impl Handlers {
    /// Create handlers with the required message callback
    pub fn new<F>(on_message: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        Self {
            on_message: Arc::new(on_message),
            on_heartbeat: None,
            on_close: None,
            on_error: None,
        }
    }

    /// Register heartbeat callback
    pub fn on_heartbeat<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_heartbeat = Some(Arc::new(f));
        self
    }

    /// Register close callback
    pub fn on_close<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_close = Some(Arc::new(f));
        self
    }

    /// Register error callback
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&TransportError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(f));
        self
    }

    pub(crate) fn set_heartbeat(&mut self, hook: Option<HeartbeatHook>) {
        self.on_heartbeat = hook;
    }

    pub(crate) fn set_close(&mut self, hook: Option<CloseHook>) {
        self.on_close = hook;
    }

    pub(crate) fn set_error(&mut self, hook: Option<ErrorHook>) {
        self.on_error = hook;
    }

    // Invocation helpers

    pub(crate) fn invoke_message(&self, frame: &str) {
        guarded("message", || (self.on_message)(frame));
    }

    pub(crate) fn invoke_heartbeat(&self) {
        if let Some(ref hook) = self.on_heartbeat {
            guarded("heartbeat", || hook());
        }
    }

    pub(crate) fn invoke_close(&self) {
        if let Some(ref hook) = self.on_close {
            guarded("close", || hook());
        }
    }

    pub(crate) fn invoke_error(&self, error: &TransportError) {
        if let Some(ref hook) = self.on_error {
            guarded("error", || hook(error));
        }
    }
}

/// Run a consumer callback, containing any panic
fn guarded(name: &str, f: impl FnOnce()) {
    if let Err(payload) = catch_unwind(AssertUnwindSafe(f)) {
        error!(handler = name, "Handler panicked: {}", panic_message(payload.as_ref()));
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handlers")
            .field("on_message", &"...")
            .field("on_heartbeat", &self.on_heartbeat.as_ref().map(|_| "..."))
            .field("on_close", &self.on_close.as_ref().map(|_| "..."))
            .field("on_error", &self.on_error.as_ref().map(|_| "..."))
            .finish()
    }
}

impl Clone for Handlers {
    fn clone(&self) -> Self {
        Self {
            on_message: Arc::clone(&self.on_message),
            on_heartbeat: self.on_heartbeat.clone(),
            on_close: self.on_close.clone(),
            on_error: self.on_error.clone(),
        }
    }
}
