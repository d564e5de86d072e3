//! Inbound frame routing and liveness tracking

use gemini_types::{classify, FrameKind};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::handlers::Handlers;

/// Longest frame prefix included in parse-failure logs
const LOG_PREVIEW_CHARS: usize = 200;

/// When the current connection last proved it was alive
///
/// Written only on heartbeat frames (and reset on open); domain frames never
/// touch it.
#[derive(Debug, Clone, Copy)]
pub struct Liveness {
    last_heartbeat_at: Instant,
}

impl Liveness {
    /// Start tracking from `now`
    pub fn new(now: Instant) -> Self {
        Self {
            last_heartbeat_at: now,
        }
    }

    /// Reset at connection open
    pub fn reset(&mut self, now: Instant) {
        self.last_heartbeat_at = now;
    }

    /// Record a heartbeat
    pub fn record_heartbeat(&mut self, now: Instant) {
        self.last_heartbeat_at = now;
    }

    /// Time of the last heartbeat (or open)
    pub fn last_heartbeat_at(&self) -> Instant {
        self.last_heartbeat_at
    }

    /// True once silence strictly exceeds `threshold`
    pub fn is_stale(&self, now: Instant, threshold: Duration) -> bool {
        now.saturating_duration_since(self.last_heartbeat_at) > threshold
    }
}

/// How a frame was routed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routed {
    /// Heartbeat: liveness updated, hook invoked, frame forwarded
    Heartbeat,
    /// Domain payload: frame forwarded
    Payload,
    /// Not JSON: logged and dropped
    Malformed,
}

/// Classifies frames and forwards them to the consumer
#[derive(Debug, Clone)]
pub struct MessageRouter {
    handlers: Handlers,
}

impl MessageRouter {
    /// Create a router over the given handlers
    pub fn new(handlers: Handlers) -> Self {
        Self { handlers }
    }

    /// Route one inbound frame
    ///
    /// Every frame that parses is forwarded raw to the message handler exactly
    /// once, heartbeats included. Frames that fail to parse are logged and
    /// skipped.
    pub fn route(&self, frame: &str, liveness: &mut Liveness) -> Routed {
        match classify(frame) {
            Ok(FrameKind::Heartbeat) => {
                liveness.record_heartbeat(Instant::now());
                debug!("Heartbeat received");
                self.handlers.invoke_heartbeat();
                self.handlers.invoke_message(frame);
                Routed::Heartbeat
            }
            Ok(FrameKind::Payload) => {
                self.handlers.invoke_message(frame);
                Routed::Payload
            }
            Err(e) => {
                let preview: String = frame.chars().take(LOG_PREVIEW_CHARS).collect();
                warn!(error = %e, frame = %preview, "Error handling message");
                Routed::Malformed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn recording_router() -> (MessageRouter, Arc<Mutex<Vec<String>>>, Arc<AtomicUsize>) {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let heartbeats = Arc::new(AtomicUsize::new(0));

        let f = Arc::clone(&frames);
        let h = Arc::clone(&heartbeats);
        let handlers = Handlers::new(move |frame| f.lock().push(frame.to_string())).on_heartbeat(move || {
            h.fetch_add(1, Ordering::SeqCst);
        });

        (MessageRouter::new(handlers), frames, heartbeats)
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_updates_liveness_and_is_forwarded() {
        let (router, frames, heartbeats) = recording_router();
        let mut liveness = Liveness::new(Instant::now());
        let opened = liveness.last_heartbeat_at();

        tokio::time::advance(Duration::from_secs(3)).await;
        let routed = router.route(r#"{"type":"heartbeat","timestampms":1}"#, &mut liveness);

        assert_eq!(routed, Routed::Heartbeat);
        assert_eq!(liveness.last_heartbeat_at() - opened, Duration::from_secs(3));
        assert_eq!(heartbeats.load(Ordering::SeqCst), 1);
        assert_eq!(*frames.lock(), vec![r#"{"type":"heartbeat","timestampms":1}"#]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_payload_does_not_touch_liveness() {
        let (router, frames, heartbeats) = recording_router();
        let mut liveness = Liveness::new(Instant::now());
        let opened = liveness.last_heartbeat_at();

        tokio::time::advance(Duration::from_secs(3)).await;
        let routed = router.route(r#"{"type":"candles_1m_updates","symbol":"BTCUSD"}"#, &mut liveness);

        assert_eq!(routed, Routed::Payload);
        assert_eq!(liveness.last_heartbeat_at(), opened);
        assert_eq!(heartbeats.load(Ordering::SeqCst), 0);
        assert_eq!(frames.lock().len(), 1);
    }

    #[test]
    fn test_malformed_frame_is_skipped() {
        let (router, frames, _) = recording_router();
        let mut liveness = Liveness::new(Instant::now());

        assert_eq!(router.route("not json", &mut liveness), Routed::Malformed);
        assert_eq!(router.route(r#"{"type":"update"}"#, &mut liveness), Routed::Payload);
        assert_eq!(*frames.lock(), vec![r#"{"type":"update"}"#]);
    }

    #[test]
    fn test_frames_forwarded_in_order() {
        let (router, frames, _) = recording_router();
        let mut liveness = Liveness::new(Instant::now());

        let input = [r#"{"n":1}"#, r#"{"type":"heartbeat"}"#, r#"[2]"#, r#"{"n":3}"#];
        for frame in input {
            router.route(frame, &mut liveness);
        }
        assert_eq!(*frames.lock(), input);
    }

    #[test]
    fn test_staleness_is_strict() {
        let start = Instant::now();
        let liveness = Liveness::new(start);
        let threshold = Duration::from_secs(6);

        assert!(!liveness.is_stale(start + Duration::from_secs(6), threshold));
        assert!(liveness.is_stale(start + Duration::from_millis(6001), threshold));
    }
}
