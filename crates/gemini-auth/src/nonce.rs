//! Wall-clock nonce source

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Strictly increasing nonces derived from the wall clock, in milliseconds
///
/// The exchange rejects any nonce that is not greater than the last one it
/// saw for the key, so the source never goes backwards even if the clock
/// does, and two calls within the same millisecond still get distinct values.
#[derive(Debug, Default)]
pub struct NonceSource {
    last: AtomicU64,
}

impl NonceSource {
    /// Create a new source
    pub fn new() -> Self {
        Self::default()
    }

    /// Milliseconds since the Unix epoch (0 if the clock is before the epoch)
    pub fn now_millis() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    }

    /// Next nonce: `max(now_ms, last + 1)`
    pub fn next(&self) -> u64 {
        self.next_at(Self::now_millis())
    }

    fn next_at(&self, now: u64) -> u64 {
        let prev = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|last| last);
        now.max(prev.saturating_add(1))
    }

    /// Last nonce handed out (0 if none yet)
    pub fn last(&self) -> u64 {
        self.last.load(Ordering::SeqCst)
    }
}
