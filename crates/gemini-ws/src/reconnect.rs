//! Heartbeat watchdog and reconnection timing

use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Timing for liveness detection and reconnection
///
/// A dead connection is noticed within `watchdog_interval + heartbeat_timeout`
/// of its last heartbeat. Reconnection never gives up: a replacement that
/// cannot be constructed is retried every `retry_delay`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectConfig {
    /// How often the watchdog checks liveness
    pub watchdog_interval: Duration,
    /// Silence longer than this triggers a reconnect
    pub heartbeat_timeout: Duration,
    /// Delay before retrying a failed transport construction
    pub retry_delay: Duration,
    /// Handshake timeout for real transports
    pub connect_timeout: Duration,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            watchdog_interval: Duration::from_secs(6),
            heartbeat_timeout: Duration::from_secs(6),
            retry_delay: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ReconnectConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set watchdog check interval
    pub fn with_watchdog_interval(mut self, interval: Duration) -> Self {
        self.watchdog_interval = interval;
        self
    }

    /// Set heartbeat timeout
    pub fn with_heartbeat_timeout(mut self, timeout: Duration) -> Self {
        self.heartbeat_timeout = timeout;
        self
    }

    /// Set construction retry delay
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Set connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Worst-case time from last heartbeat to reconnect
    pub fn detection_window(&self) -> Duration {
        self.watchdog_interval + self.heartbeat_timeout
    }

    /// Watchdog timer whose first tick is one interval from now
    pub(crate) fn watchdog(&self) -> Interval {
        // interval_at panics on a zero period
        let period = self.watchdog_interval.max(Duration::from_millis(1));
        let mut watchdog = interval_at(Instant::now() + period, period);
        watchdog.set_missed_tick_behavior(MissedTickBehavior::Delay);
        watchdog
    }
}
