//! Subscription replay on every connection open

use gemini_types::Subscriptions;
use tracing::{debug, warn};

use crate::transport::Transport;

/// The desired subscription set, serialized once at construction
///
/// The server forgets subscriptions when a connection drops, so the same
/// frames go out, in the same order, after every successful open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionReplay {
    frames: Vec<String>,
}

impl SubscriptionReplay {
    /// Serialize zero, one or many subscriptions
    pub fn new(subscriptions: impl Into<Subscriptions>) -> Result<Self, serde_json::Error> {
        let frames = subscriptions
            .into()
            .into_vec()
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { frames })
    }

    /// Serialized frames in send order
    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    /// Number of frames
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Check if there is nothing to replay
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Send every frame over `transport`
    ///
    /// Fire-and-forget: a failed send is logged and the rest still go out.
    /// Returns how many frames were sent.
    pub async fn replay<T: Transport + ?Sized>(&self, transport: &mut T) -> usize {
        let mut sent = 0;
        for frame in &self.frames {
            match transport.send(frame).await {
                Ok(()) => {
                    debug!(frame = %frame, "Subscription sent");
                    sent += 1;
                }
                Err(e) => warn!(error = %e, "Failed to send subscription"),
            }
        }
        sent
    }
}
