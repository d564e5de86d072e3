//! Inbound frame classification

use serde_json::Value;

/// Value of the `type` discriminant on heartbeat frames
pub const HEARTBEAT_TYPE: &str = "heartbeat";

/// Coarse classification of an inbound frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Server liveness frame
    Heartbeat,
    /// Anything else (market data, order events, acks)
    Payload,
}

impl FrameKind {
    /// Classify an already-parsed JSON value
    pub fn of(value: &Value) -> Self {
        match value.get("type").and_then(Value::as_str) {
            Some(HEARTBEAT_TYPE) => Self::Heartbeat,
            _ => Self::Payload,
        }
    }

    /// Returns true for heartbeat frames
    pub fn is_heartbeat(&self) -> bool {
        matches!(self, Self::Heartbeat)
    }
}

/// Parse a raw text frame and classify it
///
/// Only invalid JSON is an error; any well-formed JSON value without
/// `"type": "heartbeat"` is a payload.
pub fn classify(frame: &str) -> Result<FrameKind, serde_json::Error> {
    let value: Value = serde_json::from_str(frame)?;
    Ok(FrameKind::of(&value))
}
