//! Outbound subscription frames

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A subscription frame sent after every successful connection
///
/// The descriptor schema differs between feeds (market data uses
/// `{name, symbols}`, order events use `{type, symbolFilter}`), so the
/// descriptors are kept as opaque JSON values and sent verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    /// Frame discriminant, usually `"subscribe"`
    #[serde(rename = "type")]
    pub kind: String,
    /// Ordered filter descriptors
    pub subscriptions: Vec<Value>,
}

impl Subscription {
    /// Create a subscription frame with an arbitrary discriminant
    pub fn new(kind: impl Into<String>, subscriptions: Vec<Value>) -> Self {
        Self {
            kind: kind.into(),
            subscriptions,
        }
    }

    /// Create a `"subscribe"` frame with the given descriptors
    pub fn subscribe(subscriptions: impl IntoIterator<Item = Value>) -> Self {
        Self::new("subscribe", subscriptions.into_iter().collect())
    }

    /// Create a `"subscribe"` frame for a named market data feed
    ///
    /// ```
    /// use gemini_types::Subscription;
    ///
    /// let sub = Subscription::market_data("candles_1m", ["BTCUSD"]);
    /// assert_eq!(
    ///     serde_json::to_string(&sub).unwrap(),
    ///     r#"{"type":"subscribe","subscriptions":[{"name":"candles_1m","symbols":["BTCUSD"]}]}"#
    /// );
    /// ```
    pub fn market_data(
        name: impl Into<String>,
        symbols: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let symbols: Vec<String> = symbols.into_iter().map(Into::into).collect();
        Self::subscribe([serde_json::json!({
            "name": name.into(),
            "symbols": symbols,
        })])
    }

    /// Append another descriptor
    pub fn with_descriptor(mut self, descriptor: Value) -> Self {
        self.subscriptions.push(descriptor);
        self
    }
}

/// Zero, one, or an ordered sequence of subscriptions
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Subscriptions {
    /// Nothing to replay
    #[default]
    None,
    /// A single subscription frame
    One(Subscription),
    /// Several frames, sent in order
    Many(Vec<Subscription>),
}

impl Subscriptions {
    /// Flatten into the ordered list of frames
    pub fn into_vec(self) -> Vec<Subscription> {
        match self {
            Self::None => Vec::new(),
            Self::One(sub) => vec![sub],
            Self::Many(subs) => subs,
        }
    }

    /// Number of frames
    pub fn len(&self) -> usize {
        match self {
            Self::None => 0,
            Self::One(_) => 1,
            Self::Many(subs) => subs.len(),
        }
    }

    /// Whether there is nothing to send
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Subscription> for Subscriptions {
    fn from(sub: Subscription) -> Self {
        Self::One(sub)
    }
}

impl From<Vec<Subscription>> for Subscriptions {
    fn from(subs: Vec<Subscription>) -> Self {
        Self::Many(subs)
    }
}

impl From<Option<Subscription>> for Subscriptions {
    fn from(sub: Option<Subscription>) -> Self {
        sub.map_or(Self::None, Self::One)
    }
}
