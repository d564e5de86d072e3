//! Environment selection (sandbox vs. live)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Production REST base URL
pub const LIVE_API_BASE_URL: &str = "https://api.gemini.com";
/// Sandbox REST base URL
pub const SANDBOX_API_BASE_URL: &str = "https://api.sandbox.gemini.com";
/// Production WebSocket base URL
pub const LIVE_WS_BASE_URL: &str = "wss://api.gemini.com";
/// Sandbox WebSocket base URL
pub const SANDBOX_WS_BASE_URL: &str = "wss://api.sandbox.gemini.com";

/// Which Gemini environment to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Sandbox environment (default)
    #[default]
    Sandbox,
    /// Production environment
    Live,
}

impl Mode {
    /// REST base URL for this mode
    pub fn api_base_url(&self) -> &'static str {
        match self {
            Self::Sandbox => SANDBOX_API_BASE_URL,
            Self::Live => LIVE_API_BASE_URL,
        }
    }

    /// WebSocket base URL for this mode
    pub fn ws_base_url(&self) -> &'static str {
        match self {
            Self::Sandbox => SANDBOX_WS_BASE_URL,
            Self::Live => LIVE_WS_BASE_URL,
        }
    }

    /// Returns the mode name as used in configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sandbox => "sandbox",
            Self::Live => "live",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown mode string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mode: {0} (expected \"sandbox\" or \"live\")")]
pub struct ParseModeError(pub String);

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Self::Sandbox),
            "live" | "production" => Ok(Self::Live),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_sandbox() {
        assert_eq!(Mode::default(), Mode::Sandbox);
    }

    #[test]
    fn test_urls() {
        assert_eq!(Mode::Live.ws_base_url(), "wss://api.gemini.com");
        assert_eq!(Mode::Sandbox.ws_base_url(), "wss://api.sandbox.gemini.com");
        assert_eq!(Mode::Live.api_base_url(), "https://api.gemini.com");
        assert_eq!(Mode::Sandbox.api_base_url(), "https://api.sandbox.gemini.com");
    }

    #[test]
    fn test_parse() {
        assert_eq!("live".parse::<Mode>().unwrap(), Mode::Live);
        assert_eq!(" Sandbox ".parse::<Mode>().unwrap(), Mode::Sandbox);
        assert!("staging".parse::<Mode>().is_err());
    }
}
