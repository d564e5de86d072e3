//! Top-level client tying REST and streaming together

use gemini_auth::Credentials;
use gemini_rest::{ClientConfig, GeminiRestClient};
use gemini_types::{Mode, ParseModeError};
use gemini_ws::SocketBuilder;
use tracing::info;

use crate::error::SdkResult;

/// Environment variable selecting sandbox or live
pub const MODE_ENV_VAR: &str = "GEMINI_MODE";

/// Gemini client
///
/// Owns one credential set and one mode. The REST client and every socket
/// built from it sign with the same credentials, so nonces stay strictly
/// increasing across both.
///
/// # Example
///
/// ```no_run
/// use gemini_sdk::prelude::*;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let gemini = Gemini::from_env()?;
///
///     let ticker = gemini.api().get_ticker("BTCUSD").await?;
///     println!("BTCUSD bid {} ask {}", ticker.bid, ticker.ask);
///
///     let socket = gemini
///         .socket(ORDER_EVENTS_PATH)
///         .on_close(|| eprintln!("order events stream closed"))
///         .connect(|frame| println!("{}", frame))?;
///
///     tokio::signal::ctrl_c().await?;
///     socket.close().await;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Gemini {
    credentials: Credentials,
    mode: Mode,
    api: GeminiRestClient,
}

impl Gemini {
    /// Create a client for `mode`
    pub fn new(credentials: Credentials, mode: Mode) -> SdkResult<Self> {
        Self::with_config(credentials, ClientConfig::new(mode))
    }

    /// Create a client with custom REST settings
    ///
    /// Sockets follow `config.mode`; a REST base URL override does not
    /// apply to them.
    pub fn with_config(credentials: Credentials, config: ClientConfig) -> SdkResult<Self> {
        let mode = config.mode;
        let api = GeminiRestClient::with_config(credentials.clone(), config)?;
        info!(mode = %mode, base_url = api.base_url(), "Gemini client ready");
        Ok(Self {
            credentials,
            mode,
            api,
        })
    }

    /// Create a client from the environment
    ///
    /// Reads `GEMINI_API_KEY`, `GEMINI_API_SECRET` and the optional
    /// `GEMINI_MODE` (sandbox when unset).
    pub fn from_env() -> SdkResult<Self> {
        let credentials = Credentials::from_env()?;
        let mode = parse_mode(std::env::var(MODE_ENV_VAR).ok().as_deref())?;
        Self::new(credentials, mode)
    }

    /// REST API client
    pub fn api(&self) -> &GeminiRestClient {
        &self.api
    }

    /// Start building a stream for `path`, e.g. `/v1/order/events`
    ///
    /// The builder inherits this client's credentials and mode.
    pub fn socket(&self, path: impl Into<String>) -> SocketBuilder {
        SocketBuilder::new(self.credentials.clone(), path).mode(self.mode)
    }

    /// Selected environment
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Shared credentials
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }
}

fn parse_mode(value: Option<&str>) -> Result<Mode, ParseModeError> {
    match value {
        Some(v) if !v.trim().is_empty() => v.parse(),
        _ => Ok(Mode::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gemini_ws::{MARKET_DATA_PATH, ORDER_EVENTS_PATH};

    fn gemini(mode: Mode) -> Gemini {
        let creds = Credentials::new("test-api-key", "test-api-secret").unwrap();
        Gemini::new(creds, mode).unwrap()
    }

    #[test]
    fn test_mode_selects_urls() {
        let live = gemini(Mode::Live);
        assert_eq!(live.api().base_url(), "https://api.gemini.com");
        assert_eq!(
            live.socket(ORDER_EVENTS_PATH).config().target.url(),
            "wss://api.gemini.com/v1/order/events"
        );

        let sandbox = gemini(Mode::Sandbox);
        assert_eq!(sandbox.api().base_url(), "https://api.sandbox.gemini.com");
        assert_eq!(
            sandbox
                .socket(format!("{}/BTCUSD", MARKET_DATA_PATH))
                .config()
                .target
                .url(),
            "wss://api.sandbox.gemini.com/v2/marketdata/BTCUSD"
        );
    }

    #[test]
    fn test_rest_and_socket_share_nonces() {
        let client = gemini(Mode::Sandbox);
        let rest_nonce = client.api().credentials().next_nonce();
        let facade_nonce = client.credentials().next_nonce();
        assert!(facade_nonce > rest_nonce);

        let cloned = client.clone();
        assert!(cloned.credentials().next_nonce() > facade_nonce);
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!(parse_mode(None).unwrap(), Mode::Sandbox);
        assert_eq!(parse_mode(Some("")).unwrap(), Mode::Sandbox);
        assert_eq!(parse_mode(Some("LIVE")).unwrap(), Mode::Live);
        assert!(parse_mode(Some("staging")).is_err());
    }

    #[test]
    fn test_debug_hides_secret() {
        let debug = format!("{:?}", gemini(Mode::Live));
        assert!(!debug.contains("test-api-secret"));
    }
}
