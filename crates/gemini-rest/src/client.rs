//! Main REST client implementation

use gemini_auth::{extra_fields, Credentials};
use gemini_types::Mode;
use reqwest::header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::{ApiError, RestResult};
use crate::types::{Balance, NewOrderRequest, NewOrderResponse, SymbolDetailsResponse, TickerResponse};

/// Default request timeout
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Gemini REST API client
///
/// # Example
///
/// ```no_run
/// use gemini_auth::Credentials;
/// use gemini_rest::GeminiRestClient;
/// use gemini_types::Mode;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let creds = Credentials::from_env()?;
///     let client = GeminiRestClient::new(creds, Mode::Sandbox)?;
///
///     let ticker = client.get_ticker("BTCUSD").await?;
///     println!("BTC/USD: {} / {}", ticker.bid, ticker.ask);
///
///     let balances = client.get_balances().await?;
///     println!("Balances: {:?}", balances);
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct GeminiRestClient {
    http_client: Client,
    credentials: Credentials,
    base_url: String,
}

impl GeminiRestClient {
    /// Create a client for the given mode with default settings
    pub fn new(credentials: Credentials, mode: Mode) -> RestResult<Self> {
        Self::with_config(credentials, ClientConfig::new(mode))
    }

    /// Create a client with custom configuration
    pub fn with_config(credentials: Credentials, config: ClientConfig) -> RestResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_deref().unwrap_or(concat!(
                "gemini-rest/",
                env!("CARGO_PKG_VERSION")
            )))
            .build()
            .map_err(|e| ApiError::system(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = config.base_url().trim_end_matches('/').to_string();
        info!("Created Gemini REST client for {}", base_url);

        Ok(Self {
            http_client,
            credentials,
            base_url,
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Credentials used for signed requests
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Send one request to `{base_url}{endpoint}`
    ///
    /// With `auth`, the signed header triple is attached and `extra` is merged
    /// into the signed payload; the body itself stays empty. Public calls
    /// carry no auth headers and ignore `extra`.
    #[instrument(skip(self, extra))]
    pub async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        extra: &Map<String, Value>,
        auth: bool,
    ) -> RestResult<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut request = self.http_client.request(method, &url);

        if auth {
            let headers = self
                .credentials
                .signed_headers(endpoint, extra)
                .map_err(|e| ApiError::system(format!("Failed to sign request: {}", e)))?;

            request = request
                .header(CONTENT_TYPE, "text/plain")
                .header(CONTENT_LENGTH, "0")
                .header(CACHE_CONTROL, "no-cache");
            for (name, value) in headers.iter() {
                request = request.header(name, value);
            }
        }

        debug!("Sending request to {}", url);
        let response = request.send().await.map_err(ApiError::unreachable)?;
        let status = response.status();
        let text = response.text().await.map_err(ApiError::unreachable)?;

        if !status.is_success() {
            let error = ApiError::from_response(status.as_u16(), &text);
            warn!(status = status.as_u16(), reason = %error.reason(), "Request rejected");
            return Err(error);
        }

        serde_json::from_str(&text)
            .map_err(|e| ApiError::system(format!("Failed to parse response from {}: {}", endpoint, e)))
    }

    // ========================================================================
    // Public Market Endpoints
    // ========================================================================

    /// Get ticker information for a trading pair
    ///
    /// # Arguments
    /// * `symbol` - Trading pair (e.g., "BTCUSD")
    pub async fn get_ticker(&self, symbol: &str) -> RestResult<TickerResponse> {
        self.execute(Method::GET, &format!("/v2/ticker/{}", symbol), &Map::new(), false)
            .await
    }

    /// Get trading rules for a symbol
    pub async fn get_symbol_details(&self, symbol: &str) -> RestResult<SymbolDetailsResponse> {
        self.execute(
            Method::GET,
            &format!("/v1/symbols/details/{}", symbol),
            &Map::new(),
            false,
        )
        .await
    }

    // ========================================================================
    // Private Trading Endpoints
    // ========================================================================

    /// Place a new order
    pub async fn new_order(&self, order: &NewOrderRequest) -> RestResult<NewOrderResponse> {
        let extra = extra_fields(order).map_err(|e| ApiError::system(e.to_string()))?;
        self.execute(Method::POST, "/v1/order/new", &extra, true).await
    }

    // ========================================================================
    // Private Account Endpoints
    // ========================================================================

    /// Get balances for every currency
    pub async fn get_balances(&self) -> RestResult<Vec<Balance>> {
        self.execute(Method::POST, "/v1/balances", &Map::new(), true).await
    }
}

impl std::fmt::Debug for GeminiRestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiRestClient")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .finish()
    }
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Sandbox or live
    pub mode: Mode,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Custom user agent
    pub user_agent: Option<String>,
    /// Base URL override (takes precedence over `mode`)
    pub base_url: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(Mode::default())
    }
}

impl ClientConfig {
    /// Create a new configuration for `mode`
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: None,
            base_url: None,
        }
    }

    /// Set timeout
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Send requests to an explicit base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Effective base URL
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(self.mode.api_base_url())
    }
}
