//! Request executor tests against a one-shot local HTTP server

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use gemini_auth::Credentials;
use gemini_rest::{ClientConfig, GeminiRestClient, NewOrderRequest, OrderSide, UNREACHABLE_STATUS};
use gemini_types::{ErrorReason, Mode};
use rust_decimal_macros::dec;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Request line and lowercase headers as seen by the server
struct Captured {
    request_line: String,
    headers: Vec<(String, String)>,
}

impl Captured {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Answer exactly one request with `status` and `body`
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();

        let mut raw = Vec::new();
        let mut buf = [0u8; 1024];
        while !raw.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
        }

        let head = String::from_utf8_lossy(&raw).to_string();
        let mut lines = head.split("\r\n");
        let request_line = lines.next().unwrap_or_default().to_string();
        let headers = lines
            .take_while(|l| !l.is_empty())
            .filter_map(|l| l.split_once(':'))
            .map(|(n, v)| (n.trim().to_ascii_lowercase(), v.trim().to_string()))
            .collect();

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();

        Captured {
            request_line,
            headers,
        }
    });

    (base_url, handle)
}

fn client(base_url: &str) -> GeminiRestClient {
    let creds = Credentials::new("test-api-key", "test-api-secret").unwrap();
    GeminiRestClient::with_config(creds, ClientConfig::new(Mode::Sandbox).with_base_url(base_url)).unwrap()
}

#[tokio::test]
async fn test_public_call_is_unsigned() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"{"symbol":"BTCUSD","open":"9121.76","high":"9440.66","low":"9106.51","close":"9347.66","changes":[],"bid":"9345.70","ask":"9347.67"}"#,
    )
    .await;

    let ticker = client(&base_url).get_ticker("BTCUSD").await.unwrap();
    assert_eq!(ticker.bid, dec!(9345.70));

    let captured = server.await.unwrap();
    assert_eq!(captured.request_line, "GET /v2/ticker/BTCUSD HTTP/1.1");
    assert!(captured.header("x-gemini-apikey").is_none());
    assert!(captured.header("x-gemini-signature").is_none());
}

#[tokio::test]
async fn test_signed_call_carries_payload() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"[{"type":"exchange","currency":"BTC","amount":"1.5","available":"1.0"}]"#,
    )
    .await;

    let balances = client(&base_url).get_balances().await.unwrap();
    assert_eq!(balances[0].amount, dec!(1.5));

    let captured = server.await.unwrap();
    assert_eq!(captured.request_line, "POST /v1/balances HTTP/1.1");
    assert_eq!(captured.header("x-gemini-apikey"), Some("test-api-key"));
    assert_eq!(captured.header("content-type"), Some("text/plain"));
    assert_eq!(captured.header("content-length"), Some("0"));
    assert_eq!(captured.header("cache-control"), Some("no-cache"));
    assert_eq!(captured.header("x-gemini-signature").map(str::len), Some(96));

    let payload = BASE64.decode(captured.header("x-gemini-payload").unwrap()).unwrap();
    let payload: Value = serde_json::from_slice(&payload).unwrap();
    assert_eq!(payload["request"], "/v1/balances");
    assert!(payload["nonce"].is_u64());
}

#[tokio::test]
async fn test_order_fields_merged_into_payload() {
    let (base_url, server) = serve_once(
        "400 Bad Request",
        r#"{"result":"error","reason":"InsufficientFunds","message":"Failed to place buy order on symbol 'BTCUSD' for price $3,633.00 and quantity 5 BTC due to insufficient funds"}"#,
    )
    .await;

    let order = NewOrderRequest::limit("btcusd", OrderSide::Buy, dec!(5), dec!(3633.00));
    let err = client(&base_url).new_order(&order).await.unwrap_err();

    assert_eq!(err.status, 400);
    assert_eq!(err.reason(), ErrorReason::InsufficientFunds);
    assert!(err.message().contains("insufficient funds"));
    assert!(!err.is_unreachable());

    let captured = server.await.unwrap();
    let payload = BASE64.decode(captured.header("x-gemini-payload").unwrap()).unwrap();
    let payload: Value = serde_json::from_slice(&payload).unwrap();
    assert_eq!(payload["request"], "/v1/order/new");
    assert_eq!(payload["symbol"], "btcusd");
    assert_eq!(payload["amount"], "5");
    assert_eq!(payload["price"], "3633.00");
    assert_eq!(payload["type"], "exchange limit");
}

#[tokio::test]
async fn test_non_json_error_keeps_status() {
    let (base_url, server) = serve_once("503 Service Unavailable", "upstream unavailable").await;

    let err = client(&base_url).get_symbol_details("btcusd").await.unwrap_err();
    assert_eq!(err.status, 503);
    assert_eq!(err.reason(), ErrorReason::Unknown);
    assert_eq!(err.message(), "upstream unavailable");

    server.await.unwrap();
}

#[tokio::test]
async fn test_undecodable_success_is_system_error() {
    let (base_url, server) = serve_once("200 OK", r#"{"unexpected":true}"#).await;

    let err = client(&base_url).get_ticker("BTCUSD").await.unwrap_err();
    assert_eq!(err.status, UNREACHABLE_STATUS);
    assert_eq!(err.reason(), ErrorReason::System);
    assert!(!err.is_unreachable());

    server.await.unwrap();
}

#[tokio::test]
async fn test_unreachable_host() {
    // Bind then drop to get a port with nothing listening
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{}", addr)).get_balances().await.unwrap_err();
    assert_eq!(err.status, UNREACHABLE_STATUS);
    assert_eq!(err.reason(), ErrorReason::System);
    assert_eq!(err.message(), "Failed to make request to Gemini API");
    assert!(err.body.original_error.is_some());
    assert!(err.is_unreachable());
}
