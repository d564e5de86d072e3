//! Payload construction and HMAC-SHA384 signing
//!
//! Gemini signature algorithm:
//! 1. Build the JSON payload `{request, nonce, ...extra}`
//! 2. Base64 encode the serialized payload
//! 3. HMAC-SHA384(secret, base64_payload), hex encoded

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::Sha384;

use crate::error::{AuthError, AuthResult};

type HmacSha384 = Hmac<Sha384>;

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "X-GEMINI-APIKEY";
/// Header carrying the base64 payload
pub const PAYLOAD_HEADER: &str = "X-GEMINI-PAYLOAD";
/// Header carrying the hex signature
pub const SIGNATURE_HEADER: &str = "X-GEMINI-SIGNATURE";

/// Encoded payload and its signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPayload {
    /// Base64 of the JSON payload
    pub encoded: String,
    /// Hex HMAC-SHA384 of `encoded`
    pub signature: String,
}

/// Convert request-specific fields into a JSON object for merging
///
/// Anything that serializes to `null` counts as "no extra fields".
pub fn extra_fields<P: Serialize + ?Sized>(fields: &P) -> AuthResult<Map<String, Value>> {
    match serde_json::to_value(fields)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(AuthError::InvalidPayload(format!(
            "extra fields must be a JSON object, got {}",
            other
        ))),
    }
}

/// Build the payload object
///
/// `request` and `nonce` always win over same-named extra fields.
pub fn build_payload(endpoint: &str, nonce: u64, extra: &Map<String, Value>) -> Map<String, Value> {
    let mut payload = extra.clone();
    payload.insert("request".to_string(), Value::from(endpoint));
    payload.insert("nonce".to_string(), Value::from(nonce));
    payload
}

/// Sign a request payload
///
/// Pure and deterministic: the same endpoint, secret, nonce and extra fields
/// always produce the same output.
///
/// ```
/// use gemini_auth::sign;
///
/// let signed = sign("/v1/order/events", b"test-api-secret", 1_700_000_000_000, &Default::default()).unwrap();
/// assert_eq!(signed.encoded, "eyJub25jZSI6MTcwMDAwMDAwMDAwMCwicmVxdWVzdCI6Ii92MS9vcmRlci9ldmVudHMifQ==");
/// assert_eq!(signed.signature.len(), 96);
/// ```
pub fn sign(
    endpoint: &str,
    secret: &[u8],
    nonce: u64,
    extra: &Map<String, Value>,
) -> AuthResult<SignedPayload> {
    let payload = build_payload(endpoint, nonce, extra);
    let json = serde_json::to_vec(&payload)?;
    let encoded = BASE64.encode(json);

    let mut mac = HmacSha384::new_from_slice(secret)
        .map_err(|e| AuthError::InvalidCredentials(format!("Invalid HMAC key: {}", e)))?;
    mac.update(encoded.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    Ok(SignedPayload { encoded, signature })
}

/// The authentication header triple for one request or handshake
///
/// Never reuse across attempts: each instance carries its own nonce.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    api_key: String,
    payload: String,
    signature: String,
    nonce: u64,
}

impl SignedHeaders {
    /// Assemble headers from an API key and a signed payload
    pub fn new(api_key: impl Into<String>, signed: SignedPayload, nonce: u64) -> Self {
        Self {
            api_key: api_key.into(),
            payload: signed.encoded,
            signature: signed.signature,
            nonce,
        }
    }

    /// `X-GEMINI-APIKEY` value
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// `X-GEMINI-PAYLOAD` value
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// `X-GEMINI-SIGNATURE` value
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Nonce embedded in the payload
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Header name/value pairs, in wire order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            (API_KEY_HEADER, self.api_key.as_str()),
            (PAYLOAD_HEADER, self.payload.as_str()),
            (SIGNATURE_HEADER, self.signature.as_str()),
        ]
        .into_iter()
    }
}

impl std::fmt::Debug for SignedHeaders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedHeaders")
            .field(
                "api_key",
                &format!("{}...", self.api_key.chars().take(8).collect::<String>()),
            )
            .field("nonce", &self.nonce)
            .field("signature", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &[u8] = b"test-api-secret";

    #[test]
    fn test_known_vector() {
        let signed = sign("/v1/order/events", SECRET, 1_700_000_000_000, &Map::new()).unwrap();
        assert_eq!(
            signed.encoded,
            "eyJub25jZSI6MTcwMDAwMDAwMDAwMCwicmVxdWVzdCI6Ii92MS9vcmRlci9ldmVudHMifQ=="
        );
        assert_eq!(
            signed.signature,
            "9217effdfa8cce5cf35d2be7dd294cf33771e72262affe179bd0473ca29fd59c90a9e0e6b6f4979f465e04cb717aebfd"
        );
    }

    #[test]
    fn test_signing_is_deterministic() {
        let extra = extra_fields(&json!({"symbol": "btcusd"})).unwrap();
        let a = sign("/v1/order/new", SECRET, 42, &extra).unwrap();
        let b = sign("/v1/order/new", SECRET, 42, &extra).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_any_field_changes_signature() {
        let base = sign("/v1/order/new", SECRET, 42, &Map::new()).unwrap();

        let other_endpoint = sign("/v1/balances", SECRET, 42, &Map::new()).unwrap();
        let other_nonce = sign("/v1/order/new", SECRET, 43, &Map::new()).unwrap();
        let extra = extra_fields(&json!({"amount": "1"})).unwrap();
        let other_extra = sign("/v1/order/new", SECRET, 42, &extra).unwrap();
        let other_secret = sign("/v1/order/new", b"another-secret", 42, &Map::new()).unwrap();

        for changed in [other_endpoint, other_nonce, other_extra] {
            assert_ne!(changed.encoded, base.encoded);
            assert_ne!(changed.signature, base.signature);
        }
        assert_eq!(other_secret.encoded, base.encoded);
        assert_ne!(other_secret.signature, base.signature);
    }

    #[test]
    fn test_extra_fields_merged() {
        let extra = extra_fields(&json!({"symbol": "btcusd", "amount": "1"})).unwrap();
        let signed = sign("/v1/order/new", SECRET, 1_700_000_000_001, &extra).unwrap();
        assert_eq!(
            signed.encoded,
            "eyJhbW91bnQiOiIxIiwibm9uY2UiOjE3MDAwMDAwMDAwMDEsInJlcXVlc3QiOiIvdjEvb3JkZXIvbmV3Iiwic3ltYm9sIjoiYnRjdXNkIn0="
        );
    }

    #[test]
    fn test_request_and_nonce_not_overridable() {
        let extra = extra_fields(&json!({"request": "/evil", "nonce": 1})).unwrap();
        let payload = build_payload("/v1/balances", 99, &extra);
        assert_eq!(payload["request"], "/v1/balances");
        assert_eq!(payload["nonce"], 99);
    }

    #[test]
    fn test_extra_fields_must_be_object() {
        assert!(extra_fields(&()).unwrap().is_empty());
        assert!(matches!(
            extra_fields(&vec![1, 2, 3]),
            Err(AuthError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_headers_debug_redacts_signature() {
        let signed = sign("/v1/order/events", SECRET, 1, &Map::new()).unwrap();
        let signature = signed.signature.clone();
        let headers = SignedHeaders::new("account-abcdefghijkl", signed, 1);
        let debug = format!("{:?}", headers);
        assert!(!debug.contains(&signature));
        assert!(debug.contains("[REDACTED]"));

        let names: Vec<_> = headers.iter().map(|(name, _)| name).collect();
        assert_eq!(names, [API_KEY_HEADER, PAYLOAD_HEADER, SIGNATURE_HEADER]);
    }
}
