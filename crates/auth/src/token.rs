//! Self-contained HS256 identity tokens.
//!
//! Wire format: `base64url(header).base64url(payload).base64url(signature)`,
//! unpadded, where the signature is HMAC-SHA256 over the first two segments
//! joined by `.`. Verification needs nothing but the shared secret.

use std::sync::Arc;
use std::time::Duration;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use staffdesk_core::{Clock, SystemClock};

use crate::claims::{Claims, EXPIRES_AT, ISSUED_AT};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";

/// An encoded, signed token.
///
/// Only this module builds or takes apart the segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl core::fmt::Display for Token {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("no token presented")]
    Missing,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token signature does not verify")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,
}

impl TokenError {
    /// Short stable label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::Missing => "missing",
            TokenError::Malformed(_) => "malformed",
            TokenError::InvalidSignature => "invalid_signature",
            TokenError::Expired => "expired",
        }
    }

    fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}

/// A verified token's claims plus the service-managed validity window.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedToken {
    pub claims: Claims,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct Header {
    alg: String,
}

/// Issue a token valid for `ttl` from now.
pub fn create(secret: &[u8], ttl: Duration, claims: &Claims) -> Token {
    create_at(secret, ttl, claims, Utc::now())
}

/// Issue a token as if the current instant were `now`.
///
/// Any `iat`/`exp` the caller put into `claims` is overwritten.
pub fn create_at(secret: &[u8], ttl: Duration, claims: &Claims, now: DateTime<Utc>) -> Token {
    let issued_ms = now.timestamp_millis();
    let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
    let expires_ms = issued_ms.saturating_add(ttl_ms);

    let mut payload = claims.clone().into_map();
    payload.insert(ISSUED_AT.to_string(), numeric_date(issued_ms));
    payload.insert(EXPIRES_AT.to_string(), numeric_date(expires_ms));

    let header = json!({ "alg": ALGORITHM, "typ": "JWT" });
    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(Value::Object(payload).to_string())
    );
    let signature = URL_SAFE_NO_PAD.encode(sign(secret, signing_input.as_bytes()));

    Token(format!("{signing_input}.{signature}"))
}

/// Verify `token` against `secret` and the current time.
pub fn verify(secret: &[u8], token: &str) -> Result<Claims, TokenError> {
    verify_at(secret, token, Utc::now())
}

/// Verify `token` as if the current instant were `now`.
pub fn verify_at(secret: &[u8], token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
    decode_at(secret, token, now).map(|verified| verified.claims)
}

/// Like [`verify_at`], but also hands back `iat`/`exp`.
pub fn decode_at(
    secret: &[u8],
    token: &str,
    now: DateTime<Utc>,
) -> Result<VerifiedToken, TokenError> {
    let mut segments = token.split('.');
    let (header_b64, payload_b64, signature_b64) =
        match (segments.next(), segments.next(), segments.next(), segments.next()) {
            (Some(h), Some(p), Some(s), None) => (h, p, s),
            _ => return Err(TokenError::malformed("expected three segments")),
        };

    let header_bytes = URL_SAFE_NO_PAD
        .decode(header_b64)
        .map_err(|e| TokenError::malformed(format!("header encoding: {e}")))?;
    let header: Header = serde_json::from_slice(&header_bytes)
        .map_err(|e| TokenError::malformed(format!("header json: {e}")))?;
    if header.alg != ALGORITHM {
        return Err(TokenError::malformed(format!(
            "unsupported algorithm '{}'",
            header.alg
        )));
    }

    let provided = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|e| TokenError::malformed(format!("signature encoding: {e}")))?;

    // Signed bytes are exactly what was received, not a re-encoding.
    let signed_len = header_b64.len() + 1 + payload_b64.len();
    let expected = sign(secret, &token.as_bytes()[..signed_len]);
    if provided.ct_eq(expected.as_slice()).unwrap_u8() != 1 {
        return Err(TokenError::InvalidSignature);
    }

    let payload_bytes = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|e| TokenError::malformed(format!("payload encoding: {e}")))?;
    let payload: Map<String, Value> = serde_json::from_slice(&payload_bytes)
        .map_err(|e| TokenError::malformed(format!("payload json: {e}")))?;

    let issued_at = read_numeric_date(&payload, ISSUED_AT)?;
    let expires_at = read_numeric_date(&payload, EXPIRES_AT)?;

    if now >= expires_at {
        return Err(TokenError::Expired);
    }

    Ok(VerifiedToken {
        claims: Claims::from(payload),
        issued_at,
        expires_at,
    })
}

fn sign(secret: &[u8], input: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(input);
    mac.finalize().into_bytes().to_vec()
}

/// Seconds since epoch with the millisecond part kept as a fraction.
fn numeric_date(millis: i64) -> Value {
    if millis % 1000 == 0 {
        Value::from(millis / 1000)
    } else {
        Value::from(millis as f64 / 1000.0)
    }
}

fn read_numeric_date(payload: &Map<String, Value>, key: &str) -> Result<DateTime<Utc>, TokenError> {
    let secs = payload
        .get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| TokenError::malformed(format!("missing or non-numeric '{key}'")))?;
    let millis = (secs * 1000.0).round();
    if !millis.is_finite() {
        return Err(TokenError::malformed(format!("'{key}' out of range")));
    }
    DateTime::<Utc>::from_timestamp_millis(millis as i64)
        .ok_or_else(|| TokenError::malformed(format!("'{key}' out of range")))
}

/// Token issuance and verification bound to one secret, ttl and clock.
#[derive(Clone)]
pub struct TokenService {
    secret: Arc<[u8]>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(secret: impl AsRef<[u8]>, ttl: Duration) -> Self {
        Self::with_clock(secret, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(secret: impl AsRef<[u8]>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret: Arc::from(secret.as_ref()),
            ttl,
            clock,
        }
    }

    pub fn issue(&self, claims: &Claims) -> Token {
        create_at(&self.secret, self.ttl, claims, self.clock.now())
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        verify_at(&self.secret, token, self.clock.now())
    }

    pub fn decode(&self, token: &str) -> Result<VerifiedToken, TokenError> {
        decode_at(&self.secret, token, self.clock.now())
    }
}

impl core::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenService")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}
