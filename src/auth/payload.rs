//! Authentication payload extraction.
//!
//! Each [`Scheme`] carries its claim in a different place:
//!
//! | Scheme         | Location     | Fields                                               |
//! |----------------|--------------|------------------------------------------------------|
//! | `BodyHash`     | JSON body    | `TNPPT_HASH`, `TNPPT_TIME`, `TNPPT_TTL`, `TNPPT_LOGIN` |
//! | `HmacHeader`   | headers      | `HMAC_HASH`, `HMAC_TIME`, `HMAC_LOGIN`               |
//! | `ApiKeyHeader` | header       | `API_KEY`                                            |
//!
//! Extraction only reads; it never touches the request it was handed.
//! A field that is absent or empty yields [`PayloadError::NotDetected`],
//! a field that is present but cannot be interpreted yields
//! [`PayloadError::Unparsable`].

use std::fmt;

use axum::http::HeaderMap;
use serde_json::{Map, Value};
use thiserror::Error;

/// JSON field carrying the presented hash (body-hash scheme).
pub const TNPPT_HASH: &str = "TNPPT_HASH";
/// JSON field carrying the declared timestamp in epoch milliseconds.
pub const TNPPT_TIME: &str = "TNPPT_TIME";
/// JSON field reserved for a per-request TTL. Required, never consulted.
pub const TNPPT_TTL: &str = "TNPPT_TTL";
/// JSON field carrying the claimed login.
pub const TNPPT_LOGIN: &str = "TNPPT_LOGIN";

/// Header carrying the presented hash (HMAC-header scheme).
pub const HMAC_HASH: &str = "HMAC_HASH";
/// Header carrying the declared timestamp in epoch milliseconds.
pub const HMAC_TIME: &str = "HMAC_TIME";
/// Header carrying the claimed login.
pub const HMAC_LOGIN: &str = "HMAC_LOGIN";

/// Header carrying the pre-shared key (API-key scheme).
pub const API_KEY: &str = "API_KEY";

const REQUEST_BODY: &str = "request body";

/// Credential-presentation method a gate is configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// Hash, timestamp and login in a JSON body.
    BodyHash,
    /// Hash, timestamp and login in request headers.
    HmacHeader,
    /// A single pre-shared key header; no hash or freshness step.
    ApiKeyHeader,
}

impl Scheme {
    /// Stable label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::BodyHash => "body_hash",
            Scheme::HmacHeader => "hmac_header",
            Scheme::ApiKeyHeader => "api_key_header",
        }
    }

    /// Whether the scheme goes through hash and freshness verification.
    pub fn is_hash_bearing(self) -> bool {
        !matches!(self, Scheme::ApiKeyHeader)
    }

    /// Whether extraction needs the request body.
    pub fn reads_body(self) -> bool {
        matches!(self, Scheme::BodyHash)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a payload could not be extracted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PayloadError {
    #[error("no payload detected: {0} is missing")]
    NotDetected(&'static str),

    #[error("payload unparsable: {field} {reason}")]
    Unparsable { field: &'static str, reason: String },

    #[error("payload too large: request body exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("payload unreadable: {0}")]
    Unreadable(String),
}

/// Read-only view of the parts of a request the extractor looks at.
#[derive(Debug, Clone, Copy)]
pub struct RawRequest<'a> {
    pub headers: &'a HeaderMap,
    pub body: &'a [u8],
}

impl<'a> RawRequest<'a> {
    pub fn new(headers: &'a HeaderMap, body: &'a [u8]) -> Self {
        Self { headers, body }
    }

    /// View with headers only, for schemes that never read the body.
    pub fn headers_only(headers: &'a HeaderMap) -> Self {
        Self { headers, body: &[] }
    }
}

/// Hash-bearing claim shared by the body-hash and HMAC-header schemes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashClaim {
    pub identity: String,
    pub timestamp_millis: i64,
    pub presented_hash: String,
}

/// Claim presented by the caller, built fresh from untrusted input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthPayload {
    BodyHash {
        claim: HashClaim,
        /// Raw `TNPPT_TTL` value. Kept for the resolver's benefit only.
        ttl_hint: String,
    },
    HmacHeader(HashClaim),
    ApiKey {
        key: String,
    },
}

impl AuthPayload {
    pub fn scheme(&self) -> Scheme {
        match self {
            AuthPayload::BodyHash { .. } => Scheme::BodyHash,
            AuthPayload::HmacHeader(_) => Scheme::HmacHeader,
            AuthPayload::ApiKey { .. } => Scheme::ApiKeyHeader,
        }
    }

    /// The identity the caller asserts. For the API-key scheme this is the key.
    pub fn claimed_identity(&self) -> &str {
        match self {
            AuthPayload::BodyHash { claim, .. } | AuthPayload::HmacHeader(claim) => &claim.identity,
            AuthPayload::ApiKey { key } => key,
        }
    }

    /// The hash claim, if the scheme carries one.
    pub fn hash_claim(&self) -> Option<&HashClaim> {
        match self {
            AuthPayload::BodyHash { claim, .. } | AuthPayload::HmacHeader(claim) => Some(claim),
            AuthPayload::ApiKey { .. } => None,
        }
    }
}

/// Extract the payload for `scheme` from `request`.
///
/// # Errors
///
/// Returns [`PayloadError`] when a required field is missing, empty, or
/// cannot be parsed.
pub fn extract(scheme: Scheme, request: RawRequest<'_>) -> Result<AuthPayload, PayloadError> {
    match scheme {
        Scheme::BodyHash => extract_body_hash(request.body),
        Scheme::HmacHeader => extract_hmac_headers(request.headers),
        Scheme::ApiKeyHeader => Ok(AuthPayload::ApiKey {
            key: required_header(request.headers, API_KEY)?.to_string(),
        }),
    }
}

fn extract_body_hash(body: &[u8]) -> Result<AuthPayload, PayloadError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(PayloadError::NotDetected(REQUEST_BODY));
    }

    let fields: Map<String, Value> =
        serde_json::from_slice(body).map_err(|e| PayloadError::Unparsable {
            field: REQUEST_BODY,
            reason: describe_json_error(&e),
        })?;

    let presented_hash = required_string(&fields, TNPPT_HASH)?;
    let timestamp_millis = required_integer(&fields, TNPPT_TIME)?;
    let ttl_hint = required_string(&fields, TNPPT_TTL)?;
    let identity = required_string(&fields, TNPPT_LOGIN)?;

    Ok(AuthPayload::BodyHash {
        claim: HashClaim {
            identity,
            timestamp_millis,
            presented_hash,
        },
        ttl_hint,
    })
}

fn extract_hmac_headers(headers: &HeaderMap) -> Result<AuthPayload, PayloadError> {
    let identity = required_header(headers, HMAC_LOGIN)?;
    let presented_hash = required_header(headers, HMAC_HASH)?;
    let raw_time = required_header(headers, HMAC_TIME)?;

    let timestamp_millis = raw_time
        .parse::<i64>()
        .map_err(|e| PayloadError::Unparsable {
            field: HMAC_TIME,
            reason: format!("is not an integer millisecond timestamp ({e})"),
        })?;

    Ok(AuthPayload::HmacHeader(HashClaim {
        identity: identity.to_string(),
        timestamp_millis,
        presented_hash: presented_hash.to_string(),
    }))
}

/// Header lookup is case-insensitive, as HTTP requires.
fn required_header<'h>(headers: &'h HeaderMap, name: &'static str) -> Result<&'h str, PayloadError> {
    let value = headers.get(name).ok_or(PayloadError::NotDetected(name))?;
    let value = value.to_str().map_err(|_| PayloadError::Unparsable {
        field: name,
        reason: "contains non-visible ASCII characters".to_string(),
    })?;

    let value = value.trim();
    if value.is_empty() {
        return Err(PayloadError::NotDetected(name));
    }
    Ok(value)
}

fn required_string(fields: &Map<String, Value>, name: &'static str) -> Result<String, PayloadError> {
    match fields.get(name) {
        None | Some(Value::Null) => Err(PayloadError::NotDetected(name)),
        Some(Value::String(s)) if s.trim().is_empty() => Err(PayloadError::NotDetected(name)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(PayloadError::Unparsable {
            field: name,
            reason: "must be a string".to_string(),
        }),
    }
}

fn required_integer(fields: &Map<String, Value>, name: &'static str) -> Result<i64, PayloadError> {
    match fields.get(name) {
        None | Some(Value::Null) => Err(PayloadError::NotDetected(name)),
        Some(value) => value.as_i64().ok_or_else(|| PayloadError::Unparsable {
            field: name,
            reason: "is not an integer millisecond timestamp".to_string(),
        }),
    }
}

/// Keep serde's position information but not its internal type names.
fn describe_json_error(e: &serde_json::Error) -> String {
    if e.is_eof() {
        "ends before the JSON document is complete".to_string()
    } else if e.is_data() {
        "must be a JSON object".to_string()
    } else {
        format!("is not valid JSON (line {}, column {})", e.line(), e.column())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use axum::http::{HeaderName, HeaderValue};
    use serde_json::json;

    use super::*;

    fn hmac_headers(login: &str, hash: &str, time: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in [(HMAC_LOGIN, login), (HMAC_HASH, hash), (HMAC_TIME, time)] {
            headers.insert(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        headers
    }

    fn body_hash(body: &serde_json::Value) -> Result<AuthPayload, PayloadError> {
        let headers = HeaderMap::new();
        let bytes = serde_json::to_vec(body).unwrap();
        extract(Scheme::BodyHash, RawRequest::new(&headers, &bytes))
    }

    #[test]
    fn test_extract_body_hash_complete() {
        let payload = body_hash(&json!({
            "TNPPT_HASH": "abc",
            "TNPPT_TIME": 1600344748887_i64,
            "TNPPT_TTL": "800",
            "TNPPT_LOGIN": "steven",
        }))
        .unwrap();

        assert_eq!(payload.scheme(), Scheme::BodyHash);
        assert_eq!(payload.claimed_identity(), "steven");
        let claim = payload.hash_claim().unwrap();
        assert_eq!(claim.timestamp_millis, 1600344748887);
        assert_eq!(claim.presented_hash, "abc");
    }

    #[test]
    fn test_extract_body_hash_missing_ttl() {
        let err = body_hash(&json!({
            "TNPPT_HASH": "abc",
            "TNPPT_TIME": 1,
            "TNPPT_LOGIN": "steven",
        }))
        .unwrap_err();
        assert_eq!(err, PayloadError::NotDetected(TNPPT_TTL));
    }

    #[test]
    fn test_extract_body_hash_time_as_string_is_unparsable() {
        let err = body_hash(&json!({
            "TNPPT_HASH": "abc",
            "TNPPT_TIME": "1600344748887",
            "TNPPT_TTL": "800",
            "TNPPT_LOGIN": "steven",
        }))
        .unwrap_err();
        assert!(matches!(err, PayloadError::Unparsable { field: TNPPT_TIME, .. }));
    }

    #[test]
    fn test_extract_body_hash_fractional_time_is_unparsable() {
        let err = body_hash(&json!({
            "TNPPT_HASH": "abc",
            "TNPPT_TIME": 12.5,
            "TNPPT_TTL": "800",
            "TNPPT_LOGIN": "steven",
        }))
        .unwrap_err();
        assert!(matches!(err, PayloadError::Unparsable { field: TNPPT_TIME, .. }));
    }

    #[test]
    fn test_extract_body_hash_empty_body() {
        let headers = HeaderMap::new();
        let err = extract(Scheme::BodyHash, RawRequest::new(&headers, b"  \n")).unwrap_err();
        assert_eq!(err, PayloadError::NotDetected(REQUEST_BODY));
    }

    #[test]
    fn test_extract_body_hash_invalid_json() {
        let headers = HeaderMap::new();
        let err = extract(Scheme::BodyHash, RawRequest::new(&headers, b"{\"TNPPT_HASH\":")).unwrap_err();
        assert!(matches!(err, PayloadError::Unparsable { field: REQUEST_BODY, .. }));
    }

    #[test]
    fn test_extract_body_hash_array_body() {
        let headers = HeaderMap::new();
        let err = extract(Scheme::BodyHash, RawRequest::new(&headers, b"[1,2]")).unwrap_err();
        assert!(matches!(err, PayloadError::Unparsable { field: REQUEST_BODY, .. }));
    }

    #[test]
    fn test_extract_hmac_headers() {
        let headers = hmac_headers("steven", "deadbeef", "123456743");
        let payload = extract(Scheme::HmacHeader, RawRequest::headers_only(&headers)).unwrap();

        assert_eq!(
            payload,
            AuthPayload::HmacHeader(HashClaim {
                identity: "steven".to_string(),
                timestamp_millis: 123456743,
                presented_hash: "deadbeef".to_string(),
            })
        );
    }

    #[test]
    fn test_extract_hmac_header_names_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("hmac_login", HeaderValue::from_static("steven"));
        headers.insert("hmac_hash", HeaderValue::from_static("deadbeef"));
        headers.insert("hmac_time", HeaderValue::from_static("1"));

        assert!(extract(Scheme::HmacHeader, RawRequest::headers_only(&headers)).is_ok());
    }

    #[test]
    fn test_extract_hmac_each_missing_header() {
        for missing in [HMAC_LOGIN, HMAC_HASH, HMAC_TIME] {
            let mut headers = hmac_headers("steven", "deadbeef", "1");
            headers.remove(missing);

            let err = extract(Scheme::HmacHeader, RawRequest::headers_only(&headers)).unwrap_err();
            assert_eq!(err, PayloadError::NotDetected(missing), "header {missing}");
        }
    }

    #[test]
    fn test_extract_hmac_empty_header_not_detected() {
        let headers = hmac_headers("steven", "  ", "1");
        let err = extract(Scheme::HmacHeader, RawRequest::headers_only(&headers)).unwrap_err();
        assert_eq!(err, PayloadError::NotDetected(HMAC_HASH));
    }

    #[test]
    fn test_extract_hmac_bad_time_unparsable() {
        let headers = hmac_headers("steven", "deadbeef", "yesterday");
        let err = extract(Scheme::HmacHeader, RawRequest::headers_only(&headers)).unwrap_err();
        assert!(matches!(err, PayloadError::Unparsable { field: HMAC_TIME, .. }));
        assert!(err.to_string().starts_with("payload unparsable"));
    }

    #[test]
    fn test_extract_api_key() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_bytes(API_KEY.as_bytes()).unwrap(),
            HeaderValue::from_static("key-123"),
        );

        let payload = extract(Scheme::ApiKeyHeader, RawRequest::headers_only(&headers)).unwrap();
        assert_eq!(payload.claimed_identity(), "key-123");
        assert!(payload.hash_claim().is_none());
    }

    #[test]
    fn test_extract_api_key_missing() {
        let headers = HeaderMap::new();
        let err = extract(Scheme::ApiKeyHeader, RawRequest::headers_only(&headers)).unwrap_err();
        assert_eq!(err, PayloadError::NotDetected(API_KEY));
        assert_eq!(err.to_string(), "no payload detected: API_KEY is missing");
    }

    #[test]
    fn test_extract_body_whitespace_string_not_detected() {
        let headers = HeaderMap::new();
        let body = json!({
            "TNPPT_HASH": "abc",
            "TNPPT_TIME": 1_600_344_748_887_i64,
            "TNPPT_TTL": "   ",
            "TNPPT_LOGIN": "steven",
        })
        .to_string();

        let err = extract(Scheme::BodyHash, RawRequest::new(&headers, body.as_bytes())).unwrap_err();
        assert_eq!(err, PayloadError::NotDetected(TNPPT_TTL));
    }

    #[test]
    fn test_body_errors_name_the_cause() {
        assert_eq!(
            PayloadError::TooLarge { limit: 8 }.to_string(),
            "payload too large: request body exceeds 8 bytes"
        );
        assert!(PayloadError::Unreadable("connection reset".to_string())
            .to_string()
            .starts_with("payload unreadable"));
    }

    #[test]
    fn test_scheme_flags() {
        assert!(Scheme::BodyHash.is_hash_bearing());
        assert!(Scheme::HmacHeader.is_hash_bearing());
        assert!(!Scheme::ApiKeyHeader.is_hash_bearing());
        assert!(Scheme::BodyHash.reads_body());
        assert!(!Scheme::HmacHeader.reads_body());
    }
}
