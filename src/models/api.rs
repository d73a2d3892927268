use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body written by the gate when it denies a request.
///
/// `code` always equals the HTTP status of the response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenialBody {
    pub code: u16,
    pub message: String,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service health status
    pub status: String,
    /// Service version
    pub version: String,
    /// Seconds since the server started
    pub uptime_secs: u64,
    /// Current timestamp
    pub timestamp: DateTime<Utc>,
}

/// The part of a body-hash login the handler reads after the gate has
/// passed the body through.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(rename = "TNPPT_TIME")]
    pub timestamp_millis: i64,
}

/// Response to a successful body-hash login.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub identity: String,
    /// Timestamp the client declared, as a date
    pub declared_at: Option<DateTime<Utc>>,
    pub authenticated_at: DateTime<Utc>,
}

/// Identity established by the gate for the current request.
#[derive(Debug, Serialize, Deserialize)]
pub struct WhoAmIResponse {
    pub identity: String,
    /// Scheme label, absent when the identity was injected by the test bypass
    pub scheme: Option<String>,
}
