//! Gate outcomes and the denial response.

use std::fmt;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::payload::Scheme;
use crate::models::DenialBody;

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenyReason {
    MalformedPayload,
    UnknownIdentity,
    HashMismatch,
    Expired,
}

impl DenyReason {
    /// 400 for malformed input, 401 for everything credential-related.
    pub fn status(self) -> StatusCode {
        match self {
            DenyReason::MalformedPayload => StatusCode::BAD_REQUEST,
            DenyReason::UnknownIdentity | DenyReason::HashMismatch | DenyReason::Expired => {
                StatusCode::UNAUTHORIZED
            }
        }
    }

    /// Stable label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            DenyReason::MalformedPayload => "malformed_payload",
            DenyReason::UnknownIdentity => "unknown_identity",
            DenyReason::HashMismatch => "hash_mismatch",
            DenyReason::Expired => "expired",
        }
    }

    /// Client-facing message.
    pub fn message(self) -> &'static str {
        match self {
            DenyReason::MalformedPayload => "malformed authentication payload",
            DenyReason::UnknownIdentity => "unknown identity",
            DenyReason::HashMismatch => "incorrect hash",
            DenyReason::Expired => "TTL obsolete",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A denial with an optional diagnostic appended to the message.
///
/// The detail never changes the kind; it only says which field was missing
/// or how stale the request was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denial {
    pub reason: DenyReason,
    pub detail: Option<String>,
}

impl Denial {
    pub fn new(reason: DenyReason) -> Self {
        Self {
            reason,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn message(&self) -> String {
        match &self.detail {
            Some(detail) => format!("{}: {detail}", self.reason.message()),
            None => self.reason.message().to_string(),
        }
    }
}

impl IntoResponse for Denial {
    fn into_response(self) -> Response {
        let status = self.reason.status();
        let body = DenialBody {
            code: status.as_u16(),
            message: self.message(),
        };
        (status, Json(body)).into_response()
    }
}

/// Identity established for a request, inserted into request extensions on
/// allow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    pub identity: String,
    /// `None` when the identity was injected by the test bypass.
    pub scheme: Option<Scheme>,
}

/// Terminal decision for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allow(AuthenticatedIdentity),
    Deny(Denial),
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allow(_))
    }

    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            Verdict::Allow(_) => None,
            Verdict::Deny(denial) => Some(denial.reason),
        }
    }

    /// Label for metrics: `allowed` or the deny reason.
    pub fn outcome(&self) -> &'static str {
        match self {
            Verdict::Allow(_) => "allowed",
            Verdict::Deny(denial) => denial.reason.as_str(),
        }
    }
}
