//! Handlers mounted behind an authentication gate.
//!
//! Each reads the [`AuthenticatedIdentity`] the gate left in request
//! extensions. Its absence means the route was mounted without a gate.

use axum::body::Bytes;
use axum::extract::Json;
use axum::response::{IntoResponse, Response};
use axum::Extension;
use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::auth::{AuthenticatedIdentity, Denial, DenyReason};
use crate::error::{AppError, AppResult};
use crate::models::{LoginRequest, LoginResponse, WhoAmIResponse};

fn require_identity(
    identity: Option<Extension<AuthenticatedIdentity>>,
) -> AppResult<AuthenticatedIdentity> {
    identity
        .map(|Extension(identity)| identity)
        .ok_or_else(|| AppError::Internal("route is not behind an authentication gate".to_string()))
}

/// `POST /login`, gated by the body-hash scheme.
///
/// The gate hands the body through, so the handler can still read it. The
/// body is decoded from raw bytes like the gate does, so `Content-Type` is
/// not required.
#[instrument(skip_all)]
pub async fn login(
    identity: Option<Extension<AuthenticatedIdentity>>,
    body: Bytes,
) -> Result<Json<LoginResponse>, Response> {
    let identity = require_identity(identity).map_err(IntoResponse::into_response)?;
    let request: LoginRequest = serde_json::from_slice(&body).map_err(|e| {
        Denial::new(DenyReason::MalformedPayload)
            .with_detail(format!("login body: {e}"))
            .into_response()
    })?;

    Ok(Json(LoginResponse {
        identity: identity.identity,
        declared_at: DateTime::<Utc>::from_timestamp_millis(request.timestamp_millis),
        authenticated_at: Utc::now(),
    }))
}

/// `GET /hmac/whoami` and `GET /api/whoami`.
#[instrument(skip_all)]
pub async fn whoami(
    identity: Option<Extension<AuthenticatedIdentity>>,
) -> AppResult<Json<WhoAmIResponse>> {
    let identity = require_identity(identity)?;

    Ok(Json(WhoAmIResponse {
        identity: identity.identity,
        scheme: identity.scheme.map(|scheme| scheme.as_str().to_string()),
    }))
}
