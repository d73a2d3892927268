//! Application routing with one authentication gate per scheme.
//!
//! ```text
//! Request
//!    │
//!    ▼
//! ┌──────────────────┐
//! │     Tracing      │ ← HTTP request/response logging
//! └────────┬─────────┘
//!          │
//!    ┌─────┴───────────────┬──────────────────────┬──────────────────────┐
//!    ▼                     ▼                      ▼                      ▼
//! /health            POST /login           GET /hmac/whoami       GET /api/whoami
//! (no gate)          body-hash gate        HMAC-header gate       API-key gate
//! ```
//!
//! All gates share the resolver in [`AppState`] and the TTL from config.

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::{AuthGate, CredentialResolver, Scheme};
use crate::error::AppResult;
use crate::handlers;
use crate::middleware::AuthGateLayer;
use crate::state::AppState;

/// Build the application router.
///
/// # Errors
///
/// Returns `AppError::Gate` if a gate cannot be constructed from the
/// configuration. The server must not start in that case.
pub fn build_router(state: AppState) -> AppResult<Router> {
    let config = state.config.clone();
    let body_limit = config.max_request_body_size;

    let gate_layer = |scheme: Scheme| -> AppResult<AuthGateLayer> {
        let gate = build_gate(scheme, config.auth_ttl_millis, state.credentials.clone())?;
        info!(%scheme, ttl_ms = gate.ttl_millis(), "Authentication gate configured");
        Ok(AuthGateLayer::new(gate, body_limit))
    };

    let login = Router::new()
        .route("/login", post(handlers::login))
        .layer(gate_layer(Scheme::BodyHash)?);

    let hmac = Router::new()
        .route("/hmac/whoami", get(handlers::whoami))
        .layer(gate_layer(Scheme::HmacHeader)?);

    let api = Router::new()
        .route("/api/whoami", get(handlers::whoami))
        .layer(gate_layer(Scheme::ApiKeyHeader)?);

    let router = Router::new()
        .route("/health", get(handlers::health_check))
        .merge(login)
        .merge(hmac)
        .merge(api)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http());

    Ok(router.with_state(state))
}

/// Build one gate over a shared resolver.
///
/// # Errors
///
/// Propagates [`GateError`](crate::auth::GateError) as `AppError::Gate`.
pub fn build_gate(
    scheme: Scheme,
    ttl_millis: i64,
    resolver: Arc<dyn CredentialResolver>,
) -> AppResult<AuthGate> {
    Ok(AuthGate::builder(scheme)
        .ttl_millis(ttl_millis)
        .shared_resolver(resolver)
        .build()?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::auth::StaticCredentialStore;
    use crate::config::Config;

    #[test]
    fn test_build_gate_defaults_ttl() {
        let gate = build_gate(Scheme::HmacHeader, 0, Arc::new(StaticCredentialStore::new())).unwrap();
        assert_eq!(gate.ttl_millis(), 800);
    }

    #[test]
    fn test_build_router_rejects_negative_ttl() {
        let state = AppState::new(Config {
            auth_ttl_millis: -1,
            ..Config::default()
        });
        assert!(build_router(state).is_err());
    }
}
