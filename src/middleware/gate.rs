//! Tower adapter that puts an [`AuthGate`] in front of a router.
//!
//! # Behaviour
//!
//! - Arrival time is captured on entry, before the body is read.
//! - The body is buffered only for the body-hash scheme, then handed on
//!   unchanged so handlers can still read it.
//! - On allow, [`AuthenticatedIdentity`] is inserted into request extensions.
//! - On deny, a `{"code", "message"}` body is returned with the matching
//!   status and the inner service is never called.
//!
//! ```rust,ignore
//! let gate = AuthGate::builder(Scheme::HmacHeader)
//!     .resolver(store)
//!     .build()?;
//! let router = Router::new()
//!     .route("/hmac/whoami", get(whoami))
//!     .layer(AuthGateLayer::new(gate, 64 * 1024));
//! ```

use std::task::{Context, Poll};
use std::time::Instant;

use axum::body::{Body, Bytes};
use axum::http::{Request, Response};
use axum::response::IntoResponse;
use http_body_util::LengthLimitError;
use tower::{Layer, Service};
use tracing::{debug, warn};

use crate::auth::freshness::now_millis;
use crate::auth::{
    AuthGate, AuthenticatedIdentity, Denial, DenyReason, PayloadError, RawRequest, Verdict,
};
use crate::metrics::record_verdict;

/// Layer wrapping services with an [`AuthGate`].
#[derive(Debug, Clone)]
pub struct AuthGateLayer {
    gate: AuthGate,
    body_limit: usize,
}

impl AuthGateLayer {
    /// # Arguments
    ///
    /// * `gate` - Configured gate for one scheme
    /// * `body_limit` - Maximum body size buffered for the body-hash scheme
    pub fn new(gate: AuthGate, body_limit: usize) -> Self {
        Self { gate, body_limit }
    }

    pub fn gate(&self) -> &AuthGate {
        &self.gate
    }
}

impl<S> Layer<S> for AuthGateLayer {
    type Service = AuthGateService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthGateService {
            inner,
            gate: self.gate.clone(),
            body_limit: self.body_limit,
        }
    }
}

/// Service produced by [`AuthGateLayer`].
#[derive(Debug, Clone)]
pub struct AuthGateService<S> {
    inner: S,
    gate: AuthGate,
    body_limit: usize,
}

impl<S> Service<Request<Body>> for AuthGateService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let arrival_millis = now_millis();
        let started = Instant::now();
        let gate = self.gate.clone();
        let body_limit = self.body_limit;
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let scheme = gate.scheme();
            let path = req.uri().path().to_owned();
            let (mut parts, body) = req.into_parts();

            let (body, buffered) = if scheme.reads_body() {
                match axum::body::to_bytes(body, body_limit).await {
                    Ok(bytes) => (Body::from(bytes.clone()), bytes),
                    Err(e) => {
                        let denial = Denial::new(DenyReason::MalformedPayload)
                            .with_detail(body_read_error(&e, body_limit).to_string());
                        let verdict = Verdict::Deny(denial.clone());
                        record_verdict(scheme, &verdict, started.elapsed());
                        warn!(%scheme, path = %path, reason = %denial.reason, "Request denied");
                        return Ok(denial.into_response());
                    }
                }
            } else {
                (body, Bytes::new())
            };

            let verdict = gate.evaluate(arrival_millis, RawRequest::new(&parts.headers, &buffered));
            record_verdict(scheme, &verdict, started.elapsed());

            match verdict {
                Verdict::Allow(identity) => {
                    debug!(%scheme, path = %path, identity = %identity.identity, "Request authenticated");
                    parts.extensions.insert::<AuthenticatedIdentity>(identity);
                    inner.call(Request::from_parts(parts, body)).await
                }
                Verdict::Deny(denial) => {
                    warn!(
                        %scheme,
                        path = %path,
                        reason = %denial.reason,
                        detail = denial.detail.as_deref().unwrap_or(""),
                        "Request denied"
                    );
                    Ok(denial.into_response())
                }
            }
        })
    }
}

/// Tell an over-limit body apart from a transport failure.
fn body_read_error(err: &axum::Error, limit: usize) -> PayloadError {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return PayloadError::TooLarge { limit };
        }
        source = e.source();
    }
    PayloadError::Unreadable(err.to_string())
}
