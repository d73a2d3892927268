//! Force-authenticating stand-in for [`AuthGate`](super::AuthGate).
//!
//! Only compiled under `cfg(test)` or the `test-bypass` feature. It shares
//! no constructor with the real gate: wiring it into a router is a
//! deliberate, visible choice.

use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{Request, Response};
use tower::{Layer, Service};
use tracing::warn;

use super::verdict::{AuthenticatedIdentity, Verdict};

/// Skips every verification step and marks each request as authenticated
/// with a fixed identity.
#[derive(Debug, Clone)]
pub struct TestGate {
    identity: AuthenticatedIdentity,
}

impl TestGate {
    pub fn authenticate_as(identity: impl Into<String>) -> Self {
        Self {
            identity: AuthenticatedIdentity {
                identity: identity.into(),
                scheme: None,
            },
        }
    }

    /// Always [`Verdict::Allow`].
    pub fn verdict(&self) -> Verdict {
        Verdict::Allow(self.identity.clone())
    }
}

impl<S> Layer<S> for TestGate {
    type Service = TestGateService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        warn!(
            identity = %self.identity.identity,
            "Authentication bypass installed; every request is accepted"
        );
        TestGateService {
            inner,
            identity: self.identity.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TestGateService<S> {
    inner: S,
    identity: AuthenticatedIdentity,
}

impl<S> Service<Request<Body>> for TestGateService<S>
where
    S: Service<Request<Body>, Response = Response<Body>>,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        req.extensions_mut().insert(self.identity.clone());
        self.inner.call(req)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::convert::Infallible;

    use axum::http::StatusCode;
    use tower::{ServiceExt, service_fn};

    use super::*;

    #[test]
    fn test_verdict_is_allow_without_scheme() {
        let gate = TestGate::authenticate_as("tester");
        assert_eq!(
            gate.verdict(),
            Verdict::Allow(AuthenticatedIdentity {
                identity: "tester".to_string(),
                scheme: None,
            })
        );
    }

    #[tokio::test]
    async fn test_injects_identity_without_credentials() {
        let handler = service_fn(|req: Request<Body>| async move {
            let identity = req
                .extensions()
                .get::<AuthenticatedIdentity>()
                .map(|id| id.identity.clone())
                .unwrap_or_default();
            Ok::<_, Infallible>(Response::new(Body::from(identity)))
        });

        let service = TestGate::authenticate_as("tester").layer(handler);
        let response = service
            .oneshot(Request::builder().body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"tester");
    }
}
