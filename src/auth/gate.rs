//! The authentication gate.
//!
//! # Pipeline
//!
//! ```text
//! Start → PayloadExtracted → IdentityResolved → HashVerified → FreshnessVerified → Allowed
//!   │            │                  │                 │                │
//!   └────────────┴──────────────────┴─────────────────┴────────────────┴──→ Denied(reason)
//! ```
//!
//! Steps run strictly in order and stop at the first failure:
//!
//! 1. Arrival time is captured by the caller before anything else.
//! 2. Payload extraction, or `MalformedPayload`.
//! 3. Credential resolution, or `UnknownIdentity`. The API-key scheme is
//!    allowed at this point.
//! 4. Hash verification, or `HashMismatch`.
//! 5. Freshness against the configured TTL, or `Expired`.
//!
//! A gate holds only configuration and the shared resolver. Everything
//! derived from a request lives in locals of [`AuthGate::evaluate`].

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use super::credentials::CredentialResolver;
use super::freshness::{DEFAULT_TTL_MILLIS, SecurityWindow, now_millis};
use super::hash;
use super::payload::{self, RawRequest, Scheme};
use super::verdict::{AuthenticatedIdentity, Denial, DenyReason, Verdict};

/// Construction-time failures. A gate that fails to build must not serve.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("configuration error: no credential resolver was supplied")]
    MissingResolver,

    #[error("configuration error: TTL must not be negative (got {0}ms)")]
    NegativeTtl(i64),
}

/// Builder for [`AuthGate`].
pub struct AuthGateBuilder {
    scheme: Scheme,
    ttl_millis: i64,
    resolver: Option<Arc<dyn CredentialResolver>>,
}

impl AuthGateBuilder {
    /// Replay window in milliseconds. Zero selects the 800ms default.
    pub fn ttl_millis(mut self, ttl_millis: i64) -> Self {
        self.ttl_millis = ttl_millis;
        self
    }

    pub fn resolver(self, resolver: impl CredentialResolver + 'static) -> Self {
        self.shared_resolver(Arc::new(resolver))
    }

    /// Use a resolver that is already shared with other gates.
    pub fn shared_resolver(mut self, resolver: Arc<dyn CredentialResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// # Errors
    ///
    /// Returns [`GateError::MissingResolver`] when no resolver was set and
    /// [`GateError::NegativeTtl`] for a negative TTL.
    pub fn build(self) -> Result<AuthGate, GateError> {
        let resolver = self.resolver.ok_or(GateError::MissingResolver)?;
        let ttl_millis = match self.ttl_millis {
            0 => DEFAULT_TTL_MILLIS,
            ttl if ttl < 0 => return Err(GateError::NegativeTtl(ttl)),
            ttl => ttl,
        };

        Ok(AuthGate {
            scheme: self.scheme,
            ttl_millis,
            resolver,
        })
    }
}

/// Verifies one scheme's credentials against an injected resolver.
#[derive(Clone)]
pub struct AuthGate {
    scheme: Scheme,
    ttl_millis: i64,
    resolver: Arc<dyn CredentialResolver>,
}

impl fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthGate")
            .field("scheme", &self.scheme)
            .field("ttl_millis", &self.ttl_millis)
            .finish_non_exhaustive()
    }
}

impl AuthGate {
    pub fn builder(scheme: Scheme) -> AuthGateBuilder {
        AuthGateBuilder {
            scheme,
            ttl_millis: 0,
            resolver: None,
        }
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Effective TTL after defaulting.
    pub fn ttl_millis(&self) -> i64 {
        self.ttl_millis
    }

    /// Evaluate a request arriving now.
    pub fn check(&self, request: RawRequest<'_>) -> Verdict {
        let arrival_millis = now_millis();
        self.evaluate(arrival_millis, request)
    }

    /// Evaluate a request that arrived at `arrival_millis`.
    pub fn evaluate(&self, arrival_millis: i64, request: RawRequest<'_>) -> Verdict {
        let payload = match payload::extract(self.scheme, request) {
            Ok(payload) => payload,
            Err(e) => {
                return Verdict::Deny(
                    Denial::new(DenyReason::MalformedPayload).with_detail(e.to_string()),
                );
            }
        };

        let Some(credentials) = self.resolver.resolve(&payload) else {
            return Verdict::Deny(Denial::new(DenyReason::UnknownIdentity));
        };

        let allowed = AuthenticatedIdentity {
            identity: credentials.identity.clone(),
            scheme: Some(self.scheme),
        };

        let Some(claim) = payload.hash_claim() else {
            return Verdict::Allow(allowed);
        };

        if !hash::verify(claim, &credentials) {
            return Verdict::Deny(Denial::new(DenyReason::HashMismatch));
        }

        let window = SecurityWindow::open(self.ttl_millis, arrival_millis);
        if !window.admits(claim.timestamp_millis) {
            return Verdict::Deny(Denial::new(DenyReason::Expired).with_detail(format!(
                "request is {}ms old, TTL is {}ms",
                window.elapsed_millis(claim.timestamp_millis),
                window.ttl_millis()
            )));
        }

        Verdict::Allow(allowed)
    }
}
