//! Timestamped shared-secret request authentication.
//!
//! ```text
//! Request ─► payload::extract ─► CredentialResolver ─► hash::verify ─► freshness ─► Verdict
//!                 │                      │                   │              │
//!            400 Malformed        401 UnknownIdentity   401 HashMismatch  401 Expired
//! ```
//!
//! [`AuthGate`] runs the pipeline; [`crate::middleware::AuthGateLayer`]
//! adapts it to an Axum router.

#[cfg(any(test, feature = "test-bypass"))]
pub mod bypass;
pub mod credentials;
pub mod freshness;
pub mod gate;
pub mod hash;
pub mod payload;
pub mod verdict;

#[cfg(any(test, feature = "test-bypass"))]
pub use bypass::TestGate;
pub use credentials::{CredentialResolver, Credentials, StaticCredentialStore};
pub use freshness::{DEFAULT_TTL_MILLIS, SecurityWindow};
pub use gate::{AuthGate, AuthGateBuilder, GateError};
pub use payload::{AuthPayload, HashClaim, PayloadError, RawRequest, Scheme};
pub use verdict::{AuthenticatedIdentity, Denial, DenyReason, Verdict};
