//! # TNPPT Gate
//!
//! Request authentication for Axum services based on a shared secret and a
//! declared timestamp:
//!
//! - **Three schemes**: JSON body hash, HMAC headers, API-key header
//! - **Hash verification**: `SHA256(login ++ secret ++ timestamp)` in lowercase hex,
//!   compared in constant time
//! - **Replay window**: requests older than the TTL (default 800ms) are rejected
//! - **Pluggable user store**: a single [`CredentialResolver`] trait
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Axum HTTP Server                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  AuthGateLayer (arrival time, body buffering, response)     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  AuthGate: extract → resolve → verify hash → freshness      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CredentialResolver (injected)                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use axum::Router;
//! use axum::routing::get;
//! use tnppt_gate::auth::{AuthGate, Scheme, StaticCredentialStore};
//! use tnppt_gate::middleware::AuthGateLayer;
//!
//! # fn main() -> Result<(), tnppt_gate::auth::GateError> {
//! let gate = AuthGate::builder(Scheme::HmacHeader)
//!     .ttl_millis(800)
//!     .resolver(StaticCredentialStore::new().with_user("steven", "pass"))
//!     .build()?;
//!
//! let app: Router = Router::new()
//!     .route("/private", get(|| async { "ok" }))
//!     .layer(AuthGateLayer::new(gate, 64 * 1024));
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod utils;

// Re-exports for convenience
pub use auth::{AuthGate, CredentialResolver, Credentials, Scheme, Verdict};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use routes::build_router;
pub use state::AppState;
