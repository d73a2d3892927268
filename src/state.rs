//! Shared application state for Axum handlers.
//!
//! The credential store is the only resource shared between requests. It is
//! read-only after startup, so concurrent lookups need no locking.

use std::sync::Arc;
use std::time::Instant;

use crate::auth::{CredentialResolver, StaticCredentialStore};
use crate::config::Config;

/// Shared application state, cloned into each handler.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,
    /// Resolver shared by every gate on the router
    pub credentials: Arc<dyn CredentialResolver>,
    /// Timestamp when the application started
    pub started_at: Instant,
}

impl AppState {
    /// Build state with an in-memory store loaded from `config`.
    pub fn new(config: Config) -> Self {
        let store = StaticCredentialStore::from_pairs(&config.users, &config.api_keys);
        Self::with_resolver(config, Arc::new(store))
    }

    /// Build state around an externally supplied resolver.
    pub fn with_resolver(config: Config, credentials: Arc<dyn CredentialResolver>) -> Self {
        Self {
            config: Arc::new(config),
            credentials,
            started_at: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
