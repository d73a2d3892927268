//! Credential lookup contract.
//!
//! The gate never owns a user store. It hands the extracted [`AuthPayload`]
//! to a [`CredentialResolver`] and receives the secret material needed to
//! recompute the expected hash, or `None` when the claimed identity is not
//! resolvable.
//!
//! Resolvers are shared across concurrent requests; read consistency under
//! concurrent `resolve` calls is the resolver's responsibility. The gate puts
//! no timeout around the call.

use std::collections::HashMap;
use std::fmt;

use super::hash::constant_time_eq;
use super::payload::AuthPayload;

/// Secret material for one identity, valid for the current request only.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub identity: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(identity: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identity", &self.identity)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Pluggable user store consulted once per request.
///
/// For hash-bearing schemes the returned [`Credentials::identity`] and
/// [`Credentials::secret`] are fed to the hash computation. For the API-key
/// scheme a `Some` result is sufficient on its own.
pub trait CredentialResolver: Send + Sync {
    fn resolve(&self, payload: &AuthPayload) -> Option<Credentials>;
}

impl<F> CredentialResolver for F
where
    F: Fn(&AuthPayload) -> Option<Credentials> + Send + Sync,
{
    fn resolve(&self, payload: &AuthPayload) -> Option<Credentials> {
        self(payload)
    }
}

/// In-memory resolver backed by fixed login/secret pairs and API keys.
///
/// API keys are compared in constant time against every configured key so
/// the scan does not stop early on a match.
#[derive(Default, Clone)]
pub struct StaticCredentialStore {
    users: HashMap<String, String>,
    api_keys: Vec<(String, String)>,
}

impl StaticCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(login, secret)` and `(key, identity)` pairs.
    pub fn from_pairs(users: &[(String, String)], api_keys: &[(String, String)]) -> Self {
        Self {
            users: users.iter().cloned().collect(),
            api_keys: api_keys.to_vec(),
        }
    }

    pub fn with_user(mut self, login: impl Into<String>, secret: impl Into<String>) -> Self {
        self.users.insert(login.into(), secret.into());
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>, identity: impl Into<String>) -> Self {
        self.api_keys.push((key.into(), identity.into()));
        self
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn api_key_count(&self) -> usize {
        self.api_keys.len()
    }

    fn find_api_key(&self, presented: &str) -> Option<&str> {
        let mut owner = None;
        for (key, identity) in &self.api_keys {
            if constant_time_eq(key, presented) {
                owner = Some(identity.as_str());
            }
        }
        owner
    }
}

impl fmt::Debug for StaticCredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentialStore")
            .field("users", &self.users.len())
            .field("api_keys", &self.api_keys.len())
            .finish()
    }
}

impl CredentialResolver for StaticCredentialStore {
    fn resolve(&self, payload: &AuthPayload) -> Option<Credentials> {
        match payload {
            AuthPayload::ApiKey { key } => self
                .find_api_key(key)
                .map(|identity| Credentials::new(identity, key.as_str())),
            AuthPayload::BodyHash { claim, .. } | AuthPayload::HmacHeader(claim) => self
                .users
                .get_key_value(&claim.identity)
                .map(|(login, secret)| Credentials::new(login.as_str(), secret.as_str())),
        }
    }
}
