//! Fail-soft credential persistence.
//!
//! [`CredentialStore`] sits on top of one or two [`KeyValueStore`] backends and
//! exposes typed access to the session secrets and the cached user data.
//! Backend failures are logged and absorbed here: a failed read looks like an
//! absent value, a failed write or delete is dropped. Callers must not assume
//! that a write persisted.

mod memory;

pub use memory::MemoryStore;

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::tokens::{AccessToken, RefreshToken, TokenPair};
use crate::traits::KeyValueStore;

/// Keys under which session state is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    AccessToken,
    RefreshToken,
    UserData,
}

impl StoreKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKey::AccessToken => "authToken",
            StoreKey::RefreshToken => "refreshToken",
            StoreKey::UserData => "userData",
        }
    }

    /// Whether the value must live in the secure backend.
    pub fn is_secret(&self) -> bool {
        !matches!(self, StoreKey::UserData)
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed, fail-soft access to the persisted session.
///
/// Cheap to clone; clones share the same backends.
#[derive(Clone)]
pub struct CredentialStore {
    secure: Arc<dyn KeyValueStore>,
    plain: Arc<dyn KeyValueStore>,
}

impl CredentialStore {
    /// Create a store with separate backends for secrets and user data.
    pub fn new(secure: Arc<dyn KeyValueStore>, plain: Arc<dyn KeyValueStore>) -> Self {
        Self { secure, plain }
    }

    /// Create a store that keeps everything in a single backend.
    pub fn single(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            secure: Arc::clone(&backend),
            plain: backend,
        }
    }

    /// A store backed by a fresh [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::single(Arc::new(MemoryStore::new()))
    }

    pub async fn access_token(&self) -> Option<AccessToken> {
        self.read(StoreKey::AccessToken).await.map(AccessToken::new)
    }

    pub async fn set_access_token(&self, token: &AccessToken) {
        self.write(StoreKey::AccessToken, token.as_str()).await;
    }

    pub async fn clear_access_token(&self) {
        self.remove(StoreKey::AccessToken).await;
    }

    pub async fn refresh_token(&self) -> Option<RefreshToken> {
        self.read(StoreKey::RefreshToken).await.map(RefreshToken::new)
    }

    pub async fn set_refresh_token(&self, token: &RefreshToken) {
        self.write(StoreKey::RefreshToken, token.as_str()).await;
    }

    pub async fn clear_refresh_token(&self) {
        self.remove(StoreKey::RefreshToken).await;
    }

    /// Returns the stored pair if both tokens are present.
    pub async fn tokens(&self) -> Option<TokenPair> {
        let access = self.access_token().await?;
        let refresh = self.refresh_token().await?;
        Some(TokenPair::new(access, refresh))
    }

    /// Persist both tokens, access token first.
    pub async fn set_tokens(&self, pair: &TokenPair) {
        self.set_access_token(&pair.access).await;
        self.set_refresh_token(&pair.refresh).await;
    }

    pub async fn clear_tokens(&self) {
        self.clear_access_token().await;
        self.clear_refresh_token().await;
    }

    /// Returns the cached user data; unparsable data reads as absent.
    pub async fn user_data(&self) -> Option<serde_json::Value> {
        let raw = self.read(StoreKey::UserData).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(%error, "discarding unreadable user data");
                None
            }
        }
    }

    pub async fn set_user_data(&self, user: &serde_json::Value) {
        self.write(StoreKey::UserData, &user.to_string()).await;
    }

    pub async fn clear_user_data(&self) {
        self.remove(StoreKey::UserData).await;
    }

    /// Remove every key this store manages.
    pub async fn clear_all(&self) {
        self.clear_tokens().await;
        self.clear_user_data().await;
    }

    fn backend(&self, key: StoreKey) -> &dyn KeyValueStore {
        if key.is_secret() {
            self.secure.as_ref()
        } else {
            self.plain.as_ref()
        }
    }

    async fn read(&self, key: StoreKey) -> Option<String> {
        match self.backend(key).get(key.as_str()).await {
            Ok(value) => value,
            Err(error) => {
                warn!(%key, %error, "failed to read from credential store");
                None
            }
        }
    }

    async fn write(&self, key: StoreKey, value: &str) {
        match self.backend(key).set(key.as_str(), value).await {
            Ok(()) => debug!(%key, "stored"),
            Err(error) => warn!(%key, %error, "failed to write to credential store"),
        }
    }

    async fn remove(&self, key: StoreKey) {
        match self.backend(key).delete(key.as_str()).await {
            Ok(()) => debug!(%key, "cleared"),
            Err(error) => warn!(%key, %error, "failed to clear credential store entry"),
        }
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("entries", &"[REDACTED]")
            .finish()
    }
}
