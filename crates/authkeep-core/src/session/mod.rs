//! The authenticated session: request execution, token refresh and teardown.
//!
//! An [`AuthSession`] owns no tokens itself. Every operation reads the current
//! credentials from its injected [`CredentialStore`] and talks to the server
//! through its injected [`Transport`], so any number of sessions built over the
//! same store observe the same credentials.

mod executor;
mod refresh;
mod teardown;

use std::sync::Arc;
use std::time::Duration;

use crate::api::{AuthApi, ProfileApi};
use crate::config::SessionConfig;
use crate::error::{Error, NetworkError};
use crate::request::{ApiRequest, ApiResponse};
use crate::store::CredentialStore;
use crate::traits::Transport;

use refresh::RefreshCoordinator;

/// A client-side authentication session.
///
/// Sessions are cheap to clone (they use an internal `Arc`) and safe to share
/// across tasks. Concurrent token refreshes are coalesced internally.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use authkeep_core::{ApiUrl, AuthSession, CredentialStore, RequestOptions, Retry, SessionConfig, Transport};
///
/// # async fn example(transport: Arc<dyn Transport>) -> Result<(), authkeep_core::Error> {
/// let config = SessionConfig::new(ApiUrl::new("https://api.example.com")?);
/// let session = AuthSession::new(config, CredentialStore::in_memory(), transport)?;
///
/// let profile = session
///     .execute("/api/profile", RequestOptions::get(), Retry::OnUnauthorized)
///     .await?;
/// println!("{}", profile);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AuthSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    config: SessionConfig,
    store: CredentialStore,
    transport: Arc<dyn Transport>,
    refresh_url: String,
    logout_url: String,
    refresh: RefreshCoordinator,
}

impl AuthSession {
    /// Create a session over the given store and transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured refresh or logout endpoint cannot be
    /// resolved against the base URL.
    pub fn new(
        config: SessionConfig,
        store: CredentialStore,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, Error> {
        let refresh_url = config.base_url.join(&config.endpoints.refresh)?;
        let logout_url = config.base_url.join(&config.endpoints.logout)?;

        Ok(Self {
            inner: Arc::new(SessionInner {
                config,
                store,
                transport,
                refresh_url,
                logout_url,
                refresh: RefreshCoordinator::default(),
            }),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &CredentialStore {
        &self.inner.store
    }

    /// Returns true if both tokens are currently stored.
    pub async fn is_authenticated(&self) -> bool {
        self.inner.store.tokens().await.is_some()
    }

    /// Login, OTP and account endpoints.
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    /// Profile endpoints.
    pub fn profile(&self) -> ProfileApi<'_> {
        ProfileApi::new(self)
    }

    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, NetworkError> {
        send_with_timeout(
            self.inner.transport.as_ref(),
            request,
            self.inner.config.request_timeout(),
        )
        .await
    }
}

/// Send a request, failing with [`NetworkError::Timeout`] once `timeout` elapses.
pub(crate) async fn send_with_timeout(
    transport: &dyn Transport,
    request: ApiRequest,
    timeout: Duration,
) -> Result<ApiResponse, NetworkError> {
    match tokio::time::timeout(timeout, transport.send(request)).await {
        Ok(result) => result,
        Err(_) => Err(NetworkError::Timeout {
            duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}

// Custom Debug impl that hides sensitive data
impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("base_url", &self.inner.config.base_url)
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}
