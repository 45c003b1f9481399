//! Session teardown: best-effort server logout, then local token removal.

use serde_json::json;
use tracing::{debug, info, instrument};

use crate::request::ApiRequest;

use super::AuthSession;

impl AuthSession {
    /// End the session.
    ///
    /// If a refresh token is stored, the server is told to revoke it. That
    /// call is best effort: its outcome is logged and otherwise ignored. Both
    /// tokens are cleared regardless. Cached user data is left alone.
    #[instrument(skip(self))]
    pub async fn teardown(&self) {
        let store = &self.inner.store;

        if let Some(refresh) = store.refresh_token().await {
            let request = ApiRequest::post_json(
                self.inner.logout_url.as_str(),
                json!({ "refreshToken": refresh.as_str() }),
            );
            match self.send(request).await {
                Ok(response) if response.is_success() => debug!("server session revoked"),
                Ok(response) => debug!(status = response.status, "logout call was rejected"),
                Err(err) => debug!(error = %err, "logout call failed"),
            }
        }

        store.clear_tokens().await;
        info!("session credentials cleared");
    }
}
