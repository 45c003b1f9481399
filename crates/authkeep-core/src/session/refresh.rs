//! Refresh-token exchange, coalesced across concurrent callers.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use crate::error::RefreshError;
use crate::request::ApiRequest;
use crate::store::CredentialStore;
use crate::tokens::{AccessToken, TokenPair};
use crate::traits::Transport;

use super::{AuthSession, send_with_timeout};

type RefreshFlight = Shared<BoxFuture<'static, Result<AccessToken, RefreshError>>>;

/// Holds the refresh currently in flight, if any.
///
/// Every caller that arrives while a flight is pending awaits that same
/// flight. The slot is cleared by whichever waiter finishes first; ids keep a
/// late waiter from clearing a newer flight.
#[derive(Default)]
pub(super) struct RefreshCoordinator {
    slot: Mutex<Slot>,
}

#[derive(Default)]
struct Slot {
    next_id: u64,
    current: Option<(u64, RefreshFlight)>,
}

impl RefreshCoordinator {
    pub(super) async fn run<F>(&self, start: F) -> Result<AccessToken, RefreshError>
    where
        F: FnOnce() -> BoxFuture<'static, Result<AccessToken, RefreshError>>,
    {
        let (id, flight) = {
            let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
            match &slot.current {
                Some((id, flight)) if flight.peek().is_none() => {
                    debug!("joining token refresh already in progress");
                    (*id, flight.clone())
                }
                _ => {
                    slot.next_id += 1;
                    let id = slot.next_id;
                    let flight = start().shared();
                    slot.current = Some((id, flight.clone()));
                    (id, flight)
                }
            }
        };

        let result = flight.await;

        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if matches!(&slot.current, Some((current, _)) if *current == id) {
            slot.current = None;
        }
        result
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    token: Option<String>,
    refresh_token: Option<String>,
}

/// Trade the stored refresh token for a new pair and persist it.
async fn exchange(
    store: CredentialStore,
    transport: Arc<dyn Transport>,
    url: String,
    timeout: Duration,
) -> Result<AccessToken, RefreshError> {
    let refresh = store
        .refresh_token()
        .await
        .ok_or(RefreshError::MissingRefreshToken)?;

    let request = ApiRequest::post_json(url, json!({ "refreshToken": refresh.as_str() }));
    let response = send_with_timeout(transport.as_ref(), request, timeout)
        .await
        .map_err(RefreshError::Network)?;

    if !response.is_success() {
        return Err(RefreshError::Rejected {
            status: response.status,
        });
    }

    let body: RefreshResponse = response.json().map_err(|_| RefreshError::Malformed)?;
    let pair = TokenPair::from_parts(body.token, body.refresh_token)
        .ok_or(RefreshError::Malformed)?;

    store.set_tokens(&pair).await;
    Ok(pair.access)
}

impl AuthSession {
    /// Exchange the stored refresh token for a new token pair.
    ///
    /// Both new tokens are persisted before the new access token is returned.
    /// Concurrent calls share a single network exchange.
    ///
    /// A failed refresh leaves the stored tokens untouched; only
    /// [`execute`](Self::execute) tears the session down.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<AccessToken, RefreshError> {
        let inner = &self.inner;
        let result = inner
            .refresh
            .run(|| {
                exchange(
                    inner.store.clone(),
                    Arc::clone(&inner.transport),
                    inner.refresh_url.clone(),
                    inner.config.request_timeout(),
                )
                .boxed()
            })
            .await;

        match &result {
            Ok(_) => info!("access token refreshed"),
            Err(err) => warn!(error = %err, "token refresh failed"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;

    use super::super::testing::*;
    use crate::error::{NetworkError, RefreshError};
    use crate::request::ApiResponse;
    use crate::store::MemoryStore;

    const REFRESH: &str = "/api/auth/refresh-token";

    #[tokio::test]
    async fn persists_both_tokens_and_returns_access() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, "A1", "R1").await;
        let transport = Arc::new(FakeTransport::new(store.clone(), |_| {
            json(200, json!({"token": "A2", "refreshToken": "R2"}))
        }));
        let session = session(&store, transport.clone());

        let token = session.refresh().await.unwrap();

        assert_eq!(token.as_str(), "A2");
        assert_eq!(store.peek("authToken").as_deref(), Some("A2"));
        assert_eq!(store.peek("refreshToken").as_deref(), Some("R2"));

        let sent = &transport.calls_to(REFRESH)[0].request;
        assert_eq!(sent.body, Some(json!({"refreshToken": "R1"})));
        assert_eq!(sent.headers.get("content-type"), Some("application/json"));
    }

    #[tokio::test]
    async fn missing_refresh_token_skips_network() {
        let store = Arc::new(MemoryStore::new());
        let transport = Arc::new(FakeTransport::new(store.clone(), |_| json(200, json!({}))));
        let session = session(&store, transport.clone());

        let err = session.refresh().await.unwrap_err();

        assert_eq!(err, RefreshError::MissingRefreshToken);
        assert_eq!(err.to_string(), "no refresh token");
        assert!(transport.seen().is_empty());
    }

    #[tokio::test]
    async fn rejection_keeps_existing_tokens() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, "A1", "R1").await;
        let transport = Arc::new(FakeTransport::new(store.clone(), |_| {
            json(403, json!({"error": "revoked"}))
        }));
        let session = session(&store, transport);

        let err = session.refresh().await.unwrap_err();

        assert_eq!(err, RefreshError::Rejected { status: 403 });
        assert_eq!(err.to_string(), "refresh rejected");
        assert_eq!(store.peek("authToken").as_deref(), Some("A1"));
        assert_eq!(store.peek("refreshToken").as_deref(), Some("R1"));
    }

    #[tokio::test]
    async fn missing_field_is_malformed_without_partial_write() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, "A1", "R1").await;
        let transport = Arc::new(FakeTransport::new(store.clone(), |_| {
            json(200, json!({"token": "A2"}))
        }));
        let session = session(&store, transport);

        let err = session.refresh().await.unwrap_err();

        assert_eq!(err, RefreshError::Malformed);
        assert_eq!(err.to_string(), "malformed response");
        assert_eq!(store.peek("authToken").as_deref(), Some("A1"));
        assert_eq!(store.peek("refreshToken").as_deref(), Some("R1"));
    }

    #[tokio::test]
    async fn empty_or_mistyped_tokens_are_malformed() {
        for body in [
            json!({"token": "", "refreshToken": "R2"}),
            json!({"token": "A2", "refreshToken": 7}),
        ] {
            let store = Arc::new(MemoryStore::new());
            seed(&store, "A1", "R1").await;
            let transport = Arc::new(FakeTransport::new(store.clone(), move |_| {
                json(200, body.clone())
            }));
            let session = session(&store, transport);

            assert_eq!(session.refresh().await.unwrap_err(), RefreshError::Malformed);
            assert_eq!(store.peek("authToken").as_deref(), Some("A1"));
        }
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, "A1", "R1").await;
        let transport = Arc::new(FakeTransport::new(store.clone(), |_| {
            Ok(ApiResponse::new(200, b"ok".to_vec()))
        }));
        let session = session(&store, transport);

        assert_eq!(session.refresh().await.unwrap_err(), RefreshError::Malformed);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_exchange_times_out() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, "A1", "R1").await;
        let session = crate::AuthSession::new(
            config().with_request_timeout(Duration::from_millis(750)),
            crate::CredentialStore::single(store.clone()),
            Arc::new(HangingTransport),
        )
        .unwrap();

        let err = session.refresh().await.unwrap_err();

        assert_eq!(
            err,
            RefreshError::Network(NetworkError::Timeout { duration_ms: 750 })
        );
        assert_eq!(store.peek("refreshToken").as_deref(), Some("R1"));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_refreshes_share_one_exchange() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, "A1", "R1").await;
        let transport = Arc::new(
            FakeTransport::new(store.clone(), |_| {
                json(200, json!({"token": "A2", "refreshToken": "R2"}))
            })
            .delay(REFRESH, Duration::from_millis(100)),
        );
        let session = session(&store, transport.clone());

        let (a, b, c) = tokio::join!(session.refresh(), session.refresh(), session.refresh());

        assert_eq!(a.unwrap().as_str(), "A2");
        assert_eq!(b.unwrap().as_str(), "A2");
        assert_eq!(c.unwrap().as_str(), "A2");
        assert_eq!(transport.calls_to(REFRESH).len(), 1);
    }

    #[tokio::test]
    async fn completed_flight_is_not_reused() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, "A1", "R1").await;
        let transport = Arc::new(FakeTransport::new(store.clone(), |request| {
            match request.body.as_ref().and_then(|b| b["refreshToken"].as_str()) {
                Some("R1") => json(200, json!({"token": "A2", "refreshToken": "R2"})),
                Some("R2") => json(200, json!({"token": "A3", "refreshToken": "R3"})),
                _ => json(401, json!({})),
            }
        }));
        let session = session(&store, transport.clone());

        assert_eq!(session.refresh().await.unwrap().as_str(), "A2");
        assert_eq!(session.refresh().await.unwrap().as_str(), "A3");
        assert_eq!(transport.calls_to(REFRESH).len(), 2);
    }
}
