//! End-to-end protocol tests against a mock API server.
//!
//! These tests use wiremock to simulate the backend and drive a real
//! `ReqwestTransport` through the session, without network access.

use std::sync::Arc;
use std::time::Duration;

use authkeep_core::{
    AccessToken, ApiUrl, AuthSession, CredentialStore, Error, MemoryStore, NetworkError,
    OtpCredentials, RefreshError, RefreshToken, RequestOptions, Retry, SessionConfig, TokenPair,
    UserType,
};
use authkeep_http::ReqwestTransport;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_url(server: &MockServer) -> ApiUrl {
    ApiUrl::new(format!("http://127.0.0.1:{}", server.address().port())).unwrap()
}

fn session_for(server: &MockServer, store: CredentialStore) -> AuthSession {
    let transport = Arc::new(ReqwestTransport::new().unwrap());
    AuthSession::new(SessionConfig::new(api_url(server)), store, transport).unwrap()
}

async fn signed_in(access: &str, refresh: &str) -> CredentialStore {
    let store = CredentialStore::single(Arc::new(MemoryStore::new()));
    store
        .set_tokens(&TokenPair::new(
            AccessToken::new(access),
            RefreshToken::new(refresh),
        ))
        .await;
    store
}

// ============================================================================
// Request Execution
// ============================================================================

#[tokio::test]
async fn test_authenticated_get() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/profile"))
        .and(header("authorization", "Bearer A1"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "Asha"})))
        .expect(1)
        .mount(&server)
        .await;

    let session = session_for(&server, signed_in("A1", "R1").await);
    let body = session
        .execute("/profile", RequestOptions::get(), Retry::OnUnauthorized)
        .await
        .unwrap();

    assert_eq!(body, json!({"name": "Asha"}));
}

#[tokio::test]
async fn test_api_error_message_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/campaigns"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"error": "Budget is required"})),
        )
        .mount(&server)
        .await;

    let session = session_for(&server, signed_in("A1", "R1").await);
    let err = session
        .execute(
            "/api/campaigns",
            RequestOptions::post(json!({"title": "Launch"})),
            Retry::OnUnauthorized,
        )
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(422));
    assert_eq!(err.to_string(), "Budget is required");
}

#[tokio::test]
async fn test_empty_success_body_is_null() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/items/1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let session = session_for(&server, signed_in("A1", "R1").await);
    let body = session
        .execute(
            "/api/items/1",
            RequestOptions::new(authkeep_core::Method::Delete),
            Retry::OnUnauthorized,
        )
        .await
        .unwrap();

    assert!(body.is_null());
}

// ============================================================================
// Refresh Protocol
// ============================================================================

#[tokio::test]
async fn test_refresh_and_retry_after_401() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/profile"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "jwt expired"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh-token"))
        .and(body_json(json!({"refreshToken": "R1"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"token": "A2", "refreshToken": "R2"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/profile"))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "Asha"})))
        .expect(1)
        .mount(&server)
        .await;

    let store = signed_in("A1", "R1").await;
    let session = session_for(&server, store.clone());
    let body = session
        .execute("/profile", RequestOptions::get(), Retry::OnUnauthorized)
        .await
        .unwrap();

    assert_eq!(body["name"], "Asha");
    assert_eq!(store.access_token().await.unwrap().as_str(), "A2");
    assert_eq!(store.refresh_token().await.unwrap().as_str(), "R2");
}

#[tokio::test]
async fn test_rejected_refresh_tears_down() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "revoked"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .and(body_json(json!({"refreshToken": "R1"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let store = signed_in("A1", "R1").await;
    let session = session_for(&server, store.clone());
    let err = session
        .execute("/profile", RequestOptions::get(), Retry::OnUnauthorized)
        .await
        .unwrap_err();

    assert!(err.is_session_expired());
    assert!(matches!(
        err,
        Error::SessionExpired(RefreshError::Rejected { status: 401 })
    ));
    assert!(store.tokens().await.is_none());
}

#[tokio::test]
async fn test_no_refresh_token_never_contacts_refresh_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(path("/api/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = CredentialStore::in_memory();
    let session = session_for(&server, store.clone());
    let err = session
        .execute("/profile", RequestOptions::get(), Retry::OnUnauthorized)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::SessionExpired(RefreshError::MissingRefreshToken)
    ));
    assert!(store.tokens().await.is_none());
}

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/profile"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"token": "A2", "refreshToken": "R2"}))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/profile"))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(3)
        .mount(&server)
        .await;

    let session = session_for(&server, signed_in("A1", "R1").await);
    let call = || session.execute("/profile", RequestOptions::get(), Retry::OnUnauthorized);
    let (a, b, c) = tokio::join!(call(), call(), call());

    assert!(a.is_ok() && b.is_ok() && c.is_ok());
}

#[tokio::test]
async fn test_session_timeout_bounds_slow_calls() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let transport = Arc::new(ReqwestTransport::new().unwrap());
    let config =
        SessionConfig::new(api_url(&server)).with_request_timeout(Duration::from_millis(100));
    let session = AuthSession::new(config, CredentialStore::in_memory(), transport).unwrap();

    let err = session
        .execute("/slow", RequestOptions::get(), Retry::OnUnauthorized)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Network(NetworkError::Timeout { duration_ms: 100 })
    ));
}

#[tokio::test]
async fn test_client_timeout_reports_configured_duration() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let transport = Arc::new(ReqwestTransport::with_timeout(Duration::from_millis(100)).unwrap());
    let config = SessionConfig::new(api_url(&server)).with_request_timeout(Duration::from_secs(10));
    let session = AuthSession::new(config, CredentialStore::in_memory(), transport).unwrap();

    let err = session
        .execute("/slow", RequestOptions::get(), Retry::OnUnauthorized)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Network(NetworkError::Timeout { duration_ms: 100 })
    ));
}

#[tokio::test]
async fn test_plain_http_absolute_endpoint_is_refused() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let session = session_for(&server, signed_in("A1", "R1").await);
    let err = session
        .execute(
            "http://evil.example.com/steal",
            RequestOptions::get(),
            Retry::OnUnauthorized,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidInput(_)));
}

// ============================================================================
// Login and Logout
// ============================================================================

#[tokio::test]
async fn test_otp_login_then_logout() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/verify-otp"))
        .and(body_json(json!({
            "phone": "+919800000000",
            "code": "123456",
            "userType": "creator"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "A1",
            "refreshToken": "R1",
            "user": {"id": "u1", "name": "Asha"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .and(body_json(json!({"refreshToken": "R1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let store = CredentialStore::in_memory();
    let session = session_for(&server, store.clone());

    session
        .auth()
        .verify_otp(
            &OtpCredentials::new("+919800000000", "123456"),
            None,
            UserType::Creator,
        )
        .await
        .unwrap();
    assert!(session.is_authenticated().await);
    assert_eq!(store.user_data().await.unwrap()["name"], "Asha");

    session.auth().logout().await;
    assert!(!session.is_authenticated().await);
    assert!(store.user_data().await.is_none());
}

#[tokio::test]
async fn test_logout_clears_tokens_when_server_is_down() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let store = signed_in("A1", "R1").await;
    let session = session_for(&server, store.clone());
    session.teardown().await;

    assert!(store.tokens().await.is_none());
}
