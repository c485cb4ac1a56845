//! Integration tests for callback processing against a mock backend.

use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zoho_oauth_integration::{
    oauth_config, CallbackOutcome, CallbackParameters, CallbackState, ErrorClassifier,
    ExchangeGuard, FileSessionStore, InMemorySessionStore, OAuthConfiguration,
    ReqwestHttpTransport, SessionStore, SkipReason, UserInfo, ZohoAdminAuth,
};

const TOKEN_PATH: &str = "/api/admin/oauth/token";
const USER_INFO_PATH: &str = "/api/admin/oauth/userinfo";

fn config_for(backend: &str) -> OAuthConfiguration {
    oauth_config()
        .client_id("test-client")
        .client_secret("test-secret")
        .home_url("http://localhost:8082")
        .redirect_url("http://localhost:8082/oauth/callback")
        .backend_admin_endpoint(format!("{}/api/admin", backend))
        .build()
        .expect("valid test configuration")
}

fn client_for(server: &MockServer) -> ZohoAdminAuth {
    ZohoAdminAuth::new(config_for(&server.uri())).expect("client")
}

#[tokio::test]
async fn test_successful_login_without_user_info() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({
            "code": "1000.abc",
            "client_id": "test-client",
            "grant_type": "authorization_code",
            "domain_suffix": ".com",
            "source": "admin_portal"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "access_token": "T",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let outcome = client
        .handle_callback(&CallbackParameters::from_query("?code=1000.abc"))
        .await;

    let CallbackOutcome::Success { session, redirect_to } = outcome else {
        panic!("expected success, got {:?}", outcome);
    };
    assert_eq!(session.access_token, "T");
    assert_eq!(session.expires_in, Some(3600));
    assert!(session.user_info.is_placeholder());
    assert_eq!(session.user_info, UserInfo::placeholder_admin());
    assert_eq!(redirect_to, "http://localhost:8082/admin/dashboard");

    let stored = client.current_session().await.unwrap().unwrap();
    assert_eq!(stored, session);
}

#[tokio::test]
async fn test_user_info_from_backend_is_kept() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "access_token": "T",
            "refresh_token": "R",
            "user_info": {"ZUID": 12345, "Email": "owner@example.com", "Display_Name": "Owner"}
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let outcome = client
        .handle_callback(&CallbackParameters::from_query("code=abc"))
        .await;

    let CallbackOutcome::Success { session, .. } = outcome else {
        panic!("expected success");
    };
    assert_eq!(session.refresh_token.as_deref(), Some("R"));
    assert_eq!(session.user_info.id.as_deref(), Some("12345"));
    assert_eq!(session.user_info.email.as_deref(), Some("owner@example.com"));
    assert!(!session.user_info.is_placeholder());
}

#[tokio::test]
async fn test_malformed_user_info_uses_placeholder() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "access_token": "T",
            "user_info": {"Email": "a@b.c", "Display_Name": ["Ann"]}
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let outcome = client
        .handle_callback(&CallbackParameters::from_query("code=abc"))
        .await;

    let CallbackOutcome::Success { session, .. } = outcome else {
        panic!("expected success, got {:?}", outcome);
    };
    assert!(session.user_info.is_placeholder());
    assert!(client.is_authenticated().await.unwrap());
}

#[tokio::test]
async fn test_oversized_lifetime_session_stays_active() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "access_token": "T",
            "expires_in": 10_000_000_000_000u64
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let outcome = client
        .handle_callback(&CallbackParameters::from_query("code=abc"))
        .await;
    assert!(outcome.is_success());

    let stored = client.current_session().await.unwrap().unwrap();
    assert_eq!(stored.expires_in, Some(10_000_000_000_000));
    assert!(stored.expires_at().is_none());
}

#[tokio::test]
async fn test_region_hints_are_forwarded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_partial_json(json!({
            "location": "in",
            "accounts_server": "https://accounts.zoho.eu",
            "domain_suffix": ".in"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "access_token": "T"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let outcome = client
        .handle_callback(&CallbackParameters::from_query(
            "code=abc&location=in&accounts-server=https%3A%2F%2Faccounts.zoho.eu",
        ))
        .await;

    let CallbackOutcome::Success { session, .. } = outcome else {
        panic!("expected success");
    };
    assert_eq!(session.domain_suffix, ".in");
}

#[tokio::test]
async fn test_same_code_is_exchanged_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "access_token": "T"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let params = CallbackParameters::from_query("code=abc");

    assert!(client.handle_callback(&params).await.is_success());
    let second = client.handle_callback(&params).await;
    assert!(matches!(
        second,
        CallbackOutcome::Skipped(SkipReason::AlreadyProcessed)
    ));
}

#[tokio::test]
async fn test_concurrent_callbacks_exchange_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "access_token": "T"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let params = CallbackParameters::from_query("code=abc");

    let (first, second) = tokio::join!(
        client.handle_callback(&params),
        client.handle_callback(&params)
    );

    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|o| o.is_success()).count(), 1);
    assert_eq!(outcomes.iter().filter(|o| o.is_skipped()).count(), 1);
}

#[tokio::test]
async fn test_clients_sharing_a_guard_exchange_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "access_token": "T"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = config_for(&mock_server.uri());
    let transport = Arc::new(ReqwestHttpTransport::new().unwrap());
    let store = Arc::new(InMemorySessionStore::new());
    let guard = Arc::new(ExchangeGuard::new());
    let classifier = Arc::new(ErrorClassifier::default());

    let first = ZohoAdminAuth::with_shared(
        config.clone(),
        transport.clone(),
        store.clone(),
        guard.clone(),
        Arc::clone(&classifier),
    );
    let second = ZohoAdminAuth::with_shared(config, transport, store, guard, classifier);

    let params = CallbackParameters::from_query("code=abc");
    assert!(first.handle_callback(&params).await.is_success());
    assert!(second.handle_callback(&params).await.is_skipped());
    assert_eq!(second.callback_state(), CallbackState::Idle);
}

#[tokio::test]
async fn test_empty_query_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let outcome = client
        .handle_callback(&CallbackParameters::from_query(""))
        .await;

    assert!(matches!(outcome, CallbackOutcome::Skipped(SkipReason::NoCode)));
    assert_eq!(client.callback_state(), CallbackState::Idle);
    assert!(client.current_session().await.unwrap().is_none());
}

#[tokio::test]
async fn test_backend_unauthorized_allows_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "success": false,
            "message": "Admin privileges required"
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "access_token": "T"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let params = CallbackParameters::from_query("code=abc");

    let outcome = client.handle_callback(&params).await;
    let CallbackOutcome::Failed {
        error,
        retryable,
        details,
        ..
    } = outcome
    else {
        panic!("expected failure");
    };
    assert_eq!(error.title, "Access Denied");
    assert!(retryable);
    assert_eq!(details.as_deref(), Some("Admin privileges required"));
    assert_eq!(client.callback_state(), CallbackState::Error(error));

    // The marker was cleared, so the same code may be tried again.
    assert!(client.handle_callback(&params).await.is_success());
}

#[tokio::test]
async fn test_backend_reports_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "invalid_code"
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let outcome = client
        .handle_callback(&CallbackParameters::from_query("code=abc"))
        .await;

    assert_eq!(outcome.error().unwrap().title, "Login Link Expired");
    assert!(client.current_session().await.unwrap().is_none());
}

#[tokio::test]
async fn test_backend_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let outcome = client
        .handle_callback(&CallbackParameters::from_query("code=abc"))
        .await;

    assert_eq!(outcome.error().unwrap().title, "Server Error");
}

#[tokio::test]
async fn test_server_error_with_request_id_is_not_access_denied() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"request_id": "req-8401"})),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let outcome = client
        .handle_callback(&CallbackParameters::from_query("code=abc"))
        .await;

    assert_eq!(outcome.error().unwrap().title, "Server Error");
}

#[tokio::test]
async fn test_unreachable_backend() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let client = ZohoAdminAuth::new(config_for(&format!("http://127.0.0.1:{}", port))).unwrap();
    let outcome = client
        .handle_callback(&CallbackParameters::from_query("code=abc"))
        .await;

    let CallbackOutcome::Failed {
        error,
        error_code,
        details,
        ..
    } = outcome
    else {
        panic!("expected failure");
    };
    assert_eq!(error.title, "Cannot Reach Server");
    assert_eq!(error_code, "ADMIN_OAUTH_TRANSPORT");
    assert!(details.is_some());
}

#[tokio::test]
async fn test_provider_error_is_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let outcome = client
        .handle_callback(&CallbackParameters::from_query(
            "error=access_denied&error_description=User+denied+access",
        ))
        .await;

    let CallbackOutcome::Failed {
        error, error_code, ..
    } = outcome
    else {
        panic!("expected failure");
    };
    assert_eq!(error.title, "Sign-In Cancelled");
    assert_eq!(error_code, "ADMIN_OAUTH_PROVIDER");
}

#[tokio::test]
async fn test_session_persists_to_file() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "access_token": "T",
            "expires_in": 3600
        })))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let client = ZohoAdminAuth::with_components(
        config_for(&mock_server.uri()),
        ReqwestHttpTransport::new().unwrap(),
        FileSessionStore::in_dir(dir.path()),
    );

    assert!(client
        .handle_callback(&CallbackParameters::from_query("code=abc"))
        .await
        .is_success());

    let reopened = FileSessionStore::in_dir(dir.path());
    let session = reopened.load().await.unwrap().unwrap();
    assert_eq!(session.access_token, "T");
    assert!(session.is_admin());

    assert!(client.logout().await.unwrap());
    assert!(reopened.load().await.unwrap().is_none());
}

#[tokio::test]
async fn test_refresh_user_info_fetches_profile() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "access_token": "T"
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(USER_INFO_PATH))
        .and(header("authorization", "Bearer T"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user_info": {"ZUID": 12345, "Email": "owner@example.com"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    assert!(client
        .handle_callback(&CallbackParameters::from_query("code=abc"))
        .await
        .is_success());

    let refreshed = client.refresh_user_info().await.unwrap().unwrap();
    assert_eq!(refreshed.user_info.id.as_deref(), Some("12345"));
    assert_eq!(
        client.current_session().await.unwrap().unwrap().user_info.email.as_deref(),
        Some("owner@example.com")
    );
}
