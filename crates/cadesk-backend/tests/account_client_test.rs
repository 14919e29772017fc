//! Contract tests for AccountClient: token introspection and profile lookup.
//!
//! ## Endpoints Tested
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | GET    | `/auth/v1/user` | `user_for_token_*` |
//! | GET    | `/rest/v1/accounts` | `profile_*` |

use cadesk_backend::{BackendClient, BackendConfig, BackendError};
use cadesk_core::{AccessToken, AccountKind, UserId};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USER: &str = "6ba7b810-9dad-11d1-80b4-00c04fd430c8";

fn test_client(mock_server: &MockServer) -> BackendClient {
    BackendClient::new(BackendConfig::local_mock(&mock_server.uri(), "service-key")).unwrap()
}

// ── GET /auth/v1/user ───────────────────────────────────────────────

#[tokio::test]
async fn user_for_token_sends_caller_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("authorization", "Bearer caller-token"))
        .and(header("apikey", "service-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": USER,
            "email": "ravi@iyer-associates.in",
            "aud": "authenticated"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let user = test_client(&mock_server)
        .accounts()
        .user_for_token(&AccessToken::new("caller-token"))
        .await
        .unwrap()
        .expect("token should resolve");
    assert_eq!(user.id.to_string(), USER);
    assert_eq!(user.email.as_deref(), Some("ravi@iyer-associates.in"));
}

#[tokio::test]
async fn user_for_token_returns_none_on_401() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "message": "invalid JWT"
        })))
        .mount(&mock_server)
        .await;

    let user = test_client(&mock_server)
        .accounts()
        .user_for_token(&AccessToken::new("expired"))
        .await
        .unwrap();
    assert!(user.is_none());
}

#[tokio::test]
async fn user_for_token_surfaces_server_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server)
        .accounts()
        .user_for_token(&AccessToken::new("t"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(502));
}

// ── GET /rest/v1/accounts ───────────────────────────────────────────

#[tokio::test]
async fn profile_resolves_business_in_one_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/accounts"))
        .and(query_param("user_id", format!("eq.{USER}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
            "account_type": "business",
            "user_id": USER,
            "company_name": "Kaveri Foods Pvt Ltd",
            "gstin": "29ABCDE1234F1Z5",
            "pan": "ABCDE1234F",
            "onboarding_completed": false
        }])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let user: UserId = USER.parse().unwrap();
    let profile = test_client(&mock_server)
        .accounts()
        .profile(user)
        .await
        .unwrap()
        .expect("profile exists");
    assert_eq!(profile.kind(), AccountKind::Business);
    assert!(!profile.onboarding_completed());
}

#[tokio::test]
async fn profile_is_none_before_onboarding() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&mock_server)
        .await;

    let profile = test_client(&mock_server)
        .accounts()
        .profile(UserId::new())
        .await
        .unwrap();
    assert!(profile.is_none());
}

#[tokio::test]
async fn profile_rejects_malformed_pan() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
            "account_type": "business",
            "user_id": USER,
            "company_name": "Kaveri Foods Pvt Ltd",
            "pan": "1234"
        }])))
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server)
        .accounts()
        .profile(UserId::new())
        .await
        .unwrap_err();
    match err {
        BackendError::MalformedRow { reason, .. } => assert!(reason.contains("pan")),
        other => panic!("expected MalformedRow, got {other:?}"),
    }
}

#[tokio::test]
async fn profile_rejects_unknown_account_type() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
            "account_type": "auditor",
            "user_id": USER
        }])))
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server)
        .accounts()
        .profile(UserId::new())
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::MalformedRow { index: 0, .. }));
}
