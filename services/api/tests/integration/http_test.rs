use axum::http::{HeaderName, HeaderValue, StatusCode, header::AUTHORIZATION};
use axum_test::TestServer;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use uuid::Uuid;

use notekeeper_api::infra::email::{EmailNotifier, LogMailer};
use notekeeper_api::infra::google::GoogleJwksVerifier;
use notekeeper_api::router::build_router;
use notekeeper_api::state::AppState;
use notekeeper_core::health::Uptime;
use notekeeper_testing::auth::MockSession;

/// Server whose store is disconnected: only paths that never reach it are exercised.
fn server() -> TestServer {
    let state = AppState {
        db: DatabaseConnection::Disconnected,
        tokens: MockSession::keys(),
        google_client_id: None,
        mailer: EmailNotifier::Log(LogMailer),
        google: GoogleJwksVerifier::default(),
        uptime: Uptime::start(),
    };
    TestServer::new(build_router(state)).unwrap()
}

fn session() -> (HeaderName, HeaderValue) {
    MockSession::new(Uuid::now_v7(), "a@x.com").header()
}

// ── /health ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_report_health_with_uptime() {
    let response = server().get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["ok"], true);
    assert!(body["uptime"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn should_attach_request_id_to_responses() {
    let response = server().get("/health").await;

    let id = response.header("x-request-id");
    assert!(id.to_str().unwrap().parse::<Uuid>().is_ok());
}

// ── session middleware ───────────────────────────────────────────────────────

#[tokio::test]
async fn should_require_authorization_header() {
    let response = server().get("/notes").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"], "missing_authorization");
    assert_eq!(body["message"], "Missing Authorization header");
}

#[tokio::test]
async fn should_reject_non_bearer_scheme() {
    let response = server()
        .get("/notes")
        .add_header(AUTHORIZATION, HeaderValue::from_static("Basic YTpi"))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error"], "missing_authorization");
}

#[tokio::test]
async fn should_reject_garbage_token() {
    let response = server()
        .delete("/notes/0190f5e2-8a4c-7c3e-9b1d-2f6a8e4c1d00")
        .add_header(AUTHORIZATION, HeaderValue::from_static("Bearer garbage"))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"], "invalid_or_expired");
    assert_eq!(body["message"], "Invalid or expired token");
}

#[tokio::test]
async fn should_reject_token_signed_with_other_secret() {
    let identity = MockSession::new(Uuid::now_v7(), "a@x.com").identity;
    let foreign = notekeeper_auth_types::token::TokenKeys::new(Some("some-other-secret".into()))
        .sign(&identity, std::time::Duration::from_secs(60))
        .unwrap()
        .token;

    let response = server()
        .get("/notes")
        .add_header(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {foreign}")).unwrap(),
        )
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error"], "invalid_or_expired");
}

// ── /notes validation ────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_note_without_title() {
    let (name, value) = session();
    let response = server()
        .post("/notes")
        .add_header(name, value)
        .json(&json!({ "content": "milk" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"][0]["field"], "title");
}

#[tokio::test]
async fn should_reject_empty_update_body() {
    let (name, value) = session();
    let response = server()
        .put("/notes/0190f5e2-8a4c-7c3e-9b1d-2f6a8e4c1d00")
        .add_header(name, value)
        .json(&json!({}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "no_fields_to_update");
}

#[tokio::test]
async fn should_return_not_found_for_non_uuid_note_id() {
    let (name, value) = session();
    let response = server()
        .put("/notes/not-a-uuid")
        .add_header(name, value)
        .json(&json!({ "title": "x" }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"], "not_found");
}

#[tokio::test]
async fn should_reject_malformed_json_body() {
    let (name, value) = session();
    let response = server()
        .post("/notes")
        .add_header(name, value)
        .content_type("application/json")
        .bytes("{not json".into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"][0]["field"], "body");
}

// ── /auth ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_validate_request_otp_body() {
    let response = server()
        .post("/auth/request-otp")
        .json(&json!({ "email": "nope", "name": "" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn should_validate_verify_otp_with_missing_fields() {
    let response = server()
        .post("/auth/verify-otp")
        .json(&json!({ "email": "a@x.com" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "validation_error");
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["code", "name"]);
}

#[tokio::test]
async fn should_report_google_not_configured() {
    let response = server()
        .post("/auth/google")
        .json(&json!({ "idToken": "header.payload.signature" }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json::<Value>()["error"], "google_not_configured");
}

#[tokio::test]
async fn should_validate_google_id_token_length() {
    let response = server()
        .post("/auth/google")
        .json(&json!({ "idToken": "short" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["details"][0]["field"], "idToken");
}
