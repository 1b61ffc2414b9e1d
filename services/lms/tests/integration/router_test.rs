use axum::Router;
use axum::http::{HeaderName, HeaderValue, StatusCode, header::AUTHORIZATION};
use axum::routing::get;
use axum_test::TestServer;
use bytes::Bytes;
use sea_orm::DatabaseConnection;
use serde_json::Value;

use lms_core::middleware::catch_panic_layer;
use lms_server::router::build_router;
use lms_server::state::AppState;

use crate::helpers::{TEST_HASHER, TEST_JWT_SECRET};

/// A router whose database is never reached: every request here is
/// answered by extractors or routing alone.
fn server() -> TestServer {
    let state = AppState {
        db: DatabaseConnection::Disconnected,
        jwt_secret: TEST_JWT_SECRET.to_owned(),
        token_ttl_secs: 3600,
        upload_dir: std::env::temp_dir().join("lms-router-test"),
        max_upload_bytes: 1024 * 1024,
        hasher: TEST_HASHER,
    };
    TestServer::new(build_router(state)).unwrap()
}

#[tokio::test]
async fn should_answer_health_probes() {
    let server = server();
    server.get("/healthz").await.assert_status_ok();
    server.get("/readyz").await.assert_status_ok();
}

#[tokio::test]
async fn should_reject_missing_bearer_token() {
    let response = server().get("/api/auth/me").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["kind"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn should_reject_garbage_bearer_token() {
    let response = server()
        .get("/api/enrollments/my-courses")
        .add_header(AUTHORIZATION, HeaderValue::from_static("Bearer not-a-jwt"))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_map_malformed_json_to_validation_error() {
    let response = server()
        .post("/api/auth/login")
        .content_type("application/json")
        .bytes(Bytes::from_static(b"{\"email\": "))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["kind"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn should_assign_and_echo_request_ids() {
    let server = server();

    let generated = server.get("/healthz").await;
    assert!(generated.headers().contains_key("x-request-id"));

    let echoed = server
        .get("/healthz")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("trace-me-123"),
        )
        .await;
    assert_eq!(
        echoed.headers().get("x-request-id").unwrap(),
        "trace-me-123"
    );
}

#[tokio::test]
async fn should_return_not_found_for_unknown_route() {
    let server = server();

    for path in ["/api/nope", "/nope"] {
        let response = server.get(path).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["kind"], "NOT_FOUND");
    }
}

#[tokio::test]
async fn should_return_envelope_for_unsupported_method() {
    let response = server().patch("/api/courses").await;

    assert_eq!(response.status_code(), StatusCode::METHOD_NOT_ALLOWED);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["kind"], "METHOD_NOT_ALLOWED");
}

async fn explode() -> &'static str {
    panic!("handler blew up")
}

#[tokio::test]
async fn should_render_handler_panic_as_internal_error() {
    let app = Router::new()
        .route("/explode", get(explode))
        .layer(catch_panic_layer());
    let response = TestServer::new(app).unwrap().get("/explode").await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["kind"], "INTERNAL");
    assert_eq!(body["message"], "internal error");
}
