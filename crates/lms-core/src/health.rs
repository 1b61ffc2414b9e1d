use axum::http::StatusCode;

/// Handler for `GET /healthz`, the liveness probe.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Handler for `GET /readyz`, the readiness probe.
pub async fn readyz() -> StatusCode {
    StatusCode::OK
}
