//! JSON envelope shared by every endpoint.
//!
//! Success: `{"success": true, "message": "...", "data": ...}`.
//! Failure: `{"success": false, "message": "...", "kind": "SCREAMING_CODE"}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    #[serde(skip)]
    status: StatusCode,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// `200 OK` with a payload.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::OK,
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    /// `201 Created` with a payload.
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::ok(message, data)
        }
    }
}

impl ApiResponse<()> {
    /// `200 OK` without a payload.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Render a failure envelope.
pub fn failure(status: StatusCode, kind: &str, message: &str) -> Response {
    let body = serde_json::json!({
        "success": false,
        "message": message,
        "kind": kind,
    });
    (status, Json(body)).into_response()
}

/// Router fallback for paths no route matches.
pub async fn route_not_found() -> Response {
    failure(StatusCode::NOT_FOUND, "NOT_FOUND", "route not found")
}

/// Router fallback for a known path hit with an unsupported method.
pub async fn method_not_allowed() -> Response {
    failure(
        StatusCode::METHOD_NOT_ALLOWED,
        "METHOD_NOT_ALLOWED",
        "method not allowed",
    )
}
