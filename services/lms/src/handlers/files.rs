use axum::extract::State;
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::types::{Attachment, Caller};
use crate::error::LmsError;
use crate::handlers::extract::AppPath;
use crate::state::AppState;
use crate::usecase::file::DownloadFileUseCase;

/// Attachment metadata, flattened into the owning record's JSON.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentResponse {
    pub attachment_name: String,
    pub attachment_size: i64,
    pub attachment_type: String,
    pub attachment_url: String,
}

impl From<Attachment> for AttachmentResponse {
    fn from(attachment: Attachment) -> Self {
        Self {
            attachment_name: attachment.name,
            attachment_size: attachment.size,
            attachment_type: attachment.content_type,
            attachment_url: attachment.url,
        }
    }
}

// ── GET /api/files/download/{category}/{file_name} ───────────────────────────

pub async fn download_file(
    _caller: Caller,
    State(state): State<AppState>,
    AppPath((category, file_name)): AppPath<(String, String)>,
) -> Result<Response, LmsError> {
    let usecase = DownloadFileUseCase {
        files: state.file_store(),
    };
    let file = usecase.execute(&category, &file_name).await?;

    let content_type = HeaderValue::from_str(&file.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    // Stored names are sanitized to `[A-Za-z0-9._-]`, so quoting is enough.
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", file.file_name))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response())
}
