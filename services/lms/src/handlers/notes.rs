use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lms_core::response::ApiResponse;
use lms_domain::note::NoteVisibility;

use crate::domain::types::{Caller, Note};
use crate::error::LmsError;
use crate::handlers::display_names;
use crate::handlers::extract::{AppPath, MultipartForm};
use crate::handlers::files::AttachmentResponse;
use crate::state::AppState;
use crate::usecase::names::DisplayNames;
use crate::usecase::note::{AccessibleNotesUseCase, CreateNoteUseCase, DeleteNoteUseCase, NoteInput};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub course_id: Option<Uuid>,
    pub course_title: Option<String>,
    pub author_id: Uuid,
    pub author_name: Option<String>,
    pub visibility: NoteVisibility,
    #[serde(flatten)]
    pub attachment: Option<AttachmentResponse>,
    #[serde(serialize_with = "lms_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "lms_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl NoteResponse {
    pub fn new(note: Note, names: &DisplayNames) -> Self {
        Self {
            id: note.id,
            title: note.title,
            content: note.content,
            course_id: note.course_id,
            course_title: note.course_id.and_then(|id| names.course(id)),
            author_id: note.author_id,
            author_name: names.user(note.author_id),
            visibility: note.visibility,
            attachment: note.attachment.map(Into::into),
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub course_id: Option<Uuid>,
    pub visibility: Option<String>,
}

// ── GET /api/notes/accessible ────────────────────────────────────────────────

pub async fn accessible_notes(
    caller: Caller,
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<NoteResponse>>, LmsError> {
    let usecase = AccessibleNotesUseCase {
        notes: state.note_repo(),
        courses: state.course_repo(),
        enrollments: state.enrollment_repo(),
    };
    let notes = usecase.execute(&caller).await?;
    let names = display_names(&state).for_notes(&notes).await?;
    Ok(ApiResponse::ok(
        "notes fetched",
        notes
            .into_iter()
            .map(|note| NoteResponse::new(note, &names))
            .collect(),
    ))
}

// ── POST /api/notes ──────────────────────────────────────────────────────────

pub async fn create_note(
    caller: Caller,
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<ApiResponse<NoteResponse>, LmsError> {
    let mut form = MultipartForm::read(multipart?).await?;
    let body: NoteRequest = form.json("data")?;
    let usecase = CreateNoteUseCase {
        notes: state.note_repo(),
        courses: state.course_repo(),
        files: state.file_store(),
    };
    let note = usecase
        .execute(
            &caller,
            NoteInput {
                title: body.title,
                content: body.content,
                course_id: body.course_id,
                visibility: body.visibility,
            },
            form.file.take(),
        )
        .await?;
    let names = display_names(&state)
        .for_notes(std::slice::from_ref(&note))
        .await?;
    Ok(ApiResponse::created(
        "note created",
        NoteResponse::new(note, &names),
    ))
}

// ── DELETE /api/notes/{id} ───────────────────────────────────────────────────

pub async fn delete_note(
    caller: Caller,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<ApiResponse<()>, LmsError> {
    let usecase = DeleteNoteUseCase {
        notes: state.note_repo(),
        files: state.file_store(),
    };
    usecase.execute(&caller, id).await?;
    Ok(ApiResponse::message("note deleted"))
}
