use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lms_core::response::ApiResponse;

use crate::domain::types::{Assignment, Caller};
use crate::error::LmsError;
use crate::handlers::display_names;
use crate::handlers::extract::{AppPath, MultipartForm};
use crate::handlers::files::AttachmentResponse;
use crate::state::AppState;
use crate::usecase::assignment::{
    AssignmentInput, CreateAssignmentUseCase, DeleteAssignmentUseCase, ListAssignmentsUseCase,
    UpdateAssignmentUseCase,
};
use crate::usecase::names::DisplayNames;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentResponse {
    pub id: Uuid,
    pub course_id: Uuid,
    pub course_name: Option<String>,
    pub title: String,
    pub description: String,
    #[serde(serialize_with = "lms_core::serde::to_rfc3339_ms")]
    pub due_date: DateTime<Utc>,
    pub max_points: i32,
    pub created_by: Uuid,
    pub created_by_name: Option<String>,
    #[serde(flatten)]
    pub attachment: Option<AttachmentResponse>,
    #[serde(serialize_with = "lms_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "lms_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl AssignmentResponse {
    pub fn new(assignment: Assignment, names: &DisplayNames) -> Self {
        Self {
            id: assignment.id,
            course_id: assignment.course_id,
            course_name: names.course(assignment.course_id),
            title: assignment.title,
            description: assignment.description,
            due_date: assignment.due_date,
            max_points: assignment.max_points,
            created_by: assignment.created_by,
            created_by_name: names.user(assignment.created_by),
            attachment: assignment.attachment.map(Into::into),
            created_at: assignment.created_at,
            updated_at: assignment.updated_at,
        }
    }
}

async fn assignments_response(
    state: &AppState,
    assignments: Vec<Assignment>,
) -> Result<Vec<AssignmentResponse>, LmsError> {
    let names = display_names(state).for_assignments(&assignments).await?;
    Ok(assignments
        .into_iter()
        .map(|assignment| AssignmentResponse::new(assignment, &names))
        .collect())
}

async fn assignment_response(
    state: &AppState,
    assignment: Assignment,
) -> Result<AssignmentResponse, LmsError> {
    let names = display_names(state)
        .for_assignments(std::slice::from_ref(&assignment))
        .await?;
    Ok(AssignmentResponse::new(assignment, &names))
}

/// JSON carried in the multipart `data` part.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRequest {
    pub course_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub max_points: Option<i32>,
}

impl From<AssignmentRequest> for AssignmentInput {
    fn from(body: AssignmentRequest) -> Self {
        Self {
            course_id: body.course_id,
            title: body.title,
            description: body.description,
            due_date: body.due_date,
            max_points: body.max_points,
        }
    }
}

// ── POST /api/assignments ────────────────────────────────────────────────────

pub async fn create_assignment(
    caller: Caller,
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<ApiResponse<AssignmentResponse>, LmsError> {
    let mut form = MultipartForm::read(multipart?).await?;
    let body: AssignmentRequest = form.json("data")?;
    let usecase = CreateAssignmentUseCase {
        assignments: state.assignment_repo(),
        courses: state.course_repo(),
        files: state.file_store(),
    };
    let assignment = usecase
        .execute(&caller, body.into(), form.file.take())
        .await?;
    Ok(ApiResponse::created(
        "assignment created",
        assignment_response(&state, assignment).await?,
    ))
}

// ── GET /api/assignments ─────────────────────────────────────────────────────

pub async fn list_assignments(
    _caller: Caller,
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<AssignmentResponse>>, LmsError> {
    let usecase = ListAssignmentsUseCase {
        assignments: state.assignment_repo(),
    };
    let assignments = usecase.all().await?;
    Ok(ApiResponse::ok(
        "assignments fetched",
        assignments_response(&state, assignments).await?,
    ))
}

// ── GET /api/assignments/course/{course_id} ──────────────────────────────────

pub async fn course_assignments(
    _caller: Caller,
    State(state): State<AppState>,
    AppPath(course_id): AppPath<Uuid>,
) -> Result<ApiResponse<Vec<AssignmentResponse>>, LmsError> {
    let usecase = ListAssignmentsUseCase {
        assignments: state.assignment_repo(),
    };
    let assignments = usecase.by_course(course_id).await?;
    Ok(ApiResponse::ok(
        "assignments fetched",
        assignments_response(&state, assignments).await?,
    ))
}

// ── GET /api/assignments/{id} ────────────────────────────────────────────────

pub async fn get_assignment(
    _caller: Caller,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<ApiResponse<AssignmentResponse>, LmsError> {
    let usecase = ListAssignmentsUseCase {
        assignments: state.assignment_repo(),
    };
    let assignment = usecase.get(id).await?;
    Ok(ApiResponse::ok(
        "assignment fetched",
        assignment_response(&state, assignment).await?,
    ))
}

// ── PUT /api/assignments/{id} ────────────────────────────────────────────────

pub async fn update_assignment(
    caller: Caller,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<ApiResponse<AssignmentResponse>, LmsError> {
    let mut form = MultipartForm::read(multipart?).await?;
    let body: AssignmentRequest = form.json("data")?;
    let usecase = UpdateAssignmentUseCase {
        assignments: state.assignment_repo(),
        courses: state.course_repo(),
        files: state.file_store(),
    };
    let assignment = usecase
        .execute(&caller, id, body.into(), form.file.take())
        .await?;
    Ok(ApiResponse::ok(
        "assignment updated",
        assignment_response(&state, assignment).await?,
    ))
}

// ── DELETE /api/assignments/{id} ─────────────────────────────────────────────

pub async fn delete_assignment(
    caller: Caller,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<ApiResponse<()>, LmsError> {
    let usecase = DeleteAssignmentUseCase {
        assignments: state.assignment_repo(),
        courses: state.course_repo(),
        files: state.file_store(),
    };
    usecase.execute(&caller, id).await?;
    Ok(ApiResponse::message("assignment deleted"))
}
