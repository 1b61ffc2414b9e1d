use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lms_core::response::ApiResponse;

use crate::domain::types::{Caller, Submission};
use crate::error::LmsError;
use crate::handlers::display_names;
use crate::handlers::extract::{AppJson, AppPath, MultipartForm};
use crate::handlers::files::AttachmentResponse;
use crate::infra::db::{DbAssignmentRepository, DbCourseRepository, DbSubmissionRepository};
use crate::state::AppState;
use crate::usecase::names::DisplayNames;
use crate::usecase::submission::{GradeSubmissionUseCase, SubmissionQueriesUseCase, SubmitUseCase};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub assignment_title: Option<String>,
    pub course_id: Option<Uuid>,
    pub course_title: Option<String>,
    pub student_id: Uuid,
    pub student_name: Option<String>,
    pub content: String,
    #[serde(flatten)]
    pub attachment: Option<AttachmentResponse>,
    pub graded: bool,
    pub grade: Option<i32>,
    pub feedback: Option<String>,
    #[serde(serialize_with = "lms_core::serde::to_rfc3339_ms")]
    pub submitted_at: DateTime<Utc>,
    #[serde(serialize_with = "lms_core::serde::to_rfc3339_ms_opt")]
    pub graded_at: Option<DateTime<Utc>>,
}

impl SubmissionResponse {
    pub fn new(submission: Submission, names: &DisplayNames) -> Self {
        let assignment = names.assignment(submission.assignment_id);
        let course_id = assignment.as_ref().map(|a| a.course_id);
        Self {
            id: submission.id,
            assignment_id: submission.assignment_id,
            assignment_title: assignment.map(|a| a.title),
            course_id,
            course_title: course_id.and_then(|id| names.course(id)),
            student_id: submission.student_id,
            student_name: names.user(submission.student_id),
            content: submission.content,
            attachment: submission.attachment.map(Into::into),
            graded: submission.graded,
            grade: submission.grade,
            feedback: submission.feedback,
            submitted_at: submission.submitted_at,
            graded_at: submission.graded_at,
        }
    }
}

async fn submissions_response(
    state: &AppState,
    submissions: Vec<Submission>,
) -> Result<Vec<SubmissionResponse>, LmsError> {
    let names = display_names(state).for_submissions(&submissions).await?;
    Ok(submissions
        .into_iter()
        .map(|submission| SubmissionResponse::new(submission, &names))
        .collect())
}

async fn submission_response(
    state: &AppState,
    submission: Submission,
) -> Result<SubmissionResponse, LmsError> {
    let names = display_names(state)
        .for_submissions(std::slice::from_ref(&submission))
        .await?;
    Ok(SubmissionResponse::new(submission, &names))
}

fn queries(
    state: &AppState,
) -> SubmissionQueriesUseCase<DbSubmissionRepository, DbAssignmentRepository, DbCourseRepository>
{
    SubmissionQueriesUseCase {
        submissions: state.submission_repo(),
        assignments: state.assignment_repo(),
        courses: state.course_repo(),
    }
}

// ── POST /api/submissions/{assignment_id} ────────────────────────────────────

pub async fn submit(
    caller: Caller,
    State(state): State<AppState>,
    AppPath(assignment_id): AppPath<Uuid>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<ApiResponse<SubmissionResponse>, LmsError> {
    let mut form = MultipartForm::read(multipart?).await?;
    let usecase = SubmitUseCase {
        submissions: state.submission_repo(),
        assignments: state.assignment_repo(),
        enrollments: state.enrollment_repo(),
        files: state.file_store(),
    };
    let submission = usecase
        .execute(&caller, assignment_id, form.text("content"), form.file.take())
        .await?;
    Ok(ApiResponse::created(
        "submission received",
        submission_response(&state, submission).await?,
    ))
}

// ── PUT /api/submissions/{id}/grade ──────────────────────────────────────────

#[derive(Deserialize)]
pub struct GradeRequest {
    pub grade: i32,
    pub feedback: Option<String>,
}

pub async fn grade_submission(
    caller: Caller,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<GradeRequest>,
) -> Result<ApiResponse<SubmissionResponse>, LmsError> {
    let usecase = GradeSubmissionUseCase {
        submissions: state.submission_repo(),
        assignments: state.assignment_repo(),
        courses: state.course_repo(),
    };
    let submission = usecase
        .execute(&caller, id, body.grade, body.feedback)
        .await?;
    Ok(ApiResponse::ok(
        "submission graded",
        submission_response(&state, submission).await?,
    ))
}

// ── GET /api/submissions/assignment/{assignment_id} ──────────────────────────

pub async fn assignment_submissions(
    caller: Caller,
    State(state): State<AppState>,
    AppPath(assignment_id): AppPath<Uuid>,
) -> Result<ApiResponse<Vec<SubmissionResponse>>, LmsError> {
    let submissions = queries(&state)
        .by_assignment(&caller, assignment_id)
        .await?;
    Ok(ApiResponse::ok(
        "submissions fetched",
        submissions_response(&state, submissions).await?,
    ))
}

// ── GET /api/submissions/my ──────────────────────────────────────────────────

pub async fn my_submissions(
    caller: Caller,
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<SubmissionResponse>>, LmsError> {
    let submissions = queries(&state).mine(&caller).await?;
    Ok(ApiResponse::ok(
        "submissions fetched",
        submissions_response(&state, submissions).await?,
    ))
}

// ── GET /api/submissions/teacher ─────────────────────────────────────────────

pub async fn teacher_submissions(
    caller: Caller,
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<SubmissionResponse>>, LmsError> {
    let submissions = queries(&state).for_teacher(&caller).await?;
    Ok(ApiResponse::ok(
        "submissions fetched",
        submissions_response(&state, submissions).await?,
    ))
}

// ── GET /api/submissions/{id} ────────────────────────────────────────────────

pub async fn get_submission(
    caller: Caller,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<ApiResponse<SubmissionResponse>, LmsError> {
    let submission = queries(&state).get(&caller, id).await?;
    Ok(ApiResponse::ok(
        "submission fetched",
        submission_response(&state, submission).await?,
    ))
}
