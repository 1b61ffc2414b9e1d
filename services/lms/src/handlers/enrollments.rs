use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lms_core::response::ApiResponse;
use lms_domain::enrollment::EnrollmentStatus;

use crate::domain::types::{Caller, EnrolledCourse, Enrollment, EnrollmentStats, RosterEntry};
use crate::error::LmsError;
use crate::handlers::courses::CourseResponse;
use crate::handlers::display_names;
use crate::handlers::extract::{AppJson, AppPath};
use crate::handlers::users::UserResponse;
use crate::infra::db::{DbCourseRepository, DbEnrollmentRepository};
use crate::state::AppState;
use crate::usecase::enrollment::{
    CourseRosterUseCase, EnrollUseCase, MyEnrollmentsUseCase, UnenrollUseCase,
    UpdateProgressUseCase,
};
use crate::usecase::names::DisplayNames;

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentResponse {
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub progress: i32,
    pub completed: bool,
    pub status: EnrollmentStatus,
    #[serde(serialize_with = "lms_core::serde::to_rfc3339_ms")]
    pub enrolled_at: DateTime<Utc>,
    #[serde(serialize_with = "lms_core::serde::to_rfc3339_ms_opt")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<Enrollment> for EnrollmentResponse {
    fn from(enrollment: Enrollment) -> Self {
        Self {
            status: enrollment.status(),
            id: enrollment.id,
            student_id: enrollment.student_id,
            course_id: enrollment.course_id,
            progress: enrollment.progress,
            completed: enrollment.completed,
            enrolled_at: enrollment.enrolled_at,
            completed_at: enrollment.completed_at,
        }
    }
}

#[derive(Serialize)]
pub struct EnrolledCourseResponse {
    #[serde(flatten)]
    pub enrollment: EnrollmentResponse,
    pub course: CourseResponse,
}

impl EnrolledCourseResponse {
    pub fn new(entry: EnrolledCourse, names: &DisplayNames) -> Self {
        Self {
            enrollment: entry.enrollment.into(),
            course: CourseResponse::new(entry.course, names),
        }
    }
}

#[derive(Serialize)]
pub struct RosterEntryResponse {
    #[serde(flatten)]
    pub enrollment: EnrollmentResponse,
    pub student: UserResponse,
}

impl From<RosterEntry> for RosterEntryResponse {
    fn from(entry: RosterEntry) -> Self {
        Self {
            enrollment: entry.enrollment.into(),
            student: entry.student.into(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentStatsResponse {
    pub total_enrollments: u64,
    pub completed_courses: u64,
    pub in_progress_courses: u64,
    pub not_started_courses: u64,
    pub average_progress: f64,
}

impl From<EnrollmentStats> for EnrollmentStatsResponse {
    fn from(stats: EnrollmentStats) -> Self {
        Self {
            total_enrollments: stats.total,
            completed_courses: stats.completed,
            in_progress_courses: stats.in_progress,
            not_started_courses: stats.not_started,
            average_progress: stats.average_progress,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentCheckResponse {
    pub course_id: Uuid,
    pub enrolled: bool,
}

fn my_enrollments(
    state: &AppState,
) -> MyEnrollmentsUseCase<DbEnrollmentRepository, DbCourseRepository> {
    MyEnrollmentsUseCase {
        enrollments: state.enrollment_repo(),
        courses: state.course_repo(),
    }
}

// ── POST /api/enrollments/course/{course_id} ─────────────────────────────────

pub async fn enroll(
    caller: Caller,
    State(state): State<AppState>,
    AppPath(course_id): AppPath<Uuid>,
) -> Result<ApiResponse<EnrollmentResponse>, LmsError> {
    let usecase = EnrollUseCase {
        enrollments: state.enrollment_repo(),
        courses: state.course_repo(),
    };
    let enrollment = usecase.execute(&caller, course_id).await?;
    Ok(ApiResponse::created("enrolled", enrollment.into()))
}

// ── GET /api/enrollments/my-courses ──────────────────────────────────────────

pub async fn my_courses(
    caller: Caller,
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<EnrolledCourseResponse>>, LmsError> {
    let entries = my_enrollments(&state).courses(&caller).await?;
    let names = display_names(&state)
        .for_courses(entries.iter().map(|e| &e.course))
        .await?;
    Ok(ApiResponse::ok(
        "enrollments fetched",
        entries
            .into_iter()
            .map(|entry| EnrolledCourseResponse::new(entry, &names))
            .collect(),
    ))
}

// ── GET /api/enrollments/my-course-ids ───────────────────────────────────────

pub async fn my_course_ids(
    caller: Caller,
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Uuid>>, LmsError> {
    let ids = my_enrollments(&state).course_ids(&caller).await?;
    Ok(ApiResponse::ok("enrolled course ids", ids))
}

// ── GET /api/enrollments/my-stats ────────────────────────────────────────────

pub async fn my_stats(
    caller: Caller,
    State(state): State<AppState>,
) -> Result<ApiResponse<EnrollmentStatsResponse>, LmsError> {
    let stats = my_enrollments(&state).stats(&caller).await?;
    Ok(ApiResponse::ok("enrollment statistics", stats.into()))
}

// ── GET /api/enrollments/check/{course_id} ───────────────────────────────────

pub async fn check_enrollment(
    caller: Caller,
    State(state): State<AppState>,
    AppPath(course_id): AppPath<Uuid>,
) -> Result<ApiResponse<EnrollmentCheckResponse>, LmsError> {
    let enrolled = my_enrollments(&state)
        .is_enrolled(&caller, course_id)
        .await?;
    Ok(ApiResponse::ok(
        "enrollment checked",
        EnrollmentCheckResponse {
            course_id,
            enrolled,
        },
    ))
}

// ── GET /api/enrollments/course/{course_id}/students ─────────────────────────

pub async fn course_roster(
    caller: Caller,
    State(state): State<AppState>,
    AppPath(course_id): AppPath<Uuid>,
) -> Result<ApiResponse<Vec<RosterEntryResponse>>, LmsError> {
    let usecase = CourseRosterUseCase {
        enrollments: state.enrollment_repo(),
        courses: state.course_repo(),
        users: state.user_repo(),
    };
    let roster = usecase.execute(&caller, course_id).await?;
    Ok(ApiResponse::ok(
        "course students fetched",
        roster.into_iter().map(Into::into).collect(),
    ))
}

// ── PUT /api/enrollments/{id}/progress ───────────────────────────────────────

#[derive(Deserialize)]
pub struct ProgressRequest {
    pub progress: i32,
}

pub async fn update_progress(
    caller: Caller,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<ProgressRequest>,
) -> Result<ApiResponse<EnrollmentResponse>, LmsError> {
    let usecase = UpdateProgressUseCase {
        enrollments: state.enrollment_repo(),
    };
    let enrollment = usecase.execute(&caller, id, body.progress).await?;
    Ok(ApiResponse::ok("progress updated", enrollment.into()))
}

// ── PUT /api/enrollments/{id}/complete ───────────────────────────────────────

pub async fn complete_enrollment(
    caller: Caller,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<ApiResponse<EnrollmentResponse>, LmsError> {
    let usecase = UpdateProgressUseCase {
        enrollments: state.enrollment_repo(),
    };
    let enrollment = usecase.complete(&caller, id).await?;
    Ok(ApiResponse::ok("course completed", enrollment.into()))
}

// ── DELETE /api/enrollments/{id} ─────────────────────────────────────────────

pub async fn unenroll(
    caller: Caller,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<ApiResponse<()>, LmsError> {
    let usecase = UnenrollUseCase {
        enrollments: state.enrollment_repo(),
    };
    usecase.execute(&caller, id).await?;
    Ok(ApiResponse::message("unenrolled"))
}
