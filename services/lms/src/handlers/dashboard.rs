use axum::extract::State;
use serde::Serialize;

use lms_core::response::ApiResponse;

use crate::domain::types::Caller;
use crate::error::LmsError;
use crate::handlers::courses::{CourseResponse, courses_response};
use crate::handlers::users::{UserResponse, UserStatsResponse};
use crate::state::AppState;
use crate::usecase::dashboard::DashboardUseCase;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboardResponse {
    #[serde(flatten)]
    pub users: UserStatsResponse,
    pub total_courses: u64,
    pub recent_users: Vec<UserResponse>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherDashboardResponse {
    pub teacher: UserResponse,
    pub courses_count: usize,
    pub students_count: i64,
    pub courses: Vec<CourseResponse>,
}

// ── GET /api/dashboard/admin ─────────────────────────────────────────────────

pub async fn admin_dashboard(
    caller: Caller,
    State(state): State<AppState>,
) -> Result<ApiResponse<AdminDashboardResponse>, LmsError> {
    let usecase = DashboardUseCase {
        users: state.user_repo(),
        courses: state.course_repo(),
    };
    let dashboard = usecase.admin(&caller).await?;
    Ok(ApiResponse::ok(
        "admin dashboard",
        AdminDashboardResponse {
            users: dashboard.users.into(),
            total_courses: dashboard.total_courses,
            recent_users: dashboard.recent_users.into_iter().map(Into::into).collect(),
        },
    ))
}

// ── GET /api/dashboard/teacher ───────────────────────────────────────────────

pub async fn teacher_dashboard(
    caller: Caller,
    State(state): State<AppState>,
) -> Result<ApiResponse<TeacherDashboardResponse>, LmsError> {
    let usecase = DashboardUseCase {
        users: state.user_repo(),
        courses: state.course_repo(),
    };
    let dashboard = usecase.teacher(&caller).await?;
    Ok(ApiResponse::ok(
        "teacher dashboard",
        TeacherDashboardResponse {
            teacher: dashboard.teacher.into(),
            courses_count: dashboard.courses_count,
            students_count: dashboard.students_count,
            courses: courses_response(&state, dashboard.courses).await?,
        },
    ))
}
