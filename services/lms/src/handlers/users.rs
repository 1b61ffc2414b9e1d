use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lms_core::response::ApiResponse;
use lms_domain::user::{Role, UserStatus};

use crate::domain::types::{Caller, User, UserStats};
use crate::error::LmsError;
use crate::handlers::extract::{AppJson, AppPath, AppQuery};
use crate::state::AppState;
use crate::usecase::user::{
    CreateUserInput, CreateUserUseCase, DeleteUserUseCase, GetUserUseCase, ListUsersUseCase,
    ProfileInput, ResetPasswordUseCase, SearchUsersUseCase, UpdateUserInput, UpdateUserStatusUseCase,
    UpdateUserUseCase, UserStatsUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

/// Public view of an account. The password hash never leaves the service.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
    pub student_id: Option<String>,
    pub subject: Option<String>,
    pub qualification: Option<String>,
    pub phone: Option<String>,
    #[serde(serialize_with = "lms_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "lms_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            status: user.status,
            student_id: user.student_id,
            subject: user.subject,
            qualification: user.qualification,
            phone: user.phone,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

fn users_response(users: Vec<User>) -> Vec<UserResponse> {
    users.into_iter().map(UserResponse::from).collect()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedUserResponse {
    pub user: UserResponse,
    /// Present only when the password was generated; shown once.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_password: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatsResponse {
    pub total_users: u64,
    pub total_students: u64,
    pub total_teachers: u64,
    pub total_admins: u64,
    pub active_users: u64,
    pub inactive_users: u64,
    pub suspended_users: u64,
}

impl From<UserStats> for UserStatsResponse {
    fn from(stats: UserStats) -> Self {
        Self {
            total_users: stats.total,
            total_students: stats.students,
            total_teachers: stats.teachers,
            total_admins: stats.admins,
            active_users: stats.active,
            inactive_users: stats.inactive,
            suspended_users: stats.suspended,
        }
    }
}

// ── GET /api/users[/students|/teachers|/admins|/role/{role}] ─────────────────

async fn list_by_role(
    caller: &Caller,
    state: &AppState,
    role: Option<Role>,
) -> Result<ApiResponse<Vec<UserResponse>>, LmsError> {
    let usecase = ListUsersUseCase {
        users: state.user_repo(),
    };
    let users = usecase.execute(caller, role).await?;
    Ok(ApiResponse::ok("users fetched", users_response(users)))
}

pub async fn list_users(
    caller: Caller,
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<UserResponse>>, LmsError> {
    list_by_role(&caller, &state, None).await
}

pub async fn list_students(
    caller: Caller,
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<UserResponse>>, LmsError> {
    list_by_role(&caller, &state, Some(Role::Student)).await
}

pub async fn list_teachers(
    caller: Caller,
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<UserResponse>>, LmsError> {
    list_by_role(&caller, &state, Some(Role::Teacher)).await
}

pub async fn list_admins(
    caller: Caller,
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<UserResponse>>, LmsError> {
    list_by_role(&caller, &state, Some(Role::Admin)).await
}

pub async fn list_users_by_role(
    caller: Caller,
    State(state): State<AppState>,
    AppPath(role): AppPath<String>,
) -> Result<ApiResponse<Vec<UserResponse>>, LmsError> {
    let role: Role = role.parse()?;
    list_by_role(&caller, &state, Some(role)).await
}

// ── GET /api/users/search?q= ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

pub async fn search_users(
    caller: Caller,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<SearchQuery>,
) -> Result<ApiResponse<Vec<UserResponse>>, LmsError> {
    let usecase = SearchUsersUseCase {
        users: state.user_repo(),
    };
    let users = usecase.execute(&caller, &query.q).await?;
    Ok(ApiResponse::ok("users fetched", users_response(users)))
}

// ── GET /api/users/stats ─────────────────────────────────────────────────────

pub async fn user_stats(
    caller: Caller,
    State(state): State<AppState>,
) -> Result<ApiResponse<UserStatsResponse>, LmsError> {
    let usecase = UserStatsUseCase {
        users: state.user_repo(),
    };
    let stats = usecase.execute(&caller).await?;
    Ok(ApiResponse::ok("user statistics", stats.into()))
}

// ── GET /api/users/{id} ──────────────────────────────────────────────────────

pub async fn get_user(
    caller: Caller,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<ApiResponse<UserResponse>, LmsError> {
    let usecase = GetUserUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(&caller, id).await?;
    Ok(ApiResponse::ok("user fetched", user.into()))
}

// ── POST /api/users/{students|teachers|admins} ───────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: Option<String>,
    pub student_id: Option<String>,
    pub subject: Option<String>,
    pub qualification: Option<String>,
    pub phone: Option<String>,
}

async fn create_with_role(
    caller: &Caller,
    state: &AppState,
    role: Role,
    body: CreateUserRequest,
) -> Result<ApiResponse<CreatedUserResponse>, LmsError> {
    let usecase = CreateUserUseCase {
        users: state.user_repo(),
        hasher: state.hasher,
    };
    let created = usecase
        .execute(
            caller,
            role,
            CreateUserInput {
                profile: ProfileInput {
                    name: body.name,
                    email: body.email,
                    student_id: body.student_id,
                    subject: body.subject,
                    qualification: body.qualification,
                    phone: body.phone,
                },
                password: body.password,
            },
        )
        .await?;
    Ok(ApiResponse::created(
        format!("{} created", role.as_str().to_lowercase()),
        CreatedUserResponse {
            user: created.user.into(),
            initial_password: created.initial_password,
        },
    ))
}

pub async fn create_student(
    caller: Caller,
    State(state): State<AppState>,
    AppJson(body): AppJson<CreateUserRequest>,
) -> Result<ApiResponse<CreatedUserResponse>, LmsError> {
    create_with_role(&caller, &state, Role::Student, body).await
}

pub async fn create_teacher(
    caller: Caller,
    State(state): State<AppState>,
    AppJson(body): AppJson<CreateUserRequest>,
) -> Result<ApiResponse<CreatedUserResponse>, LmsError> {
    create_with_role(&caller, &state, Role::Teacher, body).await
}

pub async fn create_admin(
    caller: Caller,
    State(state): State<AppState>,
    AppJson(body): AppJson<CreateUserRequest>,
) -> Result<ApiResponse<CreatedUserResponse>, LmsError> {
    create_with_role(&caller, &state, Role::Admin, body).await
}

// ── PUT /api/users/{id} ──────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
    pub student_id: Option<String>,
    pub subject: Option<String>,
    pub qualification: Option<String>,
    pub phone: Option<String>,
}

pub async fn update_user(
    caller: Caller,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<UpdateUserRequest>,
) -> Result<ApiResponse<UserResponse>, LmsError> {
    let usecase = UpdateUserUseCase {
        users: state.user_repo(),
        courses: state.course_repo(),
        hasher: state.hasher,
    };
    let user = usecase
        .execute(
            &caller,
            id,
            UpdateUserInput {
                name: body.name,
                email: body.email,
                password: body.password,
                role: body.role,
                status: body.status,
                student_id: body.student_id,
                subject: body.subject,
                qualification: body.qualification,
                phone: body.phone,
            },
        )
        .await?;
    Ok(ApiResponse::ok("user updated", user.into()))
}

// ── PATCH /api/users/{id}/status ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

pub async fn update_user_status(
    caller: Caller,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<UpdateStatusRequest>,
) -> Result<ApiResponse<UserResponse>, LmsError> {
    let usecase = UpdateUserStatusUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(&caller, id, &body.status).await?;
    Ok(ApiResponse::ok("user status updated", user.into()))
}

// ── POST /api/users/{id}/reset-password ──────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordResponse {
    pub new_password: String,
}

pub async fn reset_password(
    caller: Caller,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<ApiResponse<ResetPasswordResponse>, LmsError> {
    let usecase = ResetPasswordUseCase {
        users: state.user_repo(),
        hasher: state.hasher,
    };
    let new_password = usecase.execute(&caller, id).await?;
    Ok(ApiResponse::ok(
        "password reset",
        ResetPasswordResponse { new_password },
    ))
}

// ── DELETE /api/users/{id} ───────────────────────────────────────────────────

pub async fn delete_user(
    caller: Caller,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<ApiResponse<()>, LmsError> {
    let usecase = DeleteUserUseCase {
        users: state.user_repo(),
        files: state.file_store(),
    };
    usecase.execute(&caller, id).await?;
    Ok(ApiResponse::message("user deleted"))
}
