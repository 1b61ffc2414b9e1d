use axum::extract::State;
use serde::{Deserialize, Serialize};

use lms_core::response::ApiResponse;

use crate::domain::types::Caller;
use crate::error::LmsError;
use crate::handlers::extract::AppJson;
use crate::handlers::users::UserResponse;
use crate::state::AppState;
use crate::usecase::auth::{
    ChangePasswordUseCase, GetMeUseCase, LoginInput, LoginUseCase, RegisterInput,
    RegisterUseCase, Session,
};
use crate::usecase::user::ProfileInput;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    pub token_type: &'static str,
    /// Unix seconds.
    pub expires_at: u64,
    pub user: UserResponse,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            token: session.token,
            token_type: "Bearer",
            expires_at: session.expires_at,
            user: session.user.into(),
        }
    }
}

// ── POST /api/auth/login ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    AppJson(body): AppJson<LoginRequest>,
) -> Result<ApiResponse<SessionResponse>, LmsError> {
    let usecase = LoginUseCase {
        users: state.user_repo(),
        hasher: state.hasher,
        jwt_secret: state.jwt_secret.clone(),
        token_ttl_secs: state.token_ttl_secs,
    };
    let session = usecase
        .execute(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await?;
    Ok(ApiResponse::ok("login successful", session.into()))
}

// ── POST /api/auth/register ──────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
    pub student_id: Option<String>,
    pub subject: Option<String>,
    pub qualification: Option<String>,
    pub phone: Option<String>,
}

pub async fn register(
    State(state): State<AppState>,
    AppJson(body): AppJson<RegisterRequest>,
) -> Result<ApiResponse<SessionResponse>, LmsError> {
    let usecase = RegisterUseCase {
        users: state.user_repo(),
        hasher: state.hasher,
        jwt_secret: state.jwt_secret.clone(),
        token_ttl_secs: state.token_ttl_secs,
    };
    let session = usecase
        .execute(RegisterInput {
            profile: ProfileInput {
                name: body.name,
                email: body.email,
                student_id: body.student_id,
                subject: body.subject,
                qualification: body.qualification,
                phone: body.phone,
            },
            password: body.password,
            role: body.role,
        })
        .await?;
    Ok(ApiResponse::created("registration successful", session.into()))
}

// ── GET /api/auth/me ─────────────────────────────────────────────────────────

pub async fn me(
    caller: Caller,
    State(state): State<AppState>,
) -> Result<ApiResponse<UserResponse>, LmsError> {
    let usecase = GetMeUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(&caller).await?;
    Ok(ApiResponse::ok("current user", user.into()))
}

// ── PUT /api/auth/password ───────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

pub async fn change_password(
    caller: Caller,
    State(state): State<AppState>,
    AppJson(body): AppJson<ChangePasswordRequest>,
) -> Result<ApiResponse<()>, LmsError> {
    let usecase = ChangePasswordUseCase {
        users: state.user_repo(),
        hasher: state.hasher,
    };
    usecase
        .execute(&caller, &body.current_password, &body.new_password)
        .await?;
    Ok(ApiResponse::message("password changed"))
}
