use chrono::Utc;

use lms_auth_types::token::{issue_token, validate_token};
use lms_domain::user::{Role, UserStatus};

use crate::domain::repository::UserRepository;
use crate::domain::types::{Caller, User, normalize_email};
use crate::error::LmsError;
use crate::infra::password::{PasswordHasher, validate_password};
use crate::usecase::user::{ProfileInput, new_user};

/// Signed session returned by login and registration.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub expires_at: u64,
    pub user: User,
}

fn open_session(user: User, secret: &str, ttl_secs: u64) -> Result<Session, LmsError> {
    let (token, expires_at) = issue_token(&user.id.to_string(), &user.email, secret, ttl_secs)
        .map_err(|e| LmsError::Internal(anyhow::Error::new(e).context("issue token")))?;
    Ok(Session {
        token,
        expires_at,
        user,
    })
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

pub struct LoginUseCase<R: UserRepository> {
    pub users: R,
    pub hasher: PasswordHasher,
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
}

impl<R: UserRepository> LoginUseCase<R> {
    /// Every failure is the same `InvalidCredentials` so callers cannot probe
    /// which factor was wrong.
    pub async fn execute(&self, input: LoginInput) -> Result<Session, LmsError> {
        let email = normalize_email(&input.email);
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(LmsError::InvalidCredentials)?;
        if !self.hasher.verify(&input.password, &user.password_hash) {
            return Err(LmsError::InvalidCredentials);
        }
        if user.status != UserStatus::Active {
            tracing::info!(user_id = %user.id, status = %user.status, "login refused for inactive account");
            return Err(LmsError::InvalidCredentials);
        }
        open_session(user, &self.jwt_secret, self.token_ttl_secs)
    }
}

// ── Register ─────────────────────────────────────────────────────────────────

pub struct RegisterInput {
    pub profile: ProfileInput,
    pub password: String,
    pub role: Option<String>,
}

pub struct RegisterUseCase<R: UserRepository> {
    pub users: R,
    pub hasher: PasswordHasher,
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
}

impl<R: UserRepository> RegisterUseCase<R> {
    pub async fn execute(&self, input: RegisterInput) -> Result<Session, LmsError> {
        let role = match input.role.as_deref().map(str::trim) {
            None | Some("") => Role::Student,
            Some(raw) => raw.parse::<Role>()?,
        };
        if role == Role::Admin {
            return Err(LmsError::Forbidden(
                "admin accounts are issued by an administrator",
            ));
        }
        validate_password(&input.password)?;
        let hash = self.hasher.hash(&input.password)?;
        let user = new_user(&self.users, input.profile, role, hash).await?;
        self.users.create(&user).await?;
        tracing::info!(user_id = %user.id, role = %role, "user registered");
        open_session(user, &self.jwt_secret, self.token_ttl_secs)
    }
}

// ── ChangePassword ───────────────────────────────────────────────────────────

pub struct ChangePasswordUseCase<R: UserRepository> {
    pub users: R,
    pub hasher: PasswordHasher,
}

impl<R: UserRepository> ChangePasswordUseCase<R> {
    pub async fn execute(
        &self,
        caller: &Caller,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), LmsError> {
        let mut user = self
            .users
            .find_by_id(caller.id)
            .await?
            .ok_or(LmsError::Unauthenticated)?;
        if !self.hasher.verify(current_password, &user.password_hash) {
            return Err(LmsError::validation("current password is incorrect"));
        }
        validate_password(new_password)?;
        user.password_hash = self.hasher.hash(new_password)?;
        user.updated_at = Utc::now();
        self.users.update(&user).await?;
        tracing::info!(user_id = %user.id, "password changed");
        Ok(())
    }
}

// ── GetMe ────────────────────────────────────────────────────────────────────

pub struct GetMeUseCase<R: UserRepository> {
    pub users: R,
}

impl<R: UserRepository> GetMeUseCase<R> {
    pub async fn execute(&self, caller: &Caller) -> Result<User, LmsError> {
        self.users
            .find_by_id(caller.id)
            .await?
            .ok_or(LmsError::Unauthenticated)
    }
}

// ── ResolveCaller ────────────────────────────────────────────────────────────

pub struct ResolveCallerUseCase<R: UserRepository> {
    pub users: R,
    pub jwt_secret: String,
}

impl<R: UserRepository> ResolveCallerUseCase<R> {
    /// Fails closed: any token or account problem is `Unauthenticated`.
    pub async fn execute(&self, token: Option<&str>) -> Result<Caller, LmsError> {
        let token = token.ok_or(LmsError::Unauthenticated)?;
        let info = validate_token(token, &self.jwt_secret).map_err(|e| {
            tracing::debug!(error = %e, "bearer token rejected");
            LmsError::Unauthenticated
        })?;
        let user = self
            .users
            .find_by_email(&info.email)
            .await?
            .ok_or(LmsError::Unauthenticated)?;
        // Same email, different account: the token predates a re-registration.
        if user.id.to_string() != info.user_id {
            return Err(LmsError::Unauthenticated);
        }
        if user.status != UserStatus::Active {
            return Err(LmsError::Unauthenticated);
        }
        Ok(Caller::from(&user))
    }
}
