use chrono::Utc;
use uuid::Uuid;

use lms_domain::user::{Role, UserStatus};

use crate::domain::policy::ensure_admin;
use crate::domain::repository::{CourseRepository, FileStore, UserRepository};
use crate::domain::types::{Caller, User, UserStats, normalize_email};
use crate::error::LmsError;
use crate::infra::password::{PasswordHasher, generate_password, validate_password};

/// Trim, and treat blank as absent.
pub(crate) fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

pub(crate) fn validate_name(name: &str) -> Result<String, LmsError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LmsError::validation("name is required"));
    }
    Ok(name.to_owned())
}

pub(crate) fn validate_email(email: &str) -> Result<String, LmsError> {
    let email = normalize_email(email);
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.contains('@'),
        None => false,
    };
    if !valid {
        return Err(LmsError::validation("a valid email is required"));
    }
    Ok(email)
}

/// Reject an email or student id already held by another account.
pub(crate) async fn ensure_available<R: UserRepository>(
    users: &R,
    email: &str,
    student_id: Option<&str>,
    except: Option<Uuid>,
) -> Result<(), LmsError> {
    if let Some(existing) = users.find_by_email(email).await? {
        if Some(existing.id) != except {
            return Err(LmsError::EmailTaken);
        }
    }
    if let Some(student_id) = student_id {
        if let Some(existing) = users.find_by_student_id(student_id).await? {
            if Some(existing.id) != except {
                return Err(LmsError::StudentIdTaken);
            }
        }
    }
    Ok(())
}

/// Profile fields shared by self-registration and admin-issued accounts.
#[derive(Debug, Clone, Default)]
pub struct ProfileInput {
    pub name: String,
    pub email: String,
    pub student_id: Option<String>,
    pub subject: Option<String>,
    pub qualification: Option<String>,
    pub phone: Option<String>,
}

/// Validate the profile, check uniqueness and build an `ACTIVE` user.
pub(crate) async fn new_user<R: UserRepository>(
    users: &R,
    profile: ProfileInput,
    role: Role,
    password_hash: String,
) -> Result<User, LmsError> {
    let name = validate_name(&profile.name)?;
    let email = validate_email(&profile.email)?;
    let student_id = clean(profile.student_id);
    ensure_available(users, &email, student_id.as_deref(), None).await?;

    let now = Utc::now();
    Ok(User {
        id: Uuid::now_v7(),
        name,
        email,
        password_hash,
        role,
        status: UserStatus::Active,
        student_id,
        subject: clean(profile.subject),
        qualification: clean(profile.qualification),
        phone: clean(profile.phone),
        created_at: now,
        updated_at: now,
    })
}

// ── CreateUser ───────────────────────────────────────────────────────────────

pub struct CreateUserInput {
    pub profile: ProfileInput,
    /// When absent a one-time password is generated and returned once.
    pub password: Option<String>,
}

#[derive(Debug)]
pub struct CreatedUser {
    pub user: User,
    pub initial_password: Option<String>,
}

pub struct CreateUserUseCase<R: UserRepository> {
    pub users: R,
    pub hasher: PasswordHasher,
}

impl<R: UserRepository> CreateUserUseCase<R> {
    pub async fn execute(
        &self,
        caller: &Caller,
        role: Role,
        input: CreateUserInput,
    ) -> Result<CreatedUser, LmsError> {
        ensure_admin(caller)?;
        let (password, initial_password) = match clean(input.password) {
            Some(password) => {
                validate_password(&password)?;
                (password, None)
            }
            None => {
                let generated = generate_password();
                (generated.clone(), Some(generated))
            }
        };
        let hash = self.hasher.hash(&password)?;
        let user = new_user(&self.users, input.profile, role, hash).await?;
        self.users.create(&user).await?;
        tracing::info!(user_id = %user.id, role = %role, by = %caller.id, "user created");
        Ok(CreatedUser {
            user,
            initial_password,
        })
    }
}

// ── ListUsers ────────────────────────────────────────────────────────────────

pub struct ListUsersUseCase<R: UserRepository> {
    pub users: R,
}

impl<R: UserRepository> ListUsersUseCase<R> {
    pub async fn execute(&self, caller: &Caller, role: Option<Role>) -> Result<Vec<User>, LmsError> {
        ensure_admin(caller)?;
        self.users.list(role).await
    }
}

// ── GetUser ──────────────────────────────────────────────────────────────────

pub struct GetUserUseCase<R: UserRepository> {
    pub users: R,
}

impl<R: UserRepository> GetUserUseCase<R> {
    pub async fn execute(&self, caller: &Caller, id: Uuid) -> Result<User, LmsError> {
        ensure_admin(caller)?;
        self.users
            .find_by_id(id)
            .await?
            .ok_or(LmsError::UserNotFound)
    }
}

// ── SearchUsers ──────────────────────────────────────────────────────────────

pub struct SearchUsersUseCase<R: UserRepository> {
    pub users: R,
}

impl<R: UserRepository> SearchUsersUseCase<R> {
    pub async fn execute(&self, caller: &Caller, query: &str) -> Result<Vec<User>, LmsError> {
        ensure_admin(caller)?;
        let query = query.trim();
        if query.is_empty() {
            return Ok(vec![]);
        }
        self.users.search(query).await
    }
}

// ── UpdateUser ───────────────────────────────────────────────────────────────

/// Partial update: `None` leaves the field unchanged.
#[derive(Debug, Default)]
pub struct UpdateUserInput {
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

pub struct UpdateUserUseCase<R: UserRepository, C: CourseRepository> {
    pub users: R,
    pub courses: C,
    pub hasher: PasswordHasher,
}

impl<R: UserRepository, C: CourseRepository> UpdateUserUseCase<R, C> {
    pub async fn execute(
        &self,
        caller: &Caller,
        id: Uuid,
        input: UpdateUserInput,
    ) -> Result<User, LmsError> {
        ensure_admin(caller)?;
        let mut user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or(LmsError::UserNotFound)?;

        if let Some(name) = input.name {
            user.name = validate_name(&name)?;
        }
        if let Some(email) = input.email {
            user.email = validate_email(&email)?;
        }
        if let Some(student_id) = input.student_id {
            user.student_id = clean(Some(student_id));
        }
        ensure_available(&self.users, &user.email, user.student_id.as_deref(), Some(user.id))
            .await?;

        if let Some(role) = input.role {
            let role: Role = role.parse()?;
            if user.role == Role::Teacher && role != Role::Teacher {
                let taught = self.courses.list_by_instructor(user.id).await?;
                if !taught.is_empty() {
                    return Err(LmsError::validation(
                        "reassign this teacher's courses before changing their role",
                    ));
                }
            }
            user.role = role;
        }
        if let Some(status) = input.status {
            user.status = status.parse()?;
        }
        if let Some(password) = clean(input.password) {
            validate_password(&password)?;
            user.password_hash = self.hasher.hash(&password)?;
        }
        if input.subject.is_some() {
            user.subject = clean(input.subject);
        }
        if input.qualification.is_some() {
            user.qualification = clean(input.qualification);
        }
        if input.phone.is_some() {
            user.phone = clean(input.phone);
        }
        user.updated_at = Utc::now();

        self.users.update(&user).await?;
        tracing::info!(user_id = %user.id, by = %caller.id, "user updated");
        Ok(user)
    }
}

// ── UpdateUserStatus ─────────────────────────────────────────────────────────

pub struct UpdateUserStatusUseCase<R: UserRepository> {
    pub users: R,
}

impl<R: UserRepository> UpdateUserStatusUseCase<R> {
    pub async fn execute(&self, caller: &Caller, id: Uuid, status: &str) -> Result<User, LmsError> {
        ensure_admin(caller)?;
        let status: UserStatus = status.parse()?;
        let mut user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or(LmsError::UserNotFound)?;
        user.status = status;
        user.updated_at = Utc::now();
        self.users.update(&user).await?;
        tracing::info!(user_id = %user.id, status = %status, by = %caller.id, "user status changed");
        Ok(user)
    }
}

// ── ResetPassword ────────────────────────────────────────────────────────────

pub struct ResetPasswordUseCase<R: UserRepository> {
    pub users: R,
    pub hasher: PasswordHasher,
}

impl<R: UserRepository> ResetPasswordUseCase<R> {
    /// Returns the new one-time password. Only its hash is stored.
    pub async fn execute(&self, caller: &Caller, id: Uuid) -> Result<String, LmsError> {
        ensure_admin(caller)?;
        let mut user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or(LmsError::UserNotFound)?;
        let password = generate_password();
        user.password_hash = self.hasher.hash(&password)?;
        user.updated_at = Utc::now();
        self.users.update(&user).await?;
        tracing::info!(user_id = %user.id, by = %caller.id, "password reset");
        Ok(password)
    }
}

// ── DeleteUser ───────────────────────────────────────────────────────────────

pub struct DeleteUserUseCase<R: UserRepository, F: FileStore> {
    pub users: R,
    pub files: F,
}

impl<R: UserRepository, F: FileStore> DeleteUserUseCase<R, F> {
    pub async fn execute(&self, caller: &Caller, id: Uuid) -> Result<(), LmsError> {
        ensure_admin(caller)?;
        if caller.id == id {
            return Err(LmsError::validation("you cannot delete your own account"));
        }
        if self.users.find_by_id(id).await?.is_none() {
            return Err(LmsError::UserNotFound);
        }
        let orphans = self.users.delete_cascade(id).await?;
        for url in &orphans {
            self.files.remove(url).await;
        }
        tracing::info!(user_id = %id, by = %caller.id, files = orphans.len(), "user deleted");
        Ok(())
    }
}

// ── UserStats ────────────────────────────────────────────────────────────────

pub struct UserStatsUseCase<R: UserRepository> {
    pub users: R,
}

impl<R: UserRepository> UserStatsUseCase<R> {
    pub async fn execute(&self, caller: &Caller) -> Result<UserStats, LmsError> {
        ensure_admin(caller)?;
        self.users.stats().await
    }
}
