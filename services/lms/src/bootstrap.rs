//! Startup seeding of the first administrator account.

use lms_domain::user::Role;

use crate::domain::repository::UserRepository;
use crate::domain::types::normalize_email;
use crate::error::LmsError;
use crate::infra::password::{PasswordHasher, validate_password};
use crate::usecase::user::{ProfileInput, new_user};

pub struct EnsureAdminUseCase<R: UserRepository> {
    pub users: R,
    pub hasher: PasswordHasher,
}

impl<R: UserRepository> EnsureAdminUseCase<R> {
    /// Create an ADMIN with these credentials unless the email is already
    /// registered. Returns whether an account was created. An existing
    /// account is left untouched, whatever its role.
    pub async fn execute(&self, email: &str, password: &str) -> Result<bool, LmsError> {
        let email = normalize_email(email);
        if self.users.find_by_email(&email).await?.is_some() {
            tracing::debug!(%email, "bootstrap admin already present");
            return Ok(false);
        }
        validate_password(password)?;
        let hash = self.hasher.hash(password)?;
        let profile = ProfileInput {
            name: "Administrator".to_owned(),
            email,
            ..ProfileInput::default()
        };
        let user = new_user(&self.users, profile, Role::Admin, hash).await?;
        self.users.create(&user).await?;
        tracing::info!(user_id = %user.id, email = %user.email, "bootstrap admin created");
        Ok(true)
    }
}
