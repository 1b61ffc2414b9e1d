use anyhow::Context as _;
use rand::RngExt;

use crate::error::LmsError;

const CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnpqrstuvwxyz23456789";
const GENERATED_PASSWORD_LEN: usize = 12;

/// Minimum accepted length for user-chosen passwords.
pub const MIN_PASSWORD_LEN: usize = 6;

/// bcrypt hasher. `cost` is configurable so tests can run at the minimum.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    pub cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl PasswordHasher {
    pub fn hash(&self, password: &str) -> Result<String, LmsError> {
        Ok(bcrypt::hash(password, self.cost).context("hash password")?)
    }

    /// `false` for a mismatch and for a corrupt hash alike.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        bcrypt::verify(password, hash).unwrap_or(false)
    }
}

pub fn validate_password(password: &str) -> Result<(), LmsError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(LmsError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// One-time password handed out by admin-issued account creation and resets.
/// Ambiguous glyphs (0/O, 1/l/I) are excluded.
pub fn generate_password() -> String {
    let mut rng = rand::rng();
    (0..GENERATED_PASSWORD_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}
