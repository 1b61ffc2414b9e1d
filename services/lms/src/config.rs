use std::path::PathBuf;

use lms_auth_types::token::DEFAULT_TOKEN_TTL_SECS;

/// LMS service configuration loaded from environment variables.
#[derive(Debug)]
pub struct LmsConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port for the HTTP server (default 8080). Env var: `LMS_PORT`.
    pub lms_port: u16,
    /// HS256 signing secret for bearer tokens.
    pub jwt_secret: String,
    /// Token lifetime in seconds (default 86400). Env var: `JWT_EXPIRATION_SECS`.
    pub jwt_expiration_secs: u64,
    /// Root directory for attachments (default `uploads`).
    pub upload_dir: PathBuf,
    /// Request body cap for uploads (default 10 MiB). Env var: `MAX_UPLOAD_BYTES`.
    pub max_upload_bytes: usize,
    /// bcrypt work factor (default 12). Env var: `BCRYPT_COST`.
    pub bcrypt_cost: u32,
    /// Apply pending migrations at startup (default true). Env var: `RUN_MIGRATIONS`.
    pub run_migrations: bool,
    /// Bootstrap admin, created at startup when no account has this email.
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl LmsConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            lms_port: env_parse("LMS_PORT").unwrap_or(8080),
            jwt_secret: std::env::var("JWT_SECRET").expect("JWT_SECRET"),
            jwt_expiration_secs: env_parse("JWT_EXPIRATION_SECS")
                .unwrap_or(DEFAULT_TOKEN_TTL_SECS),
            upload_dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads")),
            max_upload_bytes: env_parse("MAX_UPLOAD_BYTES").unwrap_or(10 * 1024 * 1024),
            bcrypt_cost: env_parse("BCRYPT_COST").unwrap_or(bcrypt::DEFAULT_COST),
            run_migrations: env_parse("RUN_MIGRATIONS").unwrap_or(true),
            admin_email: std::env::var("ADMIN_EMAIL").ok().filter(|v| !v.is_empty()),
            admin_password: std::env::var("ADMIN_PASSWORD").ok().filter(|v| !v.is_empty()),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
