use std::path::PathBuf;

use sea_orm::DatabaseConnection;

use crate::infra::db::{
    DbAssignmentRepository, DbCourseRepository, DbEnrollmentRepository, DbNoteRepository,
    DbSubmissionRepository, DbUserRepository,
};
use crate::infra::password::PasswordHasher;
use crate::infra::storage::LocalFileStore;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub hasher: PasswordHasher,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn course_repo(&self) -> DbCourseRepository {
        DbCourseRepository {
            db: self.db.clone(),
        }
    }

    pub fn enrollment_repo(&self) -> DbEnrollmentRepository {
        DbEnrollmentRepository {
            db: self.db.clone(),
        }
    }

    pub fn assignment_repo(&self) -> DbAssignmentRepository {
        DbAssignmentRepository {
            db: self.db.clone(),
        }
    }

    pub fn submission_repo(&self) -> DbSubmissionRepository {
        DbSubmissionRepository {
            db: self.db.clone(),
        }
    }

    pub fn note_repo(&self) -> DbNoteRepository {
        DbNoteRepository {
            db: self.db.clone(),
        }
    }

    pub fn file_store(&self) -> LocalFileStore {
        LocalFileStore {
            root: self.upload_dir.clone(),
        }
    }
}
