use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use lms_core::response::failure;
use lms_domain::InvalidValue;

/// LMS service error variants.
#[derive(Debug, thiserror::Error)]
pub enum LmsError {
    #[error("user not found")]
    UserNotFound,
    #[error("course not found")]
    CourseNotFound,
    #[error("enrollment not found")]
    EnrollmentNotFound,
    #[error("assignment not found")]
    AssignmentNotFound,
    #[error("submission not found")]
    SubmissionNotFound,
    #[error("note not found")]
    NoteNotFound,
    #[error("file not found")]
    FileNotFound,
    #[error("{0}")]
    Validation(String),
    #[error("email already in use")]
    EmailTaken,
    #[error("student id already in use")]
    StudentIdTaken,
    #[error("already enrolled in this course")]
    AlreadyEnrolled,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("unauthenticated")]
    Unauthenticated,
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl LmsError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::CourseNotFound => "COURSE_NOT_FOUND",
            Self::EnrollmentNotFound => "ENROLLMENT_NOT_FOUND",
            Self::AssignmentNotFound => "ASSIGNMENT_NOT_FOUND",
            Self::SubmissionNotFound => "SUBMISSION_NOT_FOUND",
            Self::NoteNotFound => "NOTE_NOT_FOUND",
            Self::FileNotFound => "FILE_NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::StudentIdTaken => "STUDENT_ID_TAKEN",
            Self::AlreadyEnrolled => "ALREADY_ENROLLED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::UserNotFound
            | Self::CourseNotFound
            | Self::EnrollmentNotFound
            | Self::AssignmentNotFound
            | Self::SubmissionNotFound
            | Self::NoteNotFound
            | Self::FileNotFound => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::EmailTaken | Self::StudentIdTaken | Self::AlreadyEnrolled => StatusCode::CONFLICT,
            Self::InvalidCredentials | Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<InvalidValue> for LmsError {
    fn from(e: InvalidValue) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<JsonRejection> for LmsError {
    fn from(e: JsonRejection) -> Self {
        Self::Validation(e.body_text())
    }
}

impl From<PathRejection> for LmsError {
    fn from(e: PathRejection) -> Self {
        Self::Validation(e.body_text())
    }
}

impl From<QueryRejection> for LmsError {
    fn from(e: QueryRejection) -> Self {
        Self::Validation(e.body_text())
    }
}

impl From<MultipartRejection> for LmsError {
    fn from(e: MultipartRejection) -> Self {
        Self::Validation(e.body_text())
    }
}

impl From<MultipartError> for LmsError {
    fn from(e: MultipartError) -> Self {
        Self::Validation(e.body_text())
    }
}

impl IntoResponse for LmsError {
    fn into_response(self) -> Response {
        // Log 500s only; TraceLayer already records method/uri/status for every request.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = ?e, kind = "INTERNAL", "internal error");
        }
        failure(self.status(), self.kind(), &self.to_string())
    }
}
