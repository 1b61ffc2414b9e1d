//! Enrollment progress states.

use serde::Serialize;

/// Lowest and highest allowed progress values (percent).
pub const MIN_PROGRESS: i32 = 0;
pub const MAX_PROGRESS: i32 = 100;

/// State derived from an enrollment's `(progress, completed)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnrollmentStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl EnrollmentStatus {
    pub fn derive(progress: i32, completed: bool) -> Self {
        if completed || progress >= MAX_PROGRESS {
            Self::Completed
        } else if progress <= MIN_PROGRESS {
            Self::NotStarted
        } else {
            Self::InProgress
        }
    }
}
