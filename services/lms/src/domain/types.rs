use bytes::Bytes;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use lms_domain::course::CourseLevel;
use lms_domain::enrollment::EnrollmentStatus;
use lms_domain::note::NoteVisibility;
use lms_domain::user::{Role, UserStatus};

/// Account record. `password_hash` is a bcrypt hash; no plaintext copy exists.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub status: UserStatus,
    pub student_id: Option<String>,
    pub subject: Option<String>,
    pub qualification: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Authenticated identity attached to every non-public request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&User> for Caller {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}

/// Metadata of a stored upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub size: i64,
    pub content_type: String,
    pub url: String,
}

/// File received in a multipart request, not yet stored.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// File read back from the store for download.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub level: CourseLevel,
    pub duration: String,
    pub price: String,
    pub instructor_id: Uuid,
    pub students: i32,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Enrollment {
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub progress: i32,
    pub completed: bool,
    pub enrolled_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Enrollment {
    pub fn status(&self) -> EnrollmentStatus {
        EnrollmentStatus::derive(self.progress, self.completed)
    }
}

/// An enrollment joined with its course.
#[derive(Debug, Clone)]
pub struct EnrolledCourse {
    pub enrollment: Enrollment,
    pub course: Course,
}

/// An enrollment joined with its student, for course rosters.
#[derive(Debug, Clone)]
pub struct RosterEntry {
    pub enrollment: Enrollment,
    pub student: User,
}

#[derive(Debug, Clone)]
pub struct Assignment {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub max_points: i32,
    pub attachment: Option<Attachment>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Submission {
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub student_id: Uuid,
    pub content: String,
    pub attachment: Option<Attachment>,
    pub graded: bool,
    pub grade: Option<i32>,
    pub feedback: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub graded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub course_id: Option<Uuid>,
    pub author_id: Uuid,
    pub visibility: NoteVisibility,
    pub attachment: Option<Attachment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Roster counts for the admin views.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserStats {
    pub total: u64,
    pub students: u64,
    pub teachers: u64,
    pub admins: u64,
    pub active: u64,
    pub inactive: u64,
    pub suspended: u64,
}

/// Per-student enrollment summary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrollmentStats {
    pub total: u64,
    pub completed: u64,
    pub in_progress: u64,
    pub not_started: u64,
    pub average_progress: f64,
}

impl EnrollmentStats {
    pub fn from_enrollments(enrollments: &[Enrollment]) -> Self {
        let mut stats = Self {
            total: enrollments.len() as u64,
            ..Self::default()
        };
        for enrollment in enrollments {
            match enrollment.status() {
                EnrollmentStatus::Completed => stats.completed += 1,
                EnrollmentStatus::InProgress => stats.in_progress += 1,
                EnrollmentStatus::NotStarted => stats.not_started += 1,
            }
        }
        if !enrollments.is_empty() {
            let sum: i64 = enrollments.iter().map(|e| i64::from(e.progress)).sum();
            let avg = sum as f64 / enrollments.len() as f64;
            stats.average_progress = (avg * 100.0).round() / 100.0;
        }
        stats
    }
}

/// Normalize an email for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
