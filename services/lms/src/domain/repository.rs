#![allow(async_fn_in_trait)]

use uuid::Uuid;

use lms_domain::file::FileCategory;
use lms_domain::user::Role;

use crate::domain::types::{
    Assignment, Attachment, Course, Enrollment, Note, StoredFile, Submission, Upload, User,
    UserStats,
};
use crate::error::LmsError;

/// Repository for accounts.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, LmsError>;
    /// `email` must already be normalized.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, LmsError>;
    async fn find_by_student_id(&self, student_id: &str) -> Result<Option<User>, LmsError>;
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, LmsError>;
    /// All users, optionally restricted to one role, newest first.
    async fn list(&self, role: Option<Role>) -> Result<Vec<User>, LmsError>;
    /// Case-insensitive substring match on name, email and student id.
    async fn search(&self, query: &str) -> Result<Vec<User>, LmsError>;
    async fn recent(&self, limit: u64) -> Result<Vec<User>, LmsError>;
    async fn stats(&self) -> Result<UserStats, LmsError>;

    /// Insert a user. Unique violations map to `EmailTaken` / `StudentIdTaken`.
    async fn create(&self, user: &User) -> Result<(), LmsError>;
    /// Overwrite every mutable column. Unique violations map like [`Self::create`].
    async fn update(&self, user: &User) -> Result<(), LmsError>;

    /// Delete a user together with everything that references it, in one
    /// transaction. Returns the attachment URLs left without an owner.
    async fn delete_cascade(&self, id: Uuid) -> Result<Vec<String>, LmsError>;
}

/// Repository for courses.
pub trait CourseRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Course>, LmsError>;
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Course>, LmsError>;
    async fn list_all(&self) -> Result<Vec<Course>, LmsError>;
    async fn list_by_instructor(&self, instructor_id: Uuid) -> Result<Vec<Course>, LmsError>;
    async fn list_by_category(&self, category: &str) -> Result<Vec<Course>, LmsError>;
    /// Case-insensitive substring match on title, description and category.
    async fn search(&self, query: &str) -> Result<Vec<Course>, LmsError>;
    async fn count(&self) -> Result<u64, LmsError>;

    async fn create(&self, course: &Course) -> Result<(), LmsError>;
    async fn update(&self, course: &Course) -> Result<(), LmsError>;

    /// Delete a course with its enrollments, assignments, submissions and
    /// notes in one transaction. Returns orphaned attachment URLs.
    async fn delete_cascade(&self, id: Uuid) -> Result<Vec<String>, LmsError>;
}

/// Repository for enrollments. Counter maintenance on `courses.students`
/// happens inside the same transaction as the enrollment write.
pub trait EnrollmentRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Enrollment>, LmsError>;
    async fn find(&self, student_id: Uuid, course_id: Uuid)
    -> Result<Option<Enrollment>, LmsError>;
    async fn list_by_student(&self, student_id: Uuid) -> Result<Vec<Enrollment>, LmsError>;
    async fn list_by_course(&self, course_id: Uuid) -> Result<Vec<Enrollment>, LmsError>;

    /// Insert and increment the course counter. A duplicate pair maps to
    /// `AlreadyEnrolled`.
    async fn enroll(&self, enrollment: &Enrollment) -> Result<(), LmsError>;
    /// Persist `progress`, `completed` and `completed_at`.
    async fn save_progress(&self, enrollment: &Enrollment) -> Result<(), LmsError>;
    /// Delete and decrement the course counter, never below zero.
    async fn unenroll(&self, enrollment: &Enrollment) -> Result<(), LmsError>;
}

/// Repository for assignments.
pub trait AssignmentRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Assignment>, LmsError>;
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Assignment>, LmsError>;
    async fn list_all(&self) -> Result<Vec<Assignment>, LmsError>;
    async fn list_by_course(&self, course_id: Uuid) -> Result<Vec<Assignment>, LmsError>;
    async fn list_by_courses(&self, course_ids: &[Uuid]) -> Result<Vec<Assignment>, LmsError>;

    async fn create(&self, assignment: &Assignment) -> Result<(), LmsError>;
    async fn update(&self, assignment: &Assignment) -> Result<(), LmsError>;

    /// Delete an assignment and its submissions in one transaction. Returns
    /// orphaned attachment URLs.
    async fn delete_cascade(&self, id: Uuid) -> Result<Vec<String>, LmsError>;
}

/// Repository for submissions. At most one row per `(assignment, student)`.
pub trait SubmissionRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Submission>, LmsError>;
    async fn find(
        &self,
        assignment_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<Submission>, LmsError>;
    async fn list_all(&self) -> Result<Vec<Submission>, LmsError>;
    async fn list_by_assignment(&self, assignment_id: Uuid) -> Result<Vec<Submission>, LmsError>;
    async fn list_by_assignments(
        &self,
        assignment_ids: &[Uuid],
    ) -> Result<Vec<Submission>, LmsError>;
    async fn list_by_student(&self, student_id: Uuid) -> Result<Vec<Submission>, LmsError>;

    /// Insert, or overwrite the existing row for the same pair: content and
    /// attachment replaced, grading state cleared. Returns the stored row.
    async fn upsert(&self, submission: &Submission) -> Result<Submission, LmsError>;
    /// Persist `graded`, `grade`, `feedback` and `graded_at`.
    async fn save_grade(&self, submission: &Submission) -> Result<(), LmsError>;
}

/// Repository for notes.
pub trait NoteRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Note>, LmsError>;
    async fn list_all(&self) -> Result<Vec<Note>, LmsError>;
    async fn create(&self, note: &Note) -> Result<(), LmsError>;
    /// Returns `true` if a row was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, LmsError>;
}

/// Port for attachment storage.
pub trait FileStore: Send + Sync {
    async fn save(&self, category: FileCategory, upload: &Upload) -> Result<Attachment, LmsError>;
    /// Best effort: failures are logged, never returned.
    async fn remove(&self, url: &str);
    /// `file_name` must be a single plain path component.
    async fn open(&self, category: FileCategory, file_name: &str) -> Result<StoredFile, LmsError>;
}
