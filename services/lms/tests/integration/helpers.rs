use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;
use chrono::Utc;
use uuid::Uuid;

use lms_domain::file::FileCategory;
use lms_domain::user::{Role, UserStatus};
use lms_server::domain::repository::{
    AssignmentRepository, CourseRepository, EnrollmentRepository, FileStore, NoteRepository,
    SubmissionRepository, UserRepository,
};
use lms_server::domain::types::{
    Assignment, Attachment, Caller, Course, Enrollment, Note, StoredFile, Submission, Upload,
    User, UserStats,
};
use lms_server::error::LmsError;
use lms_server::infra::password::PasswordHasher;
use lms_server::usecase::names::DisplayNamesUseCase;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-integration-tests";
pub const TEST_PASSWORD: &str = "secret123";
/// Minimum bcrypt cost keeps the suite fast.
pub const TEST_HASHER: PasswordHasher = PasswordHasher { cost: 4 };

// ── Shared in-memory store ───────────────────────────────────────────────────

#[derive(Default)]
pub struct Data {
    pub users: Vec<User>,
    pub courses: Vec<Course>,
    pub enrollments: Vec<Enrollment>,
    pub assignments: Vec<Assignment>,
    pub submissions: Vec<Submission>,
    pub notes: Vec<Note>,
    /// Stored uploads by URL.
    pub files: Vec<(String, Bytes)>,
    /// Make the next submission upsert fail.
    pub fail_submission_write: bool,
}

/// Every mock repository shares one `Data`, so cross-table effects
/// (counters, cascades) are visible to all of them.
#[derive(Clone, Default)]
pub struct Store(Arc<Mutex<Data>>);

impl Store {
    pub fn lock(&self) -> MutexGuard<'_, Data> {
        self.0.lock().unwrap()
    }

    pub fn users(&self) -> MockUserRepo {
        MockUserRepo(self.clone())
    }

    pub fn courses(&self) -> MockCourseRepo {
        MockCourseRepo(self.clone())
    }

    pub fn enrollments(&self) -> MockEnrollmentRepo {
        MockEnrollmentRepo(self.clone())
    }

    pub fn assignments(&self) -> MockAssignmentRepo {
        MockAssignmentRepo(self.clone())
    }

    pub fn submissions(&self) -> MockSubmissionRepo {
        MockSubmissionRepo(self.clone())
    }

    pub fn notes(&self) -> MockNoteRepo {
        MockNoteRepo(self.clone())
    }

    pub fn names(&self) -> DisplayNamesUseCase<MockUserRepo, MockCourseRepo, MockAssignmentRepo> {
        DisplayNamesUseCase {
            users: self.users(),
            courses: self.courses(),
            assignments: self.assignments(),
        }
    }

    pub fn files(&self) -> MockFileStore {
        MockFileStore(self.clone())
    }

    pub fn course(&self, id: Uuid) -> Course {
        self.lock()
            .courses
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .unwrap()
    }

    pub fn has_file(&self, url: &str) -> bool {
        self.lock().files.iter().any(|(u, _)| u == url)
    }

    // ── Fixtures ─────────────────────────────────────────────────────────────

    pub fn add_user(&self, role: Role, email: &str) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            name: email.split('@').next().unwrap_or(email).to_owned(),
            email: email.to_owned(),
            password_hash: TEST_HASHER.hash(TEST_PASSWORD).unwrap(),
            role,
            status: UserStatus::Active,
            student_id: None,
            subject: None,
            qualification: None,
            phone: None,
            created_at: now,
            updated_at: now,
        };
        self.lock().users.push(user.clone());
        user
    }

    pub fn add_course(&self, instructor: &User, title: &str) -> Course {
        let now = Utc::now();
        let course = Course {
            id: Uuid::now_v7(),
            title: title.to_owned(),
            description: format!("{title} description"),
            category: "Programming".to_owned(),
            level: Default::default(),
            duration: "8 weeks".to_owned(),
            price: "Free".to_owned(),
            instructor_id: instructor.id,
            students: 0,
            rating: 0.0,
            created_at: now,
            updated_at: now,
        };
        self.lock().courses.push(course.clone());
        course
    }

    pub fn add_assignment(&self, course: &Course, max_points: i32) -> Assignment {
        let now = Utc::now();
        let assignment = Assignment {
            id: Uuid::now_v7(),
            course_id: course.id,
            title: "Homework 1".to_owned(),
            description: "Write a parser".to_owned(),
            due_date: now + chrono::Duration::days(7),
            max_points,
            attachment: None,
            created_by: course.instructor_id,
            created_at: now,
            updated_at: now,
        };
        self.lock().assignments.push(assignment.clone());
        assignment
    }
}

pub fn caller(user: &User) -> Caller {
    Caller::from(user)
}

pub fn upload(name: &str, body: &'static [u8]) -> Upload {
    Upload {
        file_name: name.to_owned(),
        content_type: "text/plain".to_owned(),
        bytes: Bytes::from_static(body),
    }
}

fn attachment_url(attachment: &Option<Attachment>) -> Option<String> {
    attachment.as_ref().map(|a| a.url.clone())
}

// ── MockUserRepo ─────────────────────────────────────────────────────────────

pub struct MockUserRepo(Store);

impl UserRepository for MockUserRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, LmsError> {
        Ok(self.0.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, LmsError> {
        Ok(self.0.lock().users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_student_id(&self, student_id: &str) -> Result<Option<User>, LmsError> {
        Ok(self
            .0
            .lock()
            .users
            .iter()
            .find(|u| u.student_id.as_deref() == Some(student_id))
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, LmsError> {
        Ok(self
            .0
            .lock()
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn list(&self, role: Option<Role>) -> Result<Vec<User>, LmsError> {
        Ok(self
            .0
            .lock()
            .users
            .iter()
            .rev()
            .filter(|u| role.is_none_or(|r| u.role == r))
            .cloned()
            .collect())
    }

    async fn search(&self, query: &str) -> Result<Vec<User>, LmsError> {
        let query = query.to_lowercase();
        Ok(self
            .0
            .lock()
            .users
            .iter()
            .filter(|u| {
                u.name.to_lowercase().contains(&query)
                    || u.email.contains(&query)
                    || u.student_id
                        .as_deref()
                        .is_some_and(|s| s.to_lowercase().contains(&query))
            })
            .cloned()
            .collect())
    }

    async fn recent(&self, limit: u64) -> Result<Vec<User>, LmsError> {
        Ok(self
            .0
            .lock()
            .users
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn stats(&self) -> Result<UserStats, LmsError> {
        let data = self.0.lock();
        let roles = |role: Role| data.users.iter().filter(|u| u.role == role).count() as u64;
        let statuses =
            |status: UserStatus| data.users.iter().filter(|u| u.status == status).count() as u64;
        Ok(UserStats {
            total: data.users.len() as u64,
            students: roles(Role::Student),
            teachers: roles(Role::Teacher),
            admins: roles(Role::Admin),
            active: statuses(UserStatus::Active),
            inactive: statuses(UserStatus::Inactive),
            suspended: statuses(UserStatus::Suspended),
        })
    }

    async fn create(&self, user: &User) -> Result<(), LmsError> {
        let mut data = self.0.lock();
        if data.users.iter().any(|u| u.email == user.email) {
            return Err(LmsError::EmailTaken);
        }
        data.users.push(user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), LmsError> {
        let mut data = self.0.lock();
        if let Some(existing) = data.users.iter_mut().find(|u| u.id == user.id) {
            *existing = user.clone();
        }
        Ok(())
    }

    async fn delete_cascade(&self, id: Uuid) -> Result<Vec<String>, LmsError> {
        let mut data = self.0.lock();
        let owned: Vec<Uuid> = data
            .courses
            .iter()
            .filter(|c| c.instructor_id == id)
            .map(|c| c.id)
            .collect();
        let assignment_ids: Vec<Uuid> = data
            .assignments
            .iter()
            .filter(|a| owned.contains(&a.course_id) || a.created_by == id)
            .map(|a| a.id)
            .collect();

        let mut orphans = vec![];
        data.submissions.retain(|s| {
            let gone = s.student_id == id || assignment_ids.contains(&s.assignment_id);
            if gone {
                orphans.extend(attachment_url(&s.attachment));
            }
            !gone
        });
        data.assignments.retain(|a| {
            let gone = assignment_ids.contains(&a.id);
            if gone {
                orphans.extend(attachment_url(&a.attachment));
            }
            !gone
        });
        data.notes.retain(|n| {
            let gone = n.author_id == id || n.course_id.is_some_and(|c| owned.contains(&c));
            if gone {
                orphans.extend(attachment_url(&n.attachment));
            }
            !gone
        });

        let joined: Vec<Uuid> = data
            .enrollments
            .iter()
            .filter(|e| e.student_id == id && !owned.contains(&e.course_id))
            .map(|e| e.course_id)
            .collect();
        for course in data.courses.iter_mut().filter(|c| joined.contains(&c.id)) {
            course.students = (course.students - 1).max(0);
        }
        data.enrollments
            .retain(|e| e.student_id != id && !owned.contains(&e.course_id));
        data.courses.retain(|c| c.instructor_id != id);
        data.users.retain(|u| u.id != id);
        Ok(orphans)
    }
}

// ── MockCourseRepo ───────────────────────────────────────────────────────────

pub struct MockCourseRepo(Store);

impl CourseRepository for MockCourseRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Course>, LmsError> {
        Ok(self.0.lock().courses.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Course>, LmsError> {
        Ok(self
            .0
            .lock()
            .courses
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Course>, LmsError> {
        Ok(self.0.lock().courses.clone())
    }

    async fn list_by_instructor(&self, instructor_id: Uuid) -> Result<Vec<Course>, LmsError> {
        Ok(self
            .0
            .lock()
            .courses
            .iter()
            .filter(|c| c.instructor_id == instructor_id)
            .cloned()
            .collect())
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<Course>, LmsError> {
        Ok(self
            .0
            .lock()
            .courses
            .iter()
            .filter(|c| c.category == category)
            .cloned()
            .collect())
    }

    async fn search(&self, query: &str) -> Result<Vec<Course>, LmsError> {
        let query = query.to_lowercase();
        Ok(self
            .0
            .lock()
            .courses
            .iter()
            .filter(|c| {
                c.title.to_lowercase().contains(&query)
                    || c.description.to_lowercase().contains(&query)
                    || c.category.to_lowercase().contains(&query)
            })
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<u64, LmsError> {
        Ok(self.0.lock().courses.len() as u64)
    }

    async fn create(&self, course: &Course) -> Result<(), LmsError> {
        self.0.lock().courses.push(course.clone());
        Ok(())
    }

    async fn update(&self, course: &Course) -> Result<(), LmsError> {
        let mut data = self.0.lock();
        if let Some(existing) = data.courses.iter_mut().find(|c| c.id == course.id) {
            // The counter belongs to the enrollment ledger.
            let students = existing.students;
            *existing = course.clone();
            existing.students = students;
        }
        Ok(())
    }

    async fn delete_cascade(&self, id: Uuid) -> Result<Vec<String>, LmsError> {
        let mut data = self.0.lock();
        let assignment_ids: Vec<Uuid> = data
            .assignments
            .iter()
            .filter(|a| a.course_id == id)
            .map(|a| a.id)
            .collect();
        let mut orphans = vec![];
        data.submissions.retain(|s| {
            let gone = assignment_ids.contains(&s.assignment_id);
            if gone {
                orphans.extend(attachment_url(&s.attachment));
            }
            !gone
        });
        data.assignments.retain(|a| {
            let gone = a.course_id == id;
            if gone {
                orphans.extend(attachment_url(&a.attachment));
            }
            !gone
        });
        data.notes.retain(|n| {
            let gone = n.course_id == Some(id);
            if gone {
                orphans.extend(attachment_url(&n.attachment));
            }
            !gone
        });
        data.enrollments.retain(|e| e.course_id != id);
        data.courses.retain(|c| c.id != id);
        Ok(orphans)
    }
}

// ── MockEnrollmentRepo ───────────────────────────────────────────────────────

pub struct MockEnrollmentRepo(Store);

impl EnrollmentRepository for MockEnrollmentRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Enrollment>, LmsError> {
        Ok(self.0.lock().enrollments.iter().find(|e| e.id == id).cloned())
    }

    async fn find(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<Enrollment>, LmsError> {
        Ok(self
            .0
            .lock()
            .enrollments
            .iter()
            .find(|e| e.student_id == student_id && e.course_id == course_id)
            .cloned())
    }

    async fn list_by_student(&self, student_id: Uuid) -> Result<Vec<Enrollment>, LmsError> {
        Ok(self
            .0
            .lock()
            .enrollments
            .iter()
            .filter(|e| e.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn list_by_course(&self, course_id: Uuid) -> Result<Vec<Enrollment>, LmsError> {
        Ok(self
            .0
            .lock()
            .enrollments
            .iter()
            .filter(|e| e.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn enroll(&self, enrollment: &Enrollment) -> Result<(), LmsError> {
        let mut data = self.0.lock();
        if data
            .enrollments
            .iter()
            .any(|e| e.student_id == enrollment.student_id && e.course_id == enrollment.course_id)
        {
            return Err(LmsError::AlreadyEnrolled);
        }
        data.enrollments.push(enrollment.clone());
        if let Some(course) = data.courses.iter_mut().find(|c| c.id == enrollment.course_id) {
            course.students += 1;
        }
        Ok(())
    }

    async fn save_progress(&self, enrollment: &Enrollment) -> Result<(), LmsError> {
        let mut data = self.0.lock();
        if let Some(existing) = data.enrollments.iter_mut().find(|e| e.id == enrollment.id) {
            existing.progress = enrollment.progress;
            existing.completed = enrollment.completed;
            existing.completed_at = enrollment.completed_at;
        }
        Ok(())
    }

    async fn unenroll(&self, enrollment: &Enrollment) -> Result<(), LmsError> {
        let mut data = self.0.lock();
        data.enrollments.retain(|e| e.id != enrollment.id);
        if let Some(course) = data.courses.iter_mut().find(|c| c.id == enrollment.course_id) {
            course.students = (course.students - 1).max(0);
        }
        Ok(())
    }
}

// ── MockAssignmentRepo ───────────────────────────────────────────────────────

pub struct MockAssignmentRepo(Store);

impl AssignmentRepository for MockAssignmentRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Assignment>, LmsError> {
        Ok(self.0.lock().assignments.iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Assignment>, LmsError> {
        Ok(self
            .0
            .lock()
            .assignments
            .iter()
            .filter(|a| ids.contains(&a.id))
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Assignment>, LmsError> {
        Ok(self.0.lock().assignments.clone())
    }

    async fn list_by_course(&self, course_id: Uuid) -> Result<Vec<Assignment>, LmsError> {
        self.list_by_courses(&[course_id]).await
    }

    async fn list_by_courses(&self, course_ids: &[Uuid]) -> Result<Vec<Assignment>, LmsError> {
        Ok(self
            .0
            .lock()
            .assignments
            .iter()
            .filter(|a| course_ids.contains(&a.course_id))
            .cloned()
            .collect())
    }

    async fn create(&self, assignment: &Assignment) -> Result<(), LmsError> {
        self.0.lock().assignments.push(assignment.clone());
        Ok(())
    }

    async fn update(&self, assignment: &Assignment) -> Result<(), LmsError> {
        let mut data = self.0.lock();
        if let Some(existing) = data.assignments.iter_mut().find(|a| a.id == assignment.id) {
            *existing = assignment.clone();
        }
        Ok(())
    }

    async fn delete_cascade(&self, id: Uuid) -> Result<Vec<String>, LmsError> {
        let mut data = self.0.lock();
        let mut orphans = vec![];
        data.submissions.retain(|s| {
            let gone = s.assignment_id == id;
            if gone {
                orphans.extend(attachment_url(&s.attachment));
            }
            !gone
        });
        data.assignments.retain(|a| {
            let gone = a.id == id;
            if gone {
                orphans.extend(attachment_url(&a.attachment));
            }
            !gone
        });
        Ok(orphans)
    }
}

// ── MockSubmissionRepo ───────────────────────────────────────────────────────

pub struct MockSubmissionRepo(Store);

impl SubmissionRepository for MockSubmissionRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Submission>, LmsError> {
        Ok(self.0.lock().submissions.iter().find(|s| s.id == id).cloned())
    }

    async fn find(
        &self,
        assignment_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<Submission>, LmsError> {
        Ok(self
            .0
            .lock()
            .submissions
            .iter()
            .find(|s| s.assignment_id == assignment_id && s.student_id == student_id)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<Submission>, LmsError> {
        Ok(self.0.lock().submissions.clone())
    }

    async fn list_by_assignment(&self, assignment_id: Uuid) -> Result<Vec<Submission>, LmsError> {
        self.list_by_assignments(&[assignment_id]).await
    }

    async fn list_by_assignments(
        &self,
        assignment_ids: &[Uuid],
    ) -> Result<Vec<Submission>, LmsError> {
        Ok(self
            .0
            .lock()
            .submissions
            .iter()
            .filter(|s| assignment_ids.contains(&s.assignment_id))
            .cloned()
            .collect())
    }

    async fn list_by_student(&self, student_id: Uuid) -> Result<Vec<Submission>, LmsError> {
        Ok(self
            .0
            .lock()
            .submissions
            .iter()
            .filter(|s| s.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn upsert(&self, submission: &Submission) -> Result<Submission, LmsError> {
        let mut data = self.0.lock();
        if std::mem::take(&mut data.fail_submission_write) {
            return Err(anyhow::anyhow!("simulated write failure").into());
        }
        let position = data.submissions.iter().position(|s| {
            s.assignment_id == submission.assignment_id && s.student_id == submission.student_id
        });
        match position {
            Some(index) => {
                let id = data.submissions[index].id;
                data.submissions[index] = Submission {
                    id,
                    ..submission.clone()
                };
                Ok(data.submissions[index].clone())
            }
            None => {
                data.submissions.push(submission.clone());
                Ok(submission.clone())
            }
        }
    }

    async fn save_grade(&self, submission: &Submission) -> Result<(), LmsError> {
        let mut data = self.0.lock();
        if let Some(existing) = data.submissions.iter_mut().find(|s| s.id == submission.id) {
            existing.graded = submission.graded;
            existing.grade = submission.grade;
            existing.feedback = submission.feedback.clone();
            existing.graded_at = submission.graded_at;
        }
        Ok(())
    }
}

// ── MockNoteRepo ─────────────────────────────────────────────────────────────

pub struct MockNoteRepo(Store);

impl NoteRepository for MockNoteRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Note>, LmsError> {
        Ok(self.0.lock().notes.iter().find(|n| n.id == id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Note>, LmsError> {
        Ok(self.0.lock().notes.clone())
    }

    async fn create(&self, note: &Note) -> Result<(), LmsError> {
        self.0.lock().notes.push(note.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, LmsError> {
        let mut data = self.0.lock();
        let before = data.notes.len();
        data.notes.retain(|n| n.id != id);
        Ok(data.notes.len() != before)
    }
}

// ── MockFileStore ────────────────────────────────────────────────────────────

pub struct MockFileStore(Store);

impl FileStore for MockFileStore {
    async fn save(&self, category: FileCategory, upload: &Upload) -> Result<Attachment, LmsError> {
        let url = format!(
            "/uploads/{}/{}_{}",
            category.dir_name(),
            Uuid::now_v7(),
            upload.file_name
        );
        self.0
            .lock()
            .files
            .push((url.clone(), upload.bytes.clone()));
        Ok(Attachment {
            name: upload.file_name.clone(),
            size: upload.bytes.len() as i64,
            content_type: upload.content_type.clone(),
            url,
        })
    }

    async fn remove(&self, url: &str) {
        self.0.lock().files.retain(|(u, _)| u != url);
    }

    async fn open(&self, category: FileCategory, file_name: &str) -> Result<StoredFile, LmsError> {
        let url = format!("/uploads/{}/{file_name}", category.dir_name());
        let data = self.0.lock();
        let (_, bytes) = data
            .files
            .iter()
            .find(|(u, _)| *u == url)
            .ok_or(LmsError::FileNotFound)?;
        Ok(StoredFile {
            file_name: file_name.to_owned(),
            content_type: "application/octet-stream".to_owned(),
            bytes: bytes.clone(),
        })
    }
}
