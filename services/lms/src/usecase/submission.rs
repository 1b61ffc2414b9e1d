use chrono::Utc;
use uuid::Uuid;

use lms_domain::file::FileCategory;
use lms_domain::user::Role;

use crate::domain::policy::{can_manage_course, ensure_course_manager, ensure_role};
use crate::domain::repository::{
    AssignmentRepository, CourseRepository, EnrollmentRepository, FileStore, SubmissionRepository,
};
use crate::domain::types::{Assignment, Caller, Course, Submission, Upload};
use crate::error::LmsError;
use crate::usecase::user::clean;

fn check_grade(grade: i32, max_points: i32) -> Result<i32, LmsError> {
    if (0..=max_points).contains(&grade) {
        Ok(grade)
    } else {
        Err(LmsError::validation(format!(
            "grade must be between 0 and {max_points}"
        )))
    }
}

async fn assignment_and_course<A: AssignmentRepository, C: CourseRepository>(
    assignments: &A,
    courses: &C,
    assignment_id: Uuid,
) -> Result<(Assignment, Course), LmsError> {
    let assignment = assignments
        .find_by_id(assignment_id)
        .await?
        .ok_or(LmsError::AssignmentNotFound)?;
    let course = courses
        .find_by_id(assignment.course_id)
        .await?
        .ok_or(LmsError::CourseNotFound)?;
    Ok((assignment, course))
}

// ── Submit ───────────────────────────────────────────────────────────────────

pub struct SubmitUseCase<S, A, E, F>
where
    S: SubmissionRepository,
    A: AssignmentRepository,
    E: EnrollmentRepository,
    F: FileStore,
{
    pub submissions: S,
    pub assignments: A,
    pub enrollments: E,
    pub files: F,
}

impl<S, A, E, F> SubmitUseCase<S, A, E, F>
where
    S: SubmissionRepository,
    A: AssignmentRepository,
    E: EnrollmentRepository,
    F: FileStore,
{
    /// Create the caller's submission, or replace it. A replacement clears any
    /// grade and drops the previous attachment once the new row is stored.
    pub async fn execute(
        &self,
        caller: &Caller,
        assignment_id: Uuid,
        content: Option<String>,
        upload: Option<Upload>,
    ) -> Result<Submission, LmsError> {
        ensure_role(caller, Role::Student, "only students can submit assignments")?;
        let assignment = self
            .assignments
            .find_by_id(assignment_id)
            .await?
            .ok_or(LmsError::AssignmentNotFound)?;
        if self
            .enrollments
            .find(caller.id, assignment.course_id)
            .await?
            .is_none()
        {
            return Err(LmsError::Forbidden("you are not enrolled in this course"));
        }
        let content = clean(content).unwrap_or_default();
        if content.is_empty() && upload.is_none() {
            return Err(LmsError::validation("a submission needs content or a file"));
        }

        let previous = self.submissions.find(assignment_id, caller.id).await?;
        let attachment = match &upload {
            Some(upload) => Some(self.files.save(FileCategory::Submissions, upload).await?),
            None => None,
        };
        let draft = Submission {
            id: Uuid::now_v7(),
            assignment_id,
            student_id: caller.id,
            content,
            attachment,
            graded: false,
            grade: None,
            feedback: None,
            submitted_at: Utc::now(),
            graded_at: None,
        };
        let stored = match self.submissions.upsert(&draft).await {
            Ok(stored) => stored,
            Err(e) => {
                if let Some(attachment) = &draft.attachment {
                    self.files.remove(&attachment.url).await;
                }
                return Err(e);
            }
        };

        if let Some(old) = previous.as_ref().and_then(|p| p.attachment.as_ref()) {
            let replaced = stored.attachment.as_ref().map(|a| a.url.as_str()) != Some(old.url.as_str());
            if replaced {
                self.files.remove(&old.url).await;
            }
        }
        tracing::info!(
            submission_id = %stored.id,
            %assignment_id,
            student_id = %caller.id,
            resubmitted = previous.is_some(),
            "submission stored"
        );
        Ok(stored)
    }
}

// ── Grade ────────────────────────────────────────────────────────────────────

pub struct GradeSubmissionUseCase<S, A, C>
where
    S: SubmissionRepository,
    A: AssignmentRepository,
    C: CourseRepository,
{
    pub submissions: S,
    pub assignments: A,
    pub courses: C,
}

impl<S, A, C> GradeSubmissionUseCase<S, A, C>
where
    S: SubmissionRepository,
    A: AssignmentRepository,
    C: CourseRepository,
{
    pub async fn execute(
        &self,
        caller: &Caller,
        id: Uuid,
        grade: i32,
        feedback: Option<String>,
    ) -> Result<Submission, LmsError> {
        let mut submission = self
            .submissions
            .find_by_id(id)
            .await?
            .ok_or(LmsError::SubmissionNotFound)?;
        let (assignment, course) =
            assignment_and_course(&self.assignments, &self.courses, submission.assignment_id)
                .await?;
        ensure_course_manager(caller, &course)?;

        submission.grade = Some(check_grade(grade, assignment.max_points)?);
        submission.feedback = clean(feedback);
        submission.graded = true;
        submission.graded_at = Some(Utc::now());
        self.submissions.save_grade(&submission).await?;
        tracing::info!(submission_id = %id, grade, by = %caller.id, "submission graded");
        Ok(submission)
    }
}

// ── Queries ──────────────────────────────────────────────────────────────────

pub struct SubmissionQueriesUseCase<S, A, C>
where
    S: SubmissionRepository,
    A: AssignmentRepository,
    C: CourseRepository,
{
    pub submissions: S,
    pub assignments: A,
    pub courses: C,
}

impl<S, A, C> SubmissionQueriesUseCase<S, A, C>
where
    S: SubmissionRepository,
    A: AssignmentRepository,
    C: CourseRepository,
{
    pub async fn by_assignment(
        &self,
        caller: &Caller,
        assignment_id: Uuid,
    ) -> Result<Vec<Submission>, LmsError> {
        let (_, course) =
            assignment_and_course(&self.assignments, &self.courses, assignment_id).await?;
        ensure_course_manager(caller, &course)?;
        self.submissions.list_by_assignment(assignment_id).await
    }

    pub async fn mine(&self, caller: &Caller) -> Result<Vec<Submission>, LmsError> {
        ensure_role(caller, Role::Student, "only students have submissions")?;
        self.submissions.list_by_student(caller.id).await
    }

    /// Teachers see submissions in the courses they teach; admins see all.
    pub async fn for_teacher(&self, caller: &Caller) -> Result<Vec<Submission>, LmsError> {
        match caller.role {
            Role::Admin => self.submissions.list_all().await,
            Role::Teacher => {
                let course_ids: Vec<Uuid> = self
                    .courses
                    .list_by_instructor(caller.id)
                    .await?
                    .into_iter()
                    .map(|c| c.id)
                    .collect();
                if course_ids.is_empty() {
                    return Ok(vec![]);
                }
                let assignment_ids: Vec<Uuid> = self
                    .assignments
                    .list_by_courses(&course_ids)
                    .await?
                    .into_iter()
                    .map(|a| a.id)
                    .collect();
                if assignment_ids.is_empty() {
                    return Ok(vec![]);
                }
                self.submissions.list_by_assignments(&assignment_ids).await
            }
            Role::Student => Err(LmsError::Forbidden("teacher or admin access required")),
        }
    }

    /// Visible to the submitting student and to whoever manages the course.
    pub async fn get(&self, caller: &Caller, id: Uuid) -> Result<Submission, LmsError> {
        let submission = self
            .submissions
            .find_by_id(id)
            .await?
            .ok_or(LmsError::SubmissionNotFound)?;
        if submission.student_id == caller.id {
            return Ok(submission);
        }
        let (_, course) =
            assignment_and_course(&self.assignments, &self.courses, submission.assignment_id)
                .await?;
        if can_manage_course(caller, &course) {
            Ok(submission)
        } else {
            Err(LmsError::Forbidden("you cannot view this submission"))
        }
    }
}
