use chrono::{DateTime, NaiveDateTime, Utc};
use uuid::Uuid;

use lms_domain::file::FileCategory;

use crate::domain::policy::ensure_course_manager;
use crate::domain::repository::{AssignmentRepository, CourseRepository, FileStore};
use crate::domain::types::{Assignment, Caller, Course, Upload};
use crate::error::LmsError;
use crate::usecase::user::clean;

pub const DEFAULT_MAX_POINTS: i32 = 100;
const MAX_POINTS_RANGE: std::ops::RangeInclusive<i32> = 1..=1000;

/// Accept RFC 3339, or a zone-less `YYYY-MM-DDTHH:MM[:SS]` read as UTC.
pub fn parse_due_date(raw: &str) -> Result<DateTime<Utc>, LmsError> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| LmsError::validation(format!("invalid due date: {raw:?}")))
}

fn check_max_points(points: i32) -> Result<i32, LmsError> {
    if MAX_POINTS_RANGE.contains(&points) {
        Ok(points)
    } else {
        Err(LmsError::validation(format!(
            "maxPoints must be between {} and {}",
            MAX_POINTS_RANGE.start(),
            MAX_POINTS_RANGE.end()
        )))
    }
}

/// Assignment fields from the multipart `data` part.
#[derive(Debug, Default, Clone)]
pub struct AssignmentInput {
    pub course_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub max_points: Option<i32>,
}

async fn managed_course<C: CourseRepository>(
    courses: &C,
    caller: &Caller,
    course_id: Uuid,
) -> Result<Course, LmsError> {
    let course = courses
        .find_by_id(course_id)
        .await?
        .ok_or(LmsError::CourseNotFound)?;
    ensure_course_manager(caller, &course)?;
    Ok(course)
}

// ── CreateAssignment ─────────────────────────────────────────────────────────

pub struct CreateAssignmentUseCase<A: AssignmentRepository, C: CourseRepository, F: FileStore> {
    pub assignments: A,
    pub courses: C,
    pub files: F,
}

impl<A, C, F> CreateAssignmentUseCase<A, C, F>
where
    A: AssignmentRepository,
    C: CourseRepository,
    F: FileStore,
{
    pub async fn execute(
        &self,
        caller: &Caller,
        input: AssignmentInput,
        upload: Option<Upload>,
    ) -> Result<Assignment, LmsError> {
        let title = clean(input.title).ok_or_else(|| LmsError::validation("title is required"))?;
        let description = clean(input.description)
            .ok_or_else(|| LmsError::validation("description is required"))?;
        let due_date = clean(input.due_date)
            .ok_or_else(|| LmsError::validation("dueDate is required"))
            .and_then(|raw| parse_due_date(&raw))?;
        let course_id = input
            .course_id
            .ok_or_else(|| LmsError::validation("courseId is required"))?;
        let max_points = check_max_points(input.max_points.unwrap_or(DEFAULT_MAX_POINTS))?;
        managed_course(&self.courses, caller, course_id).await?;

        let attachment = match &upload {
            Some(upload) => Some(self.files.save(FileCategory::Assignments, upload).await?),
            None => None,
        };
        let now = Utc::now();
        let assignment = Assignment {
            id: Uuid::now_v7(),
            course_id,
            title,
            description,
            due_date,
            max_points,
            attachment,
            created_by: caller.id,
            created_at: now,
            updated_at: now,
        };
        if let Err(e) = self.assignments.create(&assignment).await {
            if let Some(attachment) = &assignment.attachment {
                self.files.remove(&attachment.url).await;
            }
            return Err(e);
        }
        tracing::info!(assignment_id = %assignment.id, %course_id, by = %caller.id, "assignment created");
        Ok(assignment)
    }
}

// ── UpdateAssignment ─────────────────────────────────────────────────────────

pub struct UpdateAssignmentUseCase<A: AssignmentRepository, C: CourseRepository, F: FileStore> {
    pub assignments: A,
    pub courses: C,
    pub files: F,
}

impl<A, C, F> UpdateAssignmentUseCase<A, C, F>
where
    A: AssignmentRepository,
    C: CourseRepository,
    F: FileStore,
{
    pub async fn execute(
        &self,
        caller: &Caller,
        id: Uuid,
        input: AssignmentInput,
        upload: Option<Upload>,
    ) -> Result<Assignment, LmsError> {
        let mut assignment = self
            .assignments
            .find_by_id(id)
            .await?
            .ok_or(LmsError::AssignmentNotFound)?;
        managed_course(&self.courses, caller, assignment.course_id).await?;

        if let Some(course_id) = input.course_id {
            if course_id != assignment.course_id {
                managed_course(&self.courses, caller, course_id).await?;
                assignment.course_id = course_id;
            }
        }
        if input.title.is_some() {
            assignment.title =
                clean(input.title).ok_or_else(|| LmsError::validation("title is required"))?;
        }
        if input.description.is_some() {
            assignment.description = clean(input.description)
                .ok_or_else(|| LmsError::validation("description is required"))?;
        }
        if let Some(raw) = input.due_date {
            assignment.due_date = parse_due_date(&raw)?;
        }
        if let Some(points) = input.max_points {
            assignment.max_points = check_max_points(points)?;
        }

        let previous = match &upload {
            Some(upload) => {
                let saved = self.files.save(FileCategory::Assignments, upload).await?;
                assignment.attachment.replace(saved)
            }
            None => None,
        };
        assignment.updated_at = Utc::now();

        if let Err(e) = self.assignments.update(&assignment).await {
            if upload.is_some() {
                if let Some(attachment) = &assignment.attachment {
                    self.files.remove(&attachment.url).await;
                }
            }
            return Err(e);
        }
        if let Some(previous) = previous {
            self.files.remove(&previous.url).await;
        }
        tracing::info!(assignment_id = %id, by = %caller.id, "assignment updated");
        Ok(assignment)
    }
}

// ── DeleteAssignment ─────────────────────────────────────────────────────────

pub struct DeleteAssignmentUseCase<A: AssignmentRepository, C: CourseRepository, F: FileStore> {
    pub assignments: A,
    pub courses: C,
    pub files: F,
}

impl<A, C, F> DeleteAssignmentUseCase<A, C, F>
where
    A: AssignmentRepository,
    C: CourseRepository,
    F: FileStore,
{
    pub async fn execute(&self, caller: &Caller, id: Uuid) -> Result<(), LmsError> {
        let assignment = self
            .assignments
            .find_by_id(id)
            .await?
            .ok_or(LmsError::AssignmentNotFound)?;
        managed_course(&self.courses, caller, assignment.course_id).await?;
        let orphans = self.assignments.delete_cascade(id).await?;
        for url in &orphans {
            self.files.remove(url).await;
        }
        tracing::info!(assignment_id = %id, by = %caller.id, files = orphans.len(), "assignment deleted");
        Ok(())
    }
}

// ── Queries ──────────────────────────────────────────────────────────────────

pub struct ListAssignmentsUseCase<A: AssignmentRepository> {
    pub assignments: A,
}

impl<A: AssignmentRepository> ListAssignmentsUseCase<A> {
    pub async fn all(&self) -> Result<Vec<Assignment>, LmsError> {
        self.assignments.list_all().await
    }

    pub async fn by_course(&self, course_id: Uuid) -> Result<Vec<Assignment>, LmsError> {
        self.assignments.list_by_course(course_id).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Assignment, LmsError> {
        self.assignments
            .find_by_id(id)
            .await?
            .ok_or(LmsError::AssignmentNotFound)
    }
}
