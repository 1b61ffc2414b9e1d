use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use lms_domain::enrollment::{MAX_PROGRESS, MIN_PROGRESS};
use lms_domain::user::Role;

use crate::domain::policy::{ensure_course_manager, ensure_role};
use crate::domain::repository::{CourseRepository, EnrollmentRepository, UserRepository};
use crate::domain::types::{
    Caller, EnrolledCourse, Enrollment, EnrollmentStats, RosterEntry,
};
use crate::error::LmsError;

/// Move progress forward. Reaching the maximum marks the enrollment complete.
fn advance_progress(
    enrollment: &mut Enrollment,
    progress: i32,
    now: DateTime<Utc>,
) -> Result<(), LmsError> {
    if !(MIN_PROGRESS..=MAX_PROGRESS).contains(&progress) {
        return Err(LmsError::validation(format!(
            "progress must be between {MIN_PROGRESS} and {MAX_PROGRESS}"
        )));
    }
    if progress < enrollment.progress {
        return Err(LmsError::validation(format!(
            "progress cannot go backwards (currently {})",
            enrollment.progress
        )));
    }
    enrollment.progress = progress;
    if progress == MAX_PROGRESS && !enrollment.completed {
        enrollment.completed = true;
        enrollment.completed_at = Some(now);
    }
    Ok(())
}

fn mark_complete(enrollment: &mut Enrollment, now: DateTime<Utc>) {
    enrollment.progress = MAX_PROGRESS;
    if !enrollment.completed {
        enrollment.completed = true;
        enrollment.completed_at = Some(now);
    }
}

/// Load an enrollment that belongs to the caller.
async fn owned_enrollment<E: EnrollmentRepository>(
    enrollments: &E,
    caller: &Caller,
    id: Uuid,
) -> Result<Enrollment, LmsError> {
    let enrollment = enrollments
        .find_by_id(id)
        .await?
        .ok_or(LmsError::EnrollmentNotFound)?;
    if enrollment.student_id != caller.id {
        return Err(LmsError::Forbidden("this enrollment belongs to another student"));
    }
    Ok(enrollment)
}

// ── Enroll ───────────────────────────────────────────────────────────────────

pub struct EnrollUseCase<E: EnrollmentRepository, C: CourseRepository> {
    pub enrollments: E,
    pub courses: C,
}

impl<E: EnrollmentRepository, C: CourseRepository> EnrollUseCase<E, C> {
    pub async fn execute(&self, caller: &Caller, course_id: Uuid) -> Result<Enrollment, LmsError> {
        ensure_role(caller, Role::Student, "only students can enroll in courses")?;
        if self.courses.find_by_id(course_id).await?.is_none() {
            return Err(LmsError::CourseNotFound);
        }
        if self.enrollments.find(caller.id, course_id).await?.is_some() {
            return Err(LmsError::AlreadyEnrolled);
        }
        let enrollment = Enrollment {
            id: Uuid::now_v7(),
            student_id: caller.id,
            course_id,
            progress: MIN_PROGRESS,
            completed: false,
            enrolled_at: Utc::now(),
            completed_at: None,
        };
        self.enrollments.enroll(&enrollment).await?;
        tracing::info!(enrollment_id = %enrollment.id, student_id = %caller.id, %course_id, "enrolled");
        Ok(enrollment)
    }
}

// ── UpdateProgress ───────────────────────────────────────────────────────────

pub struct UpdateProgressUseCase<E: EnrollmentRepository> {
    pub enrollments: E,
}

impl<E: EnrollmentRepository> UpdateProgressUseCase<E> {
    pub async fn execute(
        &self,
        caller: &Caller,
        id: Uuid,
        progress: i32,
    ) -> Result<Enrollment, LmsError> {
        let mut enrollment = owned_enrollment(&self.enrollments, caller, id).await?;
        advance_progress(&mut enrollment, progress, Utc::now())?;
        self.enrollments.save_progress(&enrollment).await?;
        tracing::info!(enrollment_id = %id, progress, completed = enrollment.completed, "progress updated");
        Ok(enrollment)
    }

    pub async fn complete(&self, caller: &Caller, id: Uuid) -> Result<Enrollment, LmsError> {
        let mut enrollment = owned_enrollment(&self.enrollments, caller, id).await?;
        mark_complete(&mut enrollment, Utc::now());
        self.enrollments.save_progress(&enrollment).await?;
        tracing::info!(enrollment_id = %id, "enrollment completed");
        Ok(enrollment)
    }
}

// ── Unenroll ─────────────────────────────────────────────────────────────────

pub struct UnenrollUseCase<E: EnrollmentRepository> {
    pub enrollments: E,
}

impl<E: EnrollmentRepository> UnenrollUseCase<E> {
    pub async fn execute(&self, caller: &Caller, id: Uuid) -> Result<(), LmsError> {
        let enrollment = owned_enrollment(&self.enrollments, caller, id).await?;
        self.enrollments.unenroll(&enrollment).await?;
        tracing::info!(enrollment_id = %id, course_id = %enrollment.course_id, "unenrolled");
        Ok(())
    }
}

// ── MyEnrollments ────────────────────────────────────────────────────────────

pub struct MyEnrollmentsUseCase<E: EnrollmentRepository, C: CourseRepository> {
    pub enrollments: E,
    pub courses: C,
}

impl<E: EnrollmentRepository, C: CourseRepository> MyEnrollmentsUseCase<E, C> {
    /// The caller's enrollments joined with their courses.
    pub async fn courses(&self, caller: &Caller) -> Result<Vec<EnrolledCourse>, LmsError> {
        let enrollments = self.enrollments.list_by_student(caller.id).await?;
        let ids: Vec<Uuid> = enrollments.iter().map(|e| e.course_id).collect();
        let mut courses: HashMap<Uuid, _> = self
            .courses
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
        Ok(enrollments
            .into_iter()
            .filter_map(|enrollment| {
                let course = courses.remove(&enrollment.course_id)?;
                Some(EnrolledCourse { enrollment, course })
            })
            .collect())
    }

    pub async fn course_ids(&self, caller: &Caller) -> Result<Vec<Uuid>, LmsError> {
        let enrollments = self.enrollments.list_by_student(caller.id).await?;
        Ok(enrollments.into_iter().map(|e| e.course_id).collect())
    }

    /// Staff always count as enrolled.
    pub async fn is_enrolled(&self, caller: &Caller, course_id: Uuid) -> Result<bool, LmsError> {
        if caller.role != Role::Student {
            return Ok(true);
        }
        Ok(self.enrollments.find(caller.id, course_id).await?.is_some())
    }

    pub async fn stats(&self, caller: &Caller) -> Result<EnrollmentStats, LmsError> {
        let enrollments = self.enrollments.list_by_student(caller.id).await?;
        Ok(EnrollmentStats::from_enrollments(&enrollments))
    }
}

// ── CourseRoster ─────────────────────────────────────────────────────────────

pub struct CourseRosterUseCase<E: EnrollmentRepository, C: CourseRepository, U: UserRepository> {
    pub enrollments: E,
    pub courses: C,
    pub users: U,
}

impl<E, C, U> CourseRosterUseCase<E, C, U>
where
    E: EnrollmentRepository,
    C: CourseRepository,
    U: UserRepository,
{
    pub async fn execute(
        &self,
        caller: &Caller,
        course_id: Uuid,
    ) -> Result<Vec<RosterEntry>, LmsError> {
        let course = self
            .courses
            .find_by_id(course_id)
            .await?
            .ok_or(LmsError::CourseNotFound)?;
        ensure_course_manager(caller, &course)?;

        let enrollments = self.enrollments.list_by_course(course_id).await?;
        let ids: Vec<Uuid> = enrollments.iter().map(|e| e.student_id).collect();
        let mut students: HashMap<Uuid, _> = self
            .users
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();
        Ok(enrollments
            .into_iter()
            .filter_map(|enrollment| {
                let student = students.remove(&enrollment.student_id)?;
                Some(RosterEntry { enrollment, student })
            })
            .collect())
    }
}
