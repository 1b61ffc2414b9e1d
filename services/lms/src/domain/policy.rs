//! Authorization rules as pure functions of caller and resource.

use std::collections::HashSet;

use uuid::Uuid;

use lms_domain::note::NoteVisibility;
use lms_domain::user::Role;

use crate::domain::types::{Caller, Course, Note};
use crate::error::LmsError;

pub fn ensure_admin(caller: &Caller) -> Result<(), LmsError> {
    if caller.is_admin() {
        Ok(())
    } else {
        Err(LmsError::Forbidden("admin access required"))
    }
}

pub fn ensure_role(caller: &Caller, role: Role, reason: &'static str) -> Result<(), LmsError> {
    if caller.role == role {
        Ok(())
    } else {
        Err(LmsError::Forbidden(reason))
    }
}

pub fn ensure_staff(caller: &Caller) -> Result<(), LmsError> {
    if caller.role.is_staff() {
        Ok(())
    } else {
        Err(LmsError::Forbidden("teacher or admin access required"))
    }
}

/// Admins manage every course; teachers only the ones they instruct.
pub fn can_manage_course(caller: &Caller, course: &Course) -> bool {
    match caller.role {
        Role::Admin => true,
        Role::Teacher => course.instructor_id == caller.id,
        Role::Student => false,
    }
}

pub fn ensure_course_manager(caller: &Caller, course: &Course) -> Result<(), LmsError> {
    if can_manage_course(caller, course) {
        Ok(())
    } else {
        Err(LmsError::Forbidden(
            "only the course instructor or an admin can do this",
        ))
    }
}

/// Set of courses a caller may see course-scoped content for.
#[derive(Debug, Clone, Default)]
pub struct CourseAccess {
    all: bool,
    courses: HashSet<Uuid>,
}

impl CourseAccess {
    pub fn everything() -> Self {
        Self {
            all: true,
            courses: HashSet::new(),
        }
    }

    pub fn only(courses: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            all: false,
            courses: courses.into_iter().collect(),
        }
    }

    pub fn allows(&self, course_id: Uuid) -> bool {
        self.all || self.courses.contains(&course_id)
    }

    pub fn is_everything(&self) -> bool {
        self.all
    }
}

/// `ALL` notes are public to signed-in callers. `COURSE` notes need access
/// to their course; a course note without a course is admin-only.
pub fn can_read_note(access: &CourseAccess, note: &Note) -> bool {
    match note.visibility {
        NoteVisibility::All => true,
        NoteVisibility::Course => match note.course_id {
            Some(course_id) => access.allows(course_id),
            None => access.is_everything(),
        },
    }
}
