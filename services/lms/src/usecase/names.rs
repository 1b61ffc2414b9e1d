//! Display names for the ids carried by course, assignment, submission and
//! note responses. Each lookup is one batched `find_by_ids` per table.

use std::collections::HashMap;

use uuid::Uuid;

use crate::domain::repository::{AssignmentRepository, CourseRepository, UserRepository};
use crate::domain::types::{Assignment, Course, Note, Submission};
use crate::error::LmsError;

/// Title and owning course of an assignment.
#[derive(Debug, Clone)]
pub struct AssignmentName {
    pub title: String,
    pub course_id: Uuid,
}

#[derive(Debug, Default)]
pub struct DisplayNames {
    users: HashMap<Uuid, String>,
    courses: HashMap<Uuid, String>,
    assignments: HashMap<Uuid, AssignmentName>,
}

impl DisplayNames {
    pub fn user(&self, id: Uuid) -> Option<String> {
        self.users.get(&id).cloned()
    }

    pub fn course(&self, id: Uuid) -> Option<String> {
        self.courses.get(&id).cloned()
    }

    pub fn assignment(&self, id: Uuid) -> Option<AssignmentName> {
        self.assignments.get(&id).cloned()
    }
}

fn unique(mut ids: Vec<Uuid>) -> Vec<Uuid> {
    ids.sort_unstable();
    ids.dedup();
    ids
}

pub struct DisplayNamesUseCase<U: UserRepository, C: CourseRepository, A: AssignmentRepository> {
    pub users: U,
    pub courses: C,
    pub assignments: A,
}

impl<U, C, A> DisplayNamesUseCase<U, C, A>
where
    U: UserRepository,
    C: CourseRepository,
    A: AssignmentRepository,
{
    /// Instructor names.
    pub async fn for_courses<'a>(
        &self,
        courses: impl IntoIterator<Item = &'a Course>,
    ) -> Result<DisplayNames, LmsError> {
        let users = courses.into_iter().map(|c| c.instructor_id).collect();
        self.load(users, vec![], vec![]).await
    }

    /// Course titles and creator names.
    pub async fn for_assignments(
        &self,
        assignments: &[Assignment],
    ) -> Result<DisplayNames, LmsError> {
        let users = assignments.iter().map(|a| a.created_by).collect();
        let courses = assignments.iter().map(|a| a.course_id).collect();
        self.load(users, courses, vec![]).await
    }

    /// Assignment titles, their course titles and student names.
    pub async fn for_submissions(
        &self,
        submissions: &[Submission],
    ) -> Result<DisplayNames, LmsError> {
        let users = submissions.iter().map(|s| s.student_id).collect();
        let assignments = submissions.iter().map(|s| s.assignment_id).collect();
        self.load(users, vec![], assignments).await
    }

    /// Course titles and author names. General notes have no course.
    pub async fn for_notes(&self, notes: &[Note]) -> Result<DisplayNames, LmsError> {
        let users = notes.iter().map(|n| n.author_id).collect();
        let courses = notes.iter().filter_map(|n| n.course_id).collect();
        self.load(users, courses, vec![]).await
    }

    async fn load(
        &self,
        user_ids: Vec<Uuid>,
        mut course_ids: Vec<Uuid>,
        assignment_ids: Vec<Uuid>,
    ) -> Result<DisplayNames, LmsError> {
        let assignments: HashMap<Uuid, AssignmentName> = self
            .assignments
            .find_by_ids(&unique(assignment_ids))
            .await?
            .into_iter()
            .map(|a| {
                let name = AssignmentName {
                    title: a.title,
                    course_id: a.course_id,
                };
                (a.id, name)
            })
            .collect();
        course_ids.extend(assignments.values().map(|a| a.course_id));

        let courses = self
            .courses
            .find_by_ids(&unique(course_ids))
            .await?
            .into_iter()
            .map(|c| (c.id, c.title))
            .collect();
        let users = self
            .users
            .find_by_ids(&unique(user_ids))
            .await?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect();

        Ok(DisplayNames {
            users,
            courses,
            assignments,
        })
    }
}
