use crate::infra::db::{DbAssignmentRepository, DbCourseRepository, DbUserRepository};
use crate::state::AppState;
use crate::usecase::names::DisplayNamesUseCase;

pub mod assignments;
pub mod auth;
pub mod courses;
pub mod dashboard;
pub mod enrollments;
pub mod extract;
pub mod files;
pub mod notes;
pub mod submissions;
pub mod users;

pub(crate) fn display_names(
    state: &AppState,
) -> DisplayNamesUseCase<DbUserRepository, DbCourseRepository, DbAssignmentRepository> {
    DisplayNamesUseCase {
        users: state.user_repo(),
        courses: state.course_repo(),
        assignments: state.assignment_repo(),
    }
}
