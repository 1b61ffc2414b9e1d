//! sea-orm entities for the LMS database.

pub mod assignments;
pub mod courses;
pub mod enrollments;
pub mod notes;
pub mod submissions;
pub mod users;
