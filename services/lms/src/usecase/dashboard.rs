use lms_domain::user::Role;

use crate::domain::policy::{ensure_admin, ensure_role};
use crate::domain::repository::{CourseRepository, UserRepository};
use crate::domain::types::{Caller, Course, User, UserStats};
use crate::error::LmsError;

const RECENT_USERS: u64 = 5;

#[derive(Debug, Clone)]
pub struct AdminDashboard {
    pub users: UserStats,
    pub total_courses: u64,
    pub recent_users: Vec<User>,
}

#[derive(Debug, Clone)]
pub struct TeacherDashboard {
    pub teacher: User,
    pub courses_count: usize,
    pub students_count: i64,
    pub courses: Vec<Course>,
}

pub struct DashboardUseCase<U: UserRepository, C: CourseRepository> {
    pub users: U,
    pub courses: C,
}

impl<U: UserRepository, C: CourseRepository> DashboardUseCase<U, C> {
    pub async fn admin(&self, caller: &Caller) -> Result<AdminDashboard, LmsError> {
        ensure_admin(caller)?;
        Ok(AdminDashboard {
            users: self.users.stats().await?,
            total_courses: self.courses.count().await?,
            recent_users: self.users.recent(RECENT_USERS).await?,
        })
    }

    pub async fn teacher(&self, caller: &Caller) -> Result<TeacherDashboard, LmsError> {
        ensure_role(caller, Role::Teacher, "teacher access required")?;
        let teacher = self
            .users
            .find_by_id(caller.id)
            .await?
            .ok_or(LmsError::Unauthenticated)?;
        let courses = self.courses.list_by_instructor(caller.id).await?;
        Ok(TeacherDashboard {
            teacher,
            courses_count: courses.len(),
            students_count: courses.iter().map(|c| i64::from(c.students.max(0))).sum(),
            courses,
        })
    }
}
