use chrono::Utc;
use uuid::Uuid;

use lms_domain::course::{CourseLevel, format_price};
use lms_domain::user::Role;

use crate::domain::policy::{ensure_course_manager, ensure_staff};
use crate::domain::repository::{CourseRepository, FileStore, UserRepository};
use crate::domain::types::{Caller, Course, User};
use crate::error::LmsError;
use crate::usecase::user::clean;

/// Course fields as received. On create, absent fields take defaults; on
/// update, absent fields are left unchanged.
#[derive(Debug, Default, Clone)]
pub struct CourseInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
    pub duration: Option<String>,
    pub price: Option<f64>,
    pub instructor_id: Option<Uuid>,
}

/// Resolve `id` to an account that may own courses.
async fn require_teacher<U: UserRepository>(users: &U, id: Uuid) -> Result<User, LmsError> {
    let user = users
        .find_by_id(id)
        .await?
        .ok_or_else(|| LmsError::validation("instructor not found"))?;
    if user.role != Role::Teacher {
        return Err(LmsError::validation("instructor must be a teacher"));
    }
    Ok(user)
}

fn parse_price(price: f64) -> Result<String, LmsError> {
    if !price.is_finite() || price < 0.0 {
        return Err(LmsError::validation("price must be zero or positive"));
    }
    Ok(format_price(Some(price)))
}

fn required_title(title: Option<String>) -> Result<String, LmsError> {
    clean(title).ok_or_else(|| LmsError::validation("title is required"))
}

// ── CreateCourse ─────────────────────────────────────────────────────────────

pub struct CreateCourseUseCase<C: CourseRepository, U: UserRepository> {
    pub courses: C,
    pub users: U,
}

impl<C: CourseRepository, U: UserRepository> CreateCourseUseCase<C, U> {
    pub async fn execute(&self, caller: &Caller, input: CourseInput) -> Result<Course, LmsError> {
        let instructor_id = match caller.role {
            Role::Student => {
                return Err(LmsError::Forbidden(
                    "only teachers and admins can create courses",
                ));
            }
            // Any instructor in the payload is ignored for teachers.
            Role::Teacher => caller.id,
            Role::Admin => {
                let id = input.instructor_id.ok_or_else(|| {
                    LmsError::validation("instructorId is required when an admin creates a course")
                })?;
                require_teacher(&self.users, id).await?.id
            }
        };

        let title = required_title(input.title)?;
        let level = match clean(input.level) {
            Some(level) => level.parse::<CourseLevel>()?,
            None => CourseLevel::default(),
        };
        let price = match input.price {
            Some(price) => parse_price(price)?,
            None => format_price(None),
        };

        let now = Utc::now();
        let course = Course {
            id: Uuid::now_v7(),
            title,
            description: clean(input.description).unwrap_or_default(),
            category: clean(input.category).unwrap_or_default(),
            level,
            duration: clean(input.duration).unwrap_or_default(),
            price,
            instructor_id,
            students: 0,
            rating: 0.0,
            created_at: now,
            updated_at: now,
        };
        self.courses.create(&course).await?;
        tracing::info!(course_id = %course.id, instructor_id = %instructor_id, by = %caller.id, "course created");
        Ok(course)
    }
}

// ── UpdateCourse ─────────────────────────────────────────────────────────────

pub struct UpdateCourseUseCase<C: CourseRepository, U: UserRepository> {
    pub courses: C,
    pub users: U,
}

impl<C: CourseRepository, U: UserRepository> UpdateCourseUseCase<C, U> {
    pub async fn execute(
        &self,
        caller: &Caller,
        id: Uuid,
        input: CourseInput,
    ) -> Result<Course, LmsError> {
        let mut course = self
            .courses
            .find_by_id(id)
            .await?
            .ok_or(LmsError::CourseNotFound)?;
        ensure_course_manager(caller, &course)?;

        if let Some(instructor_id) = input.instructor_id {
            if instructor_id != course.instructor_id {
                if !caller.is_admin() {
                    return Err(LmsError::Forbidden("only admins can reassign a course"));
                }
                course.instructor_id = require_teacher(&self.users, instructor_id).await?.id;
            }
        }
        if input.title.is_some() {
            course.title = required_title(input.title)?;
        }
        if let Some(description) = input.description {
            course.description = description.trim().to_owned();
        }
        if let Some(category) = input.category {
            course.category = category.trim().to_owned();
        }
        if let Some(level) = clean(input.level) {
            course.level = level.parse()?;
        }
        if let Some(duration) = input.duration {
            course.duration = duration.trim().to_owned();
        }
        if let Some(price) = input.price {
            course.price = parse_price(price)?;
        }
        course.updated_at = Utc::now();

        self.courses.update(&course).await?;
        tracing::info!(course_id = %course.id, by = %caller.id, "course updated");
        Ok(course)
    }
}

// ── DeleteCourse ─────────────────────────────────────────────────────────────

pub struct DeleteCourseUseCase<C: CourseRepository, F: FileStore> {
    pub courses: C,
    pub files: F,
}

impl<C: CourseRepository, F: FileStore> DeleteCourseUseCase<C, F> {
    pub async fn execute(&self, caller: &Caller, id: Uuid) -> Result<(), LmsError> {
        let course = self
            .courses
            .find_by_id(id)
            .await?
            .ok_or(LmsError::CourseNotFound)?;
        ensure_course_manager(caller, &course)?;
        let orphans = self.courses.delete_cascade(id).await?;
        for url in &orphans {
            self.files.remove(url).await;
        }
        tracing::info!(course_id = %id, by = %caller.id, files = orphans.len(), "course deleted");
        Ok(())
    }
}

// ── Queries ──────────────────────────────────────────────────────────────────

pub struct GetCourseUseCase<C: CourseRepository> {
    pub courses: C,
}

impl<C: CourseRepository> GetCourseUseCase<C> {
    pub async fn execute(&self, id: Uuid) -> Result<Course, LmsError> {
        self.courses
            .find_by_id(id)
            .await?
            .ok_or(LmsError::CourseNotFound)
    }
}

pub struct ListCoursesUseCase<C: CourseRepository> {
    pub courses: C,
}

impl<C: CourseRepository> ListCoursesUseCase<C> {
    pub async fn all(&self) -> Result<Vec<Course>, LmsError> {
        self.courses.list_all().await
    }

    pub async fn by_category(&self, category: &str) -> Result<Vec<Course>, LmsError> {
        self.courses.list_by_category(category.trim()).await
    }

    /// A blank query matches every course.
    pub async fn search(&self, query: &str) -> Result<Vec<Course>, LmsError> {
        let query = query.trim();
        if query.is_empty() {
            return self.courses.list_all().await;
        }
        self.courses.search(query).await
    }

    /// Courses taught by the caller.
    pub async fn mine(&self, caller: &Caller) -> Result<Vec<Course>, LmsError> {
        ensure_staff(caller)?;
        self.courses.list_by_instructor(caller.id).await
    }
}
