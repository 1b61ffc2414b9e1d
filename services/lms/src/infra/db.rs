use anyhow::Context as _;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    SqlErr, TransactionError, TransactionTrait,
    sea_query::{Expr, OnConflict},
};
use uuid::Uuid;

use lms_core::sea_ext::contains_ignore_case;
use lms_domain::course::CourseLevel;
use lms_domain::note::NoteVisibility;
use lms_domain::user::{Role, UserStatus};
use lms_schema::{assignments, courses, enrollments, notes, submissions, users};

use crate::domain::repository::{
    AssignmentRepository, CourseRepository, EnrollmentRepository, NoteRepository,
    SubmissionRepository, UserRepository,
};
use crate::domain::types::{
    Assignment, Attachment, Course, Enrollment, Note, Submission, User, UserStats,
};
use crate::error::LmsError;

fn unwrap_txn_err(err: TransactionError<DbErr>) -> DbErr {
    match err {
        TransactionError::Connection(e) | TransactionError::Transaction(e) => e,
    }
}

fn is_unique_violation(err: &DbErr) -> Option<String> {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => Some(msg),
        _ => None,
    }
}

/// Map a failed user write: unique violations become conflicts, anything
/// else is internal.
fn user_write_error(err: DbErr, context: &'static str) -> LmsError {
    match is_unique_violation(&err) {
        Some(msg) if msg.contains("student_id") => LmsError::StudentIdTaken,
        Some(_) => LmsError::EmailTaken,
        None => anyhow::Error::new(err).context(context).into(),
    }
}

fn attachment_from_parts(
    name: Option<String>,
    size: Option<i64>,
    content_type: Option<String>,
    url: Option<String>,
) -> Option<Attachment> {
    let url = url?;
    Some(Attachment {
        name: name.unwrap_or_default(),
        size: size.unwrap_or_default(),
        content_type: content_type.unwrap_or_default(),
        url,
    })
}

type AttachmentColumns = (Option<String>, Option<i64>, Option<String>, Option<String>);

fn attachment_columns(attachment: &Option<Attachment>) -> AttachmentColumns {
    match attachment {
        Some(a) => (
            Some(a.name.clone()),
            Some(a.size),
            Some(a.content_type.clone()),
            Some(a.url.clone()),
        ),
        None => (None, None, None, None),
    }
}

/// Decrement `courses.students` for one course, never below zero.
async fn decrement_students(txn: &DatabaseTransaction, course_id: Uuid) -> Result<(), DbErr> {
    courses::Entity::update_many()
        .col_expr(
            courses::Column::Students,
            Expr::col(courses::Column::Students).sub(1),
        )
        .filter(courses::Column::Id.eq(course_id))
        .filter(courses::Column::Students.gt(0))
        .exec(txn)
        .await?;
    Ok(())
}

/// Delete submissions matching `cond`, returning their attachment URLs.
async fn delete_submissions(
    txn: &DatabaseTransaction,
    cond: Condition,
) -> Result<Vec<String>, DbErr> {
    let urls: Vec<Option<String>> = submissions::Entity::find()
        .select_only()
        .column(submissions::Column::AttachmentUrl)
        .filter(cond.clone())
        .into_tuple()
        .all(txn)
        .await?;
    submissions::Entity::delete_many().filter(cond).exec(txn).await?;
    Ok(urls.into_iter().flatten().collect())
}

async fn delete_assignments(
    txn: &DatabaseTransaction,
    ids: &[Uuid],
) -> Result<Vec<String>, DbErr> {
    let urls: Vec<Option<String>> = assignments::Entity::find()
        .select_only()
        .column(assignments::Column::AttachmentUrl)
        .filter(assignments::Column::Id.is_in(ids.to_vec()))
        .into_tuple()
        .all(txn)
        .await?;
    assignments::Entity::delete_many()
        .filter(assignments::Column::Id.is_in(ids.to_vec()))
        .exec(txn)
        .await?;
    Ok(urls.into_iter().flatten().collect())
}

async fn delete_notes(txn: &DatabaseTransaction, cond: Condition) -> Result<Vec<String>, DbErr> {
    let urls: Vec<Option<String>> = notes::Entity::find()
        .select_only()
        .column(notes::Column::AttachmentUrl)
        .filter(cond.clone())
        .into_tuple()
        .all(txn)
        .await?;
    notes::Entity::delete_many().filter(cond).exec(txn).await?;
    Ok(urls.into_iter().flatten().collect())
}

async fn assignment_ids_in_courses(
    txn: &DatabaseTransaction,
    course_ids: &[Uuid],
) -> Result<Vec<Uuid>, DbErr> {
    assignments::Entity::find()
        .select_only()
        .column(assignments::Column::Id)
        .filter(assignments::Column::CourseId.is_in(course_ids.to_vec()))
        .into_tuple()
        .all(txn)
        .await
}

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, LmsError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, LmsError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_student_id(&self, student_id: &str) -> Result<Option<User>, LmsError> {
        let model = users::Entity::find()
            .filter(users::Column::StudentId.eq(student_id))
            .one(&self.db)
            .await
            .context("find user by student id")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, LmsError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let models = users::Entity::find()
            .filter(users::Column::Id.is_in(ids.to_vec()))
            .all(&self.db)
            .await
            .context("find users by ids")?;
        models.into_iter().map(user_from_model).collect()
    }

    async fn list(&self, role: Option<Role>) -> Result<Vec<User>, LmsError> {
        let mut query = users::Entity::find();
        if let Some(role) = role {
            query = query.filter(users::Column::Role.eq(role.as_str()));
        }
        let models = query
            .order_by_desc(users::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list users")?;
        models.into_iter().map(user_from_model).collect()
    }

    async fn search(&self, query: &str) -> Result<Vec<User>, LmsError> {
        let models = users::Entity::find()
            .filter(
                Condition::any()
                    .add(contains_ignore_case(users::Column::Name, query))
                    .add(contains_ignore_case(users::Column::Email, query))
                    .add(contains_ignore_case(users::Column::StudentId, query)),
            )
            .order_by_asc(users::Column::Name)
            .all(&self.db)
            .await
            .context("search users")?;
        models.into_iter().map(user_from_model).collect()
    }

    async fn recent(&self, limit: u64) -> Result<Vec<User>, LmsError> {
        let models = users::Entity::find()
            .order_by_desc(users::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .context("list recent users")?;
        models.into_iter().map(user_from_model).collect()
    }

    async fn stats(&self) -> Result<UserStats, LmsError> {
        let rows: Vec<(String, String, i64)> = users::Entity::find()
            .select_only()
            .column(users::Column::Role)
            .column(users::Column::Status)
            .column_as(users::Column::Id.count(), "count")
            .group_by(users::Column::Role)
            .group_by(users::Column::Status)
            .into_tuple()
            .all(&self.db)
            .await
            .context("count users by role and status")?;

        let mut stats = UserStats::default();
        for (role, status, count) in rows {
            let count = count.max(0) as u64;
            stats.total += count;
            match role.parse::<Role>().context("stored user role")? {
                Role::Student => stats.students += count,
                Role::Teacher => stats.teachers += count,
                Role::Admin => stats.admins += count,
            }
            match status.parse::<UserStatus>().context("stored user status")? {
                UserStatus::Active => stats.active += count,
                UserStatus::Inactive => stats.inactive += count,
                UserStatus::Suspended => stats.suspended += count,
            }
        }
        Ok(stats)
    }

    async fn create(&self, user: &User) -> Result<(), LmsError> {
        user_active_model(user)
            .insert(&self.db)
            .await
            .map_err(|e| user_write_error(e, "create user"))?;
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), LmsError> {
        user_active_model(user)
            .update(&self.db)
            .await
            .map_err(|e| user_write_error(e, "update user"))?;
        Ok(())
    }

    async fn delete_cascade(&self, id: Uuid) -> Result<Vec<String>, LmsError> {
        let orphans = self
            .db
            .transaction::<_, Vec<String>, DbErr>(|txn| {
                Box::pin(async move {
                    let owned_courses: Vec<Uuid> = courses::Entity::find()
                        .select_only()
                        .column(courses::Column::Id)
                        .filter(courses::Column::InstructorId.eq(id))
                        .into_tuple()
                        .all(txn)
                        .await?;

                    let mut assignment_ids = assignment_ids_in_courses(txn, &owned_courses).await?;
                    let authored: Vec<Uuid> = assignments::Entity::find()
                        .select_only()
                        .column(assignments::Column::Id)
                        .filter(assignments::Column::CreatedBy.eq(id))
                        .into_tuple()
                        .all(txn)
                        .await?;
                    for assignment_id in authored {
                        if !assignment_ids.contains(&assignment_id) {
                            assignment_ids.push(assignment_id);
                        }
                    }

                    let mut orphans = delete_submissions(
                        txn,
                        Condition::any()
                            .add(submissions::Column::StudentId.eq(id))
                            .add(submissions::Column::AssignmentId.is_in(assignment_ids.clone())),
                    )
                    .await?;
                    orphans.extend(delete_assignments(txn, &assignment_ids).await?);
                    orphans.extend(
                        delete_notes(
                            txn,
                            Condition::any()
                                .add(notes::Column::AuthorId.eq(id))
                                .add(notes::Column::CourseId.is_in(owned_courses.clone())),
                        )
                        .await?,
                    );

                    // Counters only matter for courses that survive this delete.
                    let joined: Vec<Uuid> = enrollments::Entity::find()
                        .select_only()
                        .column(enrollments::Column::CourseId)
                        .filter(enrollments::Column::StudentId.eq(id))
                        .filter(enrollments::Column::CourseId.is_not_in(owned_courses.clone()))
                        .into_tuple()
                        .all(txn)
                        .await?;
                    for course_id in joined {
                        decrement_students(txn, course_id).await?;
                    }
                    enrollments::Entity::delete_many()
                        .filter(
                            Condition::any()
                                .add(enrollments::Column::StudentId.eq(id))
                                .add(enrollments::Column::CourseId.is_in(owned_courses.clone())),
                        )
                        .exec(txn)
                        .await?;

                    courses::Entity::delete_many()
                        .filter(courses::Column::InstructorId.eq(id))
                        .exec(txn)
                        .await?;
                    users::Entity::delete_by_id(id).exec(txn).await?;
                    Ok(orphans)
                })
            })
            .await
            .map_err(unwrap_txn_err)
            .context("delete user cascade")?;
        Ok(orphans)
    }
}

fn user_active_model(user: &User) -> users::ActiveModel {
    users::ActiveModel {
        id: Set(user.id),
        name: Set(user.name.clone()),
        email: Set(user.email.clone()),
        password_hash: Set(user.password_hash.clone()),
        role: Set(user.role.as_str().to_owned()),
        status: Set(user.status.as_str().to_owned()),
        student_id: Set(user.student_id.clone()),
        subject: Set(user.subject.clone()),
        qualification: Set(user.qualification.clone()),
        phone: Set(user.phone.clone()),
        created_at: Set(user.created_at),
        updated_at: Set(user.updated_at),
    }
}

fn user_from_model(model: users::Model) -> Result<User, LmsError> {
    Ok(User {
        id: model.id,
        name: model.name,
        email: model.email,
        password_hash: model.password_hash,
        role: model.role.parse::<Role>().context("stored user role")?,
        status: model.status.parse::<UserStatus>().context("stored user status")?,
        student_id: model.student_id,
        subject: model.subject,
        qualification: model.qualification,
        phone: model.phone,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Course repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCourseRepository {
    pub db: DatabaseConnection,
}

impl CourseRepository for DbCourseRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Course>, LmsError> {
        let model = courses::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find course by id")?;
        model.map(course_from_model).transpose()
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Course>, LmsError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let models = courses::Entity::find()
            .filter(courses::Column::Id.is_in(ids.to_vec()))
            .all(&self.db)
            .await
            .context("find courses by ids")?;
        models.into_iter().map(course_from_model).collect()
    }

    async fn list_all(&self) -> Result<Vec<Course>, LmsError> {
        let models = courses::Entity::find()
            .order_by_desc(courses::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list courses")?;
        models.into_iter().map(course_from_model).collect()
    }

    async fn list_by_instructor(&self, instructor_id: Uuid) -> Result<Vec<Course>, LmsError> {
        let models = courses::Entity::find()
            .filter(courses::Column::InstructorId.eq(instructor_id))
            .order_by_desc(courses::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list courses by instructor")?;
        models.into_iter().map(course_from_model).collect()
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<Course>, LmsError> {
        let models = courses::Entity::find()
            .filter(courses::Column::Category.eq(category))
            .order_by_desc(courses::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list courses by category")?;
        models.into_iter().map(course_from_model).collect()
    }

    async fn search(&self, query: &str) -> Result<Vec<Course>, LmsError> {
        let models = courses::Entity::find()
            .filter(
                Condition::any()
                    .add(contains_ignore_case(courses::Column::Title, query))
                    .add(contains_ignore_case(courses::Column::Description, query))
                    .add(contains_ignore_case(courses::Column::Category, query)),
            )
            .order_by_desc(courses::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("search courses")?;
        models.into_iter().map(course_from_model).collect()
    }

    async fn count(&self) -> Result<u64, LmsError> {
        Ok(courses::Entity::find()
            .count(&self.db)
            .await
            .context("count courses")?)
    }

    async fn create(&self, course: &Course) -> Result<(), LmsError> {
        course_active_model(course)
            .insert(&self.db)
            .await
            .context("create course")?;
        Ok(())
    }

    async fn update(&self, course: &Course) -> Result<(), LmsError> {
        let mut am = course_active_model(course);
        // The counter is owned by the enrollment transactions.
        am.students = sea_orm::ActiveValue::NotSet;
        am.update(&self.db).await.context("update course")?;
        Ok(())
    }

    async fn delete_cascade(&self, id: Uuid) -> Result<Vec<String>, LmsError> {
        let orphans = self
            .db
            .transaction::<_, Vec<String>, DbErr>(|txn| {
                Box::pin(async move {
                    let assignment_ids = assignment_ids_in_courses(txn, &[id]).await?;
                    let mut orphans = delete_submissions(
                        txn,
                        Condition::all()
                            .add(submissions::Column::AssignmentId.is_in(assignment_ids.clone())),
                    )
                    .await?;
                    orphans.extend(delete_assignments(txn, &assignment_ids).await?);
                    orphans.extend(
                        delete_notes(txn, Condition::all().add(notes::Column::CourseId.eq(id)))
                            .await?,
                    );
                    enrollments::Entity::delete_many()
                        .filter(enrollments::Column::CourseId.eq(id))
                        .exec(txn)
                        .await?;
                    courses::Entity::delete_by_id(id).exec(txn).await?;
                    Ok(orphans)
                })
            })
            .await
            .map_err(unwrap_txn_err)
            .context("delete course cascade")?;
        Ok(orphans)
    }
}

fn course_active_model(course: &Course) -> courses::ActiveModel {
    courses::ActiveModel {
        id: Set(course.id),
        title: Set(course.title.clone()),
        description: Set(course.description.clone()),
        category: Set(course.category.clone()),
        level: Set(course.level.as_str().to_owned()),
        duration: Set(course.duration.clone()),
        price: Set(course.price.clone()),
        instructor_id: Set(course.instructor_id),
        students: Set(course.students),
        rating: Set(course.rating),
        created_at: Set(course.created_at),
        updated_at: Set(course.updated_at),
    }
}

fn course_from_model(model: courses::Model) -> Result<Course, LmsError> {
    Ok(Course {
        id: model.id,
        title: model.title,
        description: model.description,
        category: model.category,
        level: model.level.parse::<CourseLevel>().context("stored course level")?,
        duration: model.duration,
        price: model.price,
        instructor_id: model.instructor_id,
        students: model.students,
        rating: model.rating,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Enrollment repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbEnrollmentRepository {
    pub db: DatabaseConnection,
}

impl EnrollmentRepository for DbEnrollmentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Enrollment>, LmsError> {
        let model = enrollments::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find enrollment by id")?;
        Ok(model.map(enrollment_from_model))
    }

    async fn find(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<Enrollment>, LmsError> {
        let model = enrollments::Entity::find()
            .filter(enrollments::Column::StudentId.eq(student_id))
            .filter(enrollments::Column::CourseId.eq(course_id))
            .one(&self.db)
            .await
            .context("find enrollment")?;
        Ok(model.map(enrollment_from_model))
    }

    async fn list_by_student(&self, student_id: Uuid) -> Result<Vec<Enrollment>, LmsError> {
        let models = enrollments::Entity::find()
            .filter(enrollments::Column::StudentId.eq(student_id))
            .order_by_desc(enrollments::Column::EnrolledAt)
            .all(&self.db)
            .await
            .context("list enrollments by student")?;
        Ok(models.into_iter().map(enrollment_from_model).collect())
    }

    async fn list_by_course(&self, course_id: Uuid) -> Result<Vec<Enrollment>, LmsError> {
        let models = enrollments::Entity::find()
            .filter(enrollments::Column::CourseId.eq(course_id))
            .order_by_asc(enrollments::Column::EnrolledAt)
            .all(&self.db)
            .await
            .context("list enrollments by course")?;
        Ok(models.into_iter().map(enrollment_from_model).collect())
    }

    async fn enroll(&self, enrollment: &Enrollment) -> Result<(), LmsError> {
        let enrollment = enrollment.clone();
        let result = self
            .db
            .transaction::<_, (), DbErr>(|txn| {
                Box::pin(async move {
                    enrollments::ActiveModel {
                        id: Set(enrollment.id),
                        student_id: Set(enrollment.student_id),
                        course_id: Set(enrollment.course_id),
                        progress: Set(enrollment.progress),
                        completed: Set(enrollment.completed),
                        enrolled_at: Set(enrollment.enrolled_at),
                        completed_at: Set(enrollment.completed_at),
                    }
                    .insert(txn)
                    .await?;
                    courses::Entity::update_many()
                        .col_expr(
                            courses::Column::Students,
                            Expr::col(courses::Column::Students).add(1),
                        )
                        .filter(courses::Column::Id.eq(enrollment.course_id))
                        .exec(txn)
                        .await?;
                    Ok(())
                })
            })
            .await
            .map_err(unwrap_txn_err);
        match result {
            Ok(()) => Ok(()),
            Err(e) if is_unique_violation(&e).is_some() => Err(LmsError::AlreadyEnrolled),
            Err(e) => Err(anyhow::Error::new(e).context("enroll").into()),
        }
    }

    async fn save_progress(&self, enrollment: &Enrollment) -> Result<(), LmsError> {
        enrollments::ActiveModel {
            id: Set(enrollment.id),
            progress: Set(enrollment.progress),
            completed: Set(enrollment.completed),
            completed_at: Set(enrollment.completed_at),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("save enrollment progress")?;
        Ok(())
    }

    async fn unenroll(&self, enrollment: &Enrollment) -> Result<(), LmsError> {
        let id = enrollment.id;
        let course_id = enrollment.course_id;
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                Box::pin(async move {
                    let deleted = enrollments::Entity::delete_by_id(id).exec(txn).await?;
                    if deleted.rows_affected > 0 {
                        decrement_students(txn, course_id).await?;
                    }
                    Ok(())
                })
            })
            .await
            .map_err(unwrap_txn_err)
            .context("unenroll")?;
        Ok(())
    }
}

fn enrollment_from_model(model: enrollments::Model) -> Enrollment {
    Enrollment {
        id: model.id,
        student_id: model.student_id,
        course_id: model.course_id,
        progress: model.progress,
        completed: model.completed,
        enrolled_at: model.enrolled_at,
        completed_at: model.completed_at,
    }
}

// ── Assignment repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAssignmentRepository {
    pub db: DatabaseConnection,
}

impl AssignmentRepository for DbAssignmentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Assignment>, LmsError> {
        let model = assignments::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find assignment by id")?;
        Ok(model.map(assignment_from_model))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Assignment>, LmsError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let models = assignments::Entity::find()
            .filter(assignments::Column::Id.is_in(ids.to_vec()))
            .all(&self.db)
            .await
            .context("find assignments by ids")?;
        Ok(models.into_iter().map(assignment_from_model).collect())
    }

    async fn list_all(&self) -> Result<Vec<Assignment>, LmsError> {
        let models = assignments::Entity::find()
            .order_by_asc(assignments::Column::DueDate)
            .all(&self.db)
            .await
            .context("list assignments")?;
        Ok(models.into_iter().map(assignment_from_model).collect())
    }

    async fn list_by_course(&self, course_id: Uuid) -> Result<Vec<Assignment>, LmsError> {
        let models = assignments::Entity::find()
            .filter(assignments::Column::CourseId.eq(course_id))
            .order_by_asc(assignments::Column::DueDate)
            .all(&self.db)
            .await
            .context("list assignments by course")?;
        Ok(models.into_iter().map(assignment_from_model).collect())
    }

    async fn list_by_courses(&self, course_ids: &[Uuid]) -> Result<Vec<Assignment>, LmsError> {
        if course_ids.is_empty() {
            return Ok(vec![]);
        }
        let models = assignments::Entity::find()
            .filter(assignments::Column::CourseId.is_in(course_ids.to_vec()))
            .order_by_asc(assignments::Column::DueDate)
            .all(&self.db)
            .await
            .context("list assignments by courses")?;
        Ok(models.into_iter().map(assignment_from_model).collect())
    }

    async fn create(&self, assignment: &Assignment) -> Result<(), LmsError> {
        assignment_active_model(assignment)
            .insert(&self.db)
            .await
            .context("create assignment")?;
        Ok(())
    }

    async fn update(&self, assignment: &Assignment) -> Result<(), LmsError> {
        assignment_active_model(assignment)
            .update(&self.db)
            .await
            .context("update assignment")?;
        Ok(())
    }

    async fn delete_cascade(&self, id: Uuid) -> Result<Vec<String>, LmsError> {
        let orphans = self
            .db
            .transaction::<_, Vec<String>, DbErr>(|txn| {
                Box::pin(async move {
                    let mut orphans = delete_submissions(
                        txn,
                        Condition::all().add(submissions::Column::AssignmentId.eq(id)),
                    )
                    .await?;
                    orphans.extend(delete_assignments(txn, &[id]).await?);
                    Ok(orphans)
                })
            })
            .await
            .map_err(unwrap_txn_err)
            .context("delete assignment cascade")?;
        Ok(orphans)
    }
}

fn assignment_active_model(assignment: &Assignment) -> assignments::ActiveModel {
    let (name, size, content_type, url) = attachment_columns(&assignment.attachment);
    assignments::ActiveModel {
        id: Set(assignment.id),
        course_id: Set(assignment.course_id),
        title: Set(assignment.title.clone()),
        description: Set(assignment.description.clone()),
        due_date: Set(assignment.due_date),
        max_points: Set(assignment.max_points),
        attachment_name: Set(name),
        attachment_size: Set(size),
        attachment_type: Set(content_type),
        attachment_url: Set(url),
        created_by: Set(assignment.created_by),
        created_at: Set(assignment.created_at),
        updated_at: Set(assignment.updated_at),
    }
}

fn assignment_from_model(model: assignments::Model) -> Assignment {
    Assignment {
        id: model.id,
        course_id: model.course_id,
        title: model.title,
        description: model.description,
        due_date: model.due_date,
        max_points: model.max_points,
        attachment: attachment_from_parts(
            model.attachment_name,
            model.attachment_size,
            model.attachment_type,
            model.attachment_url,
        ),
        created_by: model.created_by,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Submission repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSubmissionRepository {
    pub db: DatabaseConnection,
}

impl SubmissionRepository for DbSubmissionRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Submission>, LmsError> {
        let model = submissions::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find submission by id")?;
        Ok(model.map(submission_from_model))
    }

    async fn find(
        &self,
        assignment_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<Submission>, LmsError> {
        let model = submissions::Entity::find()
            .filter(submissions::Column::AssignmentId.eq(assignment_id))
            .filter(submissions::Column::StudentId.eq(student_id))
            .one(&self.db)
            .await
            .context("find submission")?;
        Ok(model.map(submission_from_model))
    }

    async fn list_all(&self) -> Result<Vec<Submission>, LmsError> {
        let models = submissions::Entity::find()
            .order_by_desc(submissions::Column::SubmittedAt)
            .all(&self.db)
            .await
            .context("list submissions")?;
        Ok(models.into_iter().map(submission_from_model).collect())
    }

    async fn list_by_assignment(&self, assignment_id: Uuid) -> Result<Vec<Submission>, LmsError> {
        let models = submissions::Entity::find()
            .filter(submissions::Column::AssignmentId.eq(assignment_id))
            .order_by_desc(submissions::Column::SubmittedAt)
            .all(&self.db)
            .await
            .context("list submissions by assignment")?;
        Ok(models.into_iter().map(submission_from_model).collect())
    }

    async fn list_by_assignments(
        &self,
        assignment_ids: &[Uuid],
    ) -> Result<Vec<Submission>, LmsError> {
        if assignment_ids.is_empty() {
            return Ok(vec![]);
        }
        let models = submissions::Entity::find()
            .filter(submissions::Column::AssignmentId.is_in(assignment_ids.to_vec()))
            .order_by_desc(submissions::Column::SubmittedAt)
            .all(&self.db)
            .await
            .context("list submissions by assignments")?;
        Ok(models.into_iter().map(submission_from_model).collect())
    }

    async fn list_by_student(&self, student_id: Uuid) -> Result<Vec<Submission>, LmsError> {
        let models = submissions::Entity::find()
            .filter(submissions::Column::StudentId.eq(student_id))
            .order_by_desc(submissions::Column::SubmittedAt)
            .all(&self.db)
            .await
            .context("list submissions by student")?;
        Ok(models.into_iter().map(submission_from_model).collect())
    }

    async fn upsert(&self, submission: &Submission) -> Result<Submission, LmsError> {
        let (name, size, content_type, url) = attachment_columns(&submission.attachment);
        let am = submissions::ActiveModel {
            id: Set(submission.id),
            assignment_id: Set(submission.assignment_id),
            student_id: Set(submission.student_id),
            content: Set(submission.content.clone()),
            attachment_name: Set(name),
            attachment_size: Set(size),
            attachment_type: Set(content_type),
            attachment_url: Set(url),
            graded: Set(submission.graded),
            grade: Set(submission.grade),
            feedback: Set(submission.feedback.clone()),
            submitted_at: Set(submission.submitted_at),
            graded_at: Set(submission.graded_at),
        };
        let model = submissions::Entity::insert(am)
            .on_conflict(
                OnConflict::columns([
                    submissions::Column::AssignmentId,
                    submissions::Column::StudentId,
                ])
                .update_columns([
                    submissions::Column::Content,
                    submissions::Column::AttachmentName,
                    submissions::Column::AttachmentSize,
                    submissions::Column::AttachmentType,
                    submissions::Column::AttachmentUrl,
                    submissions::Column::Graded,
                    submissions::Column::Grade,
                    submissions::Column::Feedback,
                    submissions::Column::SubmittedAt,
                    submissions::Column::GradedAt,
                ])
                .to_owned(),
            )
            .exec_with_returning(&self.db)
            .await
            .context("upsert submission")?;
        Ok(submission_from_model(model))
    }

    async fn save_grade(&self, submission: &Submission) -> Result<(), LmsError> {
        submissions::ActiveModel {
            id: Set(submission.id),
            graded: Set(submission.graded),
            grade: Set(submission.grade),
            feedback: Set(submission.feedback.clone()),
            graded_at: Set(submission.graded_at),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("save submission grade")?;
        Ok(())
    }
}

fn submission_from_model(model: submissions::Model) -> Submission {
    Submission {
        id: model.id,
        assignment_id: model.assignment_id,
        student_id: model.student_id,
        content: model.content,
        attachment: attachment_from_parts(
            model.attachment_name,
            model.attachment_size,
            model.attachment_type,
            model.attachment_url,
        ),
        graded: model.graded,
        grade: model.grade,
        feedback: model.feedback,
        submitted_at: model.submitted_at,
        graded_at: model.graded_at,
    }
}

// ── Note repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbNoteRepository {
    pub db: DatabaseConnection,
}

impl NoteRepository for DbNoteRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Note>, LmsError> {
        let model = notes::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find note by id")?;
        model.map(note_from_model).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Note>, LmsError> {
        let models = notes::Entity::find()
            .order_by_desc(notes::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list notes")?;
        models.into_iter().map(note_from_model).collect()
    }

    async fn create(&self, note: &Note) -> Result<(), LmsError> {
        let (name, size, content_type, url) = attachment_columns(&note.attachment);
        notes::ActiveModel {
            id: Set(note.id),
            title: Set(note.title.clone()),
            content: Set(note.content.clone()),
            course_id: Set(note.course_id),
            author_id: Set(note.author_id),
            visibility: Set(note.visibility.as_str().to_owned()),
            attachment_name: Set(name),
            attachment_size: Set(size),
            attachment_type: Set(content_type),
            attachment_url: Set(url),
            created_at: Set(note.created_at),
            updated_at: Set(note.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create note")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, LmsError> {
        let result = notes::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete note")?;
        Ok(result.rows_affected > 0)
    }
}

fn note_from_model(model: notes::Model) -> Result<Note, LmsError> {
    Ok(Note {
        id: model.id,
        title: model.title,
        content: model.content,
        course_id: model.course_id,
        author_id: model.author_id,
        visibility: model.visibility.parse::<NoteVisibility>().context("stored note visibility")?,
        attachment: attachment_from_parts(
            model.attachment_name,
            model.attachment_size,
            model.attachment_type,
            model.attachment_url,
        ),
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}
