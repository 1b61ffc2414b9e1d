use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lms_core::response::ApiResponse;
use lms_domain::course::CourseLevel;

use crate::domain::types::{Caller, Course};
use crate::error::LmsError;
use crate::handlers::display_names;
use crate::handlers::extract::{AppJson, AppPath, AppQuery};
use crate::handlers::users::SearchQuery;
use crate::state::AppState;
use crate::usecase::course::{
    CourseInput, CreateCourseUseCase, DeleteCourseUseCase, GetCourseUseCase, ListCoursesUseCase,
    UpdateCourseUseCase,
};
use crate::usecase::names::DisplayNames;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub level: CourseLevel,
    pub duration: String,
    pub price: String,
    pub instructor_id: Uuid,
    pub instructor_name: Option<String>,
    pub students: i32,
    pub rating: f64,
    #[serde(serialize_with = "lms_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "lms_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl CourseResponse {
    pub fn new(course: Course, names: &DisplayNames) -> Self {
        Self {
            id: course.id,
            title: course.title,
            description: course.description,
            category: course.category,
            level: course.level,
            duration: course.duration,
            price: course.price,
            instructor_id: course.instructor_id,
            instructor_name: names.user(course.instructor_id),
            students: course.students,
            rating: course.rating,
            created_at: course.created_at,
            updated_at: course.updated_at,
        }
    }
}

pub(crate) async fn courses_response(
    state: &AppState,
    courses: Vec<Course>,
) -> Result<Vec<CourseResponse>, LmsError> {
    let names = display_names(state).for_courses(&courses).await?;
    Ok(courses
        .into_iter()
        .map(|course| CourseResponse::new(course, &names))
        .collect())
}

async fn course_response(state: &AppState, course: Course) -> Result<CourseResponse, LmsError> {
    let names = display_names(state).for_courses([&course]).await?;
    Ok(CourseResponse::new(course, &names))
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
    pub duration: Option<String>,
    pub price: Option<f64>,
    pub instructor_id: Option<Uuid>,
}

impl From<CourseRequest> for CourseInput {
    fn from(body: CourseRequest) -> Self {
        Self {
            title: body.title,
            description: body.description,
            category: body.category,
            level: body.level,
            duration: body.duration,
            price: body.price,
            instructor_id: body.instructor_id,
        }
    }
}

// ── GET /api/courses ─────────────────────────────────────────────────────────

pub async fn list_courses(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<CourseResponse>>, LmsError> {
    let usecase = ListCoursesUseCase {
        courses: state.course_repo(),
    };
    let courses = usecase.all().await?;
    Ok(ApiResponse::ok(
        "courses fetched",
        courses_response(&state, courses).await?,
    ))
}

// ── GET /api/courses/{id} ────────────────────────────────────────────────────

pub async fn get_course(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<ApiResponse<CourseResponse>, LmsError> {
    let usecase = GetCourseUseCase {
        courses: state.course_repo(),
    };
    let course = usecase.execute(id).await?;
    Ok(ApiResponse::ok(
        "course fetched",
        course_response(&state, course).await?,
    ))
}

// ── GET /api/courses/search?q= ───────────────────────────────────────────────

pub async fn search_courses(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<SearchQuery>,
) -> Result<ApiResponse<Vec<CourseResponse>>, LmsError> {
    let usecase = ListCoursesUseCase {
        courses: state.course_repo(),
    };
    let courses = usecase.search(&query.q).await?;
    Ok(ApiResponse::ok(
        "courses fetched",
        courses_response(&state, courses).await?,
    ))
}

// ── GET /api/courses/category/{category} ─────────────────────────────────────

pub async fn courses_by_category(
    State(state): State<AppState>,
    AppPath(category): AppPath<String>,
) -> Result<ApiResponse<Vec<CourseResponse>>, LmsError> {
    let usecase = ListCoursesUseCase {
        courses: state.course_repo(),
    };
    let courses = usecase.by_category(&category).await?;
    Ok(ApiResponse::ok(
        "courses fetched",
        courses_response(&state, courses).await?,
    ))
}

// ── GET /api/courses/mine ────────────────────────────────────────────────────

pub async fn my_courses(
    caller: Caller,
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<CourseResponse>>, LmsError> {
    let usecase = ListCoursesUseCase {
        courses: state.course_repo(),
    };
    let courses = usecase.mine(&caller).await?;
    Ok(ApiResponse::ok(
        "courses fetched",
        courses_response(&state, courses).await?,
    ))
}

// ── POST /api/courses ────────────────────────────────────────────────────────

pub async fn create_course(
    caller: Caller,
    State(state): State<AppState>,
    AppJson(body): AppJson<CourseRequest>,
) -> Result<ApiResponse<CourseResponse>, LmsError> {
    let usecase = CreateCourseUseCase {
        courses: state.course_repo(),
        users: state.user_repo(),
    };
    let course = usecase.execute(&caller, body.into()).await?;
    Ok(ApiResponse::created(
        "course created",
        course_response(&state, course).await?,
    ))
}

// ── PUT /api/courses/{id} ────────────────────────────────────────────────────

pub async fn update_course(
    caller: Caller,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<CourseRequest>,
) -> Result<ApiResponse<CourseResponse>, LmsError> {
    let usecase = UpdateCourseUseCase {
        courses: state.course_repo(),
        users: state.user_repo(),
    };
    let course = usecase.execute(&caller, id, body.into()).await?;
    Ok(ApiResponse::ok(
        "course updated",
        course_response(&state, course).await?,
    ))
}

// ── DELETE /api/courses/{id} ─────────────────────────────────────────────────

pub async fn delete_course(
    caller: Caller,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<ApiResponse<()>, LmsError> {
    let usecase = DeleteCourseUseCase {
        courses: state.course_repo(),
        files: state.file_store(),
    };
    usecase.execute(&caller, id).await?;
    Ok(ApiResponse::message("course deleted"))
}
