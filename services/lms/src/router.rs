use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post, put},
};
use tower_http::trace::TraceLayer;

use lms_core::health::{healthz, readyz};
use lms_core::middleware::{catch_panic_layer, propagate_request_id_layer, request_id_layer};
use lms_core::response::{method_not_allowed, route_not_found};

use crate::handlers::{
    assignments::{
        course_assignments, create_assignment, delete_assignment, get_assignment,
        list_assignments, update_assignment,
    },
    auth::{change_password, login, me, register},
    courses::{
        courses_by_category, create_course, delete_course, get_course, list_courses, my_courses,
        search_courses, update_course,
    },
    dashboard::{admin_dashboard, teacher_dashboard},
    enrollments::{
        check_enrollment, complete_enrollment, course_roster, enroll, my_course_ids,
        my_courses as my_enrolled_courses, my_stats, unenroll, update_progress,
    },
    files::download_file,
    notes::{accessible_notes, create_note, delete_note},
    submissions::{
        assignment_submissions, get_submission, grade_submission, my_submissions, submit,
        teacher_submissions,
    },
    users::{
        create_admin, create_student, create_teacher, delete_user, get_user, list_admins,
        list_students, list_teachers, list_users, list_users_by_role, reset_password,
        search_users, update_user, update_user_status, user_stats,
    },
};
use crate::state::AppState;

fn api_routes() -> Router<AppState> {
    Router::new()
        // Auth
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/me", get(me))
        .route("/auth/password", put(change_password))
        // Users (admin)
        .route("/users", get(list_users))
        .route("/users/students", get(list_students).post(create_student))
        .route("/users/teachers", get(list_teachers).post(create_teacher))
        .route("/users/admins", get(list_admins).post(create_admin))
        .route("/users/role/{role}", get(list_users_by_role))
        .route("/users/search", get(search_users))
        .route("/users/stats", get(user_stats))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/users/{id}/status", patch(update_user_status))
        .route("/users/{id}/reset-password", post(reset_password))
        // Courses
        .route("/courses", get(list_courses).post(create_course))
        .route("/courses/search", get(search_courses))
        .route("/courses/mine", get(my_courses))
        .route("/courses/category/{category}", get(courses_by_category))
        .route(
            "/courses/{id}",
            get(get_course).put(update_course).delete(delete_course),
        )
        // Enrollments
        .route("/enrollments/course/{course_id}", post(enroll))
        .route("/enrollments/course/{course_id}/students", get(course_roster))
        .route("/enrollments/my-courses", get(my_enrolled_courses))
        .route("/enrollments/my-course-ids", get(my_course_ids))
        .route("/enrollments/my-stats", get(my_stats))
        .route("/enrollments/check/{course_id}", get(check_enrollment))
        .route("/enrollments/{id}/progress", put(update_progress))
        .route("/enrollments/{id}/complete", put(complete_enrollment))
        .route("/enrollments/{id}", delete(unenroll))
        // Assignments
        .route("/assignments", get(list_assignments).post(create_assignment))
        .route("/assignments/course/{course_id}", get(course_assignments))
        .route(
            "/assignments/{id}",
            get(get_assignment)
                .put(update_assignment)
                .delete(delete_assignment),
        )
        // Submissions
        .route("/submissions/my", get(my_submissions))
        .route("/submissions/teacher", get(teacher_submissions))
        .route(
            "/submissions/assignment/{assignment_id}",
            get(assignment_submissions),
        )
        .route("/submissions/{id}/grade", put(grade_submission))
        // GET takes a submission id, POST the assignment being submitted to.
        .route("/submissions/{id}", get(get_submission).post(submit))
        // Notes
        .route("/notes/accessible", get(accessible_notes))
        .route("/notes", post(create_note))
        .route("/notes/{id}", delete(delete_note))
        // Files
        .route(
            "/files/download/{category}/{file_name}",
            get(download_file),
        )
        // Dashboards
        .route("/dashboard/admin", get(admin_dashboard))
        .route("/dashboard/teacher", get(teacher_dashboard))
        .method_not_allowed_fallback(method_not_allowed)
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes);
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .nest("/api", api_routes())
        .fallback(route_not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(catch_panic_layer())
        .layer(body_limit)
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
