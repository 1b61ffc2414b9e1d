use lms_domain::enrollment::EnrollmentStatus;
use lms_domain::user::Role;
use lms_server::error::LmsError;
use lms_server::usecase::enrollment::{
    CourseRosterUseCase, EnrollUseCase, MyEnrollmentsUseCase, UnenrollUseCase,
    UpdateProgressUseCase,
};
use uuid::Uuid;

use crate::helpers::{MockCourseRepo, MockEnrollmentRepo, Store, caller};

fn enroll(store: &Store) -> EnrollUseCase<MockEnrollmentRepo, MockCourseRepo> {
    EnrollUseCase {
        enrollments: store.enrollments(),
        courses: store.courses(),
    }
}

fn progress(store: &Store) -> UpdateProgressUseCase<MockEnrollmentRepo> {
    UpdateProgressUseCase {
        enrollments: store.enrollments(),
    }
}

#[tokio::test]
async fn should_enroll_student_and_bump_counter() {
    let store = Store::default();
    let teacher = store.add_user(Role::Teacher, "teach@example.com");
    let student = store.add_user(Role::Student, "stu@example.com");
    let course = store.add_course(&teacher, "Rust 101");

    let enrollment = enroll(&store)
        .execute(&caller(&student), course.id)
        .await
        .unwrap();

    assert_eq!(enrollment.progress, 0);
    assert_eq!(enrollment.status(), EnrollmentStatus::NotStarted);
    assert_eq!(store.course(course.id).students, 1);
}

#[tokio::test]
async fn should_reject_duplicate_enrollment_without_touching_counter() {
    let store = Store::default();
    let teacher = store.add_user(Role::Teacher, "teach@example.com");
    let student = store.add_user(Role::Student, "stu@example.com");
    let course = store.add_course(&teacher, "Rust 101");
    enroll(&store)
        .execute(&caller(&student), course.id)
        .await
        .unwrap();

    let err = enroll(&store)
        .execute(&caller(&student), course.id)
        .await
        .unwrap_err();

    assert!(matches!(err, LmsError::AlreadyEnrolled));
    assert_eq!(store.course(course.id).students, 1);
}

#[tokio::test]
async fn should_refuse_enrollment_for_staff_and_unknown_course() {
    let store = Store::default();
    let teacher = store.add_user(Role::Teacher, "teach@example.com");
    let student = store.add_user(Role::Student, "stu@example.com");
    let course = store.add_course(&teacher, "Rust 101");

    let staff = enroll(&store)
        .execute(&caller(&teacher), course.id)
        .await
        .unwrap_err();
    let missing = enroll(&store)
        .execute(&caller(&student), Uuid::now_v7())
        .await
        .unwrap_err();

    assert!(matches!(staff, LmsError::Forbidden(_)));
    assert!(matches!(missing, LmsError::CourseNotFound));
}

#[tokio::test]
async fn should_advance_progress_and_complete_at_hundred() {
    let store = Store::default();
    let teacher = store.add_user(Role::Teacher, "teach@example.com");
    let student = store.add_user(Role::Student, "stu@example.com");
    let course = store.add_course(&teacher, "Rust 101");
    let enrollment = enroll(&store)
        .execute(&caller(&student), course.id)
        .await
        .unwrap();

    let halfway = progress(&store)
        .execute(&caller(&student), enrollment.id, 50)
        .await
        .unwrap();
    assert_eq!(halfway.status(), EnrollmentStatus::InProgress);
    assert!(halfway.completed_at.is_none());

    let done = progress(&store)
        .execute(&caller(&student), enrollment.id, 100)
        .await
        .unwrap();
    assert!(done.completed);
    assert!(done.completed_at.is_some());
    assert!(store.lock().enrollments[0].completed);
}

#[tokio::test]
async fn should_reject_out_of_range_or_backward_progress() {
    let store = Store::default();
    let teacher = store.add_user(Role::Teacher, "teach@example.com");
    let student = store.add_user(Role::Student, "stu@example.com");
    let course = store.add_course(&teacher, "Rust 101");
    let enrollment = enroll(&store)
        .execute(&caller(&student), course.id)
        .await
        .unwrap();
    progress(&store)
        .execute(&caller(&student), enrollment.id, 60)
        .await
        .unwrap();

    for value in [-1, 101, 30] {
        let err = progress(&store)
            .execute(&caller(&student), enrollment.id, value)
            .await
            .unwrap_err();
        assert!(matches!(err, LmsError::Validation(_)), "value {value}");
    }
    assert_eq!(store.lock().enrollments[0].progress, 60);
}

#[tokio::test]
async fn should_forbid_touching_another_students_enrollment() {
    let store = Store::default();
    let teacher = store.add_user(Role::Teacher, "teach@example.com");
    let student = store.add_user(Role::Student, "stu@example.com");
    let other = store.add_user(Role::Student, "other@example.com");
    let course = store.add_course(&teacher, "Rust 101");
    let enrollment = enroll(&store)
        .execute(&caller(&student), course.id)
        .await
        .unwrap();

    let err = progress(&store)
        .complete(&caller(&other), enrollment.id)
        .await
        .unwrap_err();
    assert!(matches!(err, LmsError::Forbidden(_)));

    let err = UnenrollUseCase {
        enrollments: store.enrollments(),
    }
    .execute(&caller(&other), enrollment.id)
    .await
    .unwrap_err();
    assert!(matches!(err, LmsError::Forbidden(_)));
    assert_eq!(store.course(course.id).students, 1);
}

#[tokio::test]
async fn should_complete_in_one_step() {
    let store = Store::default();
    let teacher = store.add_user(Role::Teacher, "teach@example.com");
    let student = store.add_user(Role::Student, "stu@example.com");
    let course = store.add_course(&teacher, "Rust 101");
    let enrollment = enroll(&store)
        .execute(&caller(&student), course.id)
        .await
        .unwrap();

    let done = progress(&store)
        .complete(&caller(&student), enrollment.id)
        .await
        .unwrap();

    assert_eq!(done.progress, 100);
    assert_eq!(done.status(), EnrollmentStatus::Completed);
}

#[tokio::test]
async fn should_unenroll_and_restore_counter() {
    let store = Store::default();
    let teacher = store.add_user(Role::Teacher, "teach@example.com");
    let student = store.add_user(Role::Student, "stu@example.com");
    let course = store.add_course(&teacher, "Rust 101");
    let enrollment = enroll(&store)
        .execute(&caller(&student), course.id)
        .await
        .unwrap();

    UnenrollUseCase {
        enrollments: store.enrollments(),
    }
    .execute(&caller(&student), enrollment.id)
    .await
    .unwrap();

    assert_eq!(store.course(course.id).students, 0);
    assert!(store.lock().enrollments.is_empty());
}

#[tokio::test]
async fn should_summarize_my_enrollments() {
    let store = Store::default();
    let teacher = store.add_user(Role::Teacher, "teach@example.com");
    let student = store.add_user(Role::Student, "stu@example.com");
    let rust = store.add_course(&teacher, "Rust 101");
    let go = store.add_course(&teacher, "Go 101");
    let first = enroll(&store)
        .execute(&caller(&student), rust.id)
        .await
        .unwrap();
    enroll(&store)
        .execute(&caller(&student), go.id)
        .await
        .unwrap();
    progress(&store)
        .execute(&caller(&student), first.id, 100)
        .await
        .unwrap();
    let mine = MyEnrollmentsUseCase {
        enrollments: store.enrollments(),
        courses: store.courses(),
    };

    let courses = mine.courses(&caller(&student)).await.unwrap();
    assert_eq!(courses.len(), 2);
    assert!(courses.iter().any(|c| c.course.id == rust.id && c.enrollment.completed));

    let stats = mine.stats(&caller(&student)).await.unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.not_started, 1);
    assert_eq!(stats.average_progress, 50.0);

    assert!(mine.is_enrolled(&caller(&student), go.id).await.unwrap());
    assert!(mine.is_enrolled(&caller(&teacher), Uuid::now_v7()).await.unwrap());
}

#[tokio::test]
async fn should_show_roster_to_owner_only() {
    let store = Store::default();
    let owner = store.add_user(Role::Teacher, "owner@example.com");
    let stranger = store.add_user(Role::Teacher, "stranger@example.com");
    let student = store.add_user(Role::Student, "stu@example.com");
    let course = store.add_course(&owner, "Rust 101");
    enroll(&store)
        .execute(&caller(&student), course.id)
        .await
        .unwrap();
    let roster = CourseRosterUseCase {
        enrollments: store.enrollments(),
        courses: store.courses(),
        users: store.users(),
    };

    let entries = roster.execute(&caller(&owner), course.id).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].student.id, student.id);

    let err = roster
        .execute(&caller(&stranger), course.id)
        .await
        .unwrap_err();
    assert!(matches!(err, LmsError::Forbidden(_)));
}
