use lms_domain::user::Role;
use lms_server::error::LmsError;
use lms_server::usecase::assignment::{
    AssignmentInput, CreateAssignmentUseCase, DeleteAssignmentUseCase, ListAssignmentsUseCase,
    UpdateAssignmentUseCase,
};

use crate::helpers::{MockAssignmentRepo, MockCourseRepo, MockFileStore, Store, caller, upload};

type Create = CreateAssignmentUseCase<MockAssignmentRepo, MockCourseRepo, MockFileStore>;
type Update = UpdateAssignmentUseCase<MockAssignmentRepo, MockCourseRepo, MockFileStore>;

fn create(store: &Store) -> Create {
    CreateAssignmentUseCase {
        assignments: store.assignments(),
        courses: store.courses(),
        files: store.files(),
    }
}

fn update(store: &Store) -> Update {
    UpdateAssignmentUseCase {
        assignments: store.assignments(),
        courses: store.courses(),
        files: store.files(),
    }
}

fn input(course_id: uuid::Uuid) -> AssignmentInput {
    AssignmentInput {
        course_id: Some(course_id),
        title: Some("Homework 1".to_owned()),
        description: Some("Write a lexer".to_owned()),
        due_date: Some("2030-01-15T23:59".to_owned()),
        max_points: None,
    }
}

#[tokio::test]
async fn should_create_assignment_with_default_points_and_attachment() {
    let store = Store::default();
    let teacher = store.add_user(Role::Teacher, "teach@example.com");
    let course = store.add_course(&teacher, "Rust 101");

    let assignment = create(&store)
        .execute(
            &caller(&teacher),
            input(course.id),
            Some(upload("brief.txt", b"read me")),
        )
        .await
        .unwrap();

    assert_eq!(assignment.max_points, 100);
    assert_eq!(assignment.created_by, teacher.id);
    assert_eq!(
        assignment.due_date.to_rfc3339(),
        "2030-01-15T23:59:00+00:00"
    );
    let attachment = assignment.attachment.unwrap();
    assert_eq!(attachment.size, 7);
    assert!(store.has_file(&attachment.url));
}

#[tokio::test]
async fn should_reject_invalid_fields_before_storing_anything() {
    let store = Store::default();
    let teacher = store.add_user(Role::Teacher, "teach@example.com");
    let course = store.add_course(&teacher, "Rust 101");
    let cases = [
        AssignmentInput {
            due_date: Some("next friday".to_owned()),
            ..input(course.id)
        },
        AssignmentInput {
            max_points: Some(0),
            ..input(course.id)
        },
        AssignmentInput {
            title: Some("  ".to_owned()),
            ..input(course.id)
        },
        AssignmentInput {
            course_id: None,
            ..input(course.id)
        },
    ];

    for case in cases {
        let err = create(&store)
            .execute(&caller(&teacher), case, Some(upload("brief.txt", b"x")))
            .await
            .unwrap_err();
        assert!(matches!(err, LmsError::Validation(_)));
    }
    let data = store.lock();
    assert!(data.assignments.is_empty());
    assert!(data.files.is_empty());
}

#[tokio::test]
async fn should_forbid_assignment_in_someone_elses_course() {
    let store = Store::default();
    let owner = store.add_user(Role::Teacher, "owner@example.com");
    let stranger = store.add_user(Role::Teacher, "stranger@example.com");
    let course = store.add_course(&owner, "Rust 101");

    let err = create(&store)
        .execute(&caller(&stranger), input(course.id), None)
        .await
        .unwrap_err();

    assert!(matches!(err, LmsError::Forbidden(_)));
}

#[tokio::test]
async fn should_replace_attachment_on_update() {
    let store = Store::default();
    let teacher = store.add_user(Role::Teacher, "teach@example.com");
    let course = store.add_course(&teacher, "Rust 101");
    let assignment = create(&store)
        .execute(
            &caller(&teacher),
            input(course.id),
            Some(upload("v1.txt", b"one")),
        )
        .await
        .unwrap();
    let old_url = assignment.attachment.unwrap().url;

    let updated = update(&store)
        .execute(
            &caller(&teacher),
            assignment.id,
            AssignmentInput {
                max_points: Some(50),
                ..AssignmentInput::default()
            },
            Some(upload("v2.txt", b"two")),
        )
        .await
        .unwrap();

    let new_url = updated.attachment.unwrap().url;
    assert_eq!(updated.max_points, 50);
    assert_eq!(updated.title, "Homework 1");
    assert!(!store.has_file(&old_url));
    assert!(store.has_file(&new_url));
}

#[tokio::test]
async fn should_require_managing_the_target_course_when_moving() {
    let store = Store::default();
    let owner = store.add_user(Role::Teacher, "owner@example.com");
    let other = store.add_user(Role::Teacher, "other@example.com");
    let course = store.add_course(&owner, "Rust 101");
    let foreign = store.add_course(&other, "Go 101");
    let assignment = store.add_assignment(&course, 100);

    let err = update(&store)
        .execute(
            &caller(&owner),
            assignment.id,
            AssignmentInput {
                course_id: Some(foreign.id),
                ..AssignmentInput::default()
            },
            None,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, LmsError::Forbidden(_)));
    assert_eq!(store.lock().assignments[0].course_id, course.id);
}

#[tokio::test]
async fn should_delete_assignment_and_its_attachment() {
    let store = Store::default();
    let teacher = store.add_user(Role::Teacher, "teach@example.com");
    let course = store.add_course(&teacher, "Rust 101");
    let assignment = create(&store)
        .execute(
            &caller(&teacher),
            input(course.id),
            Some(upload("brief.txt", b"read me")),
        )
        .await
        .unwrap();

    DeleteAssignmentUseCase {
        assignments: store.assignments(),
        courses: store.courses(),
        files: store.files(),
    }
    .execute(&caller(&teacher), assignment.id)
    .await
    .unwrap();

    let data = store.lock();
    assert!(data.assignments.is_empty());
    assert!(data.files.is_empty());
}

#[tokio::test]
async fn should_list_assignments_by_course() {
    let store = Store::default();
    let teacher = store.add_user(Role::Teacher, "teach@example.com");
    let rust = store.add_course(&teacher, "Rust 101");
    let go = store.add_course(&teacher, "Go 101");
    let first = store.add_assignment(&rust, 100);
    store.add_assignment(&go, 100);
    let usecase = ListAssignmentsUseCase {
        assignments: store.assignments(),
    };

    assert_eq!(usecase.all().await.unwrap().len(), 2);
    let by_course = usecase.by_course(rust.id).await.unwrap();
    assert_eq!(by_course.len(), 1);
    assert_eq!(by_course[0].id, first.id);
    assert!(matches!(
        usecase.get(uuid::Uuid::now_v7()).await.unwrap_err(),
        LmsError::AssignmentNotFound
    ));
}
