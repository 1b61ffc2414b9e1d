use lms_domain::note::NoteVisibility;
use lms_domain::user::Role;
use lms_server::error::LmsError;
use lms_server::handlers::notes::NoteResponse;
use lms_server::usecase::enrollment::EnrollUseCase;
use lms_server::usecase::note::{
    AccessibleNotesUseCase, CreateNoteUseCase, DeleteNoteUseCase, NoteInput,
};

use crate::helpers::{
    MockCourseRepo, MockEnrollmentRepo, MockFileStore, MockNoteRepo, Store, caller, upload,
};

fn create(store: &Store) -> CreateNoteUseCase<MockNoteRepo, MockCourseRepo, MockFileStore> {
    CreateNoteUseCase {
        notes: store.notes(),
        courses: store.courses(),
        files: store.files(),
    }
}

fn accessible(store: &Store) -> AccessibleNotesUseCase<MockNoteRepo, MockCourseRepo, MockEnrollmentRepo> {
    AccessibleNotesUseCase {
        notes: store.notes(),
        courses: store.courses(),
        enrollments: store.enrollments(),
    }
}

fn note(title: &str, course_id: Option<uuid::Uuid>, visibility: &str) -> NoteInput {
    NoteInput {
        title: Some(title.to_owned()),
        content: Some("body".to_owned()),
        course_id,
        visibility: Some(visibility.to_owned()),
    }
}

#[tokio::test]
async fn should_scope_course_notes_to_enrolled_students_and_owner() {
    let store = Store::default();
    let owner = store.add_user(Role::Teacher, "owner@example.com");
    let other = store.add_user(Role::Teacher, "other@example.com");
    let enrolled = store.add_user(Role::Student, "in@example.com");
    let outsider = store.add_user(Role::Student, "out@example.com");
    let admin = store.add_user(Role::Admin, "root@example.com");
    let course = store.add_course(&owner, "Rust 101");
    EnrollUseCase {
        enrollments: store.enrollments(),
        courses: store.courses(),
    }
    .execute(&caller(&enrolled), course.id)
    .await
    .unwrap();
    create(&store)
        .execute(&caller(&owner), note("Welcome", None, "ALL"), None)
        .await
        .unwrap();
    create(&store)
        .execute(&caller(&owner), note("Week 1", Some(course.id), "COURSE"), None)
        .await
        .unwrap();

    let titles = |notes: Vec<lms_server::domain::types::Note>| {
        let mut titles: Vec<String> = notes.into_iter().map(|n| n.title).collect();
        titles.sort();
        titles
    };
    let everything = vec!["Week 1".to_owned(), "Welcome".to_owned()];
    let public = vec!["Welcome".to_owned()];

    assert_eq!(titles(accessible(&store).execute(&caller(&enrolled)).await.unwrap()), everything);
    assert_eq!(titles(accessible(&store).execute(&caller(&owner)).await.unwrap()), everything);
    assert_eq!(titles(accessible(&store).execute(&caller(&admin)).await.unwrap()), everything);
    assert_eq!(titles(accessible(&store).execute(&caller(&outsider)).await.unwrap()), public);
    assert_eq!(titles(accessible(&store).execute(&caller(&other)).await.unwrap()), public);
}

#[tokio::test]
async fn should_require_course_for_course_visibility() {
    let store = Store::default();
    let teacher = store.add_user(Role::Teacher, "teach@example.com");

    let err = create(&store)
        .execute(&caller(&teacher), note("Orphan", None, "COURSE"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, LmsError::Validation(_)));
}

#[tokio::test]
async fn should_forbid_students_and_non_owners_from_creating_notes() {
    let store = Store::default();
    let owner = store.add_user(Role::Teacher, "owner@example.com");
    let other = store.add_user(Role::Teacher, "other@example.com");
    let student = store.add_user(Role::Student, "stu@example.com");
    let course = store.add_course(&owner, "Rust 101");

    let by_student = create(&store)
        .execute(&caller(&student), note("Mine", None, "ALL"), None)
        .await
        .unwrap_err();
    let by_other = create(&store)
        .execute(&caller(&other), note("Sneaky", Some(course.id), "COURSE"), None)
        .await
        .unwrap_err();

    assert!(matches!(by_student, LmsError::Forbidden(_)));
    assert!(matches!(by_other, LmsError::Forbidden(_)));
    assert!(store.lock().notes.is_empty());
}

#[tokio::test]
async fn should_default_to_all_visibility_and_store_attachment() {
    let store = Store::default();
    let teacher = store.add_user(Role::Teacher, "teach@example.com");

    let created = create(&store)
        .execute(
            &caller(&teacher),
            NoteInput {
                title: Some("Slides".to_owned()),
                ..NoteInput::default()
            },
            Some(upload("slides.txt", b"slide deck")),
        )
        .await
        .unwrap();

    assert_eq!(created.visibility, NoteVisibility::All);
    assert!(store.has_file(&created.attachment.unwrap().url));
}

#[tokio::test]
async fn should_delete_note_by_author_or_admin_only() {
    let store = Store::default();
    let author = store.add_user(Role::Teacher, "author@example.com");
    let other = store.add_user(Role::Teacher, "other@example.com");
    let created = create(&store)
        .execute(
            &caller(&author),
            note("Slides", None, "ALL"),
            Some(upload("slides.txt", b"deck")),
        )
        .await
        .unwrap();
    let usecase = DeleteNoteUseCase {
        notes: store.notes(),
        files: store.files(),
    };

    let err = usecase
        .execute(&caller(&other), created.id)
        .await
        .unwrap_err();
    assert!(matches!(err, LmsError::Forbidden(_)));

    usecase.execute(&caller(&author), created.id).await.unwrap();
    let data = store.lock();
    assert!(data.notes.is_empty());
    assert!(data.files.is_empty());
    drop(data);

    let err = usecase
        .execute(&caller(&author), created.id)
        .await
        .unwrap_err();
    assert!(matches!(err, LmsError::NoteNotFound));
}

#[tokio::test]
async fn should_render_author_and_course_title_on_notes() {
    let store = Store::default();
    let owner = store.add_user(Role::Teacher, "owner@example.com");
    let course = store.add_course(&owner, "Rust 101");
    create(&store)
        .execute(&caller(&owner), note("Welcome", None, "ALL"), None)
        .await
        .unwrap();
    create(&store)
        .execute(&caller(&owner), note("Week 1", Some(course.id), "COURSE"), None)
        .await
        .unwrap();

    let notes = accessible(&store).execute(&caller(&owner)).await.unwrap();
    let names = store.names().for_notes(&notes).await.unwrap();
    let rendered: Vec<serde_json::Value> = notes
        .into_iter()
        .map(|n| serde_json::to_value(NoteResponse::new(n, &names)).unwrap())
        .collect();

    let by_title = |title: &str| rendered.iter().find(|n| n["title"] == title).unwrap();
    assert_eq!(by_title("Week 1")["courseTitle"], "Rust 101");
    assert_eq!(by_title("Week 1")["authorName"], "owner");
    assert!(by_title("Welcome")["courseTitle"].is_null());
    assert_eq!(by_title("Welcome")["authorName"], "owner");
}
