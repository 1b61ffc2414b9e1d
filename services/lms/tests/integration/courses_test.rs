use lms_domain::course::CourseLevel;
use lms_domain::user::Role;
use lms_server::error::LmsError;
use lms_server::handlers::assignments::AssignmentResponse;
use lms_server::handlers::courses::CourseResponse;
use lms_server::usecase::course::{
    CourseInput, CreateCourseUseCase, DeleteCourseUseCase, ListCoursesUseCase, UpdateCourseUseCase,
};
use lms_server::usecase::enrollment::EnrollUseCase;

use crate::helpers::{MockCourseRepo, MockUserRepo, Store, caller};

fn create(store: &Store) -> CreateCourseUseCase<MockCourseRepo, MockUserRepo> {
    CreateCourseUseCase {
        courses: store.courses(),
        users: store.users(),
    }
}

fn update(store: &Store) -> UpdateCourseUseCase<MockCourseRepo, MockUserRepo> {
    UpdateCourseUseCase {
        courses: store.courses(),
        users: store.users(),
    }
}

fn titled(title: &str) -> CourseInput {
    CourseInput {
        title: Some(title.to_owned()),
        ..CourseInput::default()
    }
}

#[tokio::test]
async fn should_make_teacher_the_instructor_with_defaults() {
    let store = Store::default();
    let teacher = store.add_user(Role::Teacher, "teach@example.com");
    let other = store.add_user(Role::Teacher, "other@example.com");

    let course = create(&store)
        .execute(
            &caller(&teacher),
            CourseInput {
                instructor_id: Some(other.id),
                ..titled("Rust 101")
            },
        )
        .await
        .unwrap();

    assert_eq!(course.instructor_id, teacher.id);
    assert_eq!(course.level, CourseLevel::Beginner);
    assert_eq!(course.price, "Free");
    assert_eq!(course.students, 0);
}

#[tokio::test]
async fn should_require_teacher_instructor_when_admin_creates() {
    let store = Store::default();
    let admin = store.add_user(Role::Admin, "root@example.com");
    let student = store.add_user(Role::Student, "stu@example.com");
    let teacher = store.add_user(Role::Teacher, "teach@example.com");

    let missing = create(&store)
        .execute(&caller(&admin), titled("Rust 101"))
        .await
        .unwrap_err();
    assert!(matches!(missing, LmsError::Validation(_)));

    let not_teacher = create(&store)
        .execute(
            &caller(&admin),
            CourseInput {
                instructor_id: Some(student.id),
                ..titled("Rust 101")
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(not_teacher, LmsError::Validation(_)));
    assert!(store.lock().courses.is_empty());

    let course = create(&store)
        .execute(
            &caller(&admin),
            CourseInput {
                instructor_id: Some(teacher.id),
                price: Some(49.5),
                level: Some("advanced".to_owned()),
                ..titled("Rust 101")
            },
        )
        .await
        .unwrap();
    assert_eq!(course.instructor_id, teacher.id);
    assert_eq!(course.price, "$49.50");
    assert_eq!(course.level, CourseLevel::Advanced);
}

#[tokio::test]
async fn should_forbid_students_from_creating_courses() {
    let store = Store::default();
    let student = store.add_user(Role::Student, "stu@example.com");
    let err = create(&store)
        .execute(&caller(&student), titled("Rust 101"))
        .await
        .unwrap_err();
    assert!(matches!(err, LmsError::Forbidden(_)));
}

#[tokio::test]
async fn should_reject_negative_price_and_blank_title() {
    let store = Store::default();
    let teacher = store.add_user(Role::Teacher, "teach@example.com");

    let price = create(&store)
        .execute(
            &caller(&teacher),
            CourseInput {
                price: Some(-5.0),
                ..titled("Rust 101")
            },
        )
        .await
        .unwrap_err();
    let title = create(&store)
        .execute(&caller(&teacher), titled("   "))
        .await
        .unwrap_err();

    assert!(matches!(price, LmsError::Validation(_)));
    assert!(matches!(title, LmsError::Validation(_)));
}

#[tokio::test]
async fn should_let_only_the_owner_or_admin_update() {
    let store = Store::default();
    let owner = store.add_user(Role::Teacher, "owner@example.com");
    let stranger = store.add_user(Role::Teacher, "stranger@example.com");
    let course = store.add_course(&owner, "Rust 101");

    let err = update(&store)
        .execute(&caller(&stranger), course.id, titled("Hijacked"))
        .await
        .unwrap_err();
    assert!(matches!(err, LmsError::Forbidden(_)));
    assert_eq!(store.course(course.id).title, "Rust 101");

    let updated = update(&store)
        .execute(
            &caller(&owner),
            course.id,
            CourseInput {
                price: Some(0.0),
                ..titled("Rust 102")
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Rust 102");
    assert_eq!(updated.category, course.category);
}

#[tokio::test]
async fn should_allow_reassignment_by_admin_only() {
    let store = Store::default();
    let admin = store.add_user(Role::Admin, "root@example.com");
    let owner = store.add_user(Role::Teacher, "owner@example.com");
    let successor = store.add_user(Role::Teacher, "next@example.com");
    let course = store.add_course(&owner, "Rust 101");
    let handover = CourseInput {
        instructor_id: Some(successor.id),
        ..CourseInput::default()
    };

    let err = update(&store)
        .execute(&caller(&owner), course.id, handover.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, LmsError::Forbidden(_)));

    let updated = update(&store)
        .execute(&caller(&admin), course.id, handover)
        .await
        .unwrap();
    assert_eq!(updated.instructor_id, successor.id);
}

#[tokio::test]
async fn should_keep_student_counter_on_update() {
    let store = Store::default();
    let owner = store.add_user(Role::Teacher, "owner@example.com");
    let student = store.add_user(Role::Student, "stu@example.com");
    let course = store.add_course(&owner, "Rust 101");
    EnrollUseCase {
        enrollments: store.enrollments(),
        courses: store.courses(),
    }
    .execute(&caller(&student), course.id)
    .await
    .unwrap();

    update(&store)
        .execute(&caller(&owner), course.id, titled("Rust 102"))
        .await
        .unwrap();

    assert_eq!(store.course(course.id).students, 1);
}

#[tokio::test]
async fn should_cascade_course_deletion() {
    let store = Store::default();
    let owner = store.add_user(Role::Teacher, "owner@example.com");
    let student = store.add_user(Role::Student, "stu@example.com");
    let course = store.add_course(&owner, "Rust 101");
    let keep = store.add_course(&owner, "Go 101");
    store.add_assignment(&course, 100);
    store.add_assignment(&keep, 100);
    EnrollUseCase {
        enrollments: store.enrollments(),
        courses: store.courses(),
    }
    .execute(&caller(&student), course.id)
    .await
    .unwrap();

    DeleteCourseUseCase {
        courses: store.courses(),
        files: store.files(),
    }
    .execute(&caller(&owner), course.id)
    .await
    .unwrap();

    let data = store.lock();
    assert_eq!(data.courses.len(), 1);
    assert!(data.enrollments.is_empty());
    assert_eq!(data.assignments.len(), 1);
    assert_eq!(data.assignments[0].course_id, keep.id);
}

#[tokio::test]
async fn should_return_all_courses_for_blank_search() {
    let store = Store::default();
    let owner = store.add_user(Role::Teacher, "owner@example.com");
    store.add_course(&owner, "Rust 101");
    store.add_course(&owner, "Cooking");
    let usecase = ListCoursesUseCase {
        courses: store.courses(),
    };

    assert_eq!(usecase.search("  ").await.unwrap().len(), 2);
    let hits = usecase.search("rust").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Rust 101");
}

#[tokio::test]
async fn should_list_only_the_callers_courses_as_mine() {
    let store = Store::default();
    let owner = store.add_user(Role::Teacher, "owner@example.com");
    let other = store.add_user(Role::Teacher, "other@example.com");
    let student = store.add_user(Role::Student, "stu@example.com");
    store.add_course(&owner, "Rust 101");
    store.add_course(&other, "Go 101");
    let usecase = ListCoursesUseCase {
        courses: store.courses(),
    };

    let mine = usecase.mine(&caller(&owner)).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert!(matches!(
        usecase.mine(&caller(&student)).await.unwrap_err(),
        LmsError::Forbidden(_)
    ));
}

#[tokio::test]
async fn should_render_instructor_name_on_listed_courses() {
    let store = Store::default();
    let teacher = store.add_user(Role::Teacher, "grace@example.com");
    let other = store.add_user(Role::Teacher, "linus@example.com");
    store.add_course(&teacher, "Rust 101");
    store.add_course(&other, "Kernels");

    let courses = ListCoursesUseCase {
        courses: store.courses(),
    }
    .all()
    .await
    .unwrap();
    let names = store.names().for_courses(&courses).await.unwrap();
    let rendered: Vec<serde_json::Value> = courses
        .into_iter()
        .map(|c| serde_json::to_value(CourseResponse::new(c, &names)).unwrap())
        .collect();

    let instructor = |title: &str| {
        rendered
            .iter()
            .find(|c| c["title"] == title)
            .map(|c| c["instructorName"].clone())
            .unwrap()
    };
    assert_eq!(instructor("Rust 101"), "grace");
    assert_eq!(instructor("Kernels"), "linus");
}

#[tokio::test]
async fn should_render_course_and_creator_names_on_assignments() {
    let store = Store::default();
    let teacher = store.add_user(Role::Teacher, "grace@example.com");
    let course = store.add_course(&teacher, "Rust 101");
    let assignment = store.add_assignment(&course, 50);

    let names = store
        .names()
        .for_assignments(std::slice::from_ref(&assignment))
        .await
        .unwrap();
    let body = serde_json::to_value(AssignmentResponse::new(assignment, &names)).unwrap();

    assert_eq!(body["courseName"], "Rust 101");
    assert_eq!(body["createdByName"], "grace");
}
