use lms_domain::user::{Role, UserStatus};
use lms_server::bootstrap::EnsureAdminUseCase;
use lms_server::error::LmsError;
use lms_server::usecase::auth::{
    ChangePasswordUseCase, LoginInput, LoginUseCase, RegisterInput, RegisterUseCase,
    ResolveCallerUseCase,
};
use lms_server::usecase::user::ProfileInput;

use crate::helpers::{Store, TEST_HASHER, TEST_JWT_SECRET, TEST_PASSWORD, caller};

fn register_usecase(store: &Store) -> RegisterUseCase<crate::helpers::MockUserRepo> {
    RegisterUseCase {
        users: store.users(),
        hasher: TEST_HASHER,
        jwt_secret: TEST_JWT_SECRET.to_owned(),
        token_ttl_secs: 3600,
    }
}

fn login_usecase(store: &Store) -> LoginUseCase<crate::helpers::MockUserRepo> {
    LoginUseCase {
        users: store.users(),
        hasher: TEST_HASHER,
        jwt_secret: TEST_JWT_SECRET.to_owned(),
        token_ttl_secs: 3600,
    }
}

fn profile(name: &str, email: &str) -> ProfileInput {
    ProfileInput {
        name: name.to_owned(),
        email: email.to_owned(),
        ..ProfileInput::default()
    }
}

#[tokio::test]
async fn should_register_student_by_default_and_return_session() {
    let store = Store::default();
    let session = register_usecase(&store)
        .execute(RegisterInput {
            profile: profile("Ada", " Ada@Example.com "),
            password: "hunter22".to_owned(),
            role: None,
        })
        .await
        .unwrap();

    assert_eq!(session.user.role, Role::Student);
    assert_eq!(session.user.email, "ada@example.com");
    assert!(!session.token.is_empty());
    assert_ne!(store.lock().users[0].password_hash, "hunter22");
}

#[tokio::test]
async fn should_refuse_public_admin_registration() {
    let store = Store::default();
    let err = register_usecase(&store)
        .execute(RegisterInput {
            profile: profile("Mallory", "mallory@example.com"),
            password: "hunter22".to_owned(),
            role: Some("ADMIN".to_owned()),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, LmsError::Forbidden(_)));
    assert!(store.lock().users.is_empty());
}

#[tokio::test]
async fn should_reject_duplicate_email_on_register() {
    let store = Store::default();
    store.add_user(Role::Student, "taken@example.com");
    let err = register_usecase(&store)
        .execute(RegisterInput {
            profile: profile("Other", "TAKEN@example.com"),
            password: "hunter22".to_owned(),
            role: Some("TEACHER".to_owned()),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, LmsError::EmailTaken));
}

#[tokio::test]
async fn should_reject_short_password_on_register() {
    let store = Store::default();
    let err = register_usecase(&store)
        .execute(RegisterInput {
            profile: profile("Ada", "ada@example.com"),
            password: "abc".to_owned(),
            role: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, LmsError::Validation(_)));
}

#[tokio::test]
async fn should_login_with_valid_credentials() {
    let store = Store::default();
    let user = store.add_user(Role::Teacher, "teach@example.com");
    let session = login_usecase(&store)
        .execute(LoginInput {
            email: "Teach@Example.com".to_owned(),
            password: TEST_PASSWORD.to_owned(),
        })
        .await
        .unwrap();

    assert_eq!(session.user.id, user.id);
    assert!(session.expires_at > 0);
}

#[tokio::test]
async fn should_fail_login_identically_for_wrong_password_and_unknown_email() {
    let store = Store::default();
    store.add_user(Role::Student, "stu@example.com");

    let wrong_password = login_usecase(&store)
        .execute(LoginInput {
            email: "stu@example.com".to_owned(),
            password: "not-it".to_owned(),
        })
        .await
        .unwrap_err();
    let unknown = login_usecase(&store)
        .execute(LoginInput {
            email: "nobody@example.com".to_owned(),
            password: TEST_PASSWORD.to_owned(),
        })
        .await
        .unwrap_err();

    assert!(matches!(wrong_password, LmsError::InvalidCredentials));
    assert!(matches!(unknown, LmsError::InvalidCredentials));
}

#[tokio::test]
async fn should_refuse_login_for_suspended_account() {
    let store = Store::default();
    let user = store.add_user(Role::Student, "stu@example.com");
    store.lock().users[0].status = UserStatus::Suspended;

    let err = login_usecase(&store)
        .execute(LoginInput {
            email: user.email,
            password: TEST_PASSWORD.to_owned(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, LmsError::InvalidCredentials));
}

#[tokio::test]
async fn should_resolve_caller_from_issued_token() {
    let store = Store::default();
    let user = store.add_user(Role::Admin, "root@example.com");
    let session = login_usecase(&store)
        .execute(LoginInput {
            email: user.email.clone(),
            password: TEST_PASSWORD.to_owned(),
        })
        .await
        .unwrap();

    let resolve = ResolveCallerUseCase {
        users: store.users(),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };
    let resolved = resolve.execute(Some(&session.token)).await.unwrap();
    assert_eq!(resolved, caller(&user));
}

#[tokio::test]
async fn should_reject_missing_forged_or_orphaned_tokens() {
    let store = Store::default();
    let user = store.add_user(Role::Student, "stu@example.com");
    let resolve = ResolveCallerUseCase {
        users: store.users(),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    assert!(matches!(
        resolve.execute(None).await.unwrap_err(),
        LmsError::Unauthenticated
    ));
    assert!(matches!(
        resolve.execute(Some("garbage")).await.unwrap_err(),
        LmsError::Unauthenticated
    ));

    let forged = lms_testing::auth::MockAuth::new(
        &user.id.to_string(),
        &user.email,
        "some-other-secret",
    )
    .token();
    assert!(matches!(
        resolve.execute(Some(&forged)).await.unwrap_err(),
        LmsError::Unauthenticated
    ));

    let orphan = lms_testing::auth::MockAuth::new(
        &uuid::Uuid::now_v7().to_string(),
        "ghost@example.com",
        TEST_JWT_SECRET,
    )
    .token();
    assert!(matches!(
        resolve.execute(Some(&orphan)).await.unwrap_err(),
        LmsError::Unauthenticated
    ));
}

#[tokio::test]
async fn should_reject_token_of_deleted_account_after_email_is_reused() {
    let store = Store::default();
    let first = store.add_user(Role::Student, "stu@example.com");
    let stale = lms_testing::auth::MockAuth::new(
        &first.id.to_string(),
        &first.email,
        TEST_JWT_SECRET,
    )
    .token();
    store.lock().users.retain(|u| u.id != first.id);
    let second = store.add_user(Role::Student, "stu@example.com");
    let resolve = ResolveCallerUseCase {
        users: store.users(),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    assert!(matches!(
        resolve.execute(Some(&stale)).await.unwrap_err(),
        LmsError::Unauthenticated
    ));

    let fresh = lms_testing::auth::MockAuth::new(
        &second.id.to_string(),
        &second.email,
        TEST_JWT_SECRET,
    )
    .token();
    let resolved = resolve.execute(Some(&fresh)).await.unwrap();
    assert_eq!(resolved.id, second.id);
}

#[tokio::test]
async fn should_change_password_after_verifying_current_one() {
    let store = Store::default();
    let user = store.add_user(Role::Student, "stu@example.com");
    let usecase = ChangePasswordUseCase {
        users: store.users(),
        hasher: TEST_HASHER,
    };

    let err = usecase
        .execute(&caller(&user), "wrong-one", "brand-new-pass")
        .await
        .unwrap_err();
    assert!(matches!(err, LmsError::Validation(_)));

    usecase
        .execute(&caller(&user), TEST_PASSWORD, "brand-new-pass")
        .await
        .unwrap();
    let hash = store.lock().users[0].password_hash.clone();
    assert!(TEST_HASHER.verify("brand-new-pass", &hash));
    assert!(!TEST_HASHER.verify(TEST_PASSWORD, &hash));
}

#[tokio::test]
async fn should_create_bootstrap_admin_once() {
    let store = Store::default();
    let usecase = EnsureAdminUseCase {
        users: store.users(),
        hasher: TEST_HASHER,
    };

    assert!(usecase.execute("Admin@Example.com", "admin-pass").await.unwrap());
    assert!(!usecase.execute("admin@example.com", "admin-pass").await.unwrap());

    let data = store.lock();
    assert_eq!(data.users.len(), 1);
    assert_eq!(data.users[0].role, Role::Admin);
    assert_eq!(data.users[0].email, "admin@example.com");
}
