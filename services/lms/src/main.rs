use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tracing::info;

use lms_core::tracing::init_tracing;
use lms_migration::Migrator;
use lms_server::bootstrap::EnsureAdminUseCase;
use lms_server::config::LmsConfig;
use lms_server::infra::password::PasswordHasher;
use lms_server::router::build_router;
use lms_server::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = LmsConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    if config.run_migrations {
        Migrator::up(&db, None)
            .await
            .expect("failed to apply migrations");
        info!("migrations applied");
    }

    let state = AppState {
        db,
        jwt_secret: config.jwt_secret,
        token_ttl_secs: config.jwt_expiration_secs,
        upload_dir: config.upload_dir,
        max_upload_bytes: config.max_upload_bytes,
        hasher: PasswordHasher {
            cost: config.bcrypt_cost,
        },
    };

    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        let usecase = EnsureAdminUseCase {
            users: state.user_repo(),
            hasher: state.hasher,
        };
        usecase
            .execute(email, password)
            .await
            .expect("failed to create bootstrap admin");
    }

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.lms_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("lms service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
