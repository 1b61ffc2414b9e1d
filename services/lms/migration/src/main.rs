use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(lms_migration::Migrator).await;
}
