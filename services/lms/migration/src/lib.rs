use sea_orm_migration::prelude::*;

mod m20250901_000001_create_users;
mod m20250901_000002_create_courses;
mod m20250901_000003_create_enrollments;
mod m20250901_000004_create_assignments;
mod m20250901_000005_create_submissions;
mod m20250901_000006_create_notes;
mod m20250901_000007_add_lookup_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_create_users::Migration),
            Box::new(m20250901_000002_create_courses::Migration),
            Box::new(m20250901_000003_create_enrollments::Migration),
            Box::new(m20250901_000004_create_assignments::Migration),
            Box::new(m20250901_000005_create_submissions::Migration),
            Box::new(m20250901_000006_create_notes::Migration),
            Box::new(m20250901_000007_add_lookup_indexes::Migration),
        ]
    }
}
