use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .table(Courses::Table)
                    .col(Courses::InstructorId)
                    .name("idx_courses_instructor_id")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Enrollments::Table)
                    .col(Enrollments::CourseId)
                    .name("idx_enrollments_course_id")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Assignments::Table)
                    .col(Assignments::CourseId)
                    .name("idx_assignments_course_id")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Submissions::Table)
                    .col(Submissions::StudentId)
                    .name("idx_submissions_student_id")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Notes::Table)
                    .col(Notes::CourseId)
                    .name("idx_notes_course_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_notes_course_id",
            "idx_submissions_student_id",
            "idx_assignments_course_id",
            "idx_enrollments_course_id",
            "idx_courses_instructor_id",
        ] {
            manager
                .drop_index(Index::drop().name(name).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(Iden)]
enum Courses {
    Table,
    InstructorId,
}

#[derive(Iden)]
enum Enrollments {
    Table,
    CourseId,
}

#[derive(Iden)]
enum Assignments {
    Table,
    CourseId,
}

#[derive(Iden)]
enum Submissions {
    Table,
    StudentId,
}

#[derive(Iden)]
enum Notes {
    Table,
    CourseId,
}
