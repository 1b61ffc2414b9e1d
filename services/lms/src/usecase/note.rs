use chrono::Utc;
use uuid::Uuid;

use lms_domain::file::FileCategory;
use lms_domain::note::NoteVisibility;
use lms_domain::user::Role;

use crate::domain::policy::{CourseAccess, can_read_note, ensure_course_manager, ensure_staff};
use crate::domain::repository::{CourseRepository, EnrollmentRepository, FileStore, NoteRepository};
use crate::domain::types::{Caller, Note, Upload};
use crate::error::LmsError;
use crate::usecase::user::clean;

// ── AccessibleNotes ──────────────────────────────────────────────────────────

pub struct AccessibleNotesUseCase<N, C, E>
where
    N: NoteRepository,
    C: CourseRepository,
    E: EnrollmentRepository,
{
    pub notes: N,
    pub courses: C,
    pub enrollments: E,
}

impl<N, C, E> AccessibleNotesUseCase<N, C, E>
where
    N: NoteRepository,
    C: CourseRepository,
    E: EnrollmentRepository,
{
    async fn access(&self, caller: &Caller) -> Result<CourseAccess, LmsError> {
        Ok(match caller.role {
            Role::Admin => CourseAccess::everything(),
            Role::Teacher => CourseAccess::only(
                self.courses
                    .list_by_instructor(caller.id)
                    .await?
                    .into_iter()
                    .map(|c| c.id),
            ),
            Role::Student => CourseAccess::only(
                self.enrollments
                    .list_by_student(caller.id)
                    .await?
                    .into_iter()
                    .map(|e| e.course_id),
            ),
        })
    }

    pub async fn execute(&self, caller: &Caller) -> Result<Vec<Note>, LmsError> {
        let access = self.access(caller).await?;
        let notes = self.notes.list_all().await?;
        Ok(notes
            .into_iter()
            .filter(|note| can_read_note(&access, note))
            .collect())
    }
}

// ── CreateNote ───────────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone)]
pub struct NoteInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub course_id: Option<Uuid>,
    pub visibility: Option<String>,
}

pub struct CreateNoteUseCase<N: NoteRepository, C: CourseRepository, F: FileStore> {
    pub notes: N,
    pub courses: C,
    pub files: F,
}

impl<N, C, F> CreateNoteUseCase<N, C, F>
where
    N: NoteRepository,
    C: CourseRepository,
    F: FileStore,
{
    pub async fn execute(
        &self,
        caller: &Caller,
        input: NoteInput,
        upload: Option<Upload>,
    ) -> Result<Note, LmsError> {
        ensure_staff(caller)?;
        let title = clean(input.title).ok_or_else(|| LmsError::validation("title is required"))?;
        let visibility = match clean(input.visibility) {
            Some(raw) => raw.parse::<NoteVisibility>()?,
            None => NoteVisibility::default(),
        };
        if visibility == NoteVisibility::Course && input.course_id.is_none() {
            return Err(LmsError::validation("courseId is required for course notes"));
        }
        if let Some(course_id) = input.course_id {
            let course = self
                .courses
                .find_by_id(course_id)
                .await?
                .ok_or(LmsError::CourseNotFound)?;
            ensure_course_manager(caller, &course)?;
        }

        let attachment = match &upload {
            Some(upload) => Some(self.files.save(FileCategory::Notes, upload).await?),
            None => None,
        };
        let now = Utc::now();
        let note = Note {
            id: Uuid::now_v7(),
            title,
            content: clean(input.content).unwrap_or_default(),
            course_id: input.course_id,
            author_id: caller.id,
            visibility,
            attachment,
            created_at: now,
            updated_at: now,
        };
        if let Err(e) = self.notes.create(&note).await {
            if let Some(attachment) = &note.attachment {
                self.files.remove(&attachment.url).await;
            }
            return Err(e);
        }
        tracing::info!(note_id = %note.id, %visibility, by = %caller.id, "note created");
        Ok(note)
    }
}

// ── DeleteNote ───────────────────────────────────────────────────────────────

pub struct DeleteNoteUseCase<N: NoteRepository, F: FileStore> {
    pub notes: N,
    pub files: F,
}

impl<N: NoteRepository, F: FileStore> DeleteNoteUseCase<N, F> {
    pub async fn execute(&self, caller: &Caller, id: Uuid) -> Result<(), LmsError> {
        let note = self
            .notes
            .find_by_id(id)
            .await?
            .ok_or(LmsError::NoteNotFound)?;
        if note.author_id != caller.id && !caller.is_admin() {
            return Err(LmsError::Forbidden("only the author or an admin can delete a note"));
        }
        if !self.notes.delete(id).await? {
            return Err(LmsError::NoteNotFound);
        }
        if let Some(attachment) = &note.attachment {
            self.files.remove(&attachment.url).await;
        }
        tracing::info!(note_id = %id, by = %caller.id, "note deleted");
        Ok(())
    }
}
