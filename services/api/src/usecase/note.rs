use chrono::Utc;

use notekeeper_domain::id::{NoteId, UserId};

use crate::domain::repository::NoteRepository;
use crate::domain::types::{Note, NotePatch};
use crate::error::ApiError;

fn check_title(title: &str) -> Result<(), ApiError> {
    if title.is_empty() {
        return Err(ApiError::field("title", "title_required"));
    }
    Ok(())
}

// ── ListNotes ────────────────────────────────────────────────────────────────

pub struct ListNotesUseCase<R: NoteRepository> {
    pub notes: R,
}

impl<R: NoteRepository> ListNotesUseCase<R> {
    pub async fn execute(&self, owner: UserId) -> Result<Vec<Note>, ApiError> {
        self.notes.list_by_owner(owner).await
    }
}

// ── CreateNote ───────────────────────────────────────────────────────────────

pub struct CreateNoteInput {
    pub owner: UserId,
    pub title: String,
    pub content: Option<String>,
}

pub struct CreateNoteUseCase<R: NoteRepository> {
    pub notes: R,
}

impl<R: NoteRepository> CreateNoteUseCase<R> {
    pub async fn execute(&self, input: CreateNoteInput) -> Result<Note, ApiError> {
        check_title(&input.title)?;

        let now = Utc::now();
        let note = Note {
            id: NoteId::generate(),
            user_id: input.owner,
            title: input.title,
            content: input.content.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };
        self.notes.create(&note).await?;
        Ok(note)
    }
}

// ── UpdateNote ───────────────────────────────────────────────────────────────

pub struct UpdateNoteInput {
    pub owner: UserId,
    pub id: NoteId,
    pub patch: NotePatch,
}

pub struct UpdateNoteUseCase<R: NoteRepository> {
    pub notes: R,
}

impl<R: NoteRepository> UpdateNoteUseCase<R> {
    pub async fn execute(&self, input: UpdateNoteInput) -> Result<Note, ApiError> {
        if input.patch.is_empty() {
            return Err(ApiError::NoFieldsToUpdate);
        }
        if let Some(title) = &input.patch.title {
            check_title(title)?;
        }

        self.notes
            .update_owned(input.id, input.owner, &input.patch)
            .await?
            .ok_or(ApiError::NotFound)
    }
}

// ── DeleteNote ───────────────────────────────────────────────────────────────

pub struct DeleteNoteUseCase<R: NoteRepository> {
    pub notes: R,
}

impl<R: NoteRepository> DeleteNoteUseCase<R> {
    pub async fn execute(&self, owner: UserId, id: NoteId) -> Result<(), ApiError> {
        if !self.notes.delete_owned(id, owner).await? {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }
}
