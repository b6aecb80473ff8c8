use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use notekeeper_auth_types::identity::Identity;
use notekeeper_domain::id::NoteId;

use crate::domain::types::{Note, NotePatch};
use crate::error::ApiError;
use crate::handlers::ApiJson;
use crate::handlers::auth::OkResponse;
use crate::state::AppState;
use crate::usecase::note::{
    CreateNoteInput, CreateNoteUseCase, DeleteNoteUseCase, ListNotesUseCase, UpdateNoteInput,
    UpdateNoteUseCase,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    #[serde(serialize_with = "notekeeper_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "notekeeper_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Note> for NoteResponse {
    fn from(note: Note) -> Self {
        Self {
            id: note.id.to_string(),
            user_id: note.user_id.to_string(),
            title: note.title,
            content: note.content,
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct NoteEnvelope {
    pub note: NoteResponse,
}

#[derive(Serialize)]
pub struct NoteListResponse {
    pub notes: Vec<NoteResponse>,
}

/// `201 Created` with the new note.
fn created(note: Note) -> (StatusCode, Json<NoteEnvelope>) {
    (StatusCode::CREATED, Json(NoteEnvelope { note: note.into() }))
}

/// A path segment that is not a UUID cannot name any note.
fn parse_note_id(raw: &str) -> Result<NoteId, ApiError> {
    raw.parse().map_err(|_| ApiError::NotFound)
}

// ── GET /notes ───────────────────────────────────────────────────────────────

pub async fn list_notes(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<NoteListResponse>, ApiError> {
    let usecase = ListNotesUseCase {
        notes: state.note_repo(),
    };
    let notes = usecase.execute(identity.user_id).await?;
    Ok(Json(NoteListResponse {
        notes: notes.into_iter().map(Into::into).collect(),
    }))
}

// ── POST /notes ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateNoteRequest {
    #[serde(default)]
    pub title: String,
    pub content: Option<String>,
}

pub async fn create_note(
    identity: Identity,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateNoteRequest>,
) -> Result<(StatusCode, Json<NoteEnvelope>), ApiError> {
    let usecase = CreateNoteUseCase {
        notes: state.note_repo(),
    };
    let note = usecase
        .execute(CreateNoteInput {
            owner: identity.user_id,
            title: body.title,
            content: body.content,
        })
        .await?;
    Ok(created(note))
}

// ── PUT /notes/{id} ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

pub async fn update_note(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateNoteRequest>,
) -> Result<Json<NoteEnvelope>, ApiError> {
    let id = parse_note_id(&id)?;
    let usecase = UpdateNoteUseCase {
        notes: state.note_repo(),
    };
    let note = usecase
        .execute(UpdateNoteInput {
            owner: identity.user_id,
            id,
            patch: NotePatch {
                title: body.title,
                content: body.content,
            },
        })
        .await?;
    Ok(Json(NoteEnvelope { note: note.into() }))
}

// ── DELETE /notes/{id} ───────────────────────────────────────────────────────

pub async fn delete_note(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OkResponse>, ApiError> {
    let id = parse_note_id(&id)?;
    let usecase = DeleteNoteUseCase {
        notes: state.note_repo(),
    };
    usecase.execute(identity.user_id, id).await?;
    Ok(Json(OkResponse::ok()))
}
