use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder,
};

use notekeeper_api_schema::{notes, otp_challenges, users};
use notekeeper_domain::id::{NoteId, OtpChallengeId, UserId};
use notekeeper_domain::user::AuthProvider;

use crate::domain::repository::{NoteRepository, OtpChallengeRepository, UserRepository};
use crate::domain::types::{Note, NotePatch, OtpChallenge, SignInProfile, User};
use crate::error::ApiError;

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn upsert_on_sign_in(&self, profile: &SignInProfile) -> Result<User, ApiError> {
        let now = Utc::now();
        let mut update = vec![
            users::Column::Name,
            users::Column::Provider,
            users::Column::UpdatedAt,
        ];
        if profile.avatar_url.is_some() {
            update.push(users::Column::AvatarUrl);
        }

        // INSERT ... ON CONFLICT (email) DO UPDATE ... RETURNING *
        let model = users::Entity::insert(users::ActiveModel {
            id: Set(UserId::generate().0),
            email: Set(profile.email.as_str().to_owned()),
            name: Set(Some(profile.name.clone())),
            avatar_url: Set(profile.avatar_url.clone()),
            provider: Set(profile.provider.as_str().to_owned()),
            created_at: Set(now),
            updated_at: Set(now),
        })
        .on_conflict(
            OnConflict::column(users::Column::Email)
                .update_columns(update)
                .to_owned(),
        )
        .exec_with_returning(&self.db)
        .await
        .context("upsert user on sign-in")?;

        user_from_model(model)
    }
}

fn user_from_model(model: users::Model) -> Result<User, ApiError> {
    let provider = AuthProvider::from_str_value(&model.provider)
        .with_context(|| format!("unknown provider {:?} on user {}", model.provider, model.id))?;
    Ok(User {
        id: UserId(model.id),
        email: model.email,
        name: model.name,
        avatar_url: model.avatar_url,
        provider,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── OTP challenge repository ─────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOtpChallengeRepository {
    pub db: DatabaseConnection,
}

impl OtpChallengeRepository for DbOtpChallengeRepository {
    async fn create(&self, challenge: &OtpChallenge) -> Result<(), ApiError> {
        otp_challenges::ActiveModel {
            id: Set(challenge.id.0),
            email: Set(challenge.email.clone()),
            code: Set(challenge.code.clone()),
            expires_at: Set(challenge.expires_at),
            consumed: Set(challenge.consumed),
            created_at: Set(challenge.created_at),
        }
        .insert(&self.db)
        .await
        .context("create otp challenge")?;
        Ok(())
    }

    async fn find_latest(
        &self,
        email: &str,
        code: &str,
    ) -> Result<Option<OtpChallenge>, ApiError> {
        let model = otp_challenges::Entity::find()
            .filter(otp_challenges::Column::Email.eq(email))
            .filter(otp_challenges::Column::Code.eq(code))
            .order_by_desc(otp_challenges::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find latest otp challenge")?;
        Ok(model.map(challenge_from_model))
    }

    async fn consume(&self, id: OtpChallengeId) -> Result<bool, ApiError> {
        let result = otp_challenges::Entity::update_many()
            .col_expr(otp_challenges::Column::Consumed, Expr::value(true))
            .filter(otp_challenges::Column::Id.eq(id.0))
            .filter(otp_challenges::Column::Consumed.eq(false))
            .exec(&self.db)
            .await
            .context("consume otp challenge")?;
        Ok(result.rows_affected > 0)
    }

    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<u64, ApiError> {
        let result = otp_challenges::Entity::delete_many()
            .filter(otp_challenges::Column::ExpiresAt.lt(cutoff))
            .exec(&self.db)
            .await
            .context("delete expired otp challenges")?;
        Ok(result.rows_affected)
    }
}

fn challenge_from_model(model: otp_challenges::Model) -> OtpChallenge {
    OtpChallenge {
        id: OtpChallengeId(model.id),
        email: model.email,
        code: model.code,
        expires_at: model.expires_at,
        consumed: model.consumed,
        created_at: model.created_at,
    }
}

// ── Note repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbNoteRepository {
    pub db: DatabaseConnection,
}

impl NoteRepository for DbNoteRepository {
    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Note>, ApiError> {
        let models = notes::Entity::find()
            .filter(notes::Column::UserId.eq(owner.0))
            .order_by_desc(notes::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list notes by owner")?;
        Ok(models.into_iter().map(note_from_model).collect())
    }

    async fn create(&self, note: &Note) -> Result<(), ApiError> {
        notes::ActiveModel {
            id: Set(note.id.0),
            user_id: Set(note.user_id.0),
            title: Set(note.title.clone()),
            content: Set(note.content.clone()),
            created_at: Set(note.created_at),
            updated_at: Set(note.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create note")?;
        Ok(())
    }

    async fn update_owned(
        &self,
        id: NoteId,
        owner: UserId,
        patch: &NotePatch,
    ) -> Result<Option<Note>, ApiError> {
        let mut query = notes::Entity::update_many()
            .col_expr(notes::Column::UpdatedAt, Expr::value(Utc::now()));
        if let Some(title) = &patch.title {
            query = query.col_expr(notes::Column::Title, Expr::value(title.clone()));
        }
        if let Some(content) = &patch.content {
            query = query.col_expr(notes::Column::Content, Expr::value(content.clone()));
        }

        let mut updated = query
            .filter(notes::Column::Id.eq(id.0))
            .filter(notes::Column::UserId.eq(owner.0))
            .exec_with_returning(&self.db)
            .await
            .context("update owned note")?;
        Ok(updated.pop().map(note_from_model))
    }

    async fn delete_owned(&self, id: NoteId, owner: UserId) -> Result<bool, ApiError> {
        let result = notes::Entity::delete_many()
            .filter(notes::Column::Id.eq(id.0))
            .filter(notes::Column::UserId.eq(owner.0))
            .exec(&self.db)
            .await
            .context("delete owned note")?;
        Ok(result.rows_affected > 0)
    }
}

fn note_from_model(model: notes::Model) -> Note {
    Note {
        id: NoteId(model.id),
        user_id: UserId(model.user_id),
        title: model.title,
        content: model.content,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
