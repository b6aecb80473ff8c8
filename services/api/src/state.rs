use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use notekeeper_auth_types::token::TokenKeys;
use notekeeper_core::health::Uptime;

use crate::infra::db::{DbNoteRepository, DbOtpChallengeRepository, DbUserRepository};
use crate::infra::email::EmailNotifier;
use crate::infra::google::GoogleJwksVerifier;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub tokens: TokenKeys,
    /// `None` disables Google sign-in.
    pub google_client_id: Option<String>,
    pub mailer: EmailNotifier,
    pub google: GoogleJwksVerifier,
    pub uptime: Uptime,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn otp_repo(&self) -> DbOtpChallengeRepository {
        DbOtpChallengeRepository {
            db: self.db.clone(),
        }
    }

    pub fn note_repo(&self) -> DbNoteRepository {
        DbNoteRepository {
            db: self.db.clone(),
        }
    }
}

impl FromRef<AppState> for TokenKeys {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

impl FromRef<AppState> for Uptime {
    fn from_ref(state: &AppState) -> Self {
        state.uptime
    }
}
