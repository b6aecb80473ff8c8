#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};

use notekeeper_domain::id::{NoteId, OtpChallengeId, UserId};

use crate::domain::types::{GooglePayload, Note, NotePatch, OtpChallenge, SignInProfile, User};
use crate::error::ApiError;

/// Repository for user accounts.
pub trait UserRepository: Send + Sync {
    /// Insert the user if no row has this email, otherwise overwrite the profile fields.
    /// Must be a single atomic write so concurrent first sign-ins cannot both insert.
    async fn upsert_on_sign_in(&self, profile: &SignInProfile) -> Result<User, ApiError>;
}

/// Repository for one-time email codes.
pub trait OtpChallengeRepository: Send + Sync {
    async fn create(&self, challenge: &OtpChallenge) -> Result<(), ApiError>;

    /// Most recently created challenge matching `(email, code)` exactly, consumed or not.
    async fn find_latest(
        &self,
        email: &str,
        code: &str,
    ) -> Result<Option<OtpChallenge>, ApiError>;

    /// Mark a challenge consumed. Returns `false` if it was already consumed.
    async fn consume(&self, id: OtpChallengeId) -> Result<bool, ApiError>;

    /// Delete challenges that expired before `cutoff`. Returns the number removed.
    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<u64, ApiError>;
}

/// Repository for notes. Every lookup is scoped to the owning user.
pub trait NoteRepository: Send + Sync {
    /// Notes owned by `owner`, newest first.
    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Note>, ApiError>;

    async fn create(&self, note: &Note) -> Result<(), ApiError>;

    /// Apply `patch` to the note if `owner` owns it. `None` if no such note.
    async fn update_owned(
        &self,
        id: NoteId,
        owner: UserId,
        patch: &NotePatch,
    ) -> Result<Option<Note>, ApiError>;

    /// Delete the note if `owner` owns it. Returns `true` if deleted, `false` if not found.
    async fn delete_owned(&self, id: NoteId, owner: UserId) -> Result<bool, ApiError>;
}

/// Port for delivering OTP codes.
pub trait OtpMailer: Send + Sync {
    async fn send_otp(&self, to: &str, code: &str) -> Result<(), ApiError>;
}

/// Port for validating Google ID tokens.
pub trait GoogleVerifier: Send + Sync {
    /// `Ok(None)` when the token is rejected (bad signature, audience, issuer or expiry).
    /// `Err` only when verification itself could not run.
    async fn verify(
        &self,
        id_token: &str,
        client_id: &str,
    ) -> Result<Option<GooglePayload>, ApiError>;
}
