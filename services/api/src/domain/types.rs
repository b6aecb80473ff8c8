use chrono::{DateTime, Utc};

use notekeeper_domain::email::Email;
use notekeeper_domain::id::{NoteId, OtpChallengeId, UserId};
use notekeeper_domain::user::AuthProvider;

/// Stored user account.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub provider: AuthProvider,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile fields written on every successful sign-in.
#[derive(Debug, Clone)]
pub struct SignInProfile {
    pub email: Email,
    pub name: String,
    /// `None` leaves a stored avatar untouched.
    pub avatar_url: Option<String>,
    pub provider: AuthProvider,
}

/// One-time code issued to an email address.
#[derive(Debug, Clone)]
pub struct OtpChallenge {
    pub id: OtpChallengeId,
    pub email: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub consumed: bool,
    pub created_at: DateTime<Utc>,
}

impl OtpChallenge {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// A user-owned note.
#[derive(Debug, Clone)]
pub struct Note {
    pub id: NoteId,
    pub user_id: UserId,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields to overwrite on a note. `None` leaves the stored value as is.
#[derive(Debug, Clone, Default)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl NotePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}

/// Claims of a verified Google ID token.
#[derive(Debug, Clone, Default)]
pub struct GooglePayload {
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// Number of digits in an OTP code.
pub const OTP_LEN: usize = 6;

/// OTP code time-to-live in seconds (10 minutes).
pub const OTP_TTL_SECS: i64 = 600;

/// Purge removes challenges that expired at least this long ago.
pub const OTP_PURGE_GRACE_SECS: i64 = 24 * 60 * 60;
